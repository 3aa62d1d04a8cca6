//! # Struct Declaration Validator
//!
//! A command-line utility for checking struct declaration documents and,
//! optionally, validating a JSON record against one of the declared structs.
//!
//! ## Usage
//!
//! ### Check a Declaration File
//!
//! ```bash
//! cargo run --bin struct-validator structs/book.json
//! ```
//!
//! ### Check Every Declaration File in a Directory
//!
//! ```bash
//! cargo run --bin struct-validator ./structs/
//! ```
//!
//! ### Validate a Record
//!
//! ```bash
//! cargo run --bin struct-validator ./structs/ Book record.json
//! ```
//!
//! ## Output Examples
//!
//! ```text
//! Loading declarations from: ./structs/
//! ✓ Loaded 2 struct(s)
//!
//! Struct Summary: Author
//!   Options: closed, strict
//!   Attributes: 1
//!   Required attribute names: name
//!
//! Struct Summary: Book
//!   Options: closed, strict
//!   Attributes: 4
//!   Attribute types:
//!     - integer: 1
//!     - list: 1
//!     - struct:Author: 1
//!     - text: 1
//!   Required attribute names: title
//!
//! Validating record.json as Book
//! ✓ Record is valid!
//! {
//!   "edition": 1,
//!   "title": "Dune"
//! }
//! ```
//!
//! ## Checks
//!
//! - Every document must parse as a declaration (or array of declarations)
//! - Struct types referenced by attributes or list elements must be declared
//! - Attribute types must have a registered pipeline
//!
//! ## Exit Codes
//!
//! - `0`: Everything is valid
//! - `1`: A declaration or the record is invalid, or a file could not be read

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::process;
use std::sync::Arc;
use structmodel::{AttributeSpec, Model, ModelError, Record, Schema, Value};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 && args.len() != 4 {
        eprintln!("Usage: {} <file-or-directory> [<struct-name> <record.json>]", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} structs/book.json", args[0]);
        eprintln!("  {} ./structs/ Book record.json", args[0]);
        process::exit(1);
    }

    let model = Model::new();
    let path = Path::new(&args[1]);
    println!("Loading declarations from: {}", path.display());

    let loaded = if path.is_file() {
        model.load_declaration_file(path)
    } else if path.is_dir() {
        model.load_declaration_dir(path)
    } else {
        eprintln!(
            "Error: '{}' is not a valid file or directory",
            path.display()
        );
        process::exit(1);
    };

    match loaded {
        Ok(names) => println!("✓ Loaded {} struct(s)", names.len()),
        Err(e) => {
            eprintln!("❌ Declaration loading failed: {}", e);
            process::exit(1);
        }
    }

    let mut error_count = 0;
    for schema in model.schemas() {
        print_schema_summary(&schema);
        for problem in check_references(&model, &schema) {
            eprintln!("  ❌ {}", problem);
            error_count += 1;
        }
    }
    if error_count > 0 {
        eprintln!("\n{} problem(s) found", error_count);
        process::exit(1);
    }

    if let [_, _, struct_name, record_path] = args.as_slice() {
        println!("\nValidating {} as {}", record_path, struct_name);
        match validate_record(&model, struct_name, Path::new(record_path)) {
            Ok(output) => {
                println!("✓ Record is valid!");
                println!("{}", output);
            }
            Err(e) => {
                eprintln!("❌ Record validation failed: {}", e);
                process::exit(1);
            }
        }
    }
}

/// Struct references that do not resolve and types without a pipeline.
fn check_references(model: &Model, schema: &Schema) -> Vec<String> {
    let mut problems = Vec::new();
    for spec in schema.attributes() {
        let mut check = |spec: &AttributeSpec| {
            if let Some(name) = spec.attr_type().struct_name() {
                if !model.is_declared(name) {
                    problems.push(format!(
                        "{}: struct '{}' is not declared",
                        spec.qualified_name(),
                        name
                    ));
                }
            } else if !model.types().is_registered(&spec.attr_type().tag()) {
                problems.push(format!(
                    "{}: type '{}' is not registered",
                    spec.qualified_name(),
                    spec.attr_type()
                ));
            }
        };
        check(spec.as_ref());
        if spec.options().item.is_some() {
            check(spec.item_spec().as_ref());
        }
    }
    problems
}

fn validate_record(model: &Arc<Model>, struct_name: &str, path: &Path) -> Result<String, ModelError> {
    let content = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = Value::from(serde_json::from_str::<serde_json::Value>(&content)?);
    let mut record = Record::from_value(model, struct_name, value)?;
    record.validate()?;
    record.serialize()
}

fn print_schema_summary(schema: &Schema) {
    let options = schema.options();
    println!();
    println!("Struct Summary: {}", schema.name());
    println!(
        "  Options: {}, {}",
        if options.open { "open" } else { "closed" },
        if options.lenient { "lenient" } else { "strict" }
    );
    println!("  Attributes: {}", schema.attributes().len());
    if !schema.validators().is_empty() {
        println!("  Validators: {}", schema.validators().len());
    }

    let mut type_counts: BTreeMap<String, usize> = BTreeMap::new();
    for spec in schema.attributes() {
        *type_counts.entry(spec.attr_type().to_string()).or_insert(0) += 1;
    }
    if type_counts.len() > 1 {
        println!("  Attribute types:");
        for (attr_type, count) in type_counts {
            println!("    - {}: {}", attr_type, count);
        }
    }

    let required: Vec<&str> = schema
        .attributes()
        .iter()
        .filter(|spec| spec.required())
        .map(|spec| spec.name())
        .collect();
    if !required.is_empty() {
        println!("  Required attribute names: {}", required.join(", "));
    }
}
