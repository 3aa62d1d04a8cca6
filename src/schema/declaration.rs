//! Declaration documents.
//!
//! Structs can be declared from JSON documents instead of code. A document is
//! one struct declaration or an array of them:
//!
//! ```json
//! {
//!   "name": "Book",
//!   "serialize_indent": null,
//!   "attributes": [
//!     {"name": "title", "type": "text", "required": true, "strip": true},
//!     {"name": "tags", "type": "list", "max_length": 3, "item_pattern": "^[a-z]+$"},
//!     {"name": "author", "type": "struct:Author"},
//!     {"name": "edition", "type": "integer", "default": 1}
//!   ]
//! }
//! ```
//!
//! Schema options sit next to `name` and `attributes`; unknown keys become
//! extra options. Attribute keys prefixed `item_` configure list elements.

use super::registry::Model;
use super::types::{AttributeOptions, SchemaOptions};
use crate::error::{ModelError, ModelResult};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Declaration of one struct.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDeclaration {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDeclaration>,
    #[serde(flatten)]
    pub options: SchemaOptions,
}

/// Declaration of one attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeDeclaration {
    pub name: String,
    #[serde(flatten)]
    pub options: AttributeOptions,
}

/// Parse a declaration document holding one declaration or an array of them.
pub fn parse_declarations(json: &str) -> ModelResult<Vec<SchemaDeclaration>> {
    let document: serde_json::Value = serde_json::from_str(json)?;
    let declarations = match document {
        serde_json::Value::Array(_) => serde_json::from_value(document)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(declarations)
}

impl Model {
    /// Declare one struct and its attributes.
    pub fn apply_declaration(&self, declaration: SchemaDeclaration) -> ModelResult<String> {
        let SchemaDeclaration {
            name,
            attributes,
            options,
        } = declaration;
        let mut handle = self.declare(&name, options)?;
        for attribute in attributes {
            handle = handle.define(&attribute.name, attribute.options)?;
        }
        Ok(name)
    }

    /// Declare every struct of a JSON declaration document, returning their names.
    pub fn load_declarations(&self, json: &str) -> ModelResult<Vec<String>> {
        let names = parse_declarations(json)?
            .into_iter()
            .map(|declaration| self.apply_declaration(declaration))
            .collect::<ModelResult<Vec<_>>>()?;
        debug!("Loaded {} struct declaration(s)", names.len());
        Ok(names)
    }

    /// Declare every struct of a declaration file.
    pub fn load_declaration_file<P: AsRef<Path>>(&self, path: P) -> ModelResult<Vec<String>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loading struct declarations from {}", path.display());
        self.load_declarations(&content)
    }

    /// Declare the structs of every `*.json` file in a directory, in file name order.
    pub fn load_declaration_dir<P: AsRef<Path>>(&self, dir: P) -> ModelResult<Vec<String>> {
        let dir = dir.as_ref();
        let io_error = |source| ModelError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        let mut names = Vec::new();
        for file in files {
            names.extend(self.load_declaration_file(&file)?);
        }
        Ok(names)
    }
}
