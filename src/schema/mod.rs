//! Struct schemas: declarations, registry, validation and serialization.
//!
//! # Key Types
//!
//! - [`Model`] - Registry of struct schemas and type pipelines
//! - [`Schema`] - Declaration of one struct with its attributes and validators
//! - [`AttributeSpec`] - Declaration of one attribute and its compiled pipeline
//!
//! # Examples
//!
//! ```rust
//! use structmodel::schema::Model;
//! use structmodel::{AttributeOptions, SchemaOptions, ValidatorOptions};
//!
//! # fn main() -> Result<(), structmodel::ModelError> {
//! let model = Model::new();
//! model
//!     .declare("Point", SchemaOptions::new().indent(None))?
//!     .define("x", AttributeOptions::of("integer".parse()?).required())?
//!     .define("y", AttributeOptions::of("integer".parse()?).required())?
//!     .validator(
//!         |point| point.get("x") != point.get("y"),
//!         ValidatorOptions::message("diagonal points are not allowed"),
//!     )?;
//!
//! let mut point = model.record("Point")?;
//! point.assign([("x", 1), ("y", 2)])?;
//! assert_eq!(point.validate()?.serialize()?, r#"{"x": 1, "y": 2}"#);
//! # Ok(())
//! # }
//! ```

pub mod attribute;
pub mod declaration;
pub mod definition;
pub mod registry;
pub mod serialization;
pub mod types;
pub mod validation;


// Re-export the main types for convenience
pub use attribute::AttributeSpec;
pub use declaration::{AttributeDeclaration, SchemaDeclaration, parse_declarations};
pub use definition::{Schema, is_hidden};
pub use registry::{Declaration, Model};
pub use serialization::RecordFormatter;
pub use types::{
    AttributeOptions, AttributeType, DefaultValue, SchemaOptions, StructValidator, TypeTag,
    ValidatorOptions,
};
