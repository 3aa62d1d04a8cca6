//! Runtime struct schemas for Rust.
//!
//! Declare named struct shapes with typed, optional or required attributes,
//! coerce incoming values to the declared types, validate whole records and
//! serialize them to JSON.
//!
//! # Core Components
//!
//! - [`Model`] - Registry of struct schemas and coercion pipelines
//! - [`Record`] - Schema-bound keyed value container
//! - [`BoundedList`] - List value enforcing its declared length bounds
//! - [`Value`] - Dynamic value flowing through the pipelines
//!
//! # Quick Start
//!
//! ```rust
//! use structmodel::{AttributeOptions, AttributeType, Model, SchemaOptions, Value};
//!
//! # fn main() -> Result<(), structmodel::ModelError> {
//! let model = Model::new();
//! model
//!     .declare("Book", SchemaOptions::new().indent(None))?
//!     .define("title", AttributeOptions::text().required().strip())?
//!     .define(
//!         "tags",
//!         AttributeOptions::list().max_length(2).item_pattern("^[a-z]+$"),
//!     )?
//!     .define("edition", AttributeOptions::of(AttributeType::Integer).default_value(1))?;
//!
//! let mut book = model.record("Book")?;
//! book.set("title", "  Dune ")?;
//! book.set("tags", Value::array(["scifi"]))?;
//! book.validate()?;
//! assert_eq!(
//!     book.serialize()?,
//!     r#"{"edition": 1, "tags": ["scifi"], "title": "Dune"}"#
//! );
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod value;

// Re-export commonly used types for convenience
pub use error::{ErrorCategory, ModelError, ModelResult, TypeError, ValidationError};
pub use pipeline::{Stage, StageFactory, TextFilter, TextFilters, TypeRegistry};
pub use record::{BoundedList, Record};
pub use schema::{
    AttributeOptions, AttributeSpec, AttributeType, Declaration, DefaultValue, Model, Schema,
    SchemaOptions, TypeTag, ValidatorOptions,
};
pub use value::Value;
