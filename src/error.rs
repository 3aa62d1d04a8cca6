//! Error types for struct model operations.
//!
//! Errors are split the same way the failures happen: registry and declaration
//! misuse surface directly on [`ModelError`], values that cannot be coerced to a
//! declared type surface as [`TypeError`], and data that coerces but breaks a
//! declared constraint surfaces as [`ValidationError`]. Every variant carries
//! its parameters as named fields; attribute names are always qualified as
//! `Namespace.name`.

use std::path::PathBuf;

/// Main error type for struct model operations.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// No schema is registered under the name
    #[error("Unknown struct '{name}'")]
    UnknownStruct { name: String },

    /// The name was never declared as a struct
    #[error("Struct type '{struct_type}' has not been declared")]
    UndeclaredStruct { struct_type: String },

    /// The target cannot act as a record of the struct type
    #[error("Invalid struct type: {struct_type}")]
    InvalidStructType { struct_type: String },

    /// Write to an attribute that a closed schema does not declare
    #[error("Attribute '{attribute}' is not defined")]
    UndefinedAttribute { attribute: String },

    /// Required attribute is absent (or about to be deleted)
    #[error("Required attribute '{attribute}' is missing")]
    MissingRequiredAttribute { attribute: String },

    /// Misuse that the type system cannot rule out
    #[error("Unexpected error: {message}")]
    Unexpected { message: String },

    /// Value is not compatible with the declared type
    #[error("Type error: {0}")]
    Type(#[from] TypeError),

    /// Value breaks a declared constraint
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Declaration file could not be read
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised when a value cannot be brought to the declared type.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// No pipeline is registered for the declared type
    #[error("Attribute '{attribute}' has unrecognized type '{type_name}'")]
    UnrecognizedType { attribute: String, type_name: String },

    /// Value cannot become a record of the nested struct type
    #[error("Attribute '{attribute}' expects {expected_type}, found {found_type}")]
    IncompatibleType {
        attribute: String,
        expected_type: String,
        found_type: String,
    },

    /// List attribute received something that is not a sequence
    #[error("Attribute '{attribute}' expects a sequence, found {found_type}")]
    NonIterableType {
        attribute: String,
        found_type: String,
    },
}

/// Errors raised when a coerced value violates a declared constraint.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Required attribute holds no value
    #[error("Required attribute '{attribute}' has no value")]
    MissingRequiredValue { attribute: String },

    /// Text does not match the declared pattern
    #[error("Attribute '{attribute}' value '{value}' does not match pattern '{pattern}'")]
    PatternMismatch {
        attribute: String,
        pattern: String,
        value: String,
    },

    /// List length would leave the declared bounds
    #[error(
        "Attribute '{attribute}' would hold {estimated_length} items, bounds are {min_length:?}..{max_length:?}"
    )]
    ListBoundaryViolation {
        attribute: String,
        estimated_length: i64,
        min_length: Option<usize>,
        max_length: Option<usize>,
    },

    /// Value cannot be converted or is otherwise invalid
    #[error("Attribute '{attribute}' has invalid value '{value}' ({reason})")]
    InvalidValue {
        attribute: String,
        reason: String,
        value: String,
    },

    /// Temporal text does not follow the declared format
    #[error("Attribute '{attribute}' value '{value}' does not follow format '{format}': {source}")]
    UnparseableValue {
        attribute: String,
        value: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A whole-record validator rejected the record
    #[error("Struct '{name}' failed validation: {}", .explanation.as_deref().unwrap_or("no explanation"))]
    StructValidation {
        name: String,
        explanation: Option<String>,
    },
}

/// Broad classification of a [`ModelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Registry or declaration misuse
    Model,
    /// Value incompatible with the declared type
    Type,
    /// Value violates a declared constraint
    Validation,
    /// Failures outside the model (I/O, JSON)
    System,
}

impl ModelError {
    /// Create an unknown struct error
    pub fn unknown_struct(name: impl Into<String>) -> Self {
        Self::UnknownStruct { name: name.into() }
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Create an undefined attribute error
    pub fn undefined_attribute(namespace: &str, name: &str) -> Self {
        Self::UndefinedAttribute {
            attribute: qname(namespace, name),
        }
    }

    /// Create a missing required attribute error
    pub fn missing_attribute(namespace: &str, name: &str) -> Self {
        Self::MissingRequiredAttribute {
            attribute: qname(namespace, name),
        }
    }

    /// Create a missing required value error
    pub fn missing_value(namespace: &str, name: &str) -> Self {
        Self::Validation(ValidationError::MissingRequiredValue {
            attribute: qname(namespace, name),
        })
    }

    /// Taxonomy branch this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Type(_) => ErrorCategory::Type,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Json(_) | Self::Io { .. } => ErrorCategory::System,
            _ => ErrorCategory::Model,
        }
    }
}

/// Qualified attribute name: `Namespace.name`, or just the non-empty part.
pub fn qname(namespace: &str, name: &str) -> String {
    match (namespace.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => namespace.to_string(),
        (false, false) => format!("{}.{}", namespace, name),
    }
}

/// Result type for struct model operations
pub type ModelResult<T> = Result<T, ModelError>;
