//! Record validation.
//!
//! Validation walks the declared attributes of a schema in declaration order:
//! absent attributes receive their defaults, required attributes must hold a
//! value, nested records and lists are checked recursively, and finally the
//! whole-record validators run in registration order. Defaults applied before
//! a failure stay applied.

use super::attribute::AttributeSpec;
use super::definition::{Schema, is_hidden};
use super::types::AttributeType;
use crate::error::{ModelError, ModelResult, ValidationError};
use crate::record::Record;
use crate::value::Value;
use log::trace;
use std::sync::Arc;

impl Schema {
    /// Validate a record of this schema, applying defaults to absent attributes.
    ///
    /// Validating an already valid record changes nothing.
    pub fn validate(&self, record: &mut Record) -> ModelResult<()> {
        if record.struct_name() != self.name() {
            return Err(ModelError::InvalidStructType {
                struct_type: record.struct_name().to_string(),
            });
        }
        trace!("Validating record of struct '{}'", self.name());

        for spec in self.attributes() {
            let name = spec.name();
            if is_hidden(name) {
                continue;
            }
            self.apply_default(spec, record)?;

            if spec.required() {
                match record.get(name) {
                    None => return Err(ModelError::missing_attribute(self.name(), name)),
                    Some(value) if value.is_null() => {
                        return Err(ModelError::missing_value(self.name(), name));
                    }
                    Some(_) => {}
                }
            }

            match spec.attr_type() {
                AttributeType::Struct(_) => {
                    if let Some(Value::Record(nested)) = record.entry_mut(name) {
                        nested.validate()?;
                    }
                }
                AttributeType::List => validate_list(spec, record.entry_mut(name))?,
                _ => {}
            }
        }

        for validator in self.validators() {
            if !validator.check(record) {
                return Err(ValidationError::StructValidation {
                    name: self.name().to_string(),
                    explanation: validator.options.message.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn apply_default(&self, spec: &AttributeSpec, record: &mut Record) -> ModelResult<()> {
        let options = spec.options();
        let Some(default) = options.default.as_ref() else {
            return Ok(());
        };
        if record.contains(spec.name()) {
            return Ok(());
        }
        let value = default.produce(&options.default_args);
        if !value.is_null() {
            trace!("Applying default to '{}'", spec.qualified_name());
            let value = self.process_set(record.model(), spec.name(), value)?;
            record.put(spec.name(), value);
        }
        Ok(())
    }
}

fn validate_list(spec: &Arc<AttributeSpec>, value: Option<&mut Value>) -> ModelResult<()> {
    match value {
        None | Some(Value::Null) => {
            if spec.min_length().is_some_and(|min| min > 0) {
                return Err(ModelError::missing_value(spec.namespace(), spec.name()));
            }
        }
        Some(Value::List(list)) => {
            list.rebind(spec);
            list.check_length(0)?;
            if spec.item_spec().attr_type().struct_name().is_some() {
                for item in list.items_mut() {
                    if let Value::Record(nested) = item {
                        nested.validate()?;
                    }
                }
            }
        }
        Some(other) => {
            return Err(ModelError::unexpected(format!(
                "unsupported list value for '{}': {}",
                spec.qualified_name(),
                other.type_name()
            )));
        }
    }
    Ok(())
}
