//! Struct schemas.
//!
//! A [`Schema`] is the declaration of one struct: its options, its ordered
//! attribute specifications and its whole-record validators. Schemas are
//! values; the [`Model`] stores them behind `Arc` and swaps in modified copies,
//! so a schema obtained from the model never changes under its holder.

use super::attribute::AttributeSpec;
use super::registry::Model;
use super::types::{AttributeOptions, PROTECTED_OPTIONS, SchemaOptions, StructValidator};
use crate::error::{ModelError, ModelResult};
use crate::value::Value;
use log::debug;
use std::sync::Arc;

/// Whether an attribute name is hidden from declarations and output.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('_')
}

/// Declaration of one struct.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    options: SchemaOptions,
    attributes: Vec<Arc<AttributeSpec>>,
    validators: Vec<StructValidator>,
}

impl Schema {
    pub fn new(name: impl Into<String>, options: SchemaOptions) -> Self {
        let mut schema = Self {
            name: name.into(),
            options,
            attributes: Vec::new(),
            validators: Vec::new(),
        };
        schema.strip_protected_options();
        schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> &[Arc<AttributeSpec>] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Arc<AttributeSpec>> {
        self.attributes.iter().find(|spec| spec.name() == name)
    }

    pub fn validators(&self) -> &[StructValidator] {
        &self.validators
    }

    /// Declare an attribute. Redeclaring keeps its position and replaces its
    /// specification.
    pub fn add_attribute(
        &mut self,
        name: impl Into<String>,
        options: AttributeOptions,
    ) -> Arc<AttributeSpec> {
        let spec = Arc::new(AttributeSpec::new(
            self.name.clone(),
            name,
            without_protected(options),
        ));
        match self
            .attributes
            .iter_mut()
            .find(|existing| existing.name() == spec.name())
        {
            Some(existing) => *existing = Arc::clone(&spec),
            None => self.attributes.push(Arc::clone(&spec)),
        }
        spec
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Arc<AttributeSpec>> {
        let index = self.attributes.iter().position(|spec| spec.name() == name)?;
        Some(self.attributes.remove(index))
    }

    /// Modify schema options in place.
    pub fn set_options(&mut self, patch: impl FnOnce(&mut SchemaOptions)) {
        patch(&mut self.options);
        self.strip_protected_options();
    }

    /// Reset options to their defaults. Protected and unknown keys are ignored.
    pub fn unset_options<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        for key in keys {
            self.options.unset(key);
        }
    }

    /// Modify the options of a declared attribute. The attribute gets a fresh
    /// specification, so its pipeline is recompiled on next use. Returns false
    /// when the attribute is not declared.
    pub fn set_attribute_options(
        &mut self,
        name: &str,
        patch: impl FnOnce(&mut AttributeOptions),
    ) -> bool {
        self.replace_attribute(name, |spec| {
            spec.with_options(|options| {
                patch(options);
                strip_protected(&mut options.extras);
            })
        })
    }

    /// Reset attribute options to their defaults; `item_<key>` resets the key
    /// on the element options. Returns false when the attribute is not declared.
    pub fn unset_attribute_options<'a>(
        &mut self,
        name: &str,
        keys: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        self.replace_attribute(name, |spec| {
            spec.with_options(|options| {
                for key in keys {
                    options.unset(key);
                }
            })
        })
    }

    fn replace_attribute(
        &mut self,
        name: &str,
        rebuild: impl FnOnce(&AttributeSpec) -> AttributeSpec,
    ) -> bool {
        match self.attributes.iter_mut().find(|spec| spec.name() == name) {
            Some(spec) => {
                *spec = Arc::new(rebuild(spec));
                true
            }
            None => false,
        }
    }

    pub fn add_validator(&mut self, validator: StructValidator) {
        self.validators.push(validator);
    }

    fn strip_protected_options(&mut self) {
        strip_protected(&mut self.options.extras);
    }

    /// Coerce a value about to be written to `attribute`.
    ///
    /// Hidden names pass through. Undeclared names fail on closed schemas and
    /// are declared as text on open ones.
    pub fn process_set(&self, model: &Arc<Model>, attribute: &str, value: Value) -> ModelResult<Value> {
        if is_hidden(attribute) {
            return Ok(value);
        }
        let spec = match self.attribute(attribute) {
            Some(spec) => Arc::clone(spec),
            None if self.options.open => {
                debug!(
                    "Auto-declaring text attribute '{}' on open struct '{}'",
                    attribute, self.name
                );
                model.define(&self.name, attribute, AttributeOptions::text())?
            }
            None => return Err(ModelError::undefined_attribute(&self.name, attribute)),
        };
        model.coerce(&spec, value)
    }

    /// Check that `attribute` may be removed from a record.
    pub fn process_delete(&self, attribute: &str) -> ModelResult<()> {
        if is_hidden(attribute) || self.options.lenient {
            return Ok(());
        }
        match self.attribute(attribute) {
            Some(spec) if spec.required() => {
                Err(ModelError::missing_attribute(&self.name, attribute))
            }
            _ => Ok(()),
        }
    }
}

fn strip_protected(extras: &mut std::collections::BTreeMap<String, serde_json::Value>) {
    extras.retain(|key, _| !PROTECTED_OPTIONS.contains(&key.as_str()));
}

fn without_protected(mut options: AttributeOptions) -> AttributeOptions {
    strip_protected(&mut options.extras);
    options
}
