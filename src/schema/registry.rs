//! Struct registry.
//!
//! The [`Model`] owns every declared [`Schema`], the coercion pipeline
//! registry and the text filters used by text pipelines. Schemas are stored as
//! `Arc` snapshots behind a single reader/writer lock; mutations clone the
//! affected schema and swap the copy in, so readers never hold the lock while
//! coercing or validating.

use super::attribute::AttributeSpec;
use super::definition::Schema;
use super::types::{AttributeOptions, SchemaOptions, StructValidator, TypeTag, ValidatorOptions};
use crate::error::{ModelError, ModelResult};
use crate::pipeline::{StageFactory, TextFilters, TypeRegistry};
use crate::record::Record;
use crate::value::Value;
use log::debug;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
struct Registry {
    schemas: HashMap<String, Arc<Schema>>,
    /// Names that were declared and later forgotten.
    retired: HashSet<String>,
}

impl Registry {
    fn missing(&self, name: &str) -> ModelError {
        if self.retired.contains(name) {
            ModelError::unknown_struct(name)
        } else {
            ModelError::UndeclaredStruct {
                struct_type: name.to_string(),
            }
        }
    }
}

/// Registry of struct schemas and type pipelines.
///
/// A model is shared as `Arc<Model>`: records keep a handle to the model they
/// were created from.
#[derive(Default)]
pub struct Model {
    registry: RwLock<Registry>,
    types: TypeRegistry,
    filters: RwLock<TextFilters>,
}

impl Model {
    /// Model with the built-in types and no structs.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Declare a struct, replacing any previous declaration of the name.
    pub fn declare(&self, name: &str, options: SchemaOptions) -> ModelResult<Declaration<'_>> {
        if name.is_empty() {
            return Err(ModelError::InvalidStructType {
                struct_type: name.to_string(),
            });
        }
        let schema = Arc::new(Schema::new(name, options));
        {
            let mut registry = self.registry.write();
            registry.retired.remove(name);
            registry.schemas.insert(name.to_string(), schema);
        }
        debug!("Declared struct '{}'", name);
        Ok(Declaration {
            model: self,
            name: name.to_string(),
        })
    }

    /// Look up a schema by name.
    pub fn schema(&self, name: &str) -> ModelResult<Arc<Schema>> {
        self.registry
            .read()
            .schemas
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::unknown_struct(name))
    }

    /// Schema of a struct used as a record binding or definition target.
    ///
    /// Fails with `UndeclaredStruct` for names never declared and with
    /// `UnknownStruct` for names that were forgotten.
    pub fn bound_schema(&self, name: &str) -> ModelResult<Arc<Schema>> {
        let registry = self.registry.read();
        registry
            .schemas
            .get(name)
            .cloned()
            .ok_or_else(|| registry.missing(name))
    }

    /// All schemas, ordered by name.
    pub fn schemas(&self) -> Vec<Arc<Schema>> {
        let mut schemas: Vec<Arc<Schema>> = self.registry.read().schemas.values().cloned().collect();
        schemas.sort_by(|a, b| a.name().cmp(b.name()));
        schemas
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.registry.read().schemas.contains_key(name)
    }

    /// Modify a schema under the write lock.
    ///
    /// `edit` works on a private copy when the current schema is shared, so
    /// snapshots handed out earlier are unaffected. Callers pass edits that
    /// never reach back into the model; public redefinition goes through
    /// [`Model::define`].
    pub(crate) fn update<R>(&self, name: &str, edit: impl FnOnce(&mut Schema) -> R) -> ModelResult<R> {
        let mut guard = self.registry.write();
        let registry = &mut *guard;
        if let Some(schema) = registry.schemas.get_mut(name) {
            return Ok(edit(Arc::make_mut(schema)));
        }
        Err(registry.missing(name))
    }

    /// Declare (or redeclare) an attribute of a struct.
    pub fn define(
        &self,
        struct_name: &str,
        attribute: &str,
        options: AttributeOptions,
    ) -> ModelResult<Arc<AttributeSpec>> {
        if attribute.is_empty() {
            return Err(ModelError::unexpected(format!(
                "attribute name of struct '{}' must not be empty",
                struct_name
            )));
        }
        let spec = self.update(struct_name, |schema| schema.add_attribute(attribute, options))?;
        debug!(
            "Defined attribute '{}' as {}",
            spec.qualified_name(),
            spec.attr_type()
        );
        Ok(spec)
    }

    /// Append a whole-record validator to a struct.
    pub fn attach_validator<F>(
        &self,
        struct_name: &str,
        predicate: F,
        options: ValidatorOptions,
    ) -> ModelResult<()>
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.update(struct_name, |schema| {
            schema.add_validator(StructValidator::new(predicate, options))
        })?;
        debug!("Attached validator to struct '{}'", struct_name);
        Ok(())
    }

    /// Remove a struct. Later uses of the name fail with `UnknownStruct`.
    pub fn forget(&self, name: &str) -> bool {
        let removed = {
            let mut registry = self.registry.write();
            let removed = registry.schemas.remove(name).is_some();
            if removed {
                registry.retired.insert(name.to_string());
            }
            removed
        };
        if removed {
            debug!("Forgot struct '{}'", name);
        }
        removed
    }

    /// Register (or replace) the pipeline of a type tag.
    pub fn register_type(&self, tag: TypeTag, factories: Vec<StageFactory>) -> ModelResult<()> {
        let count = factories.len();
        self.types.register(tag.clone(), factories)?;
        debug!("Registered type '{}' with {} stage factories", tag, count);
        Ok(())
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Replace the filters used by `cleanse` and `normalize` text options.
    pub fn set_text_filters(&self, filters: TextFilters) {
        *self.filters.write() = filters;
    }

    pub fn text_filters(&self) -> TextFilters {
        self.filters.read().clone()
    }

    /// Coerce a value with an attribute's pipeline.
    pub fn coerce(self: &Arc<Self>, spec: &Arc<AttributeSpec>, value: Value) -> ModelResult<Value> {
        self.types.process(self, spec, value)
    }

    /// Empty record of a declared struct.
    pub fn record(self: &Arc<Self>, struct_name: &str) -> ModelResult<Record> {
        Record::new(self, struct_name)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.registry.read().schemas.keys().cloned().collect();
        names.sort();
        f.debug_struct("Model")
            .field("structs", &names)
            .field("types", &self.types)
            .finish()
    }
}

/// Handle returned by [`Model::declare`] for chaining further declarations.
#[derive(Debug, Clone)]
pub struct Declaration<'a> {
    model: &'a Model,
    name: String,
}

impl Declaration<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare an attribute of the struct.
    pub fn define(self, attribute: &str, options: AttributeOptions) -> ModelResult<Self> {
        self.model.define(&self.name, attribute, options)?;
        Ok(self)
    }

    /// Append a whole-record validator.
    pub fn validator<F>(self, predicate: F, options: ValidatorOptions) -> ModelResult<Self>
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.model.attach_validator(&self.name, predicate, options)?;
        Ok(self)
    }

    pub fn schema(&self) -> ModelResult<Arc<Schema>> {
        self.model.schema(&self.name)
    }
}
