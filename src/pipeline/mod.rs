//! Coercion pipeline registry.
//!
//! Every attribute value written to a record is folded through an ordered list
//! of stages. The stages for an attribute are produced by the factories
//! registered for its type tag; a factory may decline (return `None`) when the
//! stage does not apply to the attribute, e.g. a pattern stage without a
//! configured pattern. The resulting list is compiled once per
//! [`AttributeSpec`] and cached on it.
//!
//! # Examples
//!
//! ```rust
//! use structmodel::pipeline::{always, stage, when};
//! use structmodel::{AttributeOptions, AttributeType, Model, TypeTag, Value};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), structmodel::ModelError> {
//! let model = Model::new();
//! model.register_type(
//!     TypeTag::Custom("shout".to_string()),
//!     vec![
//!         always(stage(|value, _, _| Ok(Value::from(value.to_string())))),
//!         when(
//!             |spec| spec.options().extra_value("loud").is_some(),
//!             stage(|value, _, _| Ok(Value::from(format!("{}!", value)))),
//!         ),
//!     ],
//! )?;
//!
//! model.declare("Greeting", Default::default())?.define(
//!     "text",
//!     AttributeOptions::of(AttributeType::Custom("shout".to_string())).extra("loud", json!(true)),
//! )?;
//! let mut record = model.record("Greeting")?;
//! record.set("text", "hello")?;
//! assert_eq!(record.get("text"), Some(&Value::from("hello!")));
//! # Ok(())
//! # }
//! ```

pub mod builtin;


use crate::error::{ModelError, ModelResult, TypeError};
use crate::schema::types::TypeTag;
use crate::schema::{AttributeSpec, Model};
use crate::value::Value;
use log::trace;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One value-transforming step of a compiled pipeline.
pub type Stage =
    Arc<dyn Fn(Value, &Arc<AttributeSpec>, &Arc<Model>) -> ModelResult<Value> + Send + Sync>;

/// Produces the stage for an attribute, or `None` when it does not apply.
pub type StageFactory = Arc<dyn Fn(&AttributeSpec) -> ModelResult<Option<Stage>> + Send + Sync>;

/// Text transformation used by the `cleanse` and `normalize` options.
pub type TextFilter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Wrap a closure as a [`Stage`].
pub fn stage<F>(f: F) -> Stage
where
    F: Fn(Value, &Arc<AttributeSpec>, &Arc<Model>) -> ModelResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Factory that contributes `stage` to every attribute.
pub fn always(stage: Stage) -> StageFactory {
    Arc::new(move |_| Ok(Some(Arc::clone(&stage))))
}

/// Factory that contributes `stage` to attributes matching `applies`.
pub fn when<P>(applies: P, stage: Stage) -> StageFactory
where
    P: Fn(&AttributeSpec) -> bool + Send + Sync + 'static,
{
    Arc::new(move |spec| Ok(applies(spec).then(|| Arc::clone(&stage))))
}

/// Filters applied by text attributes declaring `cleanse` or `normalize`.
#[derive(Clone)]
pub struct TextFilters {
    pub cleanse: TextFilter,
    pub normalize: TextFilter,
}

impl TextFilters {
    pub fn new(cleanse: TextFilter, normalize: TextFilter) -> Self {
        Self { cleanse, normalize }
    }
}

/// Removes control characters; collapses whitespace runs to single spaces.
impl Default for TextFilters {
    fn default() -> Self {
        Self {
            cleanse: Arc::new(|text: &str| text.chars().filter(|c| !c.is_control()).collect()),
            normalize: Arc::new(|text: &str| text.split_whitespace().collect::<Vec<_>>().join(" ")),
        }
    }
}

impl fmt::Debug for TextFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFilters").finish_non_exhaustive()
    }
}

/// Table mapping type tags to ordered stage factories.
pub struct TypeRegistry {
    factories: RwLock<HashMap<TypeTag, Arc<[StageFactory]>>>,
}

impl TypeRegistry {
    /// Registry without any type.
    pub fn empty() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// Registry holding the built-in types.
    pub fn new() -> Self {
        let registry = Self::empty();
        {
            let mut factories = registry.factories.write();
            for tag in TypeTag::BUILTIN {
                let stages = builtin::factories(&tag);
                factories.insert(tag, stages.into());
            }
        }
        registry
    }

    /// Register (or replace) the factories of a type tag.
    pub fn register(&self, tag: TypeTag, factories: Vec<StageFactory>) -> ModelResult<()> {
        if matches!(&tag, TypeTag::Custom(name) if name.is_empty()) {
            return Err(ModelError::unexpected("type tag must not be empty"));
        }
        if factories.is_empty() {
            return Err(ModelError::unexpected(format!(
                "type '{}' has no stage factories",
                tag
            )));
        }
        self.factories.write().insert(tag, factories.into());
        Ok(())
    }

    pub fn is_registered(&self, tag: &TypeTag) -> bool {
        self.factories.read().contains_key(tag)
    }

    /// Registered tags in a stable order.
    pub fn tags(&self) -> Vec<TypeTag> {
        let mut tags: Vec<TypeTag> = self.factories.read().keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Instantiate the stages of an attribute, ignoring any cached pipeline.
    pub fn compile(&self, spec: &AttributeSpec) -> ModelResult<Arc<[Stage]>> {
        let tag = spec.attr_type().tag();
        let factories = self.factories.read().get(&tag).cloned().ok_or_else(|| {
            TypeError::UnrecognizedType {
                attribute: spec.qualified_name(),
                type_name: spec.attr_type().to_string(),
            }
        })?;

        let mut stages = Vec::with_capacity(factories.len());
        for factory in factories.iter() {
            if let Some(stage) = factory(spec)? {
                stages.push(stage);
            }
        }
        trace!(
            "Compiled {} stage(s) for '{}' ({})",
            stages.len(),
            spec.qualified_name(),
            tag
        );
        Ok(stages.into())
    }

    /// Fold a value through the attribute's pipeline, compiling it on first use.
    pub fn process(
        &self,
        model: &Arc<Model>,
        spec: &Arc<AttributeSpec>,
        value: Value,
    ) -> ModelResult<Value> {
        if spec.required() && value.is_null() {
            return Err(ModelError::missing_value(spec.namespace(), spec.name()));
        }

        let stages = match spec.compiled() {
            Some(stages) => Arc::clone(stages),
            None => Arc::clone(spec.cache_pipeline(self.compile(spec)?)),
        };

        stages
            .iter()
            .try_fold(value, |value, stage| stage(value, spec, model))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
