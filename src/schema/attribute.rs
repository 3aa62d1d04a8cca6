//! Attribute specifications.
//!
//! An [`AttributeSpec`] pairs the declarative [`AttributeOptions`] of one
//! attribute with two derived slots: the compiled coercion pipeline and, for
//! lists, the element specification. Both are filled at most once and never
//! invalidated; changing options always produces a fresh specification.

use super::types::{AttributeOptions, AttributeType};
use crate::error::qname;
use crate::pipeline::Stage;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Declaration of one attribute of a struct.
#[derive(Clone)]
pub struct AttributeSpec {
    namespace: String,
    name: String,
    options: AttributeOptions,
    pipeline: OnceLock<Arc<[Stage]>>,
    item: OnceLock<Arc<AttributeSpec>>,
}

impl AttributeSpec {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        options: AttributeOptions,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            options,
            pipeline: OnceLock::new(),
            item: OnceLock::new(),
        }
    }

    /// Name of the owning struct.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Namespace.name`
    pub fn qualified_name(&self) -> String {
        qname(&self.namespace, &self.name)
    }

    pub fn options(&self) -> &AttributeOptions {
        &self.options
    }

    pub fn attr_type(&self) -> &AttributeType {
        &self.options.attr_type
    }

    pub fn required(&self) -> bool {
        self.options.required
    }

    pub fn min_length(&self) -> Option<usize> {
        self.options.min_length
    }

    pub fn max_length(&self) -> Option<usize> {
        self.options.max_length
    }

    /// A copy of this specification with modified options and empty caches.
    pub fn with_options(&self, patch: impl FnOnce(&mut AttributeOptions)) -> Self {
        let mut options = self.options.clone();
        patch(&mut options);
        Self::new(self.namespace.clone(), self.name.clone(), options)
    }

    /// Element specification of a list attribute, derived on first use.
    ///
    /// It lives in the same namespace under the name `<name>[*]`; an attribute
    /// without element options gets text elements.
    pub fn item_spec(&self) -> Arc<AttributeSpec> {
        Arc::clone(self.item.get_or_init(|| {
            let options = self
                .options
                .item
                .as_deref()
                .cloned()
                .unwrap_or_default();
            Arc::new(AttributeSpec::new(
                self.namespace.clone(),
                format!("{}[*]", self.name),
                options,
            ))
        }))
    }

    /// Compiled pipeline, if it has been compiled already.
    pub fn compiled(&self) -> Option<&Arc<[Stage]>> {
        self.pipeline.get()
    }

    /// Store a compiled pipeline unless another one won the race.
    pub(crate) fn cache_pipeline(&self, stages: Arc<[Stage]>) -> &Arc<[Stage]> {
        self.pipeline.get_or_init(|| stages)
    }
}

impl fmt::Debug for AttributeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeSpec")
            .field("namespace", &self.namespace)
            .field("name", &self.name)
            .field("options", &self.options)
            .field("compiled", &self.pipeline.get().map(|stages| stages.len()))
            .finish()
    }
}
