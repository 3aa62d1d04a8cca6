//! Bounded list values.
//!
//! A [`BoundedList`] is the stored form of a list attribute. It keeps the
//! declaring [`AttributeSpec`] so every later mutation can enforce the declared
//! length bounds and coerce inbound elements through the element
//! specification. Each operation validates first and mutates last: a failed
//! call leaves the list exactly as it was.

use crate::error::{ModelError, ModelResult, ValidationError};
use crate::schema::{AttributeSpec, Model};
use crate::value::Value;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Length-checked, element-coercing sequence bound to a list attribute.
#[derive(Clone)]
pub struct BoundedList {
    model: Arc<Model>,
    spec: Arc<AttributeSpec>,
    items: Vec<Value>,
}

impl BoundedList {
    /// Empty list for the given list attribute. No bound is checked until the
    /// first mutation.
    pub fn new(model: &Arc<Model>, spec: Arc<AttributeSpec>) -> Self {
        Self {
            model: Arc::clone(model),
            spec,
            items: Vec::new(),
        }
    }

    /// Declaration of the list attribute.
    pub fn spec(&self) -> &Arc<AttributeSpec> {
        &self.spec
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.iter().any(|item| item.structurally_eq(value))
    }

    /// Unwrap the elements.
    pub fn into_vec(self) -> Vec<Value> {
        self.items
    }

    /// Follow a redefinition of the list attribute.
    pub(crate) fn rebind(&mut self, spec: &Arc<AttributeSpec>) {
        if !Arc::ptr_eq(&self.spec, spec) {
            self.spec = Arc::clone(spec);
        }
    }

    pub(crate) fn items_mut(&mut self) -> &mut [Value] {
        &mut self.items
    }

    /// Check that the list could change its length by `delta`.
    ///
    /// Bounds that are absent or zero are not enforced.
    pub fn check_length(&self, delta: isize) -> ModelResult<()> {
        let len = self.items.len();
        let prospective = if delta >= 0 {
            len.checked_add(delta.unsigned_abs())
        } else {
            Some(len.saturating_sub(delta.unsigned_abs()))
        };
        self.check_prospective(prospective)
    }

    /// Check a prospective length. `None` stands for a length that does not
    /// fit in `usize` and is always rejected.
    fn check_prospective(&self, prospective: Option<usize>) -> ModelResult<()> {
        let min = self.spec.min_length().filter(|&n| n > 0);
        let max = self.spec.max_length().filter(|&n| n > 0);
        let within = prospective.is_some_and(|len| {
            min.is_none_or(|n| len >= n) && max.is_none_or(|n| len <= n)
        });
        if within {
            return Ok(());
        }
        Err(ValidationError::ListBoundaryViolation {
            attribute: self.spec.qualified_name(),
            estimated_length: prospective
                .and_then(|len| i64::try_from(len).ok())
                .unwrap_or(i64::MAX),
            min_length: min,
            max_length: max,
        }
        .into())
    }

    fn coerce(&self, value: Value) -> ModelResult<Value> {
        self.model.coerce(&self.spec.item_spec(), value)
    }

    fn coerce_all<I, V>(&self, values: I) -> ModelResult<Vec<Value>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let item_spec = self.spec.item_spec();
        values
            .into_iter()
            .map(|value| self.model.coerce(&item_spec, value.into()))
            .collect()
    }

    fn check_index(&self, index: usize, len: usize) -> ModelResult<()> {
        if index >= len {
            return Err(ModelError::unexpected(format!(
                "index {} out of range for '{}' of length {}",
                index,
                self.spec.qualified_name(),
                self.items.len()
            )));
        }
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> ModelResult<()> {
        if range.start > range.end || range.end > self.items.len() {
            return Err(ModelError::unexpected(format!(
                "range {:?} out of range for '{}' of length {}",
                range,
                self.spec.qualified_name(),
                self.items.len()
            )));
        }
        Ok(())
    }

    /// Append one element.
    pub fn push(&mut self, value: impl Into<Value>) -> ModelResult<()> {
        self.check_length(1)?;
        let value = self.coerce(value.into())?;
        self.items.push(value);
        Ok(())
    }

    /// Append every element, or none of them.
    pub fn extend<I, V>(&mut self, values: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.check_prospective(self.items.len().checked_add(values.len()))?;
        let values = self.coerce_all(values)?;
        self.items.extend(values);
        Ok(())
    }

    /// Insert one element before `index`; `index == len()` appends.
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> ModelResult<()> {
        self.check_index(index, self.items.len() + 1)?;
        self.check_length(1)?;
        let value = self.coerce(value.into())?;
        self.items.insert(index, value);
        Ok(())
    }

    /// Remove and return the element at `index`.
    pub fn remove(&mut self, index: usize) -> ModelResult<Value> {
        self.check_index(index, self.items.len())?;
        self.check_length(-1)?;
        Ok(self.items.remove(index))
    }

    /// Remove the first element equal to `value`. Returns whether one was found.
    pub fn remove_value(&mut self, value: &Value) -> ModelResult<bool> {
        let Some(index) = self.items.iter().position(|item| item.structurally_eq(value)) else {
            return Ok(false);
        };
        self.check_length(-1)?;
        self.items.remove(index);
        Ok(true)
    }

    /// Remove and return the last element; an empty list yields `None`.
    pub fn pop(&mut self) -> ModelResult<Option<Value>> {
        if self.items.is_empty() {
            return Ok(None);
        }
        self.check_length(-1)?;
        Ok(self.items.pop())
    }

    /// Replace the element at `index`.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> ModelResult<()> {
        self.check_index(index, self.items.len())?;
        let value = self.coerce(value.into())?;
        self.items[index] = value;
        Ok(())
    }

    /// New list holding these elements followed by `values`.
    pub fn concat<I, V>(&self, values: I) -> ModelResult<BoundedList>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut combined = self.clone();
        combined.extend(values)?;
        Ok(combined)
    }

    /// Repeat the contents `times` times; zero empties the list.
    pub fn repeat(&mut self, times: usize) -> ModelResult<()> {
        let Some(new_len) = self.items.len().checked_mul(times) else {
            return self.check_prospective(None);
        };
        self.check_prospective(Some(new_len))?;
        let original = std::mem::take(&mut self.items);
        self.items = original.iter().cloned().cycle().take(new_len).collect();
        Ok(())
    }

    /// Replace the elements in `range` with `values`.
    pub fn splice<I, V>(&mut self, range: Range<usize>, values: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.check_range(&range)?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.check_prospective((self.items.len() - range.len()).checked_add(values.len()))?;
        let values = self.coerce_all(values)?;
        self.items.splice(range, values);
        Ok(())
    }

    /// Remove the elements in `range`.
    pub fn delete_range(&mut self, range: Range<usize>) -> ModelResult<()> {
        self.check_range(&range)?;
        self.check_prospective(Some(self.items.len() - range.len()))?;
        self.items.drain(range);
        Ok(())
    }

    /// Remove every element.
    pub fn clear(&mut self) -> ModelResult<()> {
        self.check_prospective(Some(0))?;
        self.items.clear();
        Ok(())
    }
}

impl PartialEq for BoundedList {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl fmt::Debug for BoundedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedList")
            .field("attribute", &self.spec.qualified_name())
            .field("items", &self.items)
            .finish()
    }
}

impl<'a> IntoIterator for &'a BoundedList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
