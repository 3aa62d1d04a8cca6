//! Behavior tests organized by component.

pub mod list_properties;
pub mod lists;
pub mod registry;
pub mod serialization;
