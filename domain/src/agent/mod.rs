//! Agent domain: identity, capabilities, resources and the registry

pub mod entities;
pub mod registry;
pub mod value_objects;
