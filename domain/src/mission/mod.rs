//! Mission domain: objectives, roster, formation and lifecycle

pub mod entities;
pub mod formation;
pub mod value_objects;
