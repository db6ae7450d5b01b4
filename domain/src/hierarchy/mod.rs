//! Intent hierarchy: strategic, tactical, operational and contingency
//! intents linked parent-to-child, with failure propagation.

pub mod health;
pub mod node;
pub mod tree;
