//! Application configuration

pub mod control_params;

pub use control_params::ControlParams;
