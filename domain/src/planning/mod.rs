//! Plan generation: agent reassignment and intent-hierarchy adaptation

pub mod adaptation;
pub mod reassignment;
