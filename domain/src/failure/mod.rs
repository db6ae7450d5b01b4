//! Communication failures and their mission impact

pub mod impact;
pub mod record;
