//! Four-layer intent model
//!
//! | Layer | Type | Question answered |
//! |-------|------|-------------------|
//! | 1 | [`individual::IndividualIntent`] | Does each agent know what it wants? |
//! | 2 | [`co_intent::CoIntent`] | Do the two agents agree on a shared goal? |
//! | 3 | [`core_intent::CoreIntent`] | Does that goal serve the mission? |
//! | 4 | [`collab::CollabIntent`] | Is the partnership efficient enough? |

pub mod co_intent;
pub mod collab;
pub mod context;
pub mod core_intent;
pub mod individual;
