//! Plan history adapters
//!
//! Provides [`JsonlHistoryStore`], a JSONL file implementation of the
//! [`HistoryStore`](pact_application::HistoryStore) port. The in-memory
//! store lives in the application layer.

mod jsonl;

pub use jsonl::JsonlHistoryStore;
