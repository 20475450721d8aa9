//! Storage abstractions for service layer
//!
//! The whole datastore is one JSON document; collections are top-level arrays in it.

pub mod document_store;

pub use document_store::{DocumentStore, JsonDocumentStore};
