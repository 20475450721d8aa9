//! Service layer: the collection mutation engine and its JSON document store.
//! - `storage` owns the backing document and its flush to disk.
//! - `engine` implements create/update/bulk delete once for every resource.
//! - `resources` declares the record types and their required fields.

pub mod errors;
pub mod engine;
pub mod resources;
pub mod storage;

pub use engine::{Collection, KeyStrategy, Resource};
pub use errors::ServiceError;
