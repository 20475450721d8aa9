//! The four collections of the backing document and the create payloads they accept.

pub mod product;
pub mod request;
pub mod task;
pub mod user;

pub use product::{Product, ProductPayload};
pub use request::{Request, RequestPayload};
pub use task::{Task, TaskPayload};
pub use user::{User, UserPayload};
