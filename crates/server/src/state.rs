use std::sync::Arc;

use service::{
    resources::{Product, Request, Task, User},
    storage::DocumentStore,
    Collection, KeyStrategy, Resource,
};

/// One engine handle per collection, all sharing the same backing document.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<Collection<Product>>,
    pub users: Arc<Collection<User>>,
    pub tasks: Arc<Collection<Task>>,
    pub requests: Arc<Collection<Request>>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, keys: KeyStrategy, require_national_id: bool) -> Self {
        let user_rules = if require_national_id { User::extended_fields() } else { User::required_fields() };
        Self {
            products: Arc::new(Collection::new(Arc::clone(&store)).key_strategy(keys)),
            users: Arc::new(Collection::with_rules(Arc::clone(&store), user_rules).key_strategy(keys)),
            tasks: Arc::new(Collection::new(Arc::clone(&store)).key_strategy(keys)),
            requests: Arc::new(Collection::new(store).key_strategy(keys)),
        }
    }
}
