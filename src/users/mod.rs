//! The `users` app: the User resource exposed as a ViewSet and as direct tools.

pub mod password;
pub mod serializers;
pub mod tools;
pub mod views;

use std::sync::Arc;

use crate::registry::Registry;
use crate::store::UserRepository;
pub use views::UserViewSet;

pub const APP_LABEL: &str = "users";

/// Registers the `users` app and its direct tools.
pub fn register(registry: &mut Registry, repo: Arc<dyn UserRepository>, page_size: usize) {
    for tool in tools::user_tools(Arc::clone(&repo), page_size) {
        registry.register_tool(tool);
    }
    registry.register_viewset(APP_LABEL, Arc::new(UserViewSet::new(repo, page_size)));
}
