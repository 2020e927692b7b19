pub mod handlers;
pub mod launcher;
pub mod routes;
pub mod session_storage;
pub mod templates;

pub use routes::create_router;
pub use session_storage::SessionStorage;
