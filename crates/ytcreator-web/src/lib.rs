pub mod config;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod ui;

pub use routes::build_router;
