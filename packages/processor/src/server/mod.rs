// HTTP server setup (Axum)
pub mod app;
pub mod routes;
pub mod shutdown;

pub use app::*;
pub use shutdown::shutdown_signal;
