// Blog post job processor - core library
//
// Receives push-delivered blog post jobs, tracks each job's lifecycle in a
// document store with bounded retries, and generates articles through a
// pluggable text-generation provider.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
