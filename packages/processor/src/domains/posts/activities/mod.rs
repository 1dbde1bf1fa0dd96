//! Posts domain activities - entry-point business logic
//!
//! Activities take raw input, talk to infrastructure only through
//! `ServerDeps`, and return final outcomes.

pub mod generation;
pub mod process_job;

pub use generation::{fallback_title, generate_blog_post, GenerationOutcome};
pub use process_job::{process_job, process_message, JobOutcome};
