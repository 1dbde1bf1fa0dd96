pub mod activities;
pub mod models;
pub mod prompts;

// Re-export activities
pub use activities::{generate_blog_post, process_job, process_message, GenerationOutcome, JobOutcome};

// Re-export models
pub use models::{Brief, GeneratedPostRecord, JobMessage, JobRecord, JobStatus};
