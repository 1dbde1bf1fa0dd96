// Business domains
pub mod posts;
