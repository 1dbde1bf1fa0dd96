pub mod article;
pub mod brief;
pub mod generated_post;
pub mod job;

pub use article::*;
pub use brief::*;
pub use generated_post::*;
pub use job::*;
