pub mod engine;
pub mod error;
pub mod types;

pub use engine::*;
pub use error::StoryViewError;
pub use types::*;
