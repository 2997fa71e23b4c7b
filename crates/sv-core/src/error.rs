use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct StoryViewError {
    pub code: String,
    pub message: String,
}

impl StoryViewError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Engine-boundary failures that leave the story unable to advance.
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::new("STORY_INTEGRITY", message)
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let error = StoryViewError::new("STORY_PARSE", "bad json");
        assert_eq!(error.to_string(), "STORY_PARSE: bad json");
        assert_eq!(StoryViewError::integrity("x").code, "STORY_INTEGRITY");
    }
}
