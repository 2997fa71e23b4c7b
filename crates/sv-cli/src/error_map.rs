use std::fmt::Display;

use sv_core::StoryViewError;

fn map_error(code: &'static str, error: impl Display) -> StoryViewError {
    StoryViewError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: StoryViewError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!("ERROR_MSG_JSON:{}", json_string(&error.message));
    1
}

/// JSON-quotes a protocol value. Serializing a `&str` cannot fail.
pub(crate) fn json_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

pub(crate) fn map_tui_io(error: std::io::Error) -> StoryViewError {
    map_error("TUI_IO", error)
}

pub(crate) fn map_cli_story_path(error: std::io::Error) -> StoryViewError {
    map_error("CLI_STORY_PATH", error)
}

pub(crate) fn map_cli_story_scan(error: walkdir::Error) -> StoryViewError {
    map_error("CLI_STORY_SCAN", error)
}

pub(crate) fn map_cli_story_read(error: std::io::Error) -> StoryViewError {
    map_error("CLI_STORY_READ", error)
}

pub(crate) fn map_cli_save_write(error: std::io::Error) -> StoryViewError {
    map_error("CLI_SAVE_WRITE", error)
}

pub(crate) fn map_cli_save_encode(error: serde_json::Error) -> StoryViewError {
    map_error("CLI_SAVE_WRITE", error)
}

pub(crate) fn map_cli_save_read(error: std::io::Error) -> StoryViewError {
    map_error("CLI_SAVE_READ", error)
}

pub(crate) fn map_cli_save_invalid(error: serde_json::Error) -> StoryViewError {
    map_error("CLI_SAVE_INVALID", error)
}
