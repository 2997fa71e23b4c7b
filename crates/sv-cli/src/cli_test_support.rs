use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) const MINIMAL_STORY: &str =
    r#"{ "start": "a", "knots": { "a": { "content": ["hello"], "divert": "END" } } }"#;

pub(crate) fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!("storyview-rs-{}-{}", name, nanos))
}

pub(crate) fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent should be created");
    }
    fs::write(path, content).expect("file should be written");
}

pub(crate) fn stories_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("stories")
}

pub(crate) fn forest_story() -> String {
    stories_root().join("forest").to_string_lossy().to_string()
}
