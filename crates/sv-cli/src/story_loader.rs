use std::fs;
use std::path::{Path, PathBuf};

use sv_core::StoryViewError;
use sv_story::StoryEngine;
use tracing::debug;
use walkdir::WalkDir;

use crate::{map_cli_story_path, map_cli_story_read, map_cli_story_scan, LoadedStory};

const STORY_SUFFIX: &str = ".story.json";

/// Loads a story from a `.story.json` file, or from the `<entry>.story.json`
/// found anywhere under a directory.
pub(crate) fn load_story(story: &str, entry: &str) -> Result<LoadedStory, StoryViewError> {
    let path = resolve_story_path(story)?;
    let file = if path.is_dir() {
        find_entry_file(&path, entry)?
    } else {
        path.clone()
    };
    let source = fs::read_to_string(&file).map_err(map_cli_story_read)?;
    debug!(path = %file.display(), entry, "story loaded");

    Ok(LoadedStory {
        id: make_story_id(&path),
        path: file,
        entry: entry.to_string(),
        source,
    })
}

pub(crate) fn create_engine(story: &LoadedStory) -> Result<StoryEngine, StoryViewError> {
    StoryEngine::from_json(&story.source)
}

pub(crate) fn resolve_story_path(story: &str) -> Result<PathBuf, StoryViewError> {
    let path = PathBuf::from(story);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_story_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(StoryViewError::new(
            "CLI_STORY_NOT_FOUND",
            format!("story path does not exist: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

pub(crate) fn find_entry_file(root: &Path, entry: &str) -> Result<PathBuf, StoryViewError> {
    let wanted = format!("{}{}", entry, STORY_SUFFIX);
    let mut found = Vec::new();

    for item in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let item = item.map_err(map_cli_story_scan)?;
        if !item.file_type().is_file() {
            continue;
        }
        if item.file_name().to_string_lossy().ends_with(STORY_SUFFIX) {
            found.push(item.into_path());
        }
    }

    if found.is_empty() {
        return Err(StoryViewError::new(
            "CLI_STORY_EMPTY",
            format!("No {} files under {}", STORY_SUFFIX, root.display()),
        ));
    }

    found
        .into_iter()
        .find(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy() == wanted)
        })
        .ok_or_else(|| {
            StoryViewError::new(
                "CLI_STORY_ENTRY",
                format!("No {} under {}", wanted, root.display()),
            )
        })
}

pub(crate) fn make_story_id(path: &Path) -> String {
    format!("story:{}", path.display())
}

#[cfg(test)]
mod story_loader_tests {
    use super::*;
    use crate::cli_test_support::*;

    #[test]
    fn resolve_story_path_rejects_missing_paths() {
        let missing = temp_path("missing-story");
        let error = resolve_story_path(missing.to_string_lossy().as_ref())
            .expect_err("missing path should fail");
        assert_eq!(error.code, "CLI_STORY_NOT_FOUND");
    }

    #[test]
    fn directories_resolve_the_entry_file() {
        let root = temp_path("story-dir");
        write_file(&root.join("main.story.json"), MINIMAL_STORY);
        write_file(&root.join("nested").join("side.story.json"), MINIMAL_STORY);
        write_file(&root.join("notes.txt"), "ignored");

        let loaded = load_story(&root.to_string_lossy(), "side").expect("side entry should load");
        assert!(loaded.path.ends_with("nested/side.story.json"));
        assert_eq!(loaded.entry, "side");
        assert!(loaded.id.starts_with("story:"));

        let error = load_story(&root.to_string_lossy(), "other").expect_err("unknown entry");
        assert_eq!(error.code, "CLI_STORY_ENTRY");
    }

    #[test]
    fn directories_without_stories_are_rejected() {
        let root = temp_path("empty-story-dir");
        write_file(&root.join("readme.txt"), "not a story");

        let error = find_entry_file(&root, "main").expect_err("no stories should fail");
        assert_eq!(error.code, "CLI_STORY_EMPTY");
    }

    #[test]
    fn single_files_load_directly_and_build_an_engine() {
        let file = temp_path("single").join("tale.story.json");
        write_file(&file, MINIMAL_STORY);

        let loaded = load_story(&file.to_string_lossy(), "main").expect("file should load");
        assert_eq!(loaded.path, file);
        create_engine(&loaded).expect("engine should build");
    }

    #[test]
    fn broken_story_json_surfaces_the_parse_error() {
        let file = temp_path("broken").join("main.story.json");
        write_file(&file, "{ not json");

        let loaded = load_story(&file.to_string_lossy(), "main").expect("file should read");
        let error = create_engine(&loaded).expect_err("parse should fail");
        assert_eq!(error.code, "STORY_PARSE");
    }
}
