use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use sv_core::{TagResult, VisualNode};
use tracing::debug;

/// Builds the node for an insertion directive from its (trimmed) value.
/// Returning `None` drops the tag as malformed.
pub type DirectiveConstructor = fn(Option<&str>) -> Option<VisualNode>;

#[derive(Clone)]
pub struct DirectiveRegistry {
    constructors: BTreeMap<String, DirectiveConstructor>,
}

impl fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl Default for DirectiveRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("IMAGE", image_directive);
        registry.register("DIVIDER", divider_directive);
        registry
    }
}

impl DirectiveRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, constructor: DirectiveConstructor) {
        self.constructors
            .insert(name.to_ascii_uppercase(), constructor);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    fn build(&self, key: &str, value: Option<&str>) -> Option<Option<VisualNode>> {
        self.constructors
            .get(key)
            .map(|constructor| constructor(value))
    }
}

fn image_directive(value: Option<&str>) -> Option<VisualNode> {
    value.map(VisualNode::image)
}

fn divider_directive(_value: Option<&str>) -> Option<VisualNode> {
    Some(VisualNode::divider())
}

fn class_name_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("class name regex must compile")
    })
}

#[derive(Debug, Clone, Default)]
pub struct TagInterpreter {
    directives: DirectiveRegistry,
}

impl TagInterpreter {
    pub fn new(directives: DirectiveRegistry) -> Self {
        Self { directives }
    }

    pub fn directives(&self) -> &DirectiveRegistry {
        &self.directives
    }

    pub fn parse<S: AsRef<str>>(&self, tags: &[S]) -> TagResult {
        let mut result = TagResult::default();

        for raw in tags {
            let (key, value) = split_tag(raw.as_ref());
            match (key.as_str(), value) {
                ("TITLE", Some(title)) => result.title = Some(title.to_string()),
                ("RESTART", _) => result.restart_requested = true,
                ("CLEAR", _) => result.clear_requested = true,
                ("CLASS", Some(name)) if class_name_regex().is_match(name) => {
                    result.classes_to_add.insert(name.to_string());
                }
                _ => match self.directives.build(&key, value) {
                    Some(Some(node)) => result.elements_to_insert.push(node),
                    _ => debug!(tag = raw.as_ref(), "ignored tag"),
                },
            }
        }

        result
    }
}

/// Splits `KEY: value` at the first colon. Keys are upper-cased; empty values
/// count as absent.
fn split_tag(raw: &str) -> (String, Option<&str>) {
    let trimmed = raw.trim();
    match trimmed.split_once(':') {
        Some((key, value)) => {
            let value = value.trim();
            (
                key.trim().to_ascii_uppercase(),
                (!value.is_empty()).then_some(value),
            )
        }
        None => (trimmed.to_ascii_uppercase(), None),
    }
}

#[cfg(test)]
mod tags_tests {
    use super::*;
    use sv_core::NodeKind;

    fn parse(tags: &[&str]) -> TagResult {
        TagInterpreter::default().parse(tags)
    }

    #[test]
    fn recognizes_the_core_vocabulary() {
        let result = parse(&["TITLE: The Forest", "CLASS: intro", "CLEAR", "RESTART"]);
        assert_eq!(result.title.as_deref(), Some("The Forest"));
        assert!(result.clear_requested);
        assert!(result.restart_requested);
        assert!(result.classes_to_add.contains("intro"));
        assert!(result.elements_to_insert.is_empty());
    }

    #[test]
    fn keys_are_case_insensitive_and_whitespace_tolerant() {
        let result = parse(&["  title :  Night  ", "class:dim", " restart "]);
        assert_eq!(result.title.as_deref(), Some("Night"));
        assert!(result.classes_to_add.contains("dim"));
        assert!(result.restart_requested);
    }

    #[test]
    fn malformed_and_unknown_tags_are_ignored() {
        let result = parse(&[
            "TITLE:",
            "CLASS:",
            "CLASS: two words",
            "IMAGE",
            "AUDIO: bell.ogg",
            "",
            ":::",
        ]);
        assert_eq!(result, TagResult::default());
    }

    #[test]
    fn insertion_directives_keep_encounter_order() {
        let result = parse(&["IMAGE: map.png", "CLASS: a", "DIVIDER", "image: b.png"]);
        let kinds = result
            .elements_to_insert
            .iter()
            .map(|node| node.kind.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Image {
                    source: "map.png".to_string()
                },
                NodeKind::Divider,
                NodeKind::Image {
                    source: "b.png".to_string()
                },
            ]
        );
    }

    #[test]
    fn value_keeps_text_after_the_first_colon() {
        let result = parse(&["TITLE: Part 2: The Return"]);
        assert_eq!(result.title.as_deref(), Some("Part 2: The Return"));
    }

    #[test]
    fn registry_accepts_new_directives() {
        fn note(value: Option<&str>) -> Option<VisualNode> {
            value.map(|text| VisualNode::text(text).with_class("note"))
        }

        let mut registry = DirectiveRegistry::default();
        registry.register("note", note);
        let interpreter = TagInterpreter::new(registry);
        let result = interpreter.parse(&["NOTE: careful"]);
        assert_eq!(result.elements_to_insert.len(), 1);
        assert!(result.elements_to_insert[0].has_class("note"));
        assert_eq!(
            interpreter.directives().names().collect::<Vec<_>>(),
            vec!["DIVIDER", "IMAGE", "NOTE"]
        );
    }

    #[test]
    fn parsing_is_deterministic() {
        let tags = ["CLASS: b", "IMAGE: x.png", "CLASS: a"];
        assert_eq!(parse(&tags), parse(&tags));
    }
}
