use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Style-class tokens honored by the presentation layer.
pub mod class {
    pub const HIDE: &str = "hide";
    pub const INVISIBLE: &str = "invisible";
    pub const CHOICE_WRAPPER: &str = "choiceWrapper";
    pub const CHOICE_CONTAINER: &str = "choiceContainer";
    pub const SCENE: &str = "scene";
    pub const HEADER: &str = "header";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub index: usize,
}

/// Identity of a node on the presentation surface. `NodeId::DETACHED` marks a
/// node that has not been appended yet.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub u64);

impl NodeId {
    pub const DETACHED: NodeId = NodeId(0);

    pub fn is_detached(self) -> bool {
        self == Self::DETACHED
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeKind {
    Text,
    Image { source: String },
    Divider,
    ChoiceContainer,
    Choice { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub text: String,
    pub classes: BTreeSet<String>,
    pub children: Vec<VisualNode>,
}

impl VisualNode {
    fn detached(kind: NodeKind, text: impl Into<String>) -> Self {
        Self {
            id: NodeId::DETACHED,
            kind,
            text: text.into(),
            classes: BTreeSet::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::detached(NodeKind::Text, text)
    }

    pub fn image(source: impl Into<String>) -> Self {
        let source = source.into();
        Self::detached(
            NodeKind::Image {
                source: source.clone(),
            },
            source,
        )
    }

    pub fn divider() -> Self {
        Self::detached(NodeKind::Divider, "")
    }

    pub fn choice_container(choices: &[Choice]) -> Self {
        let mut container = Self::detached(NodeKind::ChoiceContainer, "");
        container.add_class(class::CHOICE_CONTAINER);
        container.children = choices
            .iter()
            .map(|choice| {
                let mut wrapper =
                    Self::detached(NodeKind::Choice { index: choice.index }, choice.text.clone());
                wrapper.add_class(class::CHOICE_WRAPPER);
                wrapper
            })
            .collect();
        container
    }

    pub fn with_class(mut self, name: impl Into<String>) -> Self {
        self.add_class(name);
        self
    }

    pub fn add_class(&mut self, name: impl Into<String>) {
        self.classes.insert(name.into());
    }

    pub fn remove_class(&mut self, name: &str) -> bool {
        self.classes.remove(name)
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    pub fn is_hidden(&self) -> bool {
        self.has_class(class::HIDE)
    }

    pub fn is_choice_container(&self) -> bool {
        matches!(self.kind, NodeKind::ChoiceContainer)
    }
}

/// Nodes produced by one continuation cycle; order is reveal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderBatch {
    nodes: Vec<VisualNode>,
}

impl RenderBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: VisualNode) {
        self.nodes.push(node);
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = VisualNode>) {
        self.nodes.extend(nodes);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[VisualNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<VisualNode> {
        self.nodes
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagResult {
    pub title: Option<String>,
    pub restart_requested: bool,
    pub clear_requested: bool,
    pub classes_to_add: BTreeSet<String>,
    pub elements_to_insert: Vec<VisualNode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollState {
    /// Current offset in rows; fractional while an animation is running.
    pub offset: f64,
    /// Bottom edge of the content that was on the surface before the batch in
    /// flight was appended.
    pub watermark: u32,
}

impl ScrollState {
    pub fn offset_rows(&self) -> u32 {
        self.offset.max(0.0).round() as u32
    }
}
