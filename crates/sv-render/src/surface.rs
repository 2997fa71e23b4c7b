use sv_core::{class, NodeId, NodeKind, ScrollState, VisualNode};

/// One laid-out row of the surface, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceRow {
    pub node: NodeId,
    pub role: RowRole,
    pub text: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRole {
    Header,
    Text,
    Image,
    Divider,
    Choice { index: usize },
    Spacer,
}

/// In-memory presentation surface: header, appended nodes, reserved height
/// and scroll position, all measured in terminal rows.
#[derive(Debug, Clone)]
pub struct PresentationSurface {
    width: u16,
    visible_height: u32,
    header: Vec<VisualNode>,
    nodes: Vec<VisualNode>,
    reserved_height: u32,
    scroll: ScrollState,
    next_id: u64,
}

impl PresentationSurface {
    pub fn new(width: u16, visible_height: u32) -> Self {
        Self {
            width: width.max(1),
            visible_height,
            header: Vec::new(),
            nodes: Vec::new(),
            reserved_height: 0,
            scroll: ScrollState::default(),
            next_id: 0,
        }
    }

    pub fn resize(&mut self, width: u16, visible_height: u32) {
        self.width = width.max(1);
        self.visible_height = visible_height;
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn visible_height(&self) -> u32 {
        self.visible_height
    }

    pub fn set_title(&mut self, title: &str) {
        let mut node = VisualNode::text(title).with_class(class::HEADER);
        self.attach(&mut node);
        self.header = vec![node];
    }

    pub fn header(&self) -> &[VisualNode] {
        &self.header
    }

    pub fn set_header_visible(&mut self, visible: bool) {
        for node in &mut self.header {
            if visible {
                node.remove_class(class::INVISIBLE);
            } else {
                node.add_class(class::INVISIBLE);
            }
        }
    }

    pub fn nodes(&self) -> &[VisualNode] {
        &self.nodes
    }

    /// Appends a node, assigning fresh ids to it and its children.
    pub fn append(&mut self, mut node: VisualNode) -> NodeId {
        self.attach(&mut node);
        let id = node.id;
        self.nodes.push(node);
        id
    }

    fn attach(&mut self, node: &mut VisualNode) {
        self.next_id += 1;
        node.id = NodeId(self.next_id);
        for child in &mut node.children {
            self.attach(child);
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut VisualNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn hidden_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_hidden()).count()
    }

    /// Drops every node matching `predicate`; returns how many were removed.
    pub fn remove_where(&mut self, predicate: impl Fn(&VisualNode) -> bool) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|node| !predicate(node));
        before - self.nodes.len()
    }

    pub fn remove_choice_containers(&mut self) -> usize {
        self.remove_where(VisualNode::is_choice_container)
    }

    /// Removes all story content and releases the reserved height. The header
    /// stays.
    pub fn clear_content(&mut self) {
        self.nodes.clear();
        self.reserved_height = 0;
    }

    pub fn node_height(&self, node: &VisualNode) -> u32 {
        if node.has_class(class::INVISIBLE) && node.has_class(class::HEADER) {
            return 0;
        }
        match &node.kind {
            NodeKind::Text => wrap_words(&node.text, self.width).len() as u32 + 1,
            NodeKind::Image { .. } | NodeKind::Divider => 2,
            NodeKind::ChoiceContainer => {
                node.children
                    .iter()
                    .map(|child| self.node_height(child))
                    .sum::<u32>()
                    + 1
            }
            NodeKind::Choice { .. } => {
                wrap_words(&node.text, self.width.saturating_sub(4)).len() as u32
            }
        }
    }

    fn header_height(&self) -> u32 {
        self.header.iter().map(|node| self.node_height(node)).sum()
    }

    /// Bottom edge of all content, header included.
    pub fn content_bottom_edge(&self) -> u32 {
        self.header_height()
            + self
                .nodes
                .iter()
                .map(|node| self.node_height(node))
                .sum::<u32>()
    }

    /// Bottom edge the surface would have after appending `batch`.
    pub fn projected_bottom_edge<'a>(
        &self,
        batch: impl IntoIterator<Item = &'a VisualNode>,
    ) -> u32 {
        self.content_bottom_edge()
            + batch
                .into_iter()
                .map(|node| self.node_height(node))
                .sum::<u32>()
    }

    pub fn reserved_height(&self) -> u32 {
        self.reserved_height
    }

    /// Reserved height only grows; it is released by `clear_content`.
    pub fn grow_reserved_height(&mut self, height: u32) {
        self.reserved_height = self.reserved_height.max(height);
    }

    pub fn scrollable_height(&self) -> u32 {
        self.reserved_height.max(self.content_bottom_edge())
    }

    pub fn max_scroll(&self) -> u32 {
        self.scrollable_height().saturating_sub(self.visible_height)
    }

    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll.offset = offset.max(0.0);
    }

    pub fn set_watermark(&mut self, watermark: u32) {
        self.scroll.watermark = watermark;
    }

    pub fn rows(&self) -> Vec<SurfaceRow> {
        let mut rows = Vec::new();
        for node in self.header.iter().chain(self.nodes.iter()) {
            self.push_rows(node, node.is_hidden(), &mut rows);
        }
        rows
    }

    /// Rows currently inside the viewport.
    pub fn visible_rows(&self) -> Vec<SurfaceRow> {
        let start = self.scroll.offset_rows() as usize;
        self.rows()
            .into_iter()
            .skip(start)
            .take(self.visible_height as usize)
            .collect()
    }

    fn push_rows(&self, node: &VisualNode, hidden: bool, rows: &mut Vec<SurfaceRow>) {
        if self.node_height(node) == 0 {
            return;
        }
        let row = |role: RowRole, text: String| SurfaceRow {
            node: node.id,
            role,
            text,
            hidden,
        };
        match &node.kind {
            NodeKind::Text => {
                let role = if node.has_class(class::HEADER) {
                    RowRole::Header
                } else {
                    RowRole::Text
                };
                rows.extend(
                    wrap_words(&node.text, self.width)
                        .into_iter()
                        .map(|line| row(role, line)),
                );
                rows.push(row(RowRole::Spacer, String::new()));
            }
            NodeKind::Image { source } => {
                rows.push(row(RowRole::Image, format!("[image: {}]", source)));
                rows.push(row(RowRole::Spacer, String::new()));
            }
            NodeKind::Divider => {
                rows.push(row(RowRole::Divider, "─".repeat(self.width as usize)));
                rows.push(row(RowRole::Spacer, String::new()));
            }
            NodeKind::ChoiceContainer => {
                for child in &node.children {
                    self.push_rows(child, hidden, rows);
                }
                rows.push(row(RowRole::Spacer, String::new()));
            }
            NodeKind::Choice { index } => {
                rows.extend(
                    wrap_words(&node.text, self.width.saturating_sub(4))
                        .into_iter()
                        .map(|line| row(RowRole::Choice { index: *index }, line)),
                );
            }
        }
    }
}

/// Greedy word wrap; words longer than the width are split by characters.
pub fn wrap_words(value: &str, width: u16) -> Vec<String> {
    let width = width.max(1) as usize;
    let mut lines = Vec::new();
    for raw_line in value.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in raw_line.split_whitespace() {
            let mut chars = word.chars().collect::<Vec<_>>();
            while chars.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                lines.push(chars.drain(..width).collect());
            }
            let word_len = chars.len();
            if word_len == 0 {
                continue;
            }
            let needed = if current_len == 0 {
                word_len
            } else {
                current_len + 1 + word_len
            };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chars);
            current_len += word_len;
        }
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod surface_tests {
    use super::*;
    use sv_core::Choice;

    #[test]
    fn wrap_words_breaks_on_whitespace_and_long_words() {
        assert_eq!(wrap_words("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_words("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_words("", 10), vec![""]);
        assert_eq!(wrap_words("a\nb", 10), vec!["a", "b"]);
    }

    #[test]
    fn bottom_edge_counts_header_and_nodes() {
        let mut surface = PresentationSurface::new(20, 10);
        assert_eq!(surface.content_bottom_edge(), 0);
        surface.set_title("Title");
        assert_eq!(surface.content_bottom_edge(), 2);
        surface.append(VisualNode::text("a short line"));
        assert_eq!(surface.content_bottom_edge(), 4);
        surface.append(VisualNode::choice_container(&[
            Choice {
                text: "Go left".to_string(),
                index: 0,
            },
            Choice {
                text: "Go right".to_string(),
                index: 1,
            },
        ]));
        assert_eq!(surface.content_bottom_edge(), 7);
        assert_eq!(surface.rows().len(), 7);
    }

    #[test]
    fn hidden_header_takes_no_space() {
        let mut surface = PresentationSurface::new(20, 10);
        surface.set_title("Title");
        surface.set_header_visible(false);
        assert_eq!(surface.content_bottom_edge(), 0);
        assert!(surface.rows().is_empty());
        surface.set_header_visible(true);
        assert_eq!(surface.content_bottom_edge(), 2);
    }

    #[test]
    fn append_assigns_unique_ids_recursively() {
        let mut surface = PresentationSurface::new(20, 10);
        let first = surface.append(VisualNode::text("a"));
        let container = surface.append(VisualNode::choice_container(&[Choice {
            text: "x".to_string(),
            index: 0,
        }]));
        assert_ne!(first, container);
        assert!(!surface.nodes()[1].children[0].id.is_detached());
        assert_ne!(surface.nodes()[1].children[0].id, container);
        assert!(surface.contains(first));
    }

    #[test]
    fn reserved_height_never_shrinks_until_cleared() {
        let mut surface = PresentationSurface::new(20, 4);
        surface.grow_reserved_height(12);
        surface.grow_reserved_height(5);
        assert_eq!(surface.reserved_height(), 12);
        assert_eq!(surface.max_scroll(), 8);
        surface.clear_content();
        assert_eq!(surface.reserved_height(), 0);
        assert_eq!(surface.max_scroll(), 0);
    }

    #[test]
    fn visible_rows_follow_the_scroll_offset() {
        let mut surface = PresentationSurface::new(20, 2);
        for text in ["a", "b", "c"] {
            surface.append(VisualNode::text(text));
        }
        surface.set_scroll_offset(2.0);
        let rows = surface.visible_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "b");
        assert_eq!(rows[1].role, RowRole::Spacer);
    }
}
