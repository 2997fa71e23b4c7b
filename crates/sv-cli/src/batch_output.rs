use sv_core::{class, NodeKind, VisualNode};
use sv_render::{BatchReport, RendererState};

use crate::{json_string, BatchEvent, BatchOutcome, NodeLine, StoryRenderer};

fn node_kind(node: &VisualNode) -> &'static str {
    match node.kind {
        NodeKind::Text if node.has_class(class::HEADER) => "header",
        NodeKind::Text => "text",
        NodeKind::Image { .. } => "image",
        NodeKind::Divider => "divider",
        NodeKind::ChoiceContainer => "choices",
        NodeKind::Choice { .. } => "choice",
    }
}

/// Classes that came from the story, without the reveal bookkeeping.
fn story_classes(node: &VisualNode) -> Vec<String> {
    node.classes
        .iter()
        .filter(|name| !matches!(name.as_str(), class::SCENE | class::HIDE))
        .cloned()
        .collect()
}

/// Snapshot of the surface after a batch, with everything revealed.
pub(crate) fn collect_batch(renderer: &mut StoryRenderer, report: &BatchReport) -> BatchOutcome {
    renderer.show_all_now();
    let nodes = renderer
        .surface()
        .nodes()
        .iter()
        .filter(|node| !node.is_choice_container())
        .map(|node| NodeLine {
            kind: node_kind(node),
            classes: story_classes(node),
            text: node.text.clone(),
        })
        .collect();
    let choices = renderer
        .choice_bindings()
        .iter()
        .map(|binding| (binding.choice.index, binding.choice.text.clone()))
        .collect();
    let event = if renderer.state() == RendererState::AwaitingChoice {
        BatchEvent::Choices
    } else {
        BatchEvent::End
    };

    BatchOutcome {
        event,
        nodes,
        choices,
        cleared: report.cleared,
        restarted: report.restarted,
    }
}

pub(crate) fn emit_batch(outcome: BatchOutcome, state_out: Option<String>) {
    println!("RESULT:OK");
    match outcome.event {
        BatchEvent::Choices => println!("EVENT:CHOICES"),
        BatchEvent::End => println!("EVENT:END"),
    }
    if outcome.restarted {
        println!("RESTARTED");
    }
    if outcome.cleared {
        println!("CLEARED");
    }

    for node in outcome.nodes {
        println!(
            "NODE:{}|{}|{}",
            node.kind,
            node.classes.join(","),
            json_string(&node.text)
        );
    }

    for (index, text) in outcome.choices {
        println!("CHOICE:{}|{}", index, json_string(&text));
    }

    println!(
        "STATE_OUT:{}",
        state_out.unwrap_or_else(|| "NONE".to_string())
    );
}

#[cfg(test)]
mod batch_output_tests {
    use super::*;
    use crate::cli_test_support::*;
    use crate::{create_renderer, load_story, DEFAULT_ENTRY};
    use sv_render::RendererConfig;

    #[test]
    fn collect_batch_lists_revealed_nodes_and_choices() {
        let story = load_story(&forest_story(), DEFAULT_ENTRY).expect("story");
        let mut renderer =
            create_renderer(&story, &RendererConfig::default()).expect("renderer");
        let report = renderer.continue_story(true, 0).expect("first batch");

        let outcome = collect_batch(&mut renderer, &report);
        assert_eq!(outcome.event, BatchEvent::Choices);
        assert_eq!(outcome.nodes.len(), 2);
        assert_eq!(outcome.nodes[0].kind, "text");
        assert_eq!(outcome.nodes[0].classes, vec!["intro".to_string()]);
        assert_eq!(
            outcome.choices,
            vec![(0, "Go left".to_string()), (1, "Go right".to_string())]
        );
        assert_eq!(renderer.surface().hidden_count(), 0);
    }

    #[test]
    fn collect_batch_reports_the_end_of_the_story() {
        let story = load_story(&forest_story(), DEFAULT_ENTRY).expect("story");
        let mut renderer =
            create_renderer(&story, &RendererConfig::default()).expect("renderer");
        renderer.continue_story(true, 0).expect("first batch");
        renderer.select_offered(0, 0).expect("left");
        let report = renderer.select_offered(0, 0).expect("camp");

        let outcome = collect_batch(&mut renderer, &report);
        assert_eq!(outcome.event, BatchEvent::End);
        assert!(outcome.cleared);
        assert!(outcome.choices.is_empty());
        assert_eq!(
            outcome
                .nodes
                .iter()
                .map(|node| node.kind)
                .collect::<Vec<_>>(),
            vec!["text", "divider", "text"]
        );
        assert_eq!(outcome.nodes[2].classes, vec!["ending".to_string()]);
    }
}
