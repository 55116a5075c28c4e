use std::collections::BTreeMap;
use std::sync::Arc;

use roxmltree::{Document, Node};
use tracing::warn;

use sc_core::{
    action_label, sequence_label, step_label, Action, ActionRegistry, ActionSequence, Placeholder,
    RawActionNode, Script, ScriptError, ScriptedAction, SourceLocation, SourceSpan, Step,
};

/// A parsed script plus the repairs the loader applied to produce it.
/// Structural damage below the document level never aborts a load: broken
/// entries are replaced with inert placeholders and reported here.
#[derive(Debug)]
pub struct LoadOutcome {
    pub script: Script,
    pub warnings: Vec<String>,
}

/// Parses cutscene XML against the given action registry.
///
/// Hard errors are reserved for unusable documents (malformed XML, wrong
/// root element). Anything else is repaired: unknown tags and failed action
/// constructors become placeholders, unexpected elements are skipped, and
/// each repair lands in [`LoadOutcome::warnings`].
pub fn parse_script(source: &str, registry: &ActionRegistry) -> Result<LoadOutcome, ScriptError> {
    let document = Document::parse(source)
        .map_err(|error| ScriptError::new("XML_PARSE_ERROR", error.to_string()))?;

    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(ScriptError::new(
            "XML_PARSE_ERROR",
            "script document must contain a root element.",
        ));
    };
    if root.tag_name().name() != "cutscene" {
        return Err(ScriptError::with_span(
            "SCRIPT_ROOT_ELEMENT",
            format!(
                "expected <cutscene> at document root, found <{}>.",
                root.tag_name().name()
            ),
            node_span(&document, root.range().start, root.range().end),
        ));
    }

    let mut warnings = Vec::new();
    let description = root.attribute("description").unwrap_or_default().to_string();
    let auto_play = flag_attribute(root, "autoplay", false, &mut warnings);

    let mut steps = Vec::new();
    for child in root.children().filter(Node::is_element) {
        if child.tag_name().name() != "step" {
            push_warning(
                &mut warnings,
                format!(
                    "ignoring <{}> inside <cutscene>; only <step> is allowed here",
                    child.tag_name().name()
                ),
            );
            continue;
        }
        let step_index = steps.len();
        steps.push(parse_step(&document, child, step_index, registry, &mut warnings));
    }
    if steps.is_empty() {
        push_warning(&mut warnings, "script has no steps".to_string());
    }

    Ok(LoadOutcome {
        script: Script {
            description,
            auto_play,
            steps,
        },
        warnings,
    })
}

fn parse_step(
    document: &Document<'_>,
    node: Node<'_, '_>,
    step_index: usize,
    registry: &ActionRegistry,
    warnings: &mut Vec<String>,
) -> Step {
    let label = step_label(step_index);
    let mut sequences = Vec::new();
    for child in node.children().filter(Node::is_element) {
        if child.tag_name().name() != "sequence" {
            push_warning(
                warnings,
                format!(
                    "{}: ignoring <{}>; only <sequence> is allowed here",
                    label,
                    child.tag_name().name()
                ),
            );
            continue;
        }
        let sequence_index = sequences.len();
        sequences.push(parse_sequence(
            document,
            child,
            step_index,
            sequence_index,
            registry,
            warnings,
        ));
    }
    if sequences.is_empty() {
        push_warning(warnings, format!("{} has no sequences", label));
    }
    Step { label, sequences }
}

fn parse_sequence(
    document: &Document<'_>,
    node: Node<'_, '_>,
    step_index: usize,
    sequence_index: usize,
    registry: &ActionRegistry,
    warnings: &mut Vec<String>,
) -> ActionSequence {
    let label = sequence_label(step_index, sequence_index);
    let actor = match node.attribute("actor") {
        Some("") => {
            push_warning(
                warnings,
                format!("{}: empty actor attribute; sequence will run unbound", label),
            );
            None
        }
        other => other.map(str::to_string),
    };

    let mut actions = Vec::new();
    for child in node.children().filter(Node::is_element) {
        let action_index = actions.len();
        let occurrence = action_label(step_index, sequence_index, action_index);
        let raw = raw_action_node(document, child, occurrence.clone());
        let action: Arc<dyn Action> = match registry.construct(&raw) {
            Some(Ok(action)) => action,
            Some(Err(error)) => {
                push_warning(
                    warnings,
                    format!(
                        "{}: <{}> could not be loaded ({}); substituting a no-op",
                        occurrence, raw.tag, error
                    ),
                );
                Arc::new(Placeholder::new(error.to_string()))
            }
            None => {
                push_warning(
                    warnings,
                    format!(
                        "{}: unknown action tag <{}>; substituting a no-op",
                        occurrence, raw.tag
                    ),
                );
                Arc::new(Placeholder::new(format!("unknown action tag <{}>", raw.tag)))
            }
        };
        actions.push(ScriptedAction {
            label: occurrence,
            action,
        });
    }
    if actions.is_empty() {
        push_warning(warnings, format!("{} has no actions", label));
    }

    ActionSequence {
        label,
        actor,
        actions,
    }
}

fn raw_action_node(document: &Document<'_>, node: Node<'_, '_>, label: String) -> RawActionNode {
    let mut attributes = BTreeMap::new();
    for attribute in node.attributes() {
        attributes.insert(attribute.name().to_string(), attribute.value().to_string());
    }
    let text = node
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    RawActionNode {
        tag: node.tag_name().name().to_string(),
        attributes,
        text,
        span: node_span(document, node.range().start, node.range().end),
        label,
    }
}

fn flag_attribute(node: Node<'_, '_>, name: &str, default: bool, warnings: &mut Vec<String>) -> bool {
    match node.attribute(name) {
        None => default,
        Some("true") => true,
        Some("false") => false,
        Some(other) => {
            push_warning(
                warnings,
                format!(
                    "attribute \"{}\" must be \"true\" or \"false\", found \"{}\"; using {}",
                    name, other, default
                ),
            );
            default
        }
    }
}

fn push_warning(warnings: &mut Vec<String>, message: String) {
    warn!("{}", message);
    warnings.push(message);
}

fn node_span(document: &Document<'_>, start: usize, end: usize) -> SourceSpan {
    let start_pos = document.text_pos_at(start);
    let end_pos = document.text_pos_at(end);
    SourceSpan {
        start: SourceLocation {
            line: start_pos.row as usize,
            column: start_pos.col as usize,
        },
        end: SourceLocation {
            line: end_pos.row as usize,
            column: end_pos.col as usize,
        },
    }
}
