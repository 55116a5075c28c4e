use std::collections::BTreeMap;
use std::sync::Arc;

use crate::action::Action;
use crate::error::{ScriptError, SourceSpan};

/// Tag-level view of one action element, as the loader saw it. Constructors
/// registered in an [`ActionRegistry`] turn these into live actions.
#[derive(Debug, Clone)]
pub struct RawActionNode {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Trimmed inline text, when the element had any.
    pub text: Option<String>,
    pub span: SourceSpan,
    /// Debug name of the occurrence being built.
    pub label: String,
}

impl RawActionNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn required_attr(&self, name: &str) -> Result<&str, ScriptError> {
        self.attr(name).ok_or_else(|| {
            ScriptError::with_span(
                "SCRIPT_ATTR_MISSING",
                format!("<{}> requires attribute \"{}\".", self.tag, name),
                self.span,
            )
        })
    }

    pub fn bool_attr(&self, name: &str, default: bool) -> Result<bool, ScriptError> {
        match self.attr(name) {
            None => Ok(default),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(ScriptError::with_span(
                "SCRIPT_ATTR_INVALID",
                format!(
                    "<{}> attribute \"{}\" must be \"true\" or \"false\", found \"{}\".",
                    self.tag, name, other
                ),
                self.span,
            )),
        }
    }

    pub fn required_text(&self) -> Result<&str, ScriptError> {
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(ScriptError::with_span(
                "SCRIPT_TEXT_MISSING",
                format!("<{}> requires inline text.", self.tag),
                self.span,
            )),
        }
    }
}

pub type ActionConstructor = fn(&RawActionNode) -> Result<Arc<dyn Action>, ScriptError>;

/// Tag-to-constructor table the loader consults. Populated once at startup,
/// read-only afterwards.
#[derive(Default)]
pub struct ActionRegistry {
    constructors: BTreeMap<String, ActionConstructor>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        tag: impl Into<String>,
        constructor: ActionConstructor,
    ) -> Result<(), ScriptError> {
        let tag = tag.into();
        if self.constructors.contains_key(&tag) {
            return Err(ScriptError::new(
                "REGISTRY_DUPLICATE_TAG",
                format!("action tag \"{}\" is already registered.", tag),
            ));
        }
        self.constructors.insert(tag, constructor);
        Ok(())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Runs the constructor registered for `node.tag`. `None` means the tag
    /// itself is unknown; the loader substitutes a placeholder either way.
    pub fn construct(&self, node: &RawActionNode) -> Option<Result<Arc<dyn Action>, ScriptError>> {
        self.constructors
            .get(&node.tag)
            .map(|constructor| constructor(node))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}
