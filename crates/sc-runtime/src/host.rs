use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use sc_core::{
    ChoiceSide, Facing, ObjectId, ResourceLibrary, ScriptError, SpeakChoice, Stage,
    TemplateHandle, TemplateTicket, Typist, TypistProgress, TypistTicket, Vec2,
};

#[derive(Debug, Clone)]
struct SceneNode {
    name: String,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    position: Vec2,
    enabled: bool,
    facing: Facing,
    animations: BTreeSet<String>,
}

/// Deterministic in-memory stage. Mutations append to an event log so tests
/// and the CLI can assert what a playback did to the scene without a real
/// engine behind it.
#[derive(Debug)]
pub struct MemoryStage {
    nodes: BTreeMap<ObjectId, SceneNode>,
    root: ObjectId,
    next_id: u64,
    curves: BTreeMap<String, Vec<Vec2>>,
    templates: BTreeSet<String>,
    events: Vec<String>,
}

impl Default for MemoryStage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStage {
    pub fn new() -> Self {
        let root = ObjectId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root,
            SceneNode {
                name: "root".to_string(),
                parent: None,
                children: Vec::new(),
                position: Vec2::default(),
                enabled: true,
                facing: Facing::Right,
                animations: BTreeSet::new(),
            },
        );
        Self {
            nodes,
            root,
            next_id: 1,
            curves: BTreeMap::new(),
            templates: BTreeSet::new(),
            events: Vec::new(),
        }
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn add_object(&mut self, parent: ObjectId, name: &str) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                name: name.to_string(),
                parent: Some(parent),
                children: Vec::new(),
                position: Vec2::default(),
                enabled: true,
                facing: Facing::Right,
                animations: BTreeSet::new(),
            },
        );
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }
        id
    }

    /// Setup-time position, without touching the event log.
    pub fn place(&mut self, id: ObjectId, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
        }
    }

    /// Setup-time enabled flag, without touching the event log.
    pub fn enable(&mut self, id: ObjectId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.enabled = enabled;
        }
    }

    pub fn allow_animation(&mut self, id: ObjectId, state: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.animations.insert(state.to_string());
        }
    }

    pub fn add_curve(&mut self, name: &str, points: Vec<Vec2>) {
        self.curves.insert(name.to_string(), points);
    }

    pub fn add_template(&mut self, name: &str) {
        self.templates.insert(name.to_string());
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(String::as_str)
    }

    /// First object with the given name, in id order.
    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| *id)
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }

    pub fn facing_of(&self, id: ObjectId) -> Option<Facing> {
        self.nodes.get(&id).map(|node| node.facing)
    }

    fn log(&mut self, event: String) {
        self.events.push(event);
    }
}

impl Stage for MemoryStage {
    fn name_of(&self, id: ObjectId) -> Option<&str> {
        self.nodes.get(&id).map(|node| node.name.as_str())
    }

    fn children_of(&self, id: ObjectId) -> Vec<ObjectId> {
        self.nodes
            .get(&id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn position(&self, id: ObjectId) -> Option<Vec2> {
        self.nodes.get(&id).map(|node| node.position)
    }

    fn set_position(&mut self, id: ObjectId, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
        }
    }

    fn is_enabled(&self, id: ObjectId) -> bool {
        self.nodes.get(&id).map_or(false, |node| node.enabled)
    }

    fn set_enabled(&mut self, id: ObjectId, enabled: bool) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.enabled = enabled;
        let name = node.name.clone();
        self.log(format!(
            "{} {}",
            if enabled { "enable" } else { "disable" },
            name
        ));
    }

    fn play_animation(&mut self, id: ObjectId, state: &str) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        if !node.animations.contains(state) {
            return false;
        }
        let name = node.name.clone();
        self.log(format!("animate {} {}", name, state));
        true
    }

    fn set_facing(&mut self, id: ObjectId, facing: Facing) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.facing = facing;
        let name = node.name.clone();
        self.log(format!(
            "face {} {}",
            name,
            match facing {
                Facing::Left => "left",
                Facing::Right => "right",
            }
        ));
    }

    fn curve_point(&self, curve: &str, t: f32) -> Option<Vec2> {
        let points = self.curves.get(curve)?;
        match points.len() {
            0 => None,
            1 => Some(points[0]),
            len => {
                let clamped = t.clamp(0.0, 1.0);
                let scaled = clamped * (len - 1) as f32;
                let index = (scaled.floor() as usize).min(len - 2);
                let local = scaled - index as f32;
                let a = points[index];
                let b = points[index + 1];
                Some(Vec2::new(
                    a.x + (b.x - a.x) * local,
                    a.y + (b.y - a.y) * local,
                ))
            }
        }
    }

    fn clone_object(&mut self, source: ObjectId) -> Option<ObjectId> {
        let node = self.nodes.get(&source)?.clone();
        let name = node.name.clone();
        let parent = node.parent.unwrap_or(self.root);
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                parent: Some(parent),
                children: Vec::new(),
                ..node
            },
        );
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }
        self.log(format!("clone {}", name));
        Some(id)
    }

    fn instantiate(&mut self, template: &TemplateHandle) -> Option<ObjectId> {
        if !self.templates.contains(&template.0) {
            return None;
        }
        let root = self.root;
        let id = self.add_object(root, &template.0);
        self.log(format!("spawn {}", template.0));
        Some(id)
    }

    fn despawn(&mut self, id: ObjectId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let name = node.name.clone();
        let parent = node.parent;

        let mut doomed = vec![id];
        let mut index = 0;
        while index < doomed.len() {
            let current = doomed[index];
            index += 1;
            if let Some(node) = self.nodes.get(&current) {
                doomed.extend(node.children.iter().copied());
            }
        }
        for current in &doomed {
            self.nodes.remove(current);
        }
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        self.log(format!("despawn {}", name));
    }
}

/// Typist that reports every line finished on the first poll. Two-way
/// choices resolve to the first option. Used by the CLI runner and tests.
#[derive(Debug, Default)]
pub struct InstantTypist {
    next: AtomicU64,
    sessions: Mutex<BTreeMap<u64, bool>>,
}

impl Typist for InstantTypist {
    fn begin(&self, _bubble: ObjectId, _text: &str, choice: Option<&SpeakChoice>) -> TypistTicket {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(id, choice.is_some());
        }
        TypistTicket(id)
    }

    fn poll(&self, ticket: TypistTicket) -> TypistProgress {
        let has_choice = self
            .sessions
            .lock()
            .ok()
            .and_then(|sessions| sessions.get(&ticket.0).copied())
            .unwrap_or(false);
        TypistProgress::Done {
            choice: has_choice.then_some(ChoiceSide::First),
        }
    }
}

/// Resource library over a fixed set of template names. Known names resolve
/// on the first poll; unknown names fail the fetch.
#[derive(Debug, Default)]
pub struct StaticResources {
    known: BTreeSet<String>,
}

impl StaticResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provide(&mut self, name: impl Into<String>) {
        self.known.insert(name.into());
    }
}

impl ResourceLibrary for StaticResources {
    fn fetch_template(&self, name: &str) -> TemplateTicket {
        if self.known.contains(name) {
            TemplateTicket::ready(TemplateHandle(name.to_string()))
        } else {
            TemplateTicket::failed(ScriptError::new(
                "RESOURCE_NOT_FOUND",
                format!("template \"{}\" is not in the library.", name),
            ))
        }
    }
}
