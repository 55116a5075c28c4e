use sc_core::{ObjectId, Stage};

/// Resolves an actor name to a scene object below `root`. Depth-first in
/// the order the stage reports children, first match wins, so resolution is
/// deterministic for a given scene. The root itself is never a candidate.
pub fn resolve_actor(stage: &dyn Stage, root: ObjectId, name: &str) -> Option<ObjectId> {
    let mut pending = vec![root];
    while let Some(id) = pending.pop() {
        if id != root && stage.name_of(id) == Some(name) {
            return Some(id);
        }
        let children = stage.children_of(id);
        for child in children.into_iter().rev() {
            pending.push(child);
        }
    }
    None
}
