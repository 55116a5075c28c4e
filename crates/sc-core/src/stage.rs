/// Opaque handle to a live scene object owned by the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

/// Token for an engine-side template asset. Produced by a
/// `ResourceLibrary` fetch, consumed by `Stage::instantiate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateHandle(pub String);

/// The scene-object boundary the runtime drives. Hosts implement this over
/// whatever their engine calls a scene graph; the runtime never touches
/// engine types directly.
///
/// Lookup methods return `Option`/`bool` rather than erroring: a missing
/// object is an expected runtime condition, and callers degrade to a
/// journal warning instead of aborting playback.
pub trait Stage {
    fn name_of(&self, id: ObjectId) -> Option<&str>;
    fn children_of(&self, id: ObjectId) -> Vec<ObjectId>;
    fn position(&self, id: ObjectId) -> Option<Vec2>;
    fn set_position(&mut self, id: ObjectId, position: Vec2);
    fn is_enabled(&self, id: ObjectId) -> bool;
    fn set_enabled(&mut self, id: ObjectId, enabled: bool);
    /// Returns false when the object or the animation state is unknown.
    fn play_animation(&mut self, id: ObjectId, state: &str) -> bool;
    fn set_facing(&mut self, id: ObjectId, facing: Facing);
    /// Samples the named movement curve at `t` in `[0, 1]`.
    fn curve_point(&self, curve: &str, t: f32) -> Option<Vec2>;
    /// Shallow-copies an existing scene object, e.g. a dialogue-bubble
    /// template kept disabled inside the scene.
    fn clone_object(&mut self, source: ObjectId) -> Option<ObjectId>;
    fn instantiate(&mut self, template: &TemplateHandle) -> Option<ObjectId>;
    fn despawn(&mut self, id: ObjectId);
}
