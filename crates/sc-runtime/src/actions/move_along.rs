use std::sync::Arc;
use std::time::Duration;

use sc_core::{parse_duration, Action, Cue, Facing, RawActionNode, ScriptError};

/// Horizontal travel below this distance is treated as jitter and never
/// changes facing.
const FLIP_THRESHOLD: f32 = 0.05;
/// Early curve sample used to read the opening direction of travel.
const ORIENT_PROBE: f32 = 0.05;

/// Moves the bound actor along a named stage curve over a fixed duration.
/// With `flip` the actor's facing follows the direction of travel; with
/// `orient` it is additionally corrected once at the start.
#[derive(Debug, Clone)]
pub struct MoveAction {
    curve: String,
    duration: Duration,
    flip: bool,
    orient: bool,
}

#[derive(Debug, Default, Clone, Copy)]
struct MoveSlot {
    started: Duration,
    /// X position at the last confirmed facing decision; reversals must
    /// cover FLIP_THRESHOLD from here before the facing flips.
    anchor_x: f32,
    facing: Option<Facing>,
    complete: bool,
    failed: bool,
}

impl MoveAction {
    pub fn new(curve: impl Into<String>, duration: Duration, flip: bool, orient: bool) -> Self {
        Self {
            curve: curve.into(),
            duration,
            flip,
            orient,
        }
    }

    pub(crate) fn from_node(node: &RawActionNode) -> Result<Arc<dyn Action>, ScriptError> {
        let curve = node.required_attr("curve")?.to_string();
        let duration = parse_duration(node.required_attr("duration")?)?;
        let flip = node.bool_attr("flip", false)?;
        let orient = node.bool_attr("orient", false)?;
        Ok(Arc::new(Self {
            curve,
            duration,
            flip,
            orient,
        }))
    }

    fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        }
    }
}

impl Action for MoveAction {
    fn is_done(&self, cue: &Cue<'_>) -> bool {
        cue.store
            .get::<MoveSlot>(cue.key)
            .map_or(false, |slot| slot.complete || slot.failed)
    }

    fn start(&self, cue: &mut Cue<'_>) {
        let Some(actor) = cue.actor else {
            cue.warn("no actor is bound; cannot move");
            cue.store.put(
                cue.key,
                MoveSlot {
                    failed: true,
                    ..MoveSlot::default()
                },
            );
            return;
        };
        let Some(origin) = cue.stage.curve_point(&self.curve, 0.0) else {
            cue.warn(format!("movement curve \"{}\" was not found", self.curve));
            cue.store.put(
                cue.key,
                MoveSlot {
                    failed: true,
                    ..MoveSlot::default()
                },
            );
            return;
        };

        let mut slot = MoveSlot {
            started: cue.now,
            anchor_x: origin.x,
            facing: None,
            complete: false,
            failed: false,
        };
        if self.orient {
            if let Some(ahead) = cue.stage.curve_point(&self.curve, ORIENT_PROBE) {
                let dx = ahead.x - origin.x;
                if dx.abs() > f32::EPSILON {
                    let facing = if dx < 0.0 { Facing::Left } else { Facing::Right };
                    cue.stage.set_facing(actor, facing);
                    slot.facing = Some(facing);
                }
            }
        }
        cue.stage.set_position(actor, origin);
        cue.store.put(cue.key, slot);
    }

    fn update(&self, cue: &mut Cue<'_>) {
        let Some(slot) = cue.store.get::<MoveSlot>(cue.key).copied() else {
            return;
        };
        if slot.failed || slot.complete {
            return;
        }
        let Some(actor) = cue.actor else {
            return;
        };

        let elapsed = cue.now.saturating_sub(slot.started);
        let t = self.progress(elapsed);
        let Some(point) = cue.stage.curve_point(&self.curve, t) else {
            cue.warn(format!(
                "movement curve \"{}\" disappeared mid-flight",
                self.curve
            ));
            if let Some(slot) = cue.store.get_mut::<MoveSlot>(cue.key) {
                slot.failed = true;
            }
            return;
        };
        cue.stage.set_position(actor, point);

        let mut next = slot;
        if self.flip {
            let dx = point.x - slot.anchor_x;
            let desired = if dx > FLIP_THRESHOLD {
                Some(Facing::Right)
            } else if dx < -FLIP_THRESHOLD {
                Some(Facing::Left)
            } else {
                None
            };
            if let Some(facing) = desired {
                if next.facing != Some(facing) {
                    cue.stage.set_facing(actor, facing);
                    next.facing = Some(facing);
                }
                next.anchor_x = point.x;
            }
        }
        if elapsed >= self.duration {
            next.complete = true;
        }
        if let Some(slot) = cue.store.get_mut::<MoveSlot>(cue.key) {
            *slot = next;
        }
    }
}
