use std::sync::Arc;
use std::time::Duration;

use sc_core::{parse_duration, Action, Cue, RawActionNode, ScriptError};

/// Blocks its sequence until the configured time has elapsed on the
/// playback clock. A zero duration completes at the first done-check, which
/// lets it cascade through in the same tick.
#[derive(Debug, Clone)]
pub struct PauseAction {
    duration: Duration,
}

#[derive(Debug, Clone, Copy)]
struct PauseSlot {
    started: Duration,
}

impl PauseAction {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub(crate) fn from_node(node: &RawActionNode) -> Result<Arc<dyn Action>, ScriptError> {
        let duration = match node.attr("duration") {
            Some(text) => parse_duration(text)?,
            None => Duration::ZERO,
        };
        Ok(Arc::new(Self::new(duration)))
    }
}

impl Action for PauseAction {
    fn is_done(&self, cue: &Cue<'_>) -> bool {
        cue.store
            .get::<PauseSlot>(cue.key)
            .map_or(false, |slot| {
                cue.now.saturating_sub(slot.started) >= self.duration
            })
    }

    fn start(&self, cue: &mut Cue<'_>) {
        cue.store.put(cue.key, PauseSlot { started: cue.now });
    }

    fn update(&self, _cue: &mut Cue<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ActionHarness, TICK};

    #[test]
    fn not_done_before_start() {
        let mut harness = ActionHarness::new();
        let pause = PauseAction::new(Duration::from_millis(300));
        assert!(!harness.is_done(&pause));
    }

    #[test]
    fn done_once_the_duration_elapses() {
        let mut harness = ActionHarness::new();
        let pause = PauseAction::new(Duration::from_millis(300));
        harness.start(&pause);

        assert!(!harness.tick(&pause)); // now 100ms
        assert!(!harness.tick(&pause)); // now 200ms
        assert!(harness.tick(&pause)); // now 300ms
        // Done stays done on repeated checks.
        assert!(harness.is_done(&pause));
    }

    #[test]
    fn zero_duration_is_done_immediately_after_start() {
        let mut harness = ActionHarness::new();
        let pause = PauseAction::new(Duration::ZERO);
        harness.start(&pause);
        assert!(harness.is_done(&pause));
    }

    #[test]
    fn duration_attribute_is_optional() {
        let node = crate::test_support::raw_node("pause", &[], None);
        let action = PauseAction::from_node(&node).expect("should construct");
        let mut harness = ActionHarness::new();
        harness.start(action.as_ref());
        assert!(harness.is_done(action.as_ref()));
    }

    #[test]
    fn bad_duration_fails_construction() {
        let node = crate::test_support::raw_node("pause", &[("duration", "soon")], None);
        let error = PauseAction::from_node(&node).expect_err("should reject");
        assert_eq!(error.code, "SCRIPT_DURATION_INVALID");
    }

    #[test]
    fn timer_restarts_when_started_again() {
        let mut harness = ActionHarness::new();
        let pause = PauseAction::new(TICK);
        harness.start(&pause);
        assert!(harness.tick(&pause));

        // A fresh start (new playback of the same occurrence) rearms it.
        harness.start(&pause);
        assert!(!harness.is_done(&pause));
    }
}
