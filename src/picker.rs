//! The random-selection state machine.
//!
//! `Idle -> Spinning -> Revealed -> (Idle | Spinning)`. A pick snapshots the
//! collection, hands the UI a finite frame schedule to animate, chooses the
//! winner uniformly from the snapshot exactly once when the schedule is
//! exhausted, and settles to Revealed only after the caller has journaled
//! the pick (write-then-settle).
//!
//! Every episode carries a generation id. Timer callbacks that outlive
//! their episode (a reset, a clear, a newer pick) present a stale
//! generation and are ignored, so no outstanding timer can corrupt a newer
//! episode.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::storage::Item;

/// Source of the winning index. Seam for tests to fix the selection;
/// production uses [`UniformChooser`].
pub trait IndexChooser: Send {
    /// Return an index in `[0, len)`. `len` is always >= 1.
    fn choose(&mut self, len: usize) -> usize;
}

/// Uniform distribution over `[0, len)`.
#[derive(Debug, Default)]
pub struct UniformChooser;

impl IndexChooser for UniformChooser {
    fn choose(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Animation parameters for one spin episode. Non-normative visuals, but
/// the schedule must be finite so the episode terminates on its own.
#[derive(Debug, Clone, Copy)]
pub struct SpinParams {
    pub frames: usize,
    pub frame_delay: Duration,
}

impl Default for SpinParams {
    fn default() -> Self {
        Self {
            frames: 30,
            frame_delay: Duration::from_millis(80),
        }
    }
}

impl SpinParams {
    /// Clamp user-configured values into sane ranges.
    pub fn clamped(frames: usize, frame_delay_ms: u64) -> Self {
        Self {
            frames: frames.clamp(5, 120),
            frame_delay: Duration::from_millis(frame_delay_ms.clamp(20, 500)),
        }
    }
}

/// The frame schedule for one episode, handed to the UI to drive timers.
/// Frames are indices into the episode's snapshot.
#[derive(Debug, Clone)]
pub struct SpinPlan {
    pub generation: u64,
    pub frames: Vec<usize>,
    pub frame_delay: Duration,
}

enum Phase {
    Idle,
    Spinning {
        snapshot: Arc<[Item]>,
        frame: usize,
        chosen: Option<usize>,
    },
    Revealed {
        snapshot: Arc<[Item]>,
        index: usize,
    },
}

pub struct Picker {
    phase: Phase,
    generation: u64,
    params: SpinParams,
    chooser: Box<dyn IndexChooser>,
}

impl Picker {
    pub fn new(params: SpinParams) -> Self {
        Self::with_chooser(params, Box::new(UniformChooser))
    }

    /// Construct with a custom index chooser (tests fix the selection).
    pub fn with_chooser(params: SpinParams, chooser: Box<dyn IndexChooser>) -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
            params,
            chooser,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, Phase::Spinning { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// The revealed selection, if the machine is in Revealed.
    pub fn selected(&self) -> Option<&Item> {
        match &self.phase {
            Phase::Revealed { snapshot, index } => snapshot.get(*index),
            _ => None,
        }
    }

    /// The snapshot item the current animation frame points at.
    pub fn current_frame_item(&self) -> Option<&Item> {
        match &self.phase {
            Phase::Spinning { snapshot, frame, .. } => snapshot.get(frame % snapshot.len()),
            _ => None,
        }
    }

    /// Start a spin episode from Idle or Revealed.
    ///
    /// No-op (returns `None`) while already Spinning or when the snapshot
    /// is empty. The returned plan's frames walk the snapshot's index space
    /// in order, wrapping as the original carousel did.
    pub fn pick(&mut self, snapshot: Arc<[Item]>) -> Option<SpinPlan> {
        if self.is_spinning() || snapshot.is_empty() {
            return None;
        }

        self.generation = self.generation.wrapping_add(1);
        let frames: Vec<usize> = (0..self.params.frames).map(|i| i % snapshot.len()).collect();
        let plan = SpinPlan {
            generation: self.generation,
            frames,
            frame_delay: self.params.frame_delay,
        };

        tracing::debug!(
            generation = self.generation,
            items = snapshot.len(),
            frames = plan.frames.len(),
            "Starting spin episode"
        );
        self.phase = Phase::Spinning {
            snapshot,
            frame: 0,
            chosen: None,
        };
        Some(plan)
    }

    /// Advance the animation to `frame`. Returns `false` for stale
    /// generations or when not spinning (frame dropped, no redraw).
    pub fn spin_frame(&mut self, generation: u64, frame: usize) -> bool {
        if generation != self.generation {
            tracing::debug!(
                expected = self.generation,
                got = generation,
                "Ignoring stale spin frame"
            );
            return false;
        }
        match &mut self.phase {
            Phase::Spinning { frame: f, chosen: None, .. } => {
                *f = frame;
                true
            }
            _ => false,
        }
    }

    /// Choose the winner when the frame schedule is exhausted.
    ///
    /// Selects uniformly (via the chooser) from the episode's snapshot,
    /// exactly once per episode; repeated or stale calls return `None`.
    /// The machine stays Spinning until [`Picker::settle`] so the caller
    /// can journal the pick first.
    pub fn complete(&mut self, generation: u64) -> Option<Item> {
        if generation != self.generation {
            tracing::debug!(
                expected = self.generation,
                got = generation,
                "Ignoring stale spin completion"
            );
            return None;
        }
        match &mut self.phase {
            Phase::Spinning { snapshot, chosen, .. } if chosen.is_none() => {
                let index = self.chooser.choose(snapshot.len());
                debug_assert!(index < snapshot.len());
                *chosen = Some(index);
                Some(snapshot[index].clone())
            }
            _ => None,
        }
    }

    /// Transition the completed episode to Revealed. Called after the
    /// history write has landed.
    pub fn settle(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        if let Phase::Spinning {
            snapshot,
            chosen: Some(index),
            ..
        } = &self.phase
        {
            let snapshot = Arc::clone(snapshot);
            let index = *index;
            self.phase = Phase::Revealed { snapshot, index };
            true
        } else {
            false
        }
    }

    /// Back to Idle: clears the selection, discards spin state, and bumps
    /// the generation so outstanding timer callbacks become sterile.
    /// No history side effect.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Always picks a fixed index.
    struct FixedChooser(usize);

    impl IndexChooser for FixedChooser {
        fn choose(&mut self, len: usize) -> usize {
            self.0.min(len - 1)
        }
    }

    fn items(names: &[&str]) -> Arc<[Item]> {
        names
            .iter()
            .map(|n| Item::custom(*n))
            .collect::<Vec<_>>()
            .into()
    }

    fn test_picker(index: usize) -> Picker {
        Picker::with_chooser(SpinParams::default(), Box::new(FixedChooser(index)))
    }

    #[test]
    fn pick_on_empty_collection_is_noop() {
        let mut p = test_picker(0);
        assert!(p.pick(items(&[])).is_none());
        assert!(p.is_idle());
    }

    #[test]
    fn pick_produces_finite_plan_into_snapshot() {
        let mut p = test_picker(0);
        let plan = p.pick(items(&["a", "b", "c"])).unwrap();
        assert_eq!(plan.frames.len(), 30);
        assert!(plan.frames.iter().all(|&f| f < 3));
        assert!(p.is_spinning());
    }

    #[test]
    fn pick_while_spinning_is_noop() {
        let mut p = test_picker(0);
        let first = p.pick(items(&["a", "b"])).unwrap();
        assert!(p.pick(items(&["a", "b"])).is_none());
        // The original episode is still live
        assert_eq!(p.generation(), first.generation);
    }

    #[test]
    fn fixed_chooser_selects_expected_item() {
        let mut p = test_picker(1);
        let plan = p.pick(items(&["A", "B", "C"])).unwrap();
        let picked = p.complete(plan.generation).unwrap();
        assert_eq!(picked.name, "B");
        assert!(p.settle(plan.generation));
        assert_eq!(p.selected().unwrap().name, "B");
    }

    #[test]
    fn complete_fires_exactly_once_per_episode() {
        let mut p = test_picker(0);
        let plan = p.pick(items(&["a", "b"])).unwrap();
        assert!(p.complete(plan.generation).is_some());
        assert!(p.complete(plan.generation).is_none());
    }

    #[test]
    fn stale_generation_is_ignored() {
        let mut p = test_picker(0);
        let plan = p.pick(items(&["a", "b"])).unwrap();
        p.reset();
        assert!(!p.spin_frame(plan.generation, 3));
        assert!(p.complete(plan.generation).is_none());
        assert!(!p.settle(plan.generation));
        assert!(p.is_idle());
    }

    #[test]
    fn selection_comes_from_snapshot_despite_mutation() {
        let mut p = test_picker(2);
        let snap = items(&["a", "b", "c"]);
        let plan = p.pick(Arc::clone(&snap)).unwrap();
        // Collection shrinks mid-spin; the snapshot does not.
        let picked = p.complete(plan.generation).unwrap();
        assert_eq!(picked.name, "c");
    }

    #[test]
    fn settle_requires_completion() {
        let mut p = test_picker(0);
        let plan = p.pick(items(&["a"])).unwrap();
        assert!(!p.settle(plan.generation));
        p.complete(plan.generation).unwrap();
        assert!(p.settle(plan.generation));
    }

    #[test]
    fn try_again_from_revealed_starts_new_episode() {
        let mut p = test_picker(0);
        let plan = p.pick(items(&["a", "b"])).unwrap();
        p.complete(plan.generation).unwrap();
        p.settle(plan.generation);

        let again = p.pick(items(&["a", "b"])).unwrap();
        assert!(again.generation > plan.generation);
        assert!(p.is_spinning());
        assert!(p.selected().is_none());
    }

    #[test]
    fn try_again_rejected_on_empty_collection() {
        let mut p = test_picker(0);
        let plan = p.pick(items(&["a"])).unwrap();
        p.complete(plan.generation).unwrap();
        p.settle(plan.generation);

        assert!(p.pick(items(&[])).is_none());
        // Still revealed, selection intact
        assert_eq!(p.selected().unwrap().name, "a");
    }

    #[test]
    fn reset_clears_selection_without_history_side_effect() {
        let mut p = test_picker(0);
        let plan = p.pick(items(&["a"])).unwrap();
        p.complete(plan.generation).unwrap();
        p.settle(plan.generation);
        p.reset();
        assert!(p.is_idle());
        assert!(p.selected().is_none());
    }

    proptest! {
        /// Membership invariant: whatever the collection and however the
        /// uniform chooser lands, the selection is an element of the
        /// snapshot taken at spin start.
        #[test]
        fn selected_is_member_of_snapshot(names in proptest::collection::vec("[a-z]{1,8}", 1..20)) {
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let snap = items(&refs);
            let mut p = Picker::new(SpinParams::default());
            let plan = p.pick(Arc::clone(&snap)).unwrap();
            let picked = p.complete(plan.generation).unwrap();
            prop_assert!(snap.iter().any(|i| i.name == picked.name));
        }
    }
}
