//! Per-object tracking state and its transition rules.
//!
//! A `TrackingStatus` is owned by exactly one model object. It has no
//! knowledge of the object graph; graph-wide transitions live in `track`.

///
/// TrackingState
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrackingState {
    Untracked,
    TrackingClean,
    TrackingDirty,
}

///
/// TrackingFlags
///
/// The part of a status that flows from a parent to a lazily loaded child.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct TrackingFlags {
    pub is_tracking: bool,
    pub compares_old_value: bool,
}

impl TrackingFlags {
    pub const UNTRACKED: Self = Self {
        is_tracking: false,
        compares_old_value: false,
    };

    #[must_use]
    pub const fn tracking(compares_old_value: bool) -> Self {
        Self {
            is_tracking: true,
            compares_old_value,
        }
    }
}

///
/// TrackingStatus
///
/// Dirty/new bookkeeping for one object. `is_dirty` only changes through
/// writes while `is_tracking` is set; `touch`, `set_new` and `reset_dirty`
/// are explicit and apply regardless.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TrackingStatus {
    is_new: bool,
    is_dirty: bool,
    is_tracking: bool,
    compares_old_value: bool,
}

impl TrackingStatus {
    /// Not new, not dirty, not tracking.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            is_new: false,
            is_dirty: false,
            is_tracking: false,
            compares_old_value: false,
        }
    }

    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.is_new
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        self.is_tracking
    }

    #[must_use]
    pub const fn compares_old_value(&self) -> bool {
        self.compares_old_value
    }

    #[must_use]
    pub const fn state(&self) -> TrackingState {
        match (self.is_tracking, self.is_dirty) {
            (false, _) => TrackingState::Untracked,
            (true, false) => TrackingState::TrackingClean,
            (true, true) => TrackingState::TrackingDirty,
        }
    }

    #[must_use]
    pub const fn flags(&self) -> TrackingFlags {
        TrackingFlags {
            is_tracking: self.is_tracking,
            compares_old_value: self.compares_old_value,
        }
    }

    /// Overwrite the tracking flags with a parent's.
    /// Returns `true` if anything changed.
    pub const fn inherit(&mut self, flags: TrackingFlags) -> bool {
        let changed = self.is_tracking != flags.is_tracking
            || self.compares_old_value != flags.compares_old_value;

        self.is_tracking = flags.is_tracking;
        self.compares_old_value = flags.compares_old_value;

        changed
    }

    pub const fn start_tracking(&mut self, compare_old_value: bool) {
        self.is_tracking = true;
        self.compares_old_value = compare_old_value;
    }

    /// Stop observing writes. The dirty flag is kept.
    pub const fn stop_tracking(&mut self) {
        self.is_tracking = false;
    }

    /// Record a write of `new` over `old`.
    /// Returns `true` if the write marked the object dirty.
    pub fn record_write<T>(&mut self, old: &T, new: &T) -> bool
    where
        T: PartialEq + ?Sized,
    {
        self.record_change(|| old != new)
    }

    /// Record a write whose difference is computed by `changed`.
    ///
    /// `changed` is only evaluated under the compare-old-value policy.
    pub fn record_change(&mut self, changed: impl FnOnce() -> bool) -> bool {
        if !self.is_tracking {
            return false;
        }
        if self.compares_old_value && !changed() {
            return false;
        }

        self.is_dirty = true;
        true
    }

    pub const fn touch(&mut self) {
        self.is_dirty = true;
    }

    /// Mark as never persisted; a new object always needs persisting.
    pub const fn set_new(&mut self) {
        self.is_new = true;
        self.is_dirty = true;
    }

    /// Checkpoint after a successful persistence operation.
    pub const fn reset_dirty(&mut self) {
        self.is_dirty = false;
        self.is_new = false;
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    enum Op {
        Start(bool),
        Stop,
        Write(u8, u8),
        Touch,
        SetNew,
        Reset,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<bool>().prop_map(Op::Start),
            Just(Op::Stop),
            (0u8..3, 0u8..3).prop_map(|(a, b)| Op::Write(a, b)),
            Just(Op::Touch),
            Just(Op::SetNew),
            Just(Op::Reset),
        ]
    }

    fn apply(status: &mut TrackingStatus, op: &Op) {
        match *op {
            Op::Start(compare) => status.start_tracking(compare),
            Op::Stop => status.stop_tracking(),
            Op::Write(old, new) => {
                status.record_write(&old, &new);
            }
            Op::Touch => status.touch(),
            Op::SetNew => status.set_new(),
            Op::Reset => status.reset_dirty(),
        }
    }

    #[test]
    fn fresh_status_is_untracked_and_clean() {
        let status = TrackingStatus::new();

        assert_eq!(status, TrackingStatus::default());
        assert_eq!(status.state(), TrackingState::Untracked);
        assert!(!status.is_dirty());
        assert!(!status.is_new());
    }

    #[test]
    fn compare_policy_ignores_identical_writes() {
        let mut status = TrackingStatus::new();
        status.start_tracking(true);

        assert!(!status.record_write("a", "a"));
        assert_eq!(status.state(), TrackingState::TrackingClean);

        assert!(status.record_write("a", "b"));
        assert_eq!(status.state(), TrackingState::TrackingDirty);
    }

    #[test]
    fn blind_policy_marks_every_write() {
        let mut status = TrackingStatus::new();
        status.start_tracking(false);

        assert!(status.record_write(&7, &7));
        assert!(status.is_dirty());
    }

    #[test]
    fn blind_policy_never_evaluates_the_comparison() {
        let mut status = TrackingStatus::new();
        status.start_tracking(false);

        let marked = status.record_change(|| panic!("comparison must not run"));
        assert!(marked);
    }

    #[test]
    fn stop_keeps_dirty_but_ignores_later_writes() {
        let mut status = TrackingStatus::new();
        status.start_tracking(false);
        status.record_write(&1, &2);
        status.stop_tracking();

        assert!(status.is_dirty());
        assert_eq!(status.state(), TrackingState::Untracked);

        status.reset_dirty();
        assert!(!status.record_write(&1, &2));
        assert!(!status.is_dirty());
    }

    #[test]
    fn inherit_reports_changes() {
        let mut status = TrackingStatus::new();

        assert!(status.inherit(TrackingFlags::tracking(false)));
        assert!(!status.inherit(TrackingFlags::tracking(false)));
        assert_eq!(status.flags(), TrackingFlags::tracking(false));
        assert!(status.inherit(TrackingFlags::UNTRACKED));
    }

    proptest! {
        #[test]
        fn reset_always_checkpoints(ops in prop::collection::vec(arb_op(), 0..24)) {
            let mut status = TrackingStatus::new();
            for op in &ops {
                apply(&mut status, op);
            }

            status.reset_dirty();
            prop_assert!(!status.is_dirty());
            prop_assert!(!status.is_new());
        }

        #[test]
        fn set_new_always_dirties(ops in prop::collection::vec(arb_op(), 0..24)) {
            let mut status = TrackingStatus::new();
            for op in &ops {
                apply(&mut status, op);
            }

            status.set_new();
            prop_assert!(status.is_dirty());
            prop_assert!(status.is_new());
        }

        #[test]
        fn untracked_writes_never_dirty(writes in prop::collection::vec((any::<u8>(), any::<u8>()), 0..24)) {
            let mut status = TrackingStatus::new();
            for (old, new) in &writes {
                status.record_write(old, new);
            }

            prop_assert!(!status.is_dirty());
        }
    }
}
