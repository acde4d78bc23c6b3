//! Graph-level tracking operations over type-erased roots.

use crate::{
    error::TrackError,
    obs::{TrackEvent, sink::record},
    traits::{Capability, Node, Trackable, TrackableCapability},
    walk::{apply_to_hierarchy, exclude_non_composition, exclude_none, visit_hierarchy},
};
use std::ops::ControlFlow;

/// Start tracking on `root` and, when `recurse` is set, on every reachable
/// trackable node. Containers among the visited attributes remember the
/// flags for entries they load later.
///
/// Returns the number of nodes that started tracking.
pub fn start_tracking(
    root: &mut dyn Node,
    recurse: bool,
    compare_old_value: bool,
) -> Result<usize, TrackError> {
    require_trackable(root)?;
    let path = root.type_path();

    let mut nodes = 0;
    apply_to_hierarchy::<TrackableCapability>(
        Some(root),
        &mut |target| {
            target.tracking_status_mut().start_tracking(compare_old_value);
            let flags = target.tracking_flags();
            target.remember_container_flags(flags);
            nodes += 1;
        },
        recurse,
        &exclude_none,
    )?;

    record(TrackEvent::TrackingStarted {
        path,
        nodes: nodes as u64,
        compare_old_value,
    });

    Ok(nodes)
}

/// Stop tracking on `root` and optionally its reachable hierarchy.
/// Dirty flags are kept.
pub fn stop_tracking(root: &mut dyn Node, recurse: bool) -> Result<usize, TrackError> {
    require_trackable(root)?;
    let path = root.type_path();

    let mut nodes = 0;
    apply_to_hierarchy::<TrackableCapability>(
        Some(root),
        &mut |target| {
            target.tracking_status_mut().stop_tracking();
            let flags = target.tracking_flags();
            target.remember_container_flags(flags);
            nodes += 1;
        },
        recurse,
        &exclude_none,
    )?;

    record(TrackEvent::TrackingStopped {
        path,
        nodes: nodes as u64,
    });

    Ok(nodes)
}

/// Whether `root` or any node reachable through composition attributes is
/// dirty. Only loaded container entries are inspected.
pub fn is_dirty(root: &dyn Node) -> Result<bool, TrackError> {
    require_trackable(root)?;

    let flow = visit_hierarchy::<TrackableCapability>(
        Some(root),
        &mut |target| {
            if target.is_this_dirty() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        },
        true,
        &exclude_non_composition,
    )?;
    let dirty = flow.is_break();

    record(TrackEvent::DirtyChecked {
        path: root.type_path(),
        dirty,
    });

    Ok(dirty)
}

/// Checkpoint `root` and every node reachable through composition
/// attributes after the whole aggregate was persisted.
///
/// Returns the number of nodes reset.
pub fn reset_dirty_hierarchy(root: &mut dyn Node) -> Result<usize, TrackError> {
    require_trackable(root)?;
    let path = root.type_path();

    let mut nodes = 0;
    apply_to_hierarchy::<TrackableCapability>(
        Some(root),
        &mut |target| {
            target.tracking_status_mut().reset_dirty();
            nodes += 1;
        },
        true,
        &exclude_non_composition,
    )?;

    record(TrackEvent::Checkpoint {
        path,
        nodes: nodes as u64,
    });

    Ok(nodes)
}

/// View `node` through the trackable capability, or fail with a capability
/// mismatch naming its type.
pub fn require_trackable(node: &dyn Node) -> Result<&(dyn Trackable + 'static), TrackError> {
    node.as_trackable().ok_or_else(|| {
        TrackError::capability_mismatch(node.type_path(), TrackableCapability::NAME)
    })
}

pub fn require_trackable_mut(
    node: &mut dyn Node,
) -> Result<&mut (dyn Trackable + 'static), TrackError> {
    let type_path = node.type_path();

    node.as_trackable_mut()
        .ok_or(TrackError::capability_mismatch(
            type_path,
            TrackableCapability::NAME,
        ))
}

///
/// TESTS
///
