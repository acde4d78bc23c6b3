use crate::traits::{Node, Trackable};

///
/// Capability
///
/// Names the capability a hierarchy pass operates on. The walker asks each
/// reachable node for it and only applies the pass (and only descends) where
/// it is present.
///

pub trait Capability {
    type Target: ?Sized;

    /// Human-readable capability name used in diagnostics.
    const NAME: &'static str;

    fn query(node: &dyn Node) -> Option<&Self::Target>;

    fn query_mut(node: &mut dyn Node) -> Option<&mut Self::Target>;
}

///
/// TrackableCapability
///

pub struct TrackableCapability;

impl Capability for TrackableCapability {
    type Target = dyn Trackable;

    const NAME: &'static str = "Trackable";

    fn query(node: &dyn Node) -> Option<&Self::Target> {
        node.as_trackable()
    }

    fn query_mut(node: &mut dyn Node) -> Option<&mut Self::Target> {
        node.as_trackable_mut()
    }
}
