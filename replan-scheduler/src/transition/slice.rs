use std::collections::BTreeMap;

use replan_core::variables::DomainId;

/// The resources a VM reserves on a host during `[start, end)`.
///
/// A consuming slice starts at 0 and is released at the end of the action, on the current host;
/// a demanding slice is acquired at the start of the action on the future host and lasts until
/// the horizon.
#[derive(Clone, Debug)]
pub struct Slice {
    pub(crate) host: DomainId,
    pub(crate) start: DomainId,
    pub(crate) end: DomainId,
    pub(crate) heights: BTreeMap<String, i32>,
}

impl Slice {
    /// The index of the host node.
    pub fn host(&self) -> DomainId {
        self.host
    }

    pub fn start(&self) -> DomainId {
        self.start
    }

    pub fn end(&self) -> DomainId {
        self.end
    }

    /// The amount of `resource` which is reserved; 0 for an unknown resource.
    pub fn height(&self, resource: &str) -> i32 {
        self.heights.get(resource).copied().unwrap_or(0)
    }
}
