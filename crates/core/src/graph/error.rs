use core::fmt;

use crate::registry::NodeId;

/// A targeted edge mutation found no `pred -> succ` entry to rewrite.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeNotFound {
    pub pred: NodeId,
    pub succ: NodeId,
}

impl fmt::Display for EdgeNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no edge {} -> {} to rewrite", self.pred, self.succ)
    }
}

impl core::error::Error for EdgeNotFound {}
