//! Item collection contract.

use crate::item::PlaylistItem;
use std::sync::Arc;

/// A finite, randomly-indexable ordered sequence of playable items.
///
/// The concrete storage is a host concern; the core only navigates it through
/// this read-only view. Implementations must tolerate concurrent reads.
pub trait ItemSource: Send + Sync {
    /// Number of items currently in the sequence.
    fn item_count(&self) -> usize;

    /// Item at `position`, or `None` when the position is out of range.
    fn item_at(&self, position: usize) -> Option<Arc<dyn PlaylistItem>>;

    /// Position of the item with the given id, or `None` when no such item
    /// exists. Linear scan semantics are acceptable.
    fn position_for_item(&self, item_id: u64) -> Option<usize>;
}

/// A trivial `Vec`-backed [`ItemSource`].
///
/// Convenient for hosts that hold the whole playlist in memory, and for
/// tests.
pub struct VecItemSource {
    items: Vec<Arc<dyn PlaylistItem>>,
}

impl VecItemSource {
    pub fn new(items: Vec<Arc<dyn PlaylistItem>>) -> Self {
        Self { items }
    }

    /// An empty source, useful as an initial placeholder.
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }
}

impl ItemSource for VecItemSource {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn item_at(&self, position: usize) -> Option<Arc<dyn PlaylistItem>> {
        self.items.get(position).cloned()
    }

    fn position_for_item(&self, item_id: u64) -> Option<usize> {
        self.items.iter().position(|item| item.id() == item_id)
    }
}
