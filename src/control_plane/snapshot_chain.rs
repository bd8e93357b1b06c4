//! Immutable image snapshots and the coordinator-owned snapshot chain.

use crate::api::image::Image;
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Change number of the pre-publication empty snapshot and the low-water-mark
/// sentinel: strictly below every published change number, so the first
/// publication is stamped `0` and nothing is reclaimable before a poll has
/// observed a published snapshot.
pub(crate) const SENTINEL_CHANGE_NUMBER: i64 = -1;

/// An immutable, versioned view of the set of images belonging to a
/// subscription at one point in time.
///
/// The image array never changes after construction; membership changes are
/// expressed by publishing a whole new snapshot. A snapshot holds shared
/// references to its images but never controls their lifetime.
pub(crate) struct ImageSnapshot {
    change_number: i64,
    images: Box<[Arc<dyn Image>]>,
}

impl ImageSnapshot {
    pub(crate) fn new(change_number: i64, images: Vec<Arc<dyn Image>>) -> Self {
        Self {
            change_number,
            images: images.into_boxed_slice(),
        }
    }

    /// The snapshot every subscription starts from: no images, sentinel stamp.
    pub(crate) fn empty() -> Self {
        Self::new(SENTINEL_CHANGE_NUMBER, Vec::new())
    }

    pub(crate) fn change_number(&self) -> i64 {
        self.change_number
    }

    pub(crate) fn len(&self) -> usize {
        self.images.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub(crate) fn image_at(&self, index: usize) -> &Arc<dyn Image> {
        &self.images[index]
    }

    pub(crate) fn images(&self) -> &[Arc<dyn Image>] {
        &self.images
    }
}

impl Debug for ImageSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSnapshot")
            .field("change_number", &self.change_number)
            .field("length", &self.images.len())
            .finish()
    }
}

struct ChainNode {
    snapshot: Arc<ImageSnapshot>,
    next: Option<Box<ChainNode>>,
}

/// Singly linked history of snapshots, newest at the head, change numbers
/// strictly decreasing toward the tail.
///
/// Owned exclusively by the coordinator half; pollers only ever see the
/// published head through [`SharedImageSet`](crate::data_plane::image_set::SharedImageSet).
pub(crate) struct SnapshotChain {
    head: Option<Box<ChainNode>>,
    len: usize,
}

impl SnapshotChain {
    pub(crate) fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub(crate) fn push_front(&mut self, snapshot: Arc<ImageSnapshot>) {
        self.head = Some(Box::new(ChainNode {
            snapshot,
            next: self.head.take(),
        }));
        self.len += 1;
    }

    pub(crate) fn newest(&self) -> Option<&Arc<ImageSnapshot>> {
        self.head.as_ref().map(|node| &node.snapshot)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Unlinks and drops every node whose change number is strictly below
    /// `mark`, returning the number of nodes freed.
    ///
    /// Change numbers decrease along the chain, so the nodes to free are
    /// exactly the suffix after the first retained run.
    pub(crate) fn prune_below(&mut self, mark: i64) -> usize {
        let mut link = &mut self.head;
        while link
            .as_ref()
            .map_or(false, |node| node.snapshot.change_number() >= mark)
        {
            if let Some(node) = link {
                link = &mut node.next;
            }
        }

        let freed = drop_nodes(link.take());
        self.len -= freed;
        freed
    }
}

// Unlinks node by node so dropping a long chain cannot recurse.
fn drop_nodes(mut link: Option<Box<ChainNode>>) -> usize {
    let mut freed = 0;
    while let Some(mut node) = link {
        link = node.next.take();
        freed += 1;
    }
    freed
}

impl Drop for SnapshotChain {
    fn drop(&mut self) {
        drop_nodes(self.head.take());
    }
}
