//! Cross-thread published image-set cell shared by the two subscription halves.

use crate::control_plane::snapshot_chain::{ImageSnapshot, SENTINEL_CHANGE_NUMBER};
use arc_swap::{ArcSwap, Guard};
use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

/// The only state shared between the coordinator half and the poller half.
///
/// Exactly one acquire/release pair exists per direction: the coordinator
/// release-publishes the head snapshot and acquire-loads the low-water mark;
/// the poller acquire-loads the head and release-stores the mark. Nothing
/// here blocks and nothing takes a lock.
pub(crate) struct SharedImageSet {
    head: ArcSwap<ImageSnapshot>,
    last_observed_change_number: CachePadded<AtomicI64>,
    closed: AtomicBool,
}

impl SharedImageSet {
    pub(crate) fn new(initial: Arc<ImageSnapshot>) -> Self {
        Self {
            head: ArcSwap::new(initial),
            last_observed_change_number: CachePadded::new(AtomicI64::new(SENTINEL_CHANGE_NUMBER)),
            closed: AtomicBool::new(false),
        }
    }

    /// Acquire-loads the currently published snapshot. The guard pins the
    /// snapshot for the duration of one poll pass.
    pub(crate) fn load_head(&self) -> Guard<Arc<ImageSnapshot>> {
        self.head.load()
    }

    /// Release-publishes a fully formed snapshot as the new head. Coordinator
    /// half only.
    pub(crate) fn publish_head(&self, snapshot: Arc<ImageSnapshot>) {
        self.head.store(snapshot);
    }

    /// Acquire-loads the low-water mark: the newest change number a poll has
    /// started relying on.
    pub(crate) fn last_observed_change_number(&self) -> i64 {
        self.last_observed_change_number.load(Ordering::Acquire)
    }

    /// Poller half only: advances the low-water mark if `change_number` is
    /// newer. The poller is the mark's sole writer, so the relaxed read below
    /// is exact and the mark can never move backwards.
    pub(crate) fn observe_change_number(&self, change_number: i64) {
        if change_number > self.last_observed_change_number.load(Ordering::Relaxed) {
            self.last_observed_change_number
                .store(change_number, Ordering::Release);
        }
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
