//! Single-writer coordinator handle: snapshot publication and chain pruning.

use crate::api::image::{Image, ImageEventListener};
use crate::control_plane::snapshot_chain::{ImageSnapshot, SnapshotChain};
use crate::data_plane::image_set::SharedImageSet;
use std::sync::Arc;
use tracing::debug;

const SUBSCRIPTION_COORDINATOR_TAG: &str = "SubscriptionCoordinator:";
const SUBSCRIPTION_COORDINATOR_FN_PUBLISH_TAG: &str = "publish_image_set():";
const SUBSCRIPTION_COORDINATOR_FN_PRUNE_TAG: &str = "prune_snapshots():";

/// The coordinator half of a subscription: the sole writer of membership.
///
/// All mutation goes through `&mut self` on this non-`Clone` handle, so the
/// single-writer invariant of the snapshot chain is a compile-time property
/// rather than a documented precondition. The handle owns the chain of
/// superseded snapshots and the monotonic change-number counter.
pub struct SubscriptionCoordinator {
    registration_id: i64,
    shared: Arc<SharedImageSet>,
    chain: SnapshotChain,
    next_change_number: i64,
    image_events: Arc<dyn ImageEventListener>,
}

impl SubscriptionCoordinator {
    pub(crate) fn new(
        registration_id: i64,
        shared: Arc<SharedImageSet>,
        initial: Arc<ImageSnapshot>,
        image_events: Arc<dyn ImageEventListener>,
    ) -> Self {
        let mut chain = SnapshotChain::new();
        chain.push_front(initial);

        Self {
            registration_id,
            shared,
            chain,
            next_change_number: 0,
            image_events,
        }
    }

    /// Publishes `images` as the complete new membership of the subscription.
    ///
    /// Full-replace semantics: every publication carries the whole set, never
    /// a delta. The snapshot is stamped with the next change number, linked
    /// onto the chain, and release-published as the new head so a poller that
    /// acquires the pointer always sees a fully formed snapshot. Returns the
    /// assigned change number.
    pub fn publish_image_set(&mut self, images: Vec<Arc<dyn Image>>) -> i64 {
        let change_number = self.next_change_number;
        self.next_change_number += 1;

        let snapshot = Arc::new(ImageSnapshot::new(change_number, images));
        debug!(
            "{}:{} registration_id: {}, publishing {:?}",
            SUBSCRIPTION_COORDINATOR_TAG,
            SUBSCRIPTION_COORDINATOR_FN_PUBLISH_TAG,
            self.registration_id,
            snapshot
        );

        self.chain.push_front(Arc::clone(&snapshot));
        self.shared.publish_head(snapshot);

        change_number
    }

    /// Reclaims every superseded snapshot no poll can still be relying on.
    ///
    /// Acquire-loads the low-water mark and frees the chain suffix strictly
    /// below it. Optional for poll correctness; required only to bound
    /// memory, so it may run on any schedule. The newest snapshot is always
    /// retained because the mark can never exceed its change number. Returns
    /// the number of snapshots freed.
    pub fn prune_snapshots(&mut self) -> usize {
        let mark = self.shared.last_observed_change_number();
        let freed = self.chain.prune_below(mark);

        if freed > 0 {
            debug!(
                "{}:{} registration_id: {}, freed {} snapshots below change_number {}",
                SUBSCRIPTION_COORDINATOR_TAG,
                SUBSCRIPTION_COORDINATOR_FN_PRUNE_TAG,
                self.registration_id,
                freed,
                mark
            );
        }

        freed
    }

    /// Whether the application half has marked the subscription closed.
    pub fn subscription_closed(&self) -> bool {
        self.shared.is_closed()
    }

    pub fn registration_id(&self) -> i64 {
        self.registration_id
    }

    /// The most recently published membership, used by the runtime layer to
    /// diff against an incoming replacement set.
    pub(crate) fn current_images(&self) -> &[Arc<dyn Image>] {
        self.chain
            .newest()
            .map(|snapshot| snapshot.images())
            .unwrap_or(&[])
    }

    pub(crate) fn image_events(&self) -> &Arc<dyn ImageEventListener> {
        &self.image_events
    }

    pub(crate) fn chain_len(&self) -> usize {
        self.chain.len()
    }
}

#[cfg(test)]
mod tests {
    use super::SubscriptionCoordinator;
    use crate::api::image::{FragmentHandler, Image, ImageEventListener, ImagePollError};
    use crate::control_plane::snapshot_chain::ImageSnapshot;
    use crate::data_plane::image_set::SharedImageSet;
    use std::sync::Arc;

    struct NoopEvents;

    impl ImageEventListener for NoopEvents {
        fn on_available_image(&self, _image: &Arc<dyn Image>) {}

        fn on_unavailable_image(&self, _image: &Arc<dyn Image>) {}
    }

    struct StubImage {
        session_id: i32,
    }

    impl Image for StubImage {
        fn session_id(&self) -> i32 {
            self.session_id
        }

        fn poll(
            &self,
            _handler: &mut FragmentHandler<'_>,
            _fragment_limit: usize,
        ) -> Result<usize, ImagePollError> {
            Ok(0)
        }
    }

    fn coordinator() -> (SubscriptionCoordinator, Arc<SharedImageSet>) {
        let initial = Arc::new(ImageSnapshot::empty());
        let shared = Arc::new(SharedImageSet::new(Arc::clone(&initial)));
        let coordinator = SubscriptionCoordinator::new(
            1,
            Arc::clone(&shared),
            initial,
            Arc::new(NoopEvents),
        );
        (coordinator, shared)
    }

    fn image(session_id: i32) -> Arc<dyn Image> {
        Arc::new(StubImage { session_id })
    }

    #[test]
    fn publish_assigns_strictly_increasing_change_numbers() {
        let (mut coordinator, shared) = coordinator();

        let first = coordinator.publish_image_set(vec![image(1)]);
        let second = coordinator.publish_image_set(vec![image(1), image(2)]);
        let third = coordinator.publish_image_set(Vec::new());

        assert_eq!((first, second, third), (0, 1, 2));
        assert_eq!(shared.load_head().change_number(), 2);
        assert_eq!(shared.load_head().len(), 0);
    }

    #[test]
    fn prune_before_any_poll_retains_every_snapshot() {
        let (mut coordinator, _shared) = coordinator();

        coordinator.publish_image_set(vec![image(1)]);
        coordinator.publish_image_set(vec![image(2)]);

        // Initial empty snapshot plus two publications.
        assert_eq!(coordinator.chain_len(), 3);
        assert_eq!(coordinator.prune_snapshots(), 0);
        assert_eq!(coordinator.chain_len(), 3);
    }

    #[test]
    fn prune_frees_snapshots_strictly_below_the_observed_mark() {
        let (mut coordinator, shared) = coordinator();

        coordinator.publish_image_set(vec![image(1)]);
        coordinator.publish_image_set(vec![image(2)]);
        coordinator.publish_image_set(vec![image(3)]);

        // A poll has started relying on change number 1.
        shared.observe_change_number(1);

        assert_eq!(coordinator.prune_snapshots(), 2);
        assert_eq!(coordinator.chain_len(), 2);

        shared.observe_change_number(2);
        assert_eq!(coordinator.prune_snapshots(), 1);
        assert_eq!(coordinator.chain_len(), 1);
    }

    #[test]
    fn prune_never_frees_the_images_a_snapshot_references() {
        let (mut coordinator, shared) = coordinator();

        let retained = image(1);
        coordinator.publish_image_set(vec![Arc::clone(&retained)]);
        coordinator.publish_image_set(Vec::new());

        shared.observe_change_number(1);
        assert_eq!(coordinator.prune_snapshots(), 2);

        // The snapshot is gone but the image lives on with its outside owner.
        assert_eq!(Arc::strong_count(&retained), 1);
        assert_eq!(retained.session_id(), 1);
    }

    #[test]
    fn current_images_tracks_the_newest_publication() {
        let (mut coordinator, _shared) = coordinator();

        assert!(coordinator.current_images().is_empty());

        coordinator.publish_image_set(vec![image(4), image(5)]);
        let session_ids: Vec<i32> = coordinator
            .current_images()
            .iter()
            .map(|image| image.session_id())
            .collect();

        assert_eq!(session_ids, vec![4, 5]);
    }
}
