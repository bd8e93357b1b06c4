//! Application-facing subscription handle and the lock-free poll protocol.

use crate::api::image::{FragmentHandler, Image, ImageEventListener, ImagePollError};
use crate::control_plane::coordinator::SubscriptionCoordinator;
use crate::control_plane::snapshot_chain::ImageSnapshot;
use crate::data_plane::image_set::SharedImageSet;
use crate::data_plane::round_robin::poll_round_robin;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::debug;

const SUBSCRIPTION_TAG: &str = "Subscription:";
const SUBSCRIPTION_FN_CREATE_TAG: &str = "create():";
const SUBSCRIPTION_FN_CLOSE_TAG: &str = "close():";

/// Failure of an aggregate [`Subscription::poll`].
///
/// Carries the fragments already consumed from other images in the same call;
/// a downstream failure never erases work that was already delivered to the
/// handler.
#[derive(Debug)]
pub struct PollError {
    fragments_consumed: usize,
    cause: ImagePollError,
}

impl PollError {
    pub(crate) fn new(fragments_consumed: usize, cause: ImagePollError) -> Self {
        Self {
            fragments_consumed,
            cause,
        }
    }

    /// Fragments consumed before the failing image was reached.
    pub fn fragments_consumed(&self) -> usize {
        self.fragments_consumed
    }

    pub fn cause(&self) -> &ImagePollError {
        &self.cause
    }
}

impl Display for PollError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "subscription poll failed after {} fragments: {}",
            self.fragments_consumed, self.cause
        )
    }
}

impl Error for PollError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}

/// The application half of a subscription: polls the currently published
/// image set with round-robin fairness and no locks.
///
/// A `Subscription` is deliberately not `Clone`: the poll protocol supports
/// exactly one concurrent poller, and `poll(&mut self)` makes a second one
/// unrepresentable. The matching [`SubscriptionCoordinator`] is the only
/// handle that can change membership.
pub struct Subscription {
    channel: String,
    stream_id: i32,
    registration_id: i64,
    round_robin_index: usize,
    shared: Arc<SharedImageSet>,
}

impl Subscription {
    /// Creates the two halves of a subscription: the application handle and
    /// the single-writer coordinator handle.
    ///
    /// The published head starts as an empty snapshot, so polling is valid
    /// immediately and simply consumes nothing until the coordinator
    /// publishes a first image set.
    pub fn create(
        channel: impl Into<String>,
        stream_id: i32,
        registration_id: i64,
        image_events: Arc<dyn ImageEventListener>,
    ) -> (Subscription, SubscriptionCoordinator) {
        let channel = channel.into();
        debug!(
            "{}:{} channel: {:?}, stream_id: {}, registration_id: {}",
            SUBSCRIPTION_TAG, SUBSCRIPTION_FN_CREATE_TAG, channel, stream_id, registration_id
        );

        let initial = Arc::new(ImageSnapshot::empty());
        let shared = Arc::new(SharedImageSet::new(Arc::clone(&initial)));
        let coordinator =
            SubscriptionCoordinator::new(registration_id, Arc::clone(&shared), initial, image_events);

        (
            Self {
                channel,
                stream_id,
                registration_id,
                round_robin_index: 0,
                shared,
            },
            coordinator,
        )
    }

    /// Polls the current image set for up to `fragment_limit` fragments,
    /// invoking `handler` once per fragment, and returns the total consumed.
    ///
    /// Non-blocking: returns immediately with whatever was available, and
    /// `Ok(0)` is the ordinary "no data" result. Successive polls start at
    /// rotating images so a tight fragment budget cannot starve any source.
    /// A failure from one image is propagated as [`PollError`] with the
    /// fragments already consumed in the same call still counted.
    pub fn poll(
        &mut self,
        handler: &mut FragmentHandler<'_>,
        fragment_limit: usize,
    ) -> Result<usize, PollError> {
        if self.shared.is_closed() {
            return Ok(0);
        }

        let head = self.shared.load_head();
        let snapshot: &ImageSnapshot = &head;
        let length = snapshot.len();
        if length == 0 {
            return Ok(0);
        }

        // Membership may have shrunk since the last poll.
        if self.round_robin_index >= length {
            self.round_robin_index = 0;
        }
        let start_index = self.round_robin_index;

        let fragments_consumed =
            poll_round_robin(snapshot, start_index, handler, fragment_limit)?;

        self.round_robin_index = (start_index + 1) % length;
        self.shared.observe_change_number(snapshot.change_number());

        Ok(fragments_consumed)
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn stream_id(&self) -> i32 {
        self.stream_id
    }

    pub fn registration_id(&self) -> i64 {
        self.registration_id
    }

    /// Number of images in the currently published set.
    pub fn image_count(&self) -> usize {
        self.shared.load_head().len()
    }

    /// Whether any image currently contributes to this subscription.
    pub fn is_connected(&self) -> bool {
        !self.shared.load_head().is_empty()
    }

    /// Visits every image in the currently published set.
    pub fn for_each_image(&self, f: &mut dyn FnMut(&Arc<dyn Image>)) {
        let head = self.shared.load_head();
        for image in head.images() {
            f(image);
        }
    }

    /// Marks the subscription closed. Subsequent polls return `Ok(0)`; the
    /// coordinator observes the flag through
    /// [`SubscriptionCoordinator::subscription_closed`] and may unwind.
    pub fn close(&self) {
        debug!(
            "{}:{} registration_id: {}",
            SUBSCRIPTION_TAG, SUBSCRIPTION_FN_CLOSE_TAG, self.registration_id
        );
        self.shared.close();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}
