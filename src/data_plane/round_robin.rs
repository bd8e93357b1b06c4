//! Round-robin fragment fan-out across one immutable snapshot.

use crate::api::image::FragmentHandler;
use crate::api::subscription::PollError;
use crate::control_plane::snapshot_chain::ImageSnapshot;

/// Polls every image in `snapshot` at most once, starting at `start_index`
/// and wrapping, handing each image the remaining fragment budget and
/// stopping early once the budget is exhausted.
///
/// A downstream image failure is propagated immediately; fragments already
/// consumed from images earlier in the same pass stay counted inside the
/// returned [`PollError`].
pub(crate) fn poll_round_robin(
    snapshot: &ImageSnapshot,
    start_index: usize,
    handler: &mut FragmentHandler<'_>,
    fragment_limit: usize,
) -> Result<usize, PollError> {
    let length = snapshot.len();
    let mut fragments_consumed = 0;

    for offset in 0..length {
        if fragments_consumed >= fragment_limit {
            break;
        }

        let index = (start_index + offset) % length;
        match snapshot
            .image_at(index)
            .poll(handler, fragment_limit - fragments_consumed)
        {
            Ok(consumed) => fragments_consumed += consumed,
            Err(cause) => return Err(PollError::new(fragments_consumed, cause)),
        }
    }

    Ok(fragments_consumed)
}

#[cfg(test)]
mod tests {
    use super::poll_round_robin;
    use crate::api::image::{FragmentHandler, Image, ImagePollError};
    use crate::control_plane::snapshot_chain::ImageSnapshot;
    use std::sync::{Arc, Mutex};

    struct StubImage {
        session_id: i32,
        fragments_per_poll: usize,
        polled_sessions: Arc<Mutex<Vec<i32>>>,
    }

    impl Image for StubImage {
        fn session_id(&self) -> i32 {
            self.session_id
        }

        fn poll(
            &self,
            handler: &mut FragmentHandler<'_>,
            fragment_limit: usize,
        ) -> Result<usize, ImagePollError> {
            self.polled_sessions
                .lock()
                .expect("lock polled_sessions")
                .push(self.session_id);

            let consumed = self.fragments_per_poll.min(fragment_limit);
            for _ in 0..consumed {
                handler(&[0u8; 8]);
            }
            Ok(consumed)
        }
    }

    struct FailingImage;

    impl Image for FailingImage {
        fn session_id(&self) -> i32 {
            -1
        }

        fn poll(
            &self,
            _handler: &mut FragmentHandler<'_>,
            _fragment_limit: usize,
        ) -> Result<usize, ImagePollError> {
            Err(ImagePollError::new(7, "receive buffer torn down"))
        }
    }

    fn snapshot_of(
        fragments_per_poll: &[usize],
        polled_sessions: &Arc<Mutex<Vec<i32>>>,
    ) -> ImageSnapshot {
        let images = fragments_per_poll
            .iter()
            .enumerate()
            .map(|(session_id, fragments_per_poll)| {
                Arc::new(StubImage {
                    session_id: session_id as i32,
                    fragments_per_poll: *fragments_per_poll,
                    polled_sessions: Arc::clone(polled_sessions),
                }) as Arc<dyn Image>
            })
            .collect();
        ImageSnapshot::new(0, images)
    }

    #[test]
    fn visits_images_in_wrapped_order_from_start_index() {
        let polled_sessions = Arc::new(Mutex::new(Vec::new()));
        let snapshot = snapshot_of(&[1, 1, 1], &polled_sessions);

        let consumed = poll_round_robin(&snapshot, 2, &mut |_fragment| {}, 16)
            .expect("poll succeeds");

        assert_eq!(consumed, 3);
        assert_eq!(
            *polled_sessions.lock().expect("lock polled_sessions"),
            vec![2, 0, 1]
        );
    }

    #[test]
    fn stops_once_the_fragment_budget_is_exhausted() {
        let polled_sessions = Arc::new(Mutex::new(Vec::new()));
        let snapshot = snapshot_of(&[2, 2, 2], &polled_sessions);

        let consumed = poll_round_robin(&snapshot, 0, &mut |_fragment| {}, 3)
            .expect("poll succeeds");

        assert_eq!(consumed, 3);
        // The third image never gets polled: the second one spent the budget.
        assert_eq!(
            *polled_sessions.lock().expect("lock polled_sessions"),
            vec![0, 1]
        );
    }

    #[test]
    fn hands_each_image_only_the_remaining_budget() {
        let polled_sessions = Arc::new(Mutex::new(Vec::new()));
        let mut delivered = 0;
        let snapshot = snapshot_of(&[4, 4], &polled_sessions);

        let consumed = poll_round_robin(&snapshot, 0, &mut |_fragment| delivered += 1, 5)
            .expect("poll succeeds");

        assert_eq!(consumed, 5);
        assert_eq!(delivered, 5);
    }

    #[test]
    fn zero_fragment_budget_polls_nothing() {
        let polled_sessions = Arc::new(Mutex::new(Vec::new()));
        let snapshot = snapshot_of(&[1, 1], &polled_sessions);

        let consumed = poll_round_robin(&snapshot, 0, &mut |_fragment| {}, 0)
            .expect("poll succeeds");

        assert_eq!(consumed, 0);
        assert!(polled_sessions
            .lock()
            .expect("lock polled_sessions")
            .is_empty());
    }

    #[test]
    fn downstream_failure_keeps_fragments_already_consumed_counted() {
        let polled_sessions = Arc::new(Mutex::new(Vec::new()));
        let images = vec![
            Arc::new(StubImage {
                session_id: 0,
                fragments_per_poll: 2,
                polled_sessions: Arc::clone(&polled_sessions),
            }) as Arc<dyn Image>,
            Arc::new(FailingImage) as Arc<dyn Image>,
        ];
        let snapshot = ImageSnapshot::new(0, images);

        let err = poll_round_robin(&snapshot, 0, &mut |_fragment| {}, 16)
            .expect_err("failing image propagates");

        assert_eq!(err.fragments_consumed(), 2);
        assert_eq!(err.cause().code(), 7);
    }
}
