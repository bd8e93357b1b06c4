//! Runtime helper owning the coordinator loop on a dedicated thread.

use crate::api::image::{ComparableImage, Image};
use crate::control_plane::coordinator::SubscriptionCoordinator;
use std::collections::HashSet;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;
use tracing::debug;

const COORDINATOR_LOOP_TAG: &str = "CoordinatorLoop:";
const COORDINATOR_LOOP_FN_RUN_TAG: &str = "run():";

/// Commands accepted by the coordinator loop.
pub enum MembershipCommand {
    /// Full replacement of the current image set; deltas are not supported.
    ReplaceImages(Vec<Arc<dyn Image>>),
    /// Reclaim superseded snapshots up to the low-water mark.
    PruneSnapshots,
    /// Stop the loop; the coordinator comes back through the join handle.
    Shutdown,
}

/// Spawns the dedicated coordination thread for one subscription.
///
/// The thread takes ownership of the [`SubscriptionCoordinator`], which keeps
/// every membership mutation on a single thread by construction. For each
/// replacement set it publishes the new snapshot, fires the availability
/// callbacks for the diff against the previous set, and prunes the chain.
/// Image identity for the diff is `Arc` pointer identity.
pub fn spawn_coordinator_loop(
    mut coordinator: SubscriptionCoordinator,
    commands: Receiver<MembershipCommand>,
) -> thread::JoinHandle<SubscriptionCoordinator> {
    thread::spawn(move || {
        while let Ok(command) = commands.recv() {
            match command {
                MembershipCommand::ReplaceImages(images) => {
                    replace_images(&mut coordinator, images);
                }
                MembershipCommand::PruneSnapshots => {
                    coordinator.prune_snapshots();
                }
                MembershipCommand::Shutdown => break,
            }
        }

        debug!(
            "{}:{} registration_id: {}, coordinator loop stopped",
            COORDINATOR_LOOP_TAG,
            COORDINATOR_LOOP_FN_RUN_TAG,
            coordinator.registration_id()
        );
        coordinator
    })
}

fn replace_images(coordinator: &mut SubscriptionCoordinator, images: Vec<Arc<dyn Image>>) {
    let previous: HashSet<ComparableImage> = coordinator
        .current_images()
        .iter()
        .cloned()
        .map(ComparableImage::new)
        .collect();
    let next: HashSet<ComparableImage> = images
        .iter()
        .cloned()
        .map(ComparableImage::new)
        .collect();

    let unavailable: Vec<Arc<dyn Image>> = previous
        .difference(&next)
        .map(ComparableImage::image)
        .collect();
    let available: Vec<Arc<dyn Image>> = next
        .difference(&previous)
        .map(ComparableImage::image)
        .collect();

    coordinator.publish_image_set(images);

    let image_events = Arc::clone(coordinator.image_events());
    for image in &unavailable {
        image_events.on_unavailable_image(image);
    }
    for image in &available {
        image_events.on_available_image(image);
    }

    coordinator.prune_snapshots();
}
