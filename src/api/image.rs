//! Image polling seam and per-source identity primitives.

use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Per-fragment callback invoked by [`Image::poll`] with one delivered fragment.
pub type FragmentHandler<'a> = dyn FnMut(&[u8]) + 'a;

/// One active source of data contributing to a subscription.
///
/// Images are owned and torn down by the surrounding transport layer; this
/// subsystem only holds shared references to them for as long as an unpruned
/// snapshot still lists them. An image must remain pollable for at least that
/// long.
pub trait Image: Send + Sync {
    /// Identifies the source this image receives from.
    fn session_id(&self) -> i32;

    /// Polls for up to `fragment_limit` fragments, invoking `handler` once per
    /// fragment, and returns the number of fragments consumed.
    ///
    /// Returning `Ok(0)` means no data was available; it is not an error.
    fn poll(
        &self,
        handler: &mut FragmentHandler<'_>,
        fragment_limit: usize,
    ) -> Result<usize, ImagePollError>;
}

/// Notification seam invoked by the surrounding layer when membership changes
/// are detected. The core publish/poll protocol never invokes these itself.
pub trait ImageEventListener: Send + Sync {
    /// An image joined the subscription's active set.
    fn on_available_image(&self, image: &Arc<dyn Image>);

    /// An image left the subscription's active set.
    fn on_unavailable_image(&self, image: &Arc<dyn Image>);
}

/// Failure raised by an individual image poll, carried through unchanged by
/// the aggregate subscription poll.
#[derive(Debug)]
pub struct ImagePollError {
    code: i32,
    message: String,
}

impl ImagePollError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ImagePollError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "image poll failed ({}): {}", self.code, self.message)
    }
}

impl Error for ImagePollError {}

/// Wrapper giving `Arc<dyn Image>` pointer-identity equality and hashing, so
/// membership diffs compare the images themselves rather than their contents.
#[derive(Clone)]
pub(crate) struct ComparableImage {
    image: Arc<dyn Image>,
}

impl ComparableImage {
    pub(crate) fn new(image: Arc<dyn Image>) -> Self {
        Self { image }
    }

    pub(crate) fn image(&self) -> Arc<dyn Image> {
        Arc::clone(&self.image)
    }
}

impl Hash for ComparableImage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.image).hash(state);
    }
}

impl PartialEq for ComparableImage {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

impl Eq for ComparableImage {}

impl Debug for ComparableImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparableImage").finish_non_exhaustive()
    }
}
