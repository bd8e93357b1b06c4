/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Control-plane layer.
//!
//! Owns everything only the coordination thread may touch: snapshot
//! construction and stamping, the chain of superseded snapshots, and the
//! reclamation walk bounded by the poller's low-water mark. Publication is a
//! release-store of the new head; nothing in this layer blocks a poller.
//!
//! ```
//! use std::sync::Arc;
//! use stream_subscription::{
//!     FragmentHandler, Image, ImageEventListener, ImagePollError, Subscription,
//! };
//!
//! # struct StubImage(i32);
//! #
//! # impl Image for StubImage {
//! #     fn session_id(&self) -> i32 {
//! #         self.0
//! #     }
//! #
//! #     fn poll(
//! #         &self,
//! #         handler: &mut FragmentHandler<'_>,
//! #         fragment_limit: usize,
//! #     ) -> Result<usize, ImagePollError> {
//! #         if fragment_limit == 0 {
//! #             return Ok(0);
//! #         }
//! #         handler(&[0u8; 8]);
//! #         Ok(1)
//! #     }
//! # }
//! #
//! # struct NoopEvents;
//! #
//! # impl ImageEventListener for NoopEvents {
//! #     fn on_available_image(&self, _image: &Arc<dyn Image>) {}
//! #     fn on_unavailable_image(&self, _image: &Arc<dyn Image>) {}
//! # }
//! #
//! let (mut subscription, mut coordinator) =
//!     Subscription::create("udp://239.255.0.1:40456", 1001, 7, Arc::new(NoopEvents));
//!
//! // Each publication replaces the whole membership and gets a newer stamp.
//! let first = coordinator.publish_image_set(vec![Arc::new(StubImage(1)) as Arc<dyn Image>]);
//! let second = coordinator.publish_image_set(vec![
//!     Arc::new(StubImage(1)) as Arc<dyn Image>,
//!     Arc::new(StubImage(2)) as Arc<dyn Image>,
//! ]);
//! assert!(second > first);
//!
//! // Once a poll has observed the newest snapshot, older ones are reclaimable.
//! subscription.poll(&mut |_fragment| {}, 8).unwrap();
//! assert_eq!(coordinator.prune_snapshots(), 2);
//! ```

pub(crate) mod coordinator;
pub(crate) mod snapshot_chain;
