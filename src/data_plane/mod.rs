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

//! Data-plane layer.
//!
//! The poll hot path: the lock-free cell holding the published head snapshot
//! and low-water mark, and the round-robin fan-out across one snapshot. This
//! layer takes no locks, performs no allocation, and emits no log events.
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
//! coordinator.publish_image_set(vec![
//!     Arc::new(StubImage(1)) as Arc<dyn Image>,
//!     Arc::new(StubImage(2)) as Arc<dyn Image>,
//! ]);
//!
//! // A unit fragment budget serves one image per poll, rotating fairly.
//! assert_eq!(subscription.poll(&mut |_fragment| {}, 1).unwrap(), 1);
//! assert_eq!(subscription.poll(&mut |_fragment| {}, 1).unwrap(), 1);
//!
//! // A budget covering both images drains each one once.
//! assert_eq!(subscription.poll(&mut |_fragment| {}, 4).unwrap(), 2);
//! ```

pub(crate) mod image_set;
pub(crate) mod round_robin;
