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

//! Runtime integration layer.
//!
//! Isolates threading behavior so the rest of the crate stays free of thread
//! management. Moving the [`SubscriptionCoordinator`] onto one dedicated
//! thread here is what turns the "membership changes come from a single
//! coordination thread" rule into a structural property of the program. This
//! layer is also the place that fires the image availability callbacks.
//!
//! ```
//! use std::sync::{mpsc, Arc};
//! use stream_subscription::{
//!     spawn_coordinator_loop, FragmentHandler, Image, ImageEventListener, ImagePollError,
//!     MembershipCommand, Subscription,
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
//! let (subscription, coordinator) =
//!     Subscription::create("udp://239.255.0.1:40456", 1001, 7, Arc::new(NoopEvents));
//!
//! let (sender, receiver) = mpsc::channel();
//! let handle = spawn_coordinator_loop(coordinator, receiver);
//!
//! sender
//!     .send(MembershipCommand::ReplaceImages(vec![
//!         Arc::new(StubImage(1)) as Arc<dyn Image>,
//!     ]))
//!     .unwrap();
//! sender.send(MembershipCommand::Shutdown).unwrap();
//!
//! let _coordinator = handle.join().unwrap();
//! assert_eq!(subscription.image_count(), 1);
//! ```
//!
//! [`SubscriptionCoordinator`]: crate::SubscriptionCoordinator

pub(crate) mod coordinator_runtime;
