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

//! # stream-subscription
//!
//! `stream-subscription` implements the subscriber-side image-set management
//! of a low-latency message transport: an application thread polls for new
//! messages across an always-consistent, lock-free set of active data
//! sources (images) while a background coordination thread adds and removes
//! sources as connections come and go.
//!
//! A subscription is split into two non-`Clone` halves at creation:
//!
//! - [`Subscription`] — the application handle. [`Subscription::poll`]
//!   acquire-loads the published snapshot and fans the fragment budget out
//!   across its images with round-robin fairness, then advances the
//!   low-water mark the coordinator's reclamation depends on.
//! - [`SubscriptionCoordinator`] — the single-writer handle. It publishes
//!   complete replacement image sets as immutable, version-stamped
//!   snapshots and prunes the chain of superseded snapshots once no poll
//!   can still be relying on them.
//!
//! Neither path takes a lock or blocks; each direction of the protocol is a
//! single release-store/acquire-load pair.
//!
//! ## Quick start
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
//!     Subscription::create("udp://239.255.0.1:40456", 1001, 1, Arc::new(NoopEvents));
//!
//! // Coordination thread: a source connected.
//! coordinator.publish_image_set(vec![Arc::new(StubImage(7)) as Arc<dyn Image>]);
//!
//! // Application thread: drain what is available, up to ten fragments.
//! let mut fragments = 0;
//! let consumed = subscription.poll(&mut |_fragment| fragments += 1, 10).unwrap();
//! assert_eq!(consumed, 1);
//! assert_eq!(fragments, 1);
//!
//! // Coordination thread, later: reclaim snapshots no poll can still see.
//! coordinator.prune_snapshots();
//! ```
//!
//! ## Threading contract
//!
//! Exactly one coordinator and one poller exist per subscription, enforced
//! by the handle split rather than by documentation: membership mutation
//! needs `&mut SubscriptionCoordinator`, polling needs `&mut Subscription`,
//! and neither handle is `Clone`. Distinct subscriptions are fully
//! independent. The [`spawn_coordinator_loop`] helper moves a coordinator
//! onto a dedicated thread fed by [`MembershipCommand`]s and fires the
//! [`ImageEventListener`] callbacks as membership diffs are applied.
//!
//! Images are owned by the surrounding transport layer, never by this
//! crate; an image must stay valid for as long as an unpruned snapshot
//! references it, which the `Arc` seam makes structural.
//!
//! ## Internal architecture map
//!
//! - API facade: outward `Subscription`/`SubscriptionCoordinator` surface
//! - Control plane: snapshot stamping, chain ownership, reclamation
//! - Data plane: published-head cell and round-robin fan-out (hot path)
//! - Runtime: coordinator thread boundary and availability callbacks
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs/events. Library code emits events on
//! control-plane and runtime paths (the poll hot path emits nothing) and
//! does not initialize a global subscriber. Binaries and tests are
//! responsible for one-time `tracing_subscriber` initialization at process
//! boundaries.

mod api;
pub use api::image::{FragmentHandler, Image, ImageEventListener, ImagePollError};
pub use api::subscription::{PollError, Subscription};

mod control_plane;
pub use control_plane::coordinator::SubscriptionCoordinator;

mod data_plane;

mod runtime;
pub use runtime::coordinator_runtime::{spawn_coordinator_loop, MembershipCommand};
