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

//! API facade layer.
//!
//! This layer keeps outward usage subscription-centric while delegating the
//! snapshot chain and the fan-out internals to domain-focused modules. The
//! two handles it exposes split the protocol's roles: [`Subscription`] for
//! the single poller, [`SubscriptionCoordinator`] for the single writer.
//!
//! ```ignore
//! use std::sync::Arc;
//! use stream_subscription::{ImageEventListener, Subscription};
//!
//! # let image_events: Arc<dyn ImageEventListener> = todo!("inject implementation");
//! let (subscription, coordinator) =
//!     Subscription::create("udp://239.255.0.1:40456", 1001, 1, image_events);
//! ```
//!
//! [`Subscription`]: crate::Subscription
//! [`SubscriptionCoordinator`]: crate::SubscriptionCoordinator

pub mod image;
pub mod subscription;
