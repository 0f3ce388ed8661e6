// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Outgoing notifications
//!
//! The registry only ever publishes; it never subscribes. Three kinds of
//! notification leave it:
//! - `Loading` before defaults and stored bindings are loaded
//! - `Loaded` afterwards, carrying a [`LoadReport`]
//! - `Activated` when a monitored window sees a bound gesture
//!
//! # Example
//! ```
//! use gesture_binding_manager::events::{BindingNotification, ChannelPublisher, EventPublisher};
//!
//! let (publisher, rx) = ChannelPublisher::new();
//! publisher.publish(BindingNotification::Loading);
//! assert_eq!(rx.try_recv().unwrap(), BindingNotification::Loading);
//! ```

pub mod report;

pub use report::{LoadIssue, LoadReport};

use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::{debug, info};

use crate::core::types::{BindableEvent, Gesture};
use crate::input::WindowId;

/// A bound gesture was pressed in a monitored window
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Activation {
    pub event: BindableEvent,
    pub gesture: Gesture,
    /// Window the key press was delivered to
    pub window: WindowId,
}

/// Notification published by the registry
#[derive(Clone, Debug, PartialEq)]
pub enum BindingNotification {
    Loading,
    Loaded(LoadReport),
    Activated(Activation),
}

/// Publish-only sink for registry notifications
///
/// `publish` is called with no registry lock held, so implementations may
/// query the registry from inside it.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, notification: BindingNotification);
}

/// Forwards notifications into an `mpsc` channel
pub struct ChannelPublisher {
    sender: Sender<BindingNotification>,
}

impl ChannelPublisher {
    /// Creates a publisher and the receiving end of its channel
    pub fn new() -> (Self, Receiver<BindingNotification>) {
        let (sender, rx) = channel();
        (Self { sender }, rx)
    }
}

impl EventPublisher for ChannelPublisher {
    fn publish(&self, notification: BindingNotification) {
        // A dropped receiver just means nobody is listening any more
        let _ = self.sender.send(notification);
    }
}

/// Writes notifications to the `tracing` log
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingPublisher;

impl EventPublisher for TracingPublisher {
    fn publish(&self, notification: BindingNotification) {
        match notification {
            BindingNotification::Loading => debug!("loading gesture bindings"),
            BindingNotification::Loaded(report) => {
                info!(%report, "gesture bindings loaded");
                for line in report.lines() {
                    debug!("{}", line);
                }
            }
            BindingNotification::Activated(activation) => info!(
                event = %activation.event,
                gesture = %activation.gesture,
                window = %activation.window,
                "binding activated"
            ),
        }
    }
}
