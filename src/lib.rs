// File: src/lib.rs
//! Interaction core of the fair-finder map client.
//!
//! One [`map::MapController`] owns everything a map view mutates: the
//! active interaction mode, the event draft being authored, the routing
//! session and the loaded event collection. The third-party map widget,
//! the routing/geocoding engines, the event backend and the host's
//! identity/toast services are consumed through the traits in
//! [`capability`]; [`client::EventsClient`] is the bundled HTTP
//! implementation of the backend capability.

pub mod capability;
pub mod client;
pub mod color;
pub mod config;
pub mod error;
pub mod map;
pub mod model;

#[cfg(test)]
pub(crate) mod test_util;

pub use capability::Capabilities;
pub use client::EventsClient;
pub use config::Config;
pub use error::MapError;
pub use map::{EndpointRole, InteractionMode, MapController, PopupAction};
