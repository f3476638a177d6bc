// File: src/map/mod.rs
pub mod actions;
pub mod controller;
pub mod draft;
pub mod features;
pub mod routing;

pub use actions::PopupAction;
pub use controller::MapController;
pub use routing::EndpointRole;

/// The mutually exclusive interaction context deciding what a map click
/// means. Exactly one is active at any instant, for the lifetime of the
/// map view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    AuthoringEvent,
    Routing,
}
