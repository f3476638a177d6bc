// File: src/capability.rs
//! Abstract capabilities the interaction core consumes.
//!
//! The map widget, routing/geocoding engines, event backend, identity and
//! toast services are all external collaborators. The controller only
//! ever talks to these traits; hosts wire in the real engines, tests wire
//! in mocks. Everything runs on one logical thread, so async methods
//! return [`LocalBoxFuture`]s and no `Send` bounds are imposed.

use crate::map::InteractionMode;
use crate::model::{
    DirectionStep, EventId, EventRecord, EventStats, LonLat, NewEvent, ParticipationCounters,
    ParticipationStatus, Route, UserId,
};
use futures::future::LocalBoxFuture;

/// Handle to a feature rendered on the map surface, assigned by the
/// surface implementation.
pub type FeatureId = u64;

/// The three graphics layers the core draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapLayer {
    /// Rendered event features.
    Events,
    /// User-placed points: draft vertices, routing stops, own location.
    UserPoints,
    /// Solved route paths.
    Routes,
}

pub const ALL_LAYERS: [MapLayer; 3] = [MapLayer::Events, MapLayer::UserPoints, MapLayer::Routes];

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub color: String,
    pub outline: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillStyle {
    /// Fill color, normally carrying an alpha channel.
    pub fill: String,
    pub outline: String,
}

/// One weighted anchor of the density (heat) view.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityPoint {
    pub at: LonLat,
    pub weight: f64,
}

/// An action button offered on a feature popup. The widget renders the
/// label and reports the id back when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupActionItem {
    pub id: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub event_id: EventId,
    pub title: String,
    pub body: String,
    pub actions: Vec<PopupActionItem>,
}

/// The rendering side of the third-party map widget.
pub trait MapSurface {
    fn add_marker(&mut self, layer: MapLayer, at: LonLat, style: &MarkerStyle) -> FeatureId;
    fn add_line(&mut self, layer: MapLayer, path: &[LonLat], style: &LineStyle) -> FeatureId;
    fn add_fill(&mut self, layer: MapLayer, ring: &[LonLat], style: &FillStyle) -> FeatureId;
    fn remove_feature(&mut self, id: FeatureId);
    fn clear_layer(&mut self, layer: MapLayer);

    /// Replaces the weighted point set backing the density view.
    fn set_density_points(&mut self, points: &[DensityPoint]);
    fn set_density_visible(&mut self, visible: bool);
    /// Shows or hides the discrete event features wholesale.
    fn set_events_visible(&mut self, visible: bool);

    fn zoom(&self) -> f64;
    fn go_to(&mut self, center: LonLat, zoom: f64);

    fn open_popup(&mut self, at: LonLat, content: &PopupContent);
    /// Rewrites the open popup in place (after a participation update).
    fn update_popup(&mut self, content: &PopupContent);
    fn close_popup(&mut self);

    /// Opens the panel belonging to `mode` and closes the others;
    /// `Idle` closes every mode surface.
    fn show_mode_surface(&mut self, mode: InteractionMode);
    fn show_directions(&mut self, steps: &[DirectionStep]);
    fn clear_directions(&mut self);
    fn show_stats(&mut self, stats: &EventStats);

    /// Blocking yes/no prompt for destructive actions.
    fn confirm(&mut self, message: &str) -> bool;
}

/// Point-to-point route solving (the hosted routing service).
pub trait RoutingService {
    fn solve(&self, stops: Vec<LonLat>) -> LocalBoxFuture<'_, Result<Route, String>>;
}

/// Free-text address lookup. `Ok(None)` is an empty result, not a
/// failure.
pub trait GeocodingService {
    fn resolve(&self, query: String) -> LocalBoxFuture<'_, Result<Option<LonLat>, String>>;
}

/// One-shot device geolocation; denial or absence is an `Err`.
pub trait Geolocator {
    fn current_position(&self) -> LocalBoxFuture<'_, Result<LonLat, String>>;
}

/// The community-events backend. [`crate::client::EventsClient`] is the
/// HTTP implementation.
pub trait EventBackend {
    fn list(&self) -> LocalBoxFuture<'_, Result<Vec<EventRecord>, String>>;
    fn create(&self, payload: NewEvent) -> LocalBoxFuture<'_, Result<EventId, String>>;
    fn delete(&self, id: EventId) -> LocalBoxFuture<'_, Result<(), String>>;
    fn participation(
        &self,
        event: EventId,
        user: UserId,
    ) -> LocalBoxFuture<'_, Result<Option<ParticipationStatus>, String>>;
    fn set_participation(
        &self,
        event: EventId,
        user: UserId,
        status: ParticipationStatus,
    ) -> LocalBoxFuture<'_, Result<ParticipationCounters, String>>;
}

/// Session identity, owned by the host's auth layer.
pub trait IdentityProvider {
    fn current_user_id(&self) -> Option<UserId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// Non-fatal user-visible notices (the host's toast service).
pub trait Notifier {
    fn notify(&self, message: &str, severity: Severity);
}

/// Everything the controller needs from the outside world, bundled so
/// construction sites stay readable.
pub struct Capabilities {
    pub surface: Box<dyn MapSurface>,
    pub backend: Box<dyn EventBackend>,
    pub router: Box<dyn RoutingService>,
    pub geocoder: Box<dyn GeocodingService>,
    pub locator: Box<dyn Geolocator>,
    pub identity: Box<dyn IdentityProvider>,
    pub notifier: Box<dyn Notifier>,
}
