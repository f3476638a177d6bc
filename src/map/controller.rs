// File: src/map/controller.rs
use crate::capability::{ALL_LAYERS, Capabilities, FeatureId, MapLayer, MarkerStyle, Severity};
use crate::color::{OUTLINE_COLOR, USER_LOCATION_COLOR};
use crate::config::Config;
use crate::error::MapError;
use crate::map::InteractionMode;
use crate::map::actions::{PopupAction, event_stats};
use crate::map::draft::GeometryCapture;
use crate::map::features::EventFeatureRenderer;
use crate::map::routing::{EndpointRole, RoutingSession};
use crate::model::{DraftEvent, EventId, LonLat, NewEvent, ParticipationStatus};
use log::{debug, warn};
use std::time::Duration;
use uuid::Uuid;

const LOCATE_ZOOM: f64 = 14.0;

/// Single owner of all interaction state for one map view: the active
/// mode, the event draft, the routing session and the rendered event
/// collection. Raw widget input (clicks, zoom changes, popup actions)
/// comes in through the `on_*` methods; everything else is driven by the
/// host UI's buttons and forms.
pub struct MapController {
    caps: Capabilities,
    config: Config,
    mode: InteractionMode,
    capture: GeometryCapture,
    routing: RoutingSession,
    renderer: EventFeatureRenderer,
    selected: Option<EventId>,
    user_marker: Option<FeatureId>,
}

impl MapController {
    pub fn new(caps: Capabilities, config: Config) -> Self {
        let renderer =
            EventFeatureRenderer::new(&config.default_event_color, config.density_zoom_threshold);
        Self {
            caps,
            config,
            mode: InteractionMode::Idle,
            capture: GeometryCapture::default(),
            routing: RoutingSession::default(),
            renderer,
            selected: None,
            user_marker: None,
        }
    }

    // --- LIFECYCLE ---

    /// View-load sequence: render the event collection, then center on
    /// the device and drop the own-location dot. Geolocation failure
    /// silently keeps the configured initial view.
    pub async fn start(&mut self) {
        self.reload().await;
        match self.caps.locator.current_position().await {
            Ok(at) => {
                self.caps.surface.go_to(at, LOCATE_ZOOM);
                let marker = self.caps.surface.add_marker(
                    MapLayer::UserPoints,
                    at,
                    &MarkerStyle {
                        color: USER_LOCATION_COLOR.to_string(),
                        outline: OUTLINE_COLOR.to_string(),
                    },
                );
                self.user_marker = Some(marker);
            }
            Err(e) => debug!("geolocation unavailable on load: {}", e),
        }
    }

    /// View teardown: every feature, marker and panel goes away and the
    /// controller returns to Idle.
    pub fn shutdown(&mut self) {
        self.switch_mode(InteractionMode::Idle);
        self.renderer.clear(self.caps.surface.as_mut());
        if let Some(marker) = self.user_marker.take() {
            self.caps.surface.remove_feature(marker);
        }
        for layer in ALL_LAYERS {
            self.caps.surface.clear_layer(layer);
        }
        self.caps.surface.close_popup();
        self.caps.surface.clear_directions();
        self.selected = None;
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn logged_in(&self) -> bool {
        self.caps.identity.current_user_id().is_some()
    }

    pub fn selected(&self) -> Option<EventId> {
        self.selected
    }

    async fn reload(&mut self) {
        if let Err(e) = self
            .renderer
            .load_and_render(
                self.caps.surface.as_mut(),
                self.caps.backend.as_ref(),
                self.caps.identity.as_ref(),
            )
            .await
        {
            warn!("event load failed: {}", e);
            self.caps
                .notifier
                .notify(&format!("Could not load events: {}", e), Severity::Error);
        }
    }

    /// Full re-fetch; the consistency mechanism after any mutation.
    pub async fn refresh(&mut self) {
        self.reload().await;
    }

    // --- MODE MACHINE ---

    pub async fn set_mode(&mut self, mode: InteractionMode) {
        if self.mode == mode {
            return;
        }
        self.switch_mode(mode);
        if mode == InteractionMode::Routing {
            self.fill_start_from_device().await;
        }
    }

    /// Synchronous part of a mode change: tear down the old mode's
    /// transient state even if its surface is still open, swap surfaces,
    /// prime the new mode.
    fn switch_mode(&mut self, mode: InteractionMode) {
        if self.mode == mode {
            return;
        }
        debug!("mode {:?} -> {:?}", self.mode, mode);
        match self.mode {
            InteractionMode::AuthoringEvent => self.capture.discard(self.caps.surface.as_mut()),
            InteractionMode::Routing => self.routing.reset(self.caps.surface.as_mut()),
            InteractionMode::Idle => {}
        }
        self.mode = mode;
        self.caps.surface.show_mode_surface(mode);
        if mode == InteractionMode::AuthoringEvent {
            self.capture.begin(&self.config.default_event_color);
        }
    }

    async fn fill_start_from_device(&mut self) {
        self.routing
            .use_current_location(
                self.caps.surface.as_mut(),
                self.caps.locator.as_ref(),
                self.caps.notifier.as_ref(),
                EndpointRole::Start,
            )
            .await;
    }

    /// The user dismissed the active mode's surface.
    pub fn on_mode_surface_closed(&mut self) {
        self.switch_mode(InteractionMode::Idle);
    }

    // --- MAP INPUT ---

    pub fn on_map_click(&mut self, at: LonLat) {
        match self.mode {
            InteractionMode::AuthoringEvent => {
                self.capture.capture_click(self.caps.surface.as_mut(), at);
            }
            InteractionMode::Routing => self.routing.handle_click(
                self.caps.surface.as_mut(),
                self.caps.notifier.as_ref(),
                at,
            ),
            InteractionMode::Idle => {}
        }
    }

    pub fn on_zoom_changed(&mut self, zoom: f64) {
        self.renderer.apply_zoom(self.caps.surface.as_mut(), zoom);
    }

    /// A rendered event feature was clicked: select it and open its
    /// popup with the viewer-appropriate actions.
    pub fn on_feature_click(&mut self, feature: FeatureId) {
        let Some(id) = self.renderer.event_at(feature) else {
            return;
        };
        self.selected = Some(id);
        let viewer = self.caps.identity.current_user_id();
        if let Some(content) = self.renderer.popup_content(id, viewer) {
            let at = self
                .renderer
                .record(id)
                .map(|e| e.geometry.representative_point())
                .unwrap_or(LonLat::new(0.0, 0.0));
            self.caps.surface.open_popup(at, &content);
        }
    }

    pub fn on_popup_closed(&mut self) {
        self.selected = None;
    }

    // --- POPUP ACTION DISPATCH ---

    /// Boundary entry for widget-emitted action identifiers. Unknown
    /// identifiers are dropped here, once, instead of no-opping deeper
    /// in.
    pub async fn on_popup_action(&mut self, action_id: &str) {
        let Some(selected) = self.selected else {
            return;
        };
        match PopupAction::parse(action_id, selected) {
            Some(action) => self.dispatch(action).await,
            None => debug!("ignoring unknown popup action {:?}", action_id),
        }
    }

    pub async fn dispatch(&mut self, action: PopupAction) {
        match action {
            PopupAction::NavigateTo(id) => self.navigate_to_event(id).await,
            PopupAction::Delete(id) => self.delete_event(id).await,
            PopupAction::ViewStats(id) => self.view_stats(id),
            PopupAction::SetParticipation(id, status) => self.set_participation(id, status).await,
        }
    }

    /// Routing entry from a popup: the destination is set immediately,
    /// the start field is filled from the device only after a short
    /// delay so the routing surface can settle.
    async fn navigate_to_event(&mut self, id: EventId) {
        let Some((target, label)) = self
            .renderer
            .record(id)
            .map(|e| (e.geometry.representative_point(), e.title.clone()))
        else {
            return;
        };
        self.caps.surface.close_popup();
        self.selected = None;
        self.switch_mode(InteractionMode::Routing);
        self.routing
            .set_endpoint(self.caps.surface.as_mut(), EndpointRole::End, target, label);
        tokio::time::sleep(Duration::from_millis(self.config.nav_start_delay_ms)).await;
        self.fill_start_from_device().await;
    }

    async fn delete_event(&mut self, id: EventId) {
        let Some((owner, title)) = self
            .renderer
            .record(id)
            .map(|e| (e.owner_id, e.title.clone()))
        else {
            return;
        };
        if self.caps.identity.current_user_id() != Some(owner) {
            self.caps
                .notifier
                .notify("Only the event owner can delete it", Severity::Warning);
            return;
        }
        if !self.caps.surface.confirm(&format!("Delete \"{}\"?", title)) {
            return;
        }
        match self.caps.backend.delete(id).await {
            Ok(()) => {
                self.caps.surface.close_popup();
                self.selected = None;
                self.caps.notifier.notify("Event deleted", Severity::Success);
                self.reload().await;
            }
            Err(e) => self
                .caps
                .notifier
                .notify(&format!("Could not delete event: {}", e), Severity::Error),
        }
    }

    fn view_stats(&mut self, id: EventId) {
        let Some(stats) = self.renderer.record(id).map(event_stats) else {
            return;
        };
        self.caps.surface.show_stats(&stats);
    }

    async fn set_participation(&mut self, id: EventId, status: ParticipationStatus) {
        let Some(user) = self.caps.identity.current_user_id() else {
            self.caps
                .notifier
                .notify("Sign in to respond to events", Severity::Warning);
            return;
        };
        match self.caps.backend.set_participation(id, user, status).await {
            Ok(counters) => {
                self.renderer
                    .apply_participation(self.caps.surface.as_mut(), id, status, counters);
                if self.selected == Some(id)
                    && let Some(content) = self.renderer.popup_content(id, Some(user))
                {
                    self.caps.surface.update_popup(&content);
                }
            }
            Err(e) => {
                // No local patch: counters and the open popup keep their
                // pre-failure content.
                self.caps.notifier.notify(
                    &format!("Could not update your response: {}", e),
                    Severity::Error,
                );
            }
        }
    }

    // --- AUTHORING ---

    pub fn draft(&self) -> Option<&DraftEvent> {
        (self.mode == InteractionMode::AuthoringEvent).then(|| &self.capture.draft)
    }

    pub fn draft_mut(&mut self) -> Option<&mut DraftEvent> {
        (self.mode == InteractionMode::AuthoringEvent).then(|| &mut self.capture.draft)
    }

    pub fn captured_points(&self) -> Vec<(Uuid, LonLat)> {
        self.capture.points().iter().map(|p| (p.id, p.at)).collect()
    }

    pub fn remove_draft_point(&mut self, id: Uuid) {
        self.capture.remove_point(self.caps.surface.as_mut(), id);
    }

    /// Builds the captured geometry and posts the draft. An empty
    /// capture is rejected locally and nothing is sent; a backend
    /// failure keeps the draft intact for a manual retry.
    pub async fn save_draft(&mut self) -> Result<(), MapError> {
        if self.mode != InteractionMode::AuthoringEvent {
            return Ok(());
        }
        let Some(owner) = self.caps.identity.current_user_id() else {
            self.caps
                .notifier
                .notify("Sign in to create events", Severity::Warning);
            return Ok(());
        };
        let geometry = match self.capture.build_geometry() {
            Ok(g) => g,
            Err(e) => {
                self.caps.notifier.notify(
                    "Click the map to place your event first",
                    Severity::Warning,
                );
                return Err(e);
            }
        };
        let draft = &self.capture.draft;
        let payload = NewEvent {
            owner_id: owner,
            title: draft.title.clone(),
            description: draft.description.clone(),
            start_time: draft.start_time.clone(),
            end_time: draft.end_time.clone(),
            geometry,
            color: draft.color.clone(),
        };
        match self.caps.backend.create(payload).await {
            Ok(id) => {
                debug!("created event {}", id);
                self.caps
                    .notifier
                    .notify("Event created", Severity::Success);
                self.switch_mode(InteractionMode::Idle);
                self.reload().await;
                Ok(())
            }
            Err(e) => {
                self.caps
                    .notifier
                    .notify(&format!("Could not save event: {}", e), Severity::Error);
                Ok(())
            }
        }
    }

    // --- ROUTING ---

    pub fn routing_session(&self) -> &RoutingSession {
        &self.routing
    }

    pub fn select_routing_field(&mut self, role: EndpointRole) {
        if self.mode == InteractionMode::Routing {
            self.routing.select_field(role);
        }
    }

    pub async fn use_current_location(&mut self, role: EndpointRole) {
        if self.mode != InteractionMode::Routing {
            return;
        }
        self.routing
            .use_current_location(
                self.caps.surface.as_mut(),
                self.caps.locator.as_ref(),
                self.caps.notifier.as_ref(),
                role,
            )
            .await;
    }

    pub fn clear_routing_endpoint(&mut self, role: EndpointRole) {
        if self.mode == InteractionMode::Routing {
            self.routing.clear_endpoint(self.caps.surface.as_mut(), role);
        }
    }

    pub async fn compute_route(&mut self) -> Result<(), MapError> {
        let result = self
            .routing
            .compute_route(
                self.caps.surface.as_mut(),
                self.caps.router.as_ref(),
                self.caps.notifier.as_ref(),
            )
            .await;
        if result == Err(MapError::MissingEndpoints) {
            self.caps
                .notifier
                .notify("Set both start and destination first", Severity::Warning);
        }
        result
    }

    // --- SEARCH ---

    /// Looks the query up in the loaded event titles first, then falls
    /// back to the geocoder.
    pub async fn search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        if let Some(target) = self
            .renderer
            .find_by_title(query)
            .map(|e| e.geometry.representative_point())
        {
            self.caps.surface.go_to(target, LOCATE_ZOOM);
            return;
        }
        match self.caps.geocoder.resolve(query.to_string()).await {
            Ok(Some(at)) => self.caps.surface.go_to(at, LOCATE_ZOOM),
            Ok(None) => self.caps.notifier.notify(
                &format!("No places found for \"{}\"", query),
                Severity::Info,
            ),
            Err(e) => self
                .caps
                .notifier
                .notify(&format!("Search failed: {}", e), Severity::Error),
        }
    }
}
