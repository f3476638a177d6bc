// File: src/map/routing.rs
use crate::capability::{
    FeatureId, Geolocator, LineStyle, MapLayer, MapSurface, Notifier, RoutingService, Severity,
};
use crate::color::{DEFAULT_EVENT_COLOR, OUTLINE_COLOR, ROUTE_COLOR};
use crate::error::MapError;
use crate::model::LonLat;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Start,
    End,
}

impl EndpointRole {
    fn default_label(&self) -> &'static str {
        match self {
            EndpointRole::Start => "Start point",
            EndpointRole::End => "Destination",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingEndpoint {
    pub role: EndpointRole,
    pub at: LonLat,
    pub label: String,
    pub marker: FeatureId,
}

fn stop_marker_style() -> crate::capability::MarkerStyle {
    crate::capability::MarkerStyle {
        color: DEFAULT_EVENT_COLOR.to_string(),
        outline: OUTLINE_COLOR.to_string(),
    }
}

fn route_style() -> LineStyle {
    LineStyle {
        color: ROUTE_COLOR.to_string(),
        width: 3.0,
    }
}

/// Start/end selection protocol plus route rendering state.
#[derive(Default)]
pub struct RoutingSession {
    active_field: Option<EndpointRole>,
    start: Option<RoutingEndpoint>,
    end: Option<RoutingEndpoint>,
    route_feature: Option<FeatureId>,
}

impl RoutingSession {
    pub fn active_field(&self) -> Option<EndpointRole> {
        self.active_field
    }

    pub fn start(&self) -> Option<&RoutingEndpoint> {
        self.start.as_ref()
    }

    pub fn end(&self) -> Option<&RoutingEndpoint> {
        self.end.as_ref()
    }

    pub fn has_route(&self) -> bool {
        self.route_feature.is_some()
    }

    /// Marks which endpoint the next map click fills.
    pub fn select_field(&mut self, role: EndpointRole) {
        self.active_field = Some(role);
    }

    /// Fills the active endpoint from a map click; a click with no field
    /// selected only produces a notice.
    pub fn handle_click(
        &mut self,
        surface: &mut dyn MapSurface,
        notifier: &dyn Notifier,
        at: LonLat,
    ) {
        let Some(role) = self.active_field else {
            notifier.notify(
                "Select the start or destination field first",
                Severity::Info,
            );
            return;
        };
        self.set_endpoint(surface, role, at, role.default_label().to_string());
    }

    /// Sets or replaces the endpoint for `role`, dropping any previous
    /// marker, then auto-advances the active field: Start -> End,
    /// End -> none.
    pub fn set_endpoint(
        &mut self,
        surface: &mut dyn MapSurface,
        role: EndpointRole,
        at: LonLat,
        label: String,
    ) {
        let marker = surface.add_marker(MapLayer::UserPoints, at, &stop_marker_style());
        let slot = match role {
            EndpointRole::Start => &mut self.start,
            EndpointRole::End => &mut self.end,
        };
        if let Some(previous) = slot.take() {
            surface.remove_feature(previous.marker);
        }
        *slot = Some(RoutingEndpoint {
            role,
            at,
            label,
            marker,
        });
        self.active_field = match role {
            EndpointRole::Start => Some(EndpointRole::End),
            EndpointRole::End => None,
        };
    }

    /// Fills `role` from the device position; unavailable or denied
    /// geolocation degrades to manual selection with a notice.
    pub async fn use_current_location(
        &mut self,
        surface: &mut dyn MapSurface,
        locator: &dyn Geolocator,
        notifier: &dyn Notifier,
        role: EndpointRole,
    ) {
        match locator.current_position().await {
            Ok(at) => self.set_endpoint(surface, role, at, "Current location".to_string()),
            Err(e) => {
                debug!("geolocation failed: {}", e);
                notifier.notify(
                    &format!("Location unavailable: {}", e),
                    Severity::Warning,
                );
                self.active_field = Some(role);
            }
        }
    }

    /// Removes the endpoint for `role` and re-opens its field.
    pub fn clear_endpoint(&mut self, surface: &mut dyn MapSurface, role: EndpointRole) {
        let slot = match role {
            EndpointRole::Start => &mut self.start,
            EndpointRole::End => &mut self.end,
        };
        if let Some(endpoint) = slot.take() {
            surface.remove_feature(endpoint.marker);
        }
        self.active_field = Some(role);
    }

    /// Solves start -> end and renders the path plus directions. A
    /// service failure is a notice; whatever route was already rendered
    /// stays untouched.
    pub async fn compute_route(
        &mut self,
        surface: &mut dyn MapSurface,
        router: &dyn RoutingService,
        notifier: &dyn Notifier,
    ) -> Result<(), MapError> {
        let (Some(start), Some(end)) = (&self.start, &self.end) else {
            return Err(MapError::MissingEndpoints);
        };
        match router.solve(vec![start.at, end.at]).await {
            Ok(route) => {
                if let Some(previous) = self.route_feature.take() {
                    surface.remove_feature(previous);
                }
                self.route_feature =
                    Some(surface.add_line(MapLayer::Routes, &route.path, &route_style()));
                surface.show_directions(&route.steps);
                Ok(())
            }
            Err(e) => {
                warn!("route solve failed: {}", e);
                notifier.notify(&format!("Error calculating route: {}", e), Severity::Error);
                Ok(())
            }
        }
    }

    /// Clears endpoints, the rendered route and the directions panel.
    pub fn reset(&mut self, surface: &mut dyn MapSurface) {
        for slot in [&mut self.start, &mut self.end] {
            if let Some(endpoint) = slot.take() {
                surface.remove_feature(endpoint.marker);
            }
        }
        if let Some(feature) = self.route_feature.take() {
            surface.remove_feature(feature);
        }
        surface.clear_directions();
        self.active_field = None;
    }
}
