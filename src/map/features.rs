// File: src/map/features.rs
use crate::capability::{
    DensityPoint, EventBackend, FeatureId, FillStyle, IdentityProvider, LineStyle, MapLayer,
    MapSurface, MarkerStyle, PopupContent,
};
use crate::color::{self, DEFAULT_EVENT_COLOR, OUTLINE_COLOR, with_alpha};
use crate::map::actions::available_actions;
use crate::model::{EventId, EventRecord, Geometry, ParticipationCounters, ParticipationStatus, UserId};

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::collections::HashMap;

const TIME_FMT: &str = "%Y-%m-%d %H:%M";
const FILL_ALPHA: u8 = 0x59;

/// Turns backend event records into map features and keeps the three
/// derived views (discrete features, weighted density points, title
/// search index) consistent. Consistency is full reload: `refresh` after
/// any mutation re-fetches everything instead of patching incrementally.
pub struct EventFeatureRenderer {
    default_color: String,
    density_zoom_threshold: f64,
    events: Vec<EventRecord>,
    features: Vec<(FeatureId, EventId)>,
    /// The signed-in viewer's status per event, used to trim the offered
    /// popup actions.
    statuses: HashMap<EventId, ParticipationStatus>,
    title_index: Vec<(String, EventId)>,
    density_visible: Option<bool>,
}

impl EventFeatureRenderer {
    pub fn new(default_color: &str, density_zoom_threshold: f64) -> Self {
        Self {
            default_color: color::normalize_hex(default_color)
                .unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_string()),
            density_zoom_threshold,
            events: Vec::new(),
            features: Vec::new(),
            statuses: HashMap::new(),
            title_index: Vec::new(),
            density_visible: None,
        }
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn record(&self, id: EventId) -> Option<&EventRecord> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Maps a widget hit-test result back to its event.
    pub fn event_at(&self, feature: FeatureId) -> Option<EventId> {
        self.features
            .iter()
            .find(|(f, _)| *f == feature)
            .map(|(_, id)| *id)
    }

    pub fn status(&self, id: EventId) -> Option<ParticipationStatus> {
        self.statuses.get(&id).copied()
    }

    /// Fetches all records and rebuilds every view from scratch.
    pub async fn load_and_render(
        &mut self,
        surface: &mut dyn MapSurface,
        backend: &dyn EventBackend,
        identity: &dyn IdentityProvider,
    ) -> Result<(), String> {
        let records = backend.list().await?;
        debug!("loaded {} events", records.len());
        self.clear(surface);
        self.events = records;

        self.statuses.clear();
        if let Some(user) = identity.current_user_id() {
            // One lookup per event, at most four in flight.
            let ids: Vec<EventId> = self.events.iter().map(|e| e.id).collect();
            let lookups = ids
                .into_iter()
                .map(|id| async move { (id, backend.participation(id, user).await) });
            let mut results = stream::iter(lookups).buffer_unordered(4);
            while let Some((id, result)) = results.next().await {
                match result {
                    Ok(Some(status)) => {
                        self.statuses.insert(id, status);
                    }
                    Ok(None) => {}
                    Err(e) => warn!("participation lookup failed for event {}: {}", id, e),
                }
            }
        }

        let mut features = Vec::with_capacity(self.events.len());
        for event in &self.events {
            features.push((
                Self::render_record(surface, event, &self.default_color),
                event.id,
            ));
        }
        self.features = features;

        self.title_index = self
            .events
            .iter()
            .map(|e| (e.title.to_lowercase(), e.id))
            .collect();

        surface.set_density_points(&self.density_points());
        let zoom = surface.zoom();
        self.apply_zoom(surface, zoom);
        Ok(())
    }

    fn render_record(
        surface: &mut dyn MapSurface,
        event: &EventRecord,
        default_color: &str,
    ) -> FeatureId {
        let color = event
            .color
            .as_deref()
            .and_then(color::normalize_hex)
            .unwrap_or_else(|| default_color.to_string());
        match &event.geometry {
            Geometry::Point(p) => surface.add_marker(
                MapLayer::Events,
                *p,
                &MarkerStyle {
                    color,
                    outline: OUTLINE_COLOR.to_string(),
                },
            ),
            Geometry::Polygon(rings) => {
                let ring = rings.first().map(Vec::as_slice).unwrap_or(&[]);
                surface.add_fill(
                    MapLayer::Events,
                    ring,
                    &FillStyle {
                        fill: with_alpha(&color, FILL_ALPHA),
                        outline: color,
                    },
                )
            }
            Geometry::Polyline(path) => surface.add_line(
                MapLayer::Events,
                path,
                &LineStyle { color, width: 3.0 },
            ),
        }
    }

    /// The weighted point set backing the density view.
    pub fn density_points(&self) -> Vec<DensityPoint> {
        self.events
            .iter()
            .map(|e| DensityPoint {
                at: e.geometry.representative_point(),
                weight: e.counters.density_weight(),
            })
            .collect()
    }

    /// Switches between the density and discrete views around the zoom
    /// threshold. Re-applying the same zoom is a no-op.
    pub fn apply_zoom(&mut self, surface: &mut dyn MapSurface, zoom: f64) {
        let density = zoom < self.density_zoom_threshold;
        if self.density_visible == Some(density) {
            return;
        }
        self.density_visible = Some(density);
        surface.set_density_visible(density);
        surface.set_events_visible(!density);
    }

    /// Case-insensitive substring search over event titles.
    pub fn find_by_title(&self, query: &str) -> Option<&EventRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.title_index
            .iter()
            .find(|(title, _)| title.contains(&needle))
            .and_then(|(_, id)| self.record(*id))
    }

    /// Popup payload for one event, with the actions its viewer may
    /// trigger.
    pub fn popup_content(&self, id: EventId, viewer: Option<UserId>) -> Option<PopupContent> {
        let event = self.record(id)?;
        let body = format!(
            "{}\n{} - {}",
            event.description,
            event.start_time.format(TIME_FMT),
            event.end_time.format(TIME_FMT),
        );
        Some(PopupContent {
            event_id: id,
            title: event.title.clone(),
            body,
            actions: available_actions(event, viewer, self.status(id)),
        })
    }

    /// In-place patch after a confirmed participation update: counters,
    /// viewer status and density weights change; everything else waits
    /// for the next full reload.
    pub fn apply_participation(
        &mut self,
        surface: &mut dyn MapSurface,
        id: EventId,
        status: ParticipationStatus,
        counters: ParticipationCounters,
    ) {
        let Some(event) = self.events.iter_mut().find(|e| e.id == id) else {
            return;
        };
        event.counters = counters;
        self.statuses.insert(id, status);
        surface.set_density_points(&self.density_points());
    }

    /// Drops every rendered feature and derived view.
    pub fn clear(&mut self, surface: &mut dyn MapSurface) {
        surface.clear_layer(MapLayer::Events);
        surface.set_density_points(&[]);
        self.events.clear();
        self.features.clear();
        self.title_index.clear();
    }
}
