// File: src/test_util.rs
//! In-crate mock collaborators for unit tests.

use crate::capability::{
    DensityPoint, FeatureId, FillStyle, IdentityProvider, LineStyle, MapLayer, MapSurface,
    MarkerStyle, Notifier, PopupContent, Severity,
};
use crate::map::InteractionMode;
use crate::model::{
    DirectionStep, EventId, EventRecord, EventStats, Geometry, LonLat, ParticipationCounters,
    UserId,
};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::HashMap;

pub fn sample_event(id: EventId, owner: UserId, title: &str, geometry: Geometry) -> EventRecord {
    let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    EventRecord {
        id,
        owner_id: owner,
        title: title.to_string(),
        description: "A community event".to_string(),
        start_time: day.and_hms_opt(18, 0, 0).unwrap(),
        end_time: day.and_hms_opt(21, 0, 0).unwrap(),
        color: None,
        geometry,
        counters: ParticipationCounters::default(),
        demographics: BTreeMap::new(),
    }
}

/// A [`MapSurface`] that records what was drawn.
pub struct RecordingSurface {
    next_id: FeatureId,
    features: HashMap<FeatureId, MapLayer>,
    pub feature_ids: Vec<FeatureId>,
    pub markers: usize,
    pub lines: usize,
    pub fills: usize,
    pub density: Vec<DensityPoint>,
    pub density_visible: Option<bool>,
    pub events_visible: Option<bool>,
    pub visibility_calls: usize,
    pub zoom_level: f64,
    pub centered: Vec<(LonLat, f64)>,
    pub popup: Option<PopupContent>,
    pub mode_surface: Option<InteractionMode>,
    pub directions: Option<Vec<DirectionStep>>,
    pub stats: Option<EventStats>,
    pub confirm_response: bool,
    pub confirms: Vec<String>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            next_id: 0,
            features: HashMap::new(),
            feature_ids: Vec::new(),
            markers: 0,
            lines: 0,
            fills: 0,
            density: Vec::new(),
            density_visible: None,
            events_visible: None,
            visibility_calls: 0,
            zoom_level: 12.0,
            centered: Vec::new(),
            popup: None,
            mode_surface: None,
            directions: None,
            stats: None,
            confirm_response: true,
            confirms: Vec::new(),
        }
    }
}

impl RecordingSurface {
    fn add(&mut self, layer: MapLayer) -> FeatureId {
        self.next_id += 1;
        self.features.insert(self.next_id, layer);
        self.feature_ids.push(self.next_id);
        self.next_id
    }

    pub fn live_features(&self, layer: MapLayer) -> usize {
        self.features.values().filter(|l| **l == layer).count()
    }
}

impl MapSurface for RecordingSurface {
    fn add_marker(&mut self, layer: MapLayer, _at: LonLat, _style: &MarkerStyle) -> FeatureId {
        self.markers += 1;
        self.add(layer)
    }
    fn add_line(&mut self, layer: MapLayer, _path: &[LonLat], _style: &LineStyle) -> FeatureId {
        self.lines += 1;
        self.add(layer)
    }
    fn add_fill(&mut self, layer: MapLayer, _ring: &[LonLat], _style: &FillStyle) -> FeatureId {
        self.fills += 1;
        self.add(layer)
    }
    fn remove_feature(&mut self, id: FeatureId) {
        self.features.remove(&id);
    }
    fn clear_layer(&mut self, layer: MapLayer) {
        self.features.retain(|_, l| *l != layer);
    }
    fn set_density_points(&mut self, points: &[DensityPoint]) {
        self.density = points.to_vec();
    }
    fn set_density_visible(&mut self, visible: bool) {
        self.density_visible = Some(visible);
        self.visibility_calls += 1;
    }
    fn set_events_visible(&mut self, visible: bool) {
        self.events_visible = Some(visible);
        self.visibility_calls += 1;
    }
    fn zoom(&self) -> f64 {
        self.zoom_level
    }
    fn go_to(&mut self, center: LonLat, zoom: f64) {
        self.centered.push((center, zoom));
    }
    fn open_popup(&mut self, _at: LonLat, content: &PopupContent) {
        self.popup = Some(content.clone());
    }
    fn update_popup(&mut self, content: &PopupContent) {
        self.popup = Some(content.clone());
    }
    fn close_popup(&mut self) {
        self.popup = None;
    }
    fn show_mode_surface(&mut self, mode: InteractionMode) {
        self.mode_surface = Some(mode);
    }
    fn show_directions(&mut self, steps: &[DirectionStep]) {
        self.directions = Some(steps.to_vec());
    }
    fn clear_directions(&mut self) {
        self.directions = None;
    }
    fn show_stats(&mut self, stats: &EventStats) {
        self.stats = Some(stats.clone());
    }
    fn confirm(&mut self, message: &str) -> bool {
        self.confirms.push(message.to_string());
        self.confirm_response
    }
}

#[derive(Default)]
pub struct CollectingNotifier {
    pub notices: RefCell<Vec<(String, Severity)>>,
}

impl CollectingNotifier {
    pub fn severities(&self) -> Vec<Severity> {
        self.notices.borrow().iter().map(|(_, s)| *s).collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.notices
            .borrow_mut()
            .push((message.to_string(), severity));
    }
}

pub struct StaticIdentity(pub Option<UserId>);

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<UserId> {
        self.0
    }
}
