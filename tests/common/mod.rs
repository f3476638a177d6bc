// File: tests/common/mod.rs
//! Mock collaborators shared by the controller scenarios.

use chrono::NaiveDate;
use fairmap::capability::{
    Capabilities, DensityPoint, EventBackend, FeatureId, FillStyle, GeocodingService, Geolocator,
    IdentityProvider, LineStyle, MapLayer, MapSurface, MarkerStyle, Notifier, PopupContent,
    RoutingService, Severity,
};
use fairmap::model::{
    DirectionStep, EventId, EventRecord, EventStats, Geometry, LonLat, NewEvent,
    ParticipationCounters, ParticipationStatus, Route, UserId,
};
use fairmap::{Config, InteractionMode, MapController};
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

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

// --- MAP SURFACE ---

pub struct SurfaceState {
    next_id: FeatureId,
    features: HashMap<FeatureId, MapLayer>,
    pub feature_ids: Vec<FeatureId>,
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

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            next_id: 0,
            features: HashMap::new(),
            feature_ids: Vec::new(),
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

impl SurfaceState {
    fn add(&mut self, layer: MapLayer) -> FeatureId {
        self.next_id += 1;
        self.features.insert(self.next_id, layer);
        self.feature_ids.push(self.next_id);
        self.next_id
    }

    pub fn live(&self, layer: MapLayer) -> usize {
        self.features.values().filter(|l| **l == layer).count()
    }
}

#[derive(Clone)]
pub struct SharedSurface(pub Rc<RefCell<SurfaceState>>);

impl MapSurface for SharedSurface {
    fn add_marker(&mut self, layer: MapLayer, _at: LonLat, _style: &MarkerStyle) -> FeatureId {
        self.0.borrow_mut().add(layer)
    }
    fn add_line(&mut self, layer: MapLayer, _path: &[LonLat], _style: &LineStyle) -> FeatureId {
        self.0.borrow_mut().add(layer)
    }
    fn add_fill(&mut self, layer: MapLayer, _ring: &[LonLat], _style: &FillStyle) -> FeatureId {
        self.0.borrow_mut().add(layer)
    }
    fn remove_feature(&mut self, id: FeatureId) {
        self.0.borrow_mut().features.remove(&id);
    }
    fn clear_layer(&mut self, layer: MapLayer) {
        self.0.borrow_mut().features.retain(|_, l| *l != layer);
    }
    fn set_density_points(&mut self, points: &[DensityPoint]) {
        self.0.borrow_mut().density = points.to_vec();
    }
    fn set_density_visible(&mut self, visible: bool) {
        let mut st = self.0.borrow_mut();
        st.density_visible = Some(visible);
        st.visibility_calls += 1;
    }
    fn set_events_visible(&mut self, visible: bool) {
        let mut st = self.0.borrow_mut();
        st.events_visible = Some(visible);
        st.visibility_calls += 1;
    }
    fn zoom(&self) -> f64 {
        self.0.borrow().zoom_level
    }
    fn go_to(&mut self, center: LonLat, zoom: f64) {
        self.0.borrow_mut().centered.push((center, zoom));
    }
    fn open_popup(&mut self, _at: LonLat, content: &PopupContent) {
        self.0.borrow_mut().popup = Some(content.clone());
    }
    fn update_popup(&mut self, content: &PopupContent) {
        self.0.borrow_mut().popup = Some(content.clone());
    }
    fn close_popup(&mut self) {
        self.0.borrow_mut().popup = None;
    }
    fn show_mode_surface(&mut self, mode: InteractionMode) {
        self.0.borrow_mut().mode_surface = Some(mode);
    }
    fn show_directions(&mut self, steps: &[DirectionStep]) {
        self.0.borrow_mut().directions = Some(steps.to_vec());
    }
    fn clear_directions(&mut self) {
        self.0.borrow_mut().directions = None;
    }
    fn show_stats(&mut self, stats: &EventStats) {
        self.0.borrow_mut().stats = Some(stats.clone());
    }
    fn confirm(&mut self, message: &str) -> bool {
        let mut st = self.0.borrow_mut();
        st.confirms.push(message.to_string());
        st.confirm_response
    }
}

// --- EVENT BACKEND ---

#[derive(Default)]
pub struct BackendState {
    pub events: Vec<EventRecord>,
    pub statuses: HashMap<(EventId, UserId), ParticipationStatus>,
    pub fail_list: bool,
    pub fail_mutations: bool,
    pub created: Vec<NewEvent>,
    pub deleted: Vec<EventId>,
    pub list_calls: usize,
    pub next_id: EventId,
}

impl BackendState {
    fn counters_for(&self, event: EventId) -> ParticipationCounters {
        let mut counters = ParticipationCounters::default();
        for ((e, _), status) in &self.statuses {
            if *e != event {
                continue;
            }
            match status {
                ParticipationStatus::Going => counters.going += 1,
                ParticipationStatus::NotGoing => counters.not_going += 1,
                ParticipationStatus::Interested => counters.interested += 1,
            }
        }
        counters
    }
}

#[derive(Clone)]
pub struct SharedBackend(pub Rc<RefCell<BackendState>>);

impl EventBackend for SharedBackend {
    fn list(&self) -> LocalBoxFuture<'_, Result<Vec<EventRecord>, String>> {
        Box::pin(async move {
            let mut st = self.0.borrow_mut();
            st.list_calls += 1;
            if st.fail_list {
                return Err("backend offline".to_string());
            }
            Ok(st.events.clone())
        })
    }

    fn create(&self, payload: NewEvent) -> LocalBoxFuture<'_, Result<EventId, String>> {
        Box::pin(async move {
            let mut st = self.0.borrow_mut();
            if st.fail_mutations {
                return Err("network down".to_string());
            }
            st.next_id += 1;
            let id = st.next_id;
            st.created.push(payload);
            Ok(id)
        })
    }

    fn delete(&self, id: EventId) -> LocalBoxFuture<'_, Result<(), String>> {
        Box::pin(async move {
            let mut st = self.0.borrow_mut();
            if st.fail_mutations {
                return Err("network down".to_string());
            }
            st.deleted.push(id);
            st.events.retain(|e| e.id != id);
            Ok(())
        })
    }

    fn participation(
        &self,
        event: EventId,
        user: UserId,
    ) -> LocalBoxFuture<'_, Result<Option<ParticipationStatus>, String>> {
        Box::pin(async move {
            Ok(self.0.borrow().statuses.get(&(event, user)).copied())
        })
    }

    fn set_participation(
        &self,
        event: EventId,
        user: UserId,
        status: ParticipationStatus,
    ) -> LocalBoxFuture<'_, Result<ParticipationCounters, String>> {
        Box::pin(async move {
            let mut st = self.0.borrow_mut();
            if st.fail_mutations {
                return Err("network down".to_string());
            }
            st.statuses.insert((event, user), status);
            let counters = st.counters_for(event);
            if let Some(ev) = st.events.iter_mut().find(|e| e.id == event) {
                ev.counters = counters;
            }
            Ok(counters)
        })
    }
}

// --- ROUTING / GEOCODING / GEOLOCATION / IDENTITY / NOTIFIER ---

pub struct RouterState {
    pub response: Result<Route, String>,
    pub calls: Vec<Vec<LonLat>>,
}

impl Default for RouterState {
    fn default() -> Self {
        Self {
            response: Ok(Route {
                path: vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)],
                steps: vec![DirectionStep {
                    text: "Head north".to_string(),
                    distance_miles: 1.2,
                }],
            }),
            calls: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct SharedRouter(pub Rc<RefCell<RouterState>>);

impl RoutingService for SharedRouter {
    fn solve(&self, stops: Vec<LonLat>) -> LocalBoxFuture<'_, Result<Route, String>> {
        Box::pin(async move {
            let mut st = self.0.borrow_mut();
            st.calls.push(stops);
            st.response.clone()
        })
    }
}

pub struct StubGeocoder(pub Result<Option<LonLat>, String>);

impl GeocodingService for StubGeocoder {
    fn resolve(&self, _query: String) -> LocalBoxFuture<'_, Result<Option<LonLat>, String>> {
        let response = self.0.clone();
        Box::pin(async move { response })
    }
}

pub struct StubLocator(pub Option<LonLat>);

impl Geolocator for StubLocator {
    fn current_position(&self) -> LocalBoxFuture<'_, Result<LonLat, String>> {
        let position = self.0;
        Box::pin(async move { position.ok_or_else(|| "permission denied".to_string()) })
    }
}

pub struct StaticIdentity(pub Option<UserId>);

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<UserId> {
        self.0
    }
}

#[derive(Clone, Default)]
pub struct SharedNotifier(pub Rc<RefCell<Vec<(String, Severity)>>>);

impl Notifier for SharedNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.0.borrow_mut().push((message.to_string(), severity));
    }
}

// --- HARNESS ---

pub struct Harness {
    pub surface: Rc<RefCell<SurfaceState>>,
    pub backend: Rc<RefCell<BackendState>>,
    pub router: Rc<RefCell<RouterState>>,
    pub notices: Rc<RefCell<Vec<(String, Severity)>>>,
}

impl Harness {
    pub fn severities(&self) -> Vec<Severity> {
        self.notices.borrow().iter().map(|(_, s)| *s).collect()
    }
}

/// Builds a controller wired to fresh mocks.
pub fn controller(
    events: Vec<EventRecord>,
    viewer: Option<UserId>,
    device: Option<LonLat>,
) -> (MapController, Harness) {
    let surface = Rc::new(RefCell::new(SurfaceState::default()));
    let backend = Rc::new(RefCell::new(BackendState {
        events,
        next_id: 100,
        ..BackendState::default()
    }));
    let router = Rc::new(RefCell::new(RouterState::default()));
    let notices = Rc::new(RefCell::new(Vec::new()));

    let caps = Capabilities {
        surface: Box::new(SharedSurface(surface.clone())),
        backend: Box::new(SharedBackend(backend.clone())),
        router: Box::new(SharedRouter(router.clone())),
        geocoder: Box::new(StubGeocoder(Ok(None))),
        locator: Box::new(StubLocator(device)),
        identity: Box::new(StaticIdentity(viewer)),
        notifier: Box::new(SharedNotifier(notices.clone())),
    };

    let harness = Harness {
        surface,
        backend,
        router,
        notices,
    };
    (MapController::new(caps, Config::default()), harness)
}

/// Same harness, but with a geocoder that answers `response`.
pub fn controller_with_geocoder(
    events: Vec<EventRecord>,
    viewer: Option<UserId>,
    response: Result<Option<LonLat>, String>,
) -> (MapController, Harness) {
    let surface = Rc::new(RefCell::new(SurfaceState::default()));
    let backend = Rc::new(RefCell::new(BackendState {
        events,
        next_id: 100,
        ..BackendState::default()
    }));
    let router = Rc::new(RefCell::new(RouterState::default()));
    let notices = Rc::new(RefCell::new(Vec::new()));

    let caps = Capabilities {
        surface: Box::new(SharedSurface(surface.clone())),
        backend: Box::new(SharedBackend(backend.clone())),
        router: Box::new(SharedRouter(router.clone())),
        geocoder: Box::new(StubGeocoder(response)),
        locator: Box::new(StubLocator(None)),
        identity: Box::new(StaticIdentity(viewer)),
        notifier: Box::new(SharedNotifier(notices.clone())),
    };

    let harness = Harness {
        surface,
        backend,
        router,
        notices,
    };
    (MapController::new(caps, Config::default()), harness)
}
