// File: src/model/mod.rs
pub mod adapter;

use chrono::NaiveDateTime;
use geo::{Centroid, LineString, Polygon as GeoPolygon};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type EventId = i64;
pub type UserId = i64;

/// A geographic coordinate, longitude first like the backend's GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Which shape an authoring session captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeometryKind {
    #[default]
    Point,
    Polygon,
    Polyline,
}

/// Event geometry as stored by the backend (GeoJSON on the wire, see
/// `adapter`).
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LonLat),
    /// Rings of vertices; the first ring is the exterior boundary.
    Polygon(Vec<Vec<LonLat>>),
    Polyline(Vec<LonLat>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::Polyline(_) => GeometryKind::Polyline,
        }
    }

    /// A single point standing in for the whole shape: the point itself,
    /// or the centroid for polygons and polylines. Used as the routing
    /// target and the density-view anchor.
    pub fn representative_point(&self) -> LonLat {
        match self {
            Geometry::Point(p) => *p,
            Geometry::Polygon(rings) => {
                let ring = rings.first().map(Vec::as_slice).unwrap_or(&[]);
                let exterior = LineString::from(
                    ring.iter().map(|p| (p.lon, p.lat)).collect::<Vec<_>>(),
                );
                GeoPolygon::new(exterior, vec![])
                    .centroid()
                    .map(|c| LonLat::new(c.x(), c.y()))
                    .unwrap_or_else(|| ring.first().copied().unwrap_or(LonLat::new(0.0, 0.0)))
            }
            Geometry::Polyline(path) => {
                LineString::from(path.iter().map(|p| (p.lon, p.lat)).collect::<Vec<_>>())
                    .centroid()
                    .map(|c| LonLat::new(c.x(), c.y()))
                    .unwrap_or_else(|| path.first().copied().unwrap_or(LonLat::new(0.0, 0.0)))
            }
        }
    }
}

/// A viewer's declared intent for one event. Wire strings are the
/// backend's ("Going" / "Not going" / "Interested").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticipationStatus {
    Going,
    NotGoing,
    Interested,
}

impl ParticipationStatus {
    pub const ALL: [ParticipationStatus; 3] = [
        ParticipationStatus::Going,
        ParticipationStatus::NotGoing,
        ParticipationStatus::Interested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipationStatus::Going => "Going",
            ParticipationStatus::NotGoing => "Not going",
            ParticipationStatus::Interested => "Interested",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Going" => Some(ParticipationStatus::Going),
            "Not going" => Some(ParticipationStatus::NotGoing),
            "Interested" => Some(ParticipationStatus::Interested),
            _ => None,
        }
    }
}

/// Aggregate participation counts carried by every event record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationCounters {
    pub going: u32,
    pub not_going: u32,
    pub interested: u32,
}

impl ParticipationCounters {
    /// Weight of this event in the density view. Floored at 1 so
    /// zero-engagement events remain visible.
    pub fn density_weight(&self) -> f64 {
        f64::from((self.going * 3 + self.interested).max(1))
    }
}

/// A community event as returned by the backend. Immutable on the client
/// except through explicit save/delete/participation calls; the whole
/// collection is re-fetched after any mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: EventId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Hex color chosen by the owner; `None` falls back to the
    /// configured default at render time.
    pub color: Option<String>,
    pub geometry: Geometry,
    pub counters: ParticipationCounters,
    /// Age band -> attendee count, as aggregated server-side.
    pub demographics: BTreeMap<String, u32>,
}

/// Form data for an event being authored. Times are kept as the raw
/// `YYYY-MM-DDTHH:MM` strings the form produces and the backend expects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftEvent {
    pub title: String,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    pub color: String,
    pub geometry_type: GeometryKind,
}

/// Payload for creating an event.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    pub geometry: Geometry,
    pub color: String,
}

/// One step of a turn-by-turn direction list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionStep {
    pub text: String,
    pub distance_miles: f64,
}

impl std::fmt::Display for DirectionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} miles)", self.text, self.distance_miles)
    }
}

/// A solved route: the path to draw plus its directions.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub path: Vec<LonLat>,
    pub steps: Vec<DirectionStep>,
}

/// Figures shown on the stats surface for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStats {
    pub title: String,
    pub duration_minutes: i64,
    /// Geodesic area of the exterior ring, polygons only.
    pub area_m2: Option<f64>,
    pub counters: ParticipationCounters,
    pub demographics: BTreeMap<String, u32>,
}
