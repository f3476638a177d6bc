// File: src/map/draft.rs
use crate::capability::{FeatureId, MapLayer, MapSurface, MarkerStyle};
use crate::color::{DEFAULT_EVENT_COLOR, OUTLINE_COLOR};
use crate::error::MapError;
use crate::model::{DraftEvent, Geometry, GeometryKind, LonLat};
use uuid::Uuid;

fn sketch_marker_style() -> MarkerStyle {
    MarkerStyle {
        color: DEFAULT_EVENT_COLOR.to_string(),
        outline: OUTLINE_COLOR.to_string(),
    }
}

/// One vertex captured during an authoring session.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPoint {
    pub id: Uuid,
    pub at: LonLat,
    pub marker: FeatureId,
}

/// Accumulates map clicks into a draft geometry while the authoring
/// surface is open.
#[derive(Default)]
pub struct GeometryCapture {
    pub draft: DraftEvent,
    points: Vec<CapturedPoint>,
    /// Every marker drawn this session, including Point markers whose
    /// backing point was since replaced. All of them stay visible until
    /// authoring ends.
    session_markers: Vec<FeatureId>,
}

impl GeometryCapture {
    /// Resets the draft to empty defaults at authoring start.
    pub fn begin(&mut self, default_color: &str) {
        self.draft = DraftEvent {
            color: default_color.to_string(),
            ..DraftEvent::default()
        };
        self.points.clear();
        self.session_markers.clear();
    }

    /// Adds a vertex for the current geometry type. Point drafts keep
    /// single-point semantics: only the newest click counts toward the
    /// saved geometry, while earlier markers remain on the map.
    pub fn capture_click(&mut self, surface: &mut dyn MapSurface, at: LonLat) -> Uuid {
        let marker = surface.add_marker(MapLayer::UserPoints, at, &sketch_marker_style());
        self.session_markers.push(marker);
        if self.draft.geometry_type == GeometryKind::Point {
            self.points.clear();
        }
        let id = Uuid::new_v4();
        self.points.push(CapturedPoint { id, at, marker });
        id
    }

    /// Removes one captured vertex and its marker, keeping the relative
    /// order of the rest. Returns false for an unknown id.
    pub fn remove_point(&mut self, surface: &mut dyn MapSurface, id: Uuid) -> bool {
        let Some(idx) = self.points.iter().position(|p| p.id == id) else {
            return false;
        };
        let point = self.points.remove(idx);
        surface.remove_feature(point.marker);
        self.session_markers.retain(|m| *m != point.marker);
        true
    }

    pub fn points(&self) -> &[CapturedPoint] {
        &self.points
    }

    /// Builds the savable geometry from the captured sequence.
    pub fn build_geometry(&self) -> Result<Geometry, MapError> {
        if self.points.is_empty() {
            return Err(MapError::EmptyGeometry);
        }
        let coords: Vec<LonLat> = self.points.iter().map(|p| p.at).collect();
        Ok(match self.draft.geometry_type {
            GeometryKind::Point => Geometry::Point(coords[0]),
            GeometryKind::Polygon => Geometry::Polygon(vec![coords]),
            GeometryKind::Polyline => Geometry::Polyline(coords),
        })
    }

    /// Removes every marker drawn during the session and resets the
    /// draft.
    pub fn discard(&mut self, surface: &mut dyn MapSurface) {
        for marker in self.session_markers.drain(..) {
            surface.remove_feature(marker);
        }
        self.points.clear();
        self.draft = DraftEvent::default();
    }
}
