// File: ./src/model/adapter.rs
// Handles GeoJSON and backend wire (de)serialization
use crate::model::{
    EventRecord, Geometry, LonLat, NewEvent, ParticipationCounters, ParticipationStatus,
};
use chrono::NaiveDateTime;
use serde_json::{Value, json};
use std::collections::BTreeMap;

fn coord_to_json(p: &LonLat) -> Value {
    json!([p.lon, p.lat])
}

fn coord_from_json(v: &Value) -> Result<LonLat, String> {
    let pair = v.as_array().ok_or("coordinate is not an array")?;
    if pair.len() < 2 {
        return Err("coordinate needs [lon, lat]".to_string());
    }
    let lon = pair[0].as_f64().ok_or("lon is not a number")?;
    let lat = pair[1].as_f64().ok_or("lat is not a number")?;
    Ok(LonLat::new(lon, lat))
}

fn path_from_json(v: &Value) -> Result<Vec<LonLat>, String> {
    v.as_array()
        .ok_or("coordinate sequence is not an array")?
        .iter()
        .map(coord_from_json)
        .collect()
}

impl Geometry {
    /// Serializes to the GeoJSON geometry object the backend stores
    /// (`{"type": "Point", "coordinates": [lon, lat]}` and friends).
    pub fn to_geojson(&self) -> Value {
        match self {
            Geometry::Point(p) => json!({
                "type": "Point",
                "coordinates": coord_to_json(p),
            }),
            Geometry::Polygon(rings) => json!({
                "type": "Polygon",
                "coordinates": rings
                    .iter()
                    .map(|ring| Value::Array(ring.iter().map(coord_to_json).collect()))
                    .collect::<Vec<_>>(),
            }),
            Geometry::Polyline(path) => json!({
                "type": "LineString",
                "coordinates": path.iter().map(coord_to_json).collect::<Vec<_>>(),
            }),
        }
    }

    pub fn from_geojson(v: &Value) -> Result<Self, String> {
        let kind = v
            .get("type")
            .and_then(Value::as_str)
            .ok_or("geometry has no type")?;
        let coordinates = v.get("coordinates").ok_or("geometry has no coordinates")?;
        match kind {
            "Point" => Ok(Geometry::Point(coord_from_json(coordinates)?)),
            "Polygon" => {
                let rings = coordinates
                    .as_array()
                    .ok_or("polygon coordinates are not an array")?
                    .iter()
                    .map(path_from_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Geometry::Polygon(rings))
            }
            "LineString" => Ok(Geometry::Polyline(path_from_json(coordinates)?)),
            other => Err(format!("unsupported geometry type: {}", other)),
        }
    }
}

/// The backend emits `YYYY-MM-DDTHH:MM`; Python's isoformat may append
/// seconds, so accept both.
fn parse_event_time(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| format!("bad event time {:?}: {}", s, e))
}

impl ParticipationCounters {
    /// Counters are keyed by the wire status strings.
    pub fn from_json(v: &Value) -> Self {
        let count = |status: ParticipationStatus| {
            v.get(status.as_str())
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32
        };
        Self {
            going: count(ParticipationStatus::Going),
            not_going: count(ParticipationStatus::NotGoing),
            interested: count(ParticipationStatus::Interested),
        }
    }
}

impl EventRecord {
    pub fn from_json(v: &Value) -> Result<Self, String> {
        let id = v.get("id").and_then(Value::as_i64).ok_or("event has no id")?;
        let owner_id = v
            .get("owner_id")
            .and_then(Value::as_i64)
            .ok_or("event has no owner_id")?;
        let title = v
            .get("title")
            .and_then(Value::as_str)
            .ok_or("event has no title")?
            .to_string();
        let description = v
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let start_time = parse_event_time(
            v.get("start_time")
                .and_then(Value::as_str)
                .ok_or("event has no start_time")?,
        )?;
        let end_time = parse_event_time(
            v.get("end_time")
                .and_then(Value::as_str)
                .ok_or("event has no end_time")?,
        )?;
        // An absent, null or empty color means "use the default".
        let color = v
            .get("color")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let geometry = Geometry::from_geojson(v.get("geometry").ok_or("event has no geometry")?)?;
        let counters = v
            .get("participation")
            .map(ParticipationCounters::from_json)
            .unwrap_or_default();

        let mut demographics = BTreeMap::new();
        if let Some(bands) = v.get("demographics").and_then(Value::as_object) {
            for (band, count) in bands {
                if let Some(n) = count.as_u64() {
                    demographics.insert(band.clone(), n as u32);
                }
            }
        }

        Ok(EventRecord {
            id,
            owner_id,
            title,
            description,
            start_time,
            end_time,
            color,
            geometry,
            counters,
            demographics,
        })
    }
}

impl NewEvent {
    pub fn to_json(&self) -> Value {
        json!({
            "owner_id": self.owner_id,
            "title": self.title,
            "description": self.description,
            "start_time": self.start_time,
            "end_time": self.end_time,
            "geometry": self.geometry.to_geojson(),
            "color": self.color,
        })
    }
}
