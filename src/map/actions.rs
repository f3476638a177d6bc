// File: src/map/actions.rs
use crate::capability::PopupActionItem;
use crate::model::{EventId, EventRecord, EventStats, Geometry, ParticipationStatus, UserId};
use geo::{GeodesicArea, LineString, Polygon as GeoPolygon};

/// An operation triggered from a feature popup, carrying its payload.
/// The widget still speaks string identifiers; [`PopupAction::parse`]
/// turns them into variants once at the boundary, so a typo is dropped
/// there instead of silently no-opping deeper in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupAction {
    NavigateTo(EventId),
    Delete(EventId),
    ViewStats(EventId),
    SetParticipation(EventId, ParticipationStatus),
}

pub const NAVIGATE_ACTION: &str = "navigate-to-event";
pub const DELETE_ACTION: &str = "delete-event";
pub const STATS_ACTION: &str = "view-stats";

/// Identifier of the popup button that posts `status`.
pub fn status_action_id(status: ParticipationStatus) -> &'static str {
    match status {
        ParticipationStatus::Going => "event-going",
        ParticipationStatus::NotGoing => "event-not_going",
        ParticipationStatus::Interested => "event-interested",
    }
}

impl PopupAction {
    /// Parses a widget-emitted identifier for the selected event.
    /// Unknown identifiers yield `None` and are ignored.
    pub fn parse(id: &str, event: EventId) -> Option<Self> {
        match id {
            NAVIGATE_ACTION => Some(PopupAction::NavigateTo(event)),
            DELETE_ACTION => Some(PopupAction::Delete(event)),
            STATS_ACTION => Some(PopupAction::ViewStats(event)),
            "event-going" => Some(PopupAction::SetParticipation(
                event,
                ParticipationStatus::Going,
            )),
            "event-not_going" => Some(PopupAction::SetParticipation(
                event,
                ParticipationStatus::NotGoing,
            )),
            "event-interested" => Some(PopupAction::SetParticipation(
                event,
                ParticipationStatus::Interested,
            )),
            _ => None,
        }
    }
}

/// Builds the action set a popup offers for `event`.
///
/// Navigate and stats need no identity. A signed-in viewer gets the
/// status changes minus their current status, and the owner additionally
/// gets delete.
pub fn available_actions(
    event: &EventRecord,
    viewer: Option<UserId>,
    current: Option<ParticipationStatus>,
) -> Vec<PopupActionItem> {
    let mut actions = vec![
        PopupActionItem {
            id: NAVIGATE_ACTION,
            label: "Navigate".to_string(),
        },
        PopupActionItem {
            id: STATS_ACTION,
            label: "Statistics".to_string(),
        },
    ];
    let Some(viewer) = viewer else {
        return actions;
    };
    for status in ParticipationStatus::ALL {
        if Some(status) != current {
            actions.push(PopupActionItem {
                id: status_action_id(status),
                label: status.as_str().to_string(),
            });
        }
    }
    if viewer == event.owner_id {
        actions.push(PopupActionItem {
            id: DELETE_ACTION,
            label: "Delete event".to_string(),
        });
    }
    actions
}

/// Figures for the stats surface: schedule length, geodesic area for
/// polygon events, and the demographic breakdown.
pub fn event_stats(event: &EventRecord) -> EventStats {
    let area_m2 = match &event.geometry {
        Geometry::Polygon(rings) if !rings.is_empty() => {
            let mut rings = rings.iter().map(|ring| {
                LineString::from(ring.iter().map(|p| (p.lon, p.lat)).collect::<Vec<_>>())
            });
            let exterior = rings.next().unwrap();
            let polygon = GeoPolygon::new(exterior, rings.collect());
            Some(polygon.geodesic_area_unsigned())
        }
        _ => None,
    };
    EventStats {
        title: event.title.clone(),
        duration_minutes: (event.end_time - event.start_time).num_minutes(),
        area_m2,
        counters: event.counters,
        demographics: event.demographics.clone(),
    }
}
