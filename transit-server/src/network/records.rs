//! Repository record shapes and their conversion to domain types.
//!
//! These mirror the documents the stop repository serves. Required fields
//! are enforced by deserialisation, so malformed records are rejected here
//! rather than inside the planner.

use serde::{Deserialize, Serialize};

use crate::domain::{Edge, RouteId, RouteInfo, Stop, StopId};

use super::error::SourceError;

/// Route ids are strings in most feeds but bare numbers in some exports.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawRouteId {
    Text(String),
    Number(i64),
}

impl RawRouteId {
    fn to_route_id(&self, kind: &'static str) -> Result<RouteId, SourceError> {
        let result = match self {
            RawRouteId::Text(s) => RouteId::new(s),
            RawRouteId::Number(n) => RouteId::new(n.to_string()),
        };
        result.map_err(|e| SourceError::InvalidRecord {
            kind,
            message: e.to_string(),
        })
    }
}

/// A stop document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StopRecord {
    pub stop_id: i64,
    pub stop_name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl From<StopRecord> for Stop {
    fn from(record: StopRecord) -> Self {
        let stop = Stop::new(StopId(record.stop_id), record.stop_name);
        // Half a coordinate pair is not a position.
        match (record.lat, record.lng) {
            (Some(lat), Some(lng)) => stop.with_position(lat, lng),
            _ => stop,
        }
    }
}

/// An edge document.
///
/// Older exports call the distance `distance_km`; some carry both keys, in
/// which case `distance` wins.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EdgeRecord {
    pub from_stop: i64,
    pub to_stop: i64,
    pub route_id: RawRouteId,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl TryFrom<EdgeRecord> for Edge {
    type Error = SourceError;

    fn try_from(record: EdgeRecord) -> Result<Self, Self::Error> {
        Ok(Edge::new(
            StopId(record.from_stop),
            StopId(record.to_stop),
            record.route_id.to_route_id("edge")?,
            record.distance.or(record.distance_km),
        ))
    }
}

/// A route catalogue document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RouteRecord {
    pub route_id: RawRouteId,
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub stops: Vec<i64>,
    #[serde(default)]
    pub total_distance: Option<f64>,
}

impl TryFrom<RouteRecord> for RouteInfo {
    type Error = SourceError;

    fn try_from(record: RouteRecord) -> Result<Self, Self::Error> {
        let id = record.route_id.to_route_id("route")?;
        let name = record
            .route_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.to_string());

        Ok(RouteInfo {
            id,
            name,
            stops: record.stops.into_iter().map(StopId).collect(),
            total_distance: record.total_distance,
        })
    }
}

/// Everything a source returns for one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkData {
    pub stops: Vec<Stop>,
    pub edges: Vec<Edge>,
    pub routes: Vec<RouteInfo>,
}

impl NetworkData {
    /// Convert raw records, failing on the first unusable one.
    pub fn from_records(
        stops: Vec<StopRecord>,
        edges: Vec<EdgeRecord>,
        routes: Vec<RouteRecord>,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            stops: stops.into_iter().map(Stop::from).collect(),
            edges: edges
                .into_iter()
                .map(Edge::try_from)
                .collect::<Result<_, _>>()?,
            routes: routes
                .into_iter()
                .map(RouteInfo::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Parse a JSON array of records, naming the collection in errors.
pub(super) fn parse_records<T: for<'de> Deserialize<'de>>(
    what: &str,
    body: &str,
) -> Result<Vec<T>, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Json {
        what: what.to_string(),
        message: e.to_string(),
    })
}
