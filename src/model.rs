use std::{fmt, str::FromStr};

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

// A latitude,longitude pattern, e.g. "37.7,-122.43". Spaces around the comma
// are tolerated since the value usually comes from a shell argument.
const LATLNGPAT: &str = r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Formats as `lat,lng`, the form the Places API expects for `location`.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidCoordinate(s.to_string());
        let pattern = Regex::new(LATLNGPAT).map_err(|_| invalid())?;
        let (_, [lat, lng]) = pattern
            .captures(s)
            .map(|c| c.extract())
            .ok_or_else(invalid)?;
        let lat: f64 = lat.parse().map_err(|_| invalid())?;
        let lng: f64 = lng.parse().map_err(|_| invalid())?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(invalid());
        }
        Ok(Self { lat, lng })
    }
}

/// A place record from the Nearby Search API.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: String,
    pub name: String,
    /// The `vicinity` field, a short address such as "1801 Union Street".
    pub address: String,
    pub coordinate: Option<Coordinate>,
    /// The record exactly as received.
    pub raw: Map<String, Value>,
}

/// The subset of a place record we read. Missing text fields become empty.
#[derive(Deserialize)]
struct PlaceRecord {
    #[serde(default)]
    place_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    vicinity: String,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
pub(crate) struct Geometry {
    pub location: Option<Coordinate>,
}

impl Place {
    pub fn from_record(record: Value) -> Result<Self, serde_json::Error> {
        let raw = match record {
            Value::Object(map) => map,
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected a place object, found {other}"
                )))
            }
        };
        let parsed: PlaceRecord =
            serde_json::from_value(Value::Object(raw.clone()))?;
        Ok(Self {
            id: parsed.place_id,
            name: parsed.name,
            address: parsed.vicinity,
            coordinate: parsed.geometry.and_then(|g| g.location),
            raw,
        })
    }
}

/// An inclusive latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// The smallest box containing both corners, in either order.
    pub fn from_corners(a: Coordinate, b: Coordinate) -> Self {
        Self {
            min_lat: a.lat.min(b.lat),
            max_lat: a.lat.max(b.lat),
            min_lng: a.lng.min(b.lng),
            max_lng: a.lng.max(b.lng),
        }
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&c.lat)
            && (self.min_lng..=self.max_lng).contains(&c.lng)
    }
}
