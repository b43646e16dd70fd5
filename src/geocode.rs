use serde::Deserialize;

use crate::{
    api::{Client, Transport, GEOCODE_URL},
    error::{Error, Result},
    model::{Coordinate, Geometry},
};

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    status: Option<String>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

/// The free-text form the geocoder understands for an intersection.
pub fn intersection(street_a: &str, street_b: &str, city: &str) -> String {
    format!("{street_a} at {street_b}, {city}")
}

impl<T: Transport> Client<T> {
    /// Resolve the intersection of two streets to the first result's location.
    pub fn geocode(
        &self,
        street_a: &str,
        street_b: &str,
        city: &str,
    ) -> Result<Coordinate> {
        let address = intersection(street_a, street_b, city);
        tracing::info!(%address, "fetching coordinates");

        let response = self.transport.get(
            GEOCODE_URL,
            &[("address", address.clone()), ("key", self.api_key.clone())],
        )?;
        if !response.is_success() {
            return Err(response.into_service_error("geocode"));
        }

        let data: GeocodeResponse = response.json("geocode")?;
        match data.results.into_iter().next() {
            Some(GeocodeResult {
                geometry:
                    Geometry {
                        location: Some(location),
                    },
            }) => {
                tracing::info!(
                    %address,
                    lat = location.lat,
                    lng = location.lng,
                    "resolved"
                );
                Ok(location)
            }
            _ => Err(Error::GeocodeNotFound {
                address,
                status: data.status,
                message: data.error_message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::fake::{client, Scripted};

    fn result(lat: f64, lng: f64) -> serde_json::Value {
        json!({ "geometry": { "location": { "lat": lat, "lng": lng } } })
    }

    #[test]
    fn first_result_wins() {
        let client = client(Scripted::new().ok(json!({
            "results": [result(37.798, -122.427), result(40.0, -70.0)],
            "status": "OK",
        })));
        let location = client
            .geocode("Gough Street", "Union Street", "San Francisco")
            .unwrap();
        assert_eq!(location, Coordinate::new(37.798, -122.427));

        let requests = client.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, GEOCODE_URL);
        assert_eq!(
            requests[0].param("address"),
            Some("Gough Street at Union Street, San Francisco")
        );
        assert_eq!(requests[0].param("key"), Some("test-key"));
    }

    #[test]
    fn zero_results() {
        let client = client(Scripted::new().ok(json!({
            "results": [],
            "status": "ZERO_RESULTS",
        })));
        match client.geocode("Nowhere", "Union Street", "San Francisco") {
            Err(Error::GeocodeNotFound {
                address, status, ..
            }) => {
                assert_eq!(address, "Nowhere at Union Street, San Francisco");
                assert_eq!(status.as_deref(), Some("ZERO_RESULTS"));
            }
            other => panic!("expected GeocodeNotFound, got {other:?}"),
        }
    }

    #[test]
    fn http_error() {
        let client = client(Scripted::new().respond(403, "forbidden"));
        match client.geocode("Gough Street", "Union Street", "San Francisco") {
            Err(Error::Service { status, body, .. }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("expected Service error, got {other:?}"),
        }
    }
}
