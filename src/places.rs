use std::thread::sleep;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    api::{Client, Response, Transport, PLACES_URL},
    error::{Error, Result},
    model::{Coordinate, Place},
};

pub const PLACE_TYPE: &str = "restaurant";

const ENDPOINT: &str = "nearby search";

#[derive(Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    results: Vec<Value>,
    next_page_token: Option<String>,
    status: Option<String>,
    error_message: Option<String>,
}

/// A page is usable on HTTP success with a body status of `OK` or
/// `ZERO_RESULTS` (or none at all).
fn page(response: Response) -> Result<NearbyResponse> {
    if !response.is_success() {
        return Err(response.into_service_error(ENDPOINT));
    }
    let data: NearbyResponse = response.json(ENDPOINT)?;
    match data.status.as_deref() {
        None | Some("OK" | "ZERO_RESULTS") => Ok(data),
        Some(status) => Err(Error::Rejected {
            endpoint: ENDPOINT,
            status: status.to_string(),
            message: data.error_message,
        }),
    }
}

impl<T: Transport> Client<T> {
    /// All restaurants within `radius` metres of `location`, following
    /// next-page tokens until the service stops returning them.
    ///
    /// A failed page part way through keeps the pages already fetched and
    /// logs a warning, unless the client is [`strict`](Client::strict).
    pub fn nearby(
        &self,
        location: Coordinate,
        radius: u32,
    ) -> Result<Vec<Place>> {
        let mut query = vec![
            ("location", location.to_string()),
            ("radius", radius.to_string()),
            ("type", PLACE_TYPE.to_string()),
            ("key", self.api_key.clone()),
        ];
        let mut places = Vec::new();
        let mut page_number = 1;
        loop {
            let response = self.transport.get(PLACES_URL, &query)?;
            let data = match page(response) {
                Ok(data) => data,
                Err(e) if self.strict => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        %location,
                        page = page_number,
                        kept = places.len(),
                        "nearby search failed, keeping partial results"
                    );
                    break;
                }
            };

            for record in data.results {
                match Place::from_record(record) {
                    Ok(place) => places.push(place),
                    Err(e) => {
                        tracing::warn!(%e, "skipping malformed place record")
                    }
                }
            }

            let Some(token) = data.next_page_token.filter(|t| !t.is_empty())
            else {
                break;
            };
            match query.iter_mut().find(|(k, _)| *k == "pagetoken") {
                Some((_, v)) => *v = token,
                None => query.push(("pagetoken", token)),
            }
            page_number += 1;
            sleep(self.page_delay);
        }
        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::fake::{client, Scripted};

    fn record(id: &str) -> Value {
        json!({
            "place_id": id,
            "name": format!("Place {id}"),
            "vicinity": "1 Union Street",
            "geometry": { "location": { "lat": 37.7, "lng": -122.43 } },
        })
    }

    fn first_page() -> Value {
        json!({
            "results": [record("a")],
            "next_page_token": "t1",
            "status": "OK",
        })
    }

    const HERE: Coordinate = Coordinate::new(37.7, -122.43);

    #[test]
    fn follows_page_tokens() {
        let client = client(
            Scripted::new()
                .ok(json!({
                    "results": [record("a"), record("b")],
                    "next_page_token": "t1",
                }))
                .ok(json!({
                    "results": [record("c")],
                    "next_page_token": "t2",
                }))
                .ok(json!({ "results": [record("d")] })),
        );
        let places = client.nearby(HERE, 100).unwrap();
        let ids: Vec<_> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);

        let requests = client.transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].param("pagetoken"), None);
        assert_eq!(requests[1].param("pagetoken"), Some("t1"));
        assert_eq!(requests[2].param("pagetoken"), Some("t2"));
        for r in &requests {
            assert_eq!(r.url, PLACES_URL);
            assert_eq!(r.param("location"), Some("37.7,-122.43"));
            assert_eq!(r.param("radius"), Some("100"));
            assert_eq!(r.param("type"), Some("restaurant"));
        }
    }

    #[test]
    fn empty_token_ends_pagination() {
        let client = client(Scripted::new().ok(json!({
            "results": [record("a")],
            "next_page_token": "",
        })));
        assert_eq!(client.nearby(HERE, 100).unwrap().len(), 1);
        assert_eq!(client.transport.requests().len(), 1);
    }

    #[test]
    fn zero_results_is_a_normal_page() {
        let client = client(Scripted::new().ok(json!({
            "results": [],
            "status": "ZERO_RESULTS",
        })))
        .strict(true);
        assert!(client.nearby(HERE, 100).unwrap().is_empty());
    }

    #[test]
    fn http_error_keeps_earlier_pages() {
        let client =
            client(Scripted::new().ok(first_page()).respond(500, "oops"));
        let places = client.nearby(HERE, 100).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "a");
    }

    #[test]
    fn strict_http_error() {
        let client =
            client(Scripted::new().ok(first_page()).respond(500, "oops"))
                .strict(true);
        assert!(matches!(
            client.nearby(HERE, 100),
            Err(Error::Service { status: 500, .. })
        ));
    }

    #[test]
    fn inactive_token_keeps_earlier_pages() {
        let client = client(
            Scripted::new()
                .ok(first_page())
                .ok(json!({ "results": [], "status": "INVALID_REQUEST" })),
        );
        let places = client.nearby(HERE, 100).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(client.transport.requests().len(), 2);
    }

    #[test]
    fn strict_inactive_token() {
        let client = client(
            Scripted::new()
                .ok(first_page())
                .ok(json!({ "results": [], "status": "INVALID_REQUEST" })),
        )
        .strict(true);
        match client.nearby(HERE, 100) {
            Err(Error::Rejected { status, .. }) => {
                assert_eq!(status, "INVALID_REQUEST")
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn strict_denied_first_page() {
        let client = client(Scripted::new().ok(json!({
            "results": [],
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
        })))
        .strict(true);
        match client.nearby(HERE, 100) {
            Err(Error::Rejected { message, .. }) => assert_eq!(
                message.as_deref(),
                Some("The provided API key is invalid.")
            ),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn skips_malformed_records() {
        let client = client(Scripted::new().ok(json!({
            "results": [record("a"), 42, { "place_id": 7 }],
        })));
        let places = client.nearby(HERE, 100).unwrap();
        assert_eq!(places.len(), 1);
    }
}
