use std::time::Duration;

use serde::de::DeserializeOwned;
use ureq::{Agent, AgentBuilder};

use crate::error::{Error, Result};

pub const GEOCODE_URL: &str =
    "https://maps.googleapis.com/maps/api/geocode/json";
pub const PLACES_URL: &str =
    "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

/// The places service needs a moment before a next-page token is accepted.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(2);

/// A raw HTTP response. Non-success statuses are still responses.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub(crate) fn json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
    ) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|source| Error::Json { endpoint, source })
    }

    pub(crate) fn into_service_error(self, endpoint: &'static str) -> Error {
        Error::Service {
            endpoint,
            status: self.status,
            body: self.body,
        }
    }
}

/// Blocking HTTP GET.
pub trait Transport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response>;
}

pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = AgentBuilder::new()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        let mut request = self.agent.get(url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        match request.call() {
            Ok(response) => Ok(Response {
                status: response.status(),
                body: response.into_string()?,
            }),
            Err(ureq::Error::Status(status, response)) => Ok(Response {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(e) => Err(Box::new(e).into()),
        }
    }
}

/// Client for the Geocoding and Nearby Search endpoints.
///
/// The request methods live next to their response types, in
/// [`crate::geocode`] and [`crate::places`].
pub struct Client<T> {
    pub(crate) transport: T,
    pub(crate) api_key: String,
    pub(crate) page_delay: Duration,
    pub(crate) strict: bool,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            page_delay: DEFAULT_PAGE_DELAY,
            strict: false,
        }
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Fail a nearby search on any failed page, HTTP error or rejected
    /// request, instead of keeping the pages fetched so far.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
