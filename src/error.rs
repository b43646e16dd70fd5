use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The geocoder answered, but with zero results for the address.
    #[error(
        "no geocoding results for {address:?}{}",
        api_status_suffix(.status, .message)
    )]
    GeocodeNotFound {
        address: String,
        status: Option<String>,
        message: Option<String>,
    },

    /// A non-success HTTP status from either endpoint.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Service {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// HTTP success, but the body's `status` field reports a failure, e.g.
    /// `INVALID_REQUEST` for a page token that is not active yet.
    #[error(
        "{endpoint} rejected the request{}",
        rejected_suffix(.status, .message)
    )]
    Rejected {
        endpoint: &'static str,
        status: String,
        message: Option<String>,
    },

    #[error("no restaurants found within the specified range")]
    NoResultsInRange,

    #[error("request failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("failed to decode {endpoint} response: {source}")]
    Json {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid coordinates {0:?}, expected \"lat,lng\"")]
    InvalidCoordinate(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn api_status_suffix(
    status: &Option<String>,
    message: &Option<String>,
) -> String {
    match (status, message) {
        (Some(s), Some(m)) => format!(" (status {s}: {m})"),
        (Some(s), None) => format!(" (status {s})"),
        (None, Some(m)) => format!(" ({m})"),
        (None, None) => String::new(),
    }
}

fn rejected_suffix(status: &str, message: &Option<String>) -> String {
    api_status_suffix(&Some(status.to_string()), message)
}
