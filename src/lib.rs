use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;

pub mod api;
pub mod error;
pub mod filter;
pub mod geocode;
pub mod model;
pub mod output;
pub mod places;
pub mod sample;

use api::{Client, Transport, UreqTransport};
use error::Error;
use model::{BoundingBox, Coordinate, Place};

/// List the restaurants along a stretch of street and save them to CSV.
///
/// The stretch runs along `--street` from its intersection with `--from` to
/// its intersection with `--to`. Sample points are spaced evenly in
/// longitude only, so this works for streets running roughly east-west.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Google Maps API key with the Geocoding and Places APIs enabled
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    api_key: String,

    /// The street to walk along
    #[arg(long, default_value = "Union Street")]
    street: String,

    /// City the street is in
    #[arg(long, default_value = "San Francisco")]
    city: String,

    /// Cross street at the start of the stretch
    #[arg(long, default_value = "Gough Street")]
    from: String,

    /// Cross street at the end of the stretch
    #[arg(long, default_value = "Pierce Street")]
    to: String,

    /// Use these coordinates ("lat,lng") for the start instead of geocoding
    #[arg(long, value_name = "LAT,LNG")]
    start_coords: Option<Coordinate>,

    /// Use these coordinates ("lat,lng") for the end instead of geocoding
    #[arg(long, value_name = "LAT,LNG")]
    end_coords: Option<Coordinate>,

    /// Search radius around each sample point, in metres
    #[arg(long, default_value_t = 100)]
    radius: u32,

    /// Number of steps between start and end; steps + 1 points are searched
    #[arg(long, default_value_t = 20)]
    steps: u32,

    /// Keep places on any street inside the bounding box
    #[arg(long)]
    any_street: bool,

    /// Abort on a failed nearby search instead of keeping partial results
    #[arg(long)]
    strict: bool,

    /// Wait before requesting the next page of results, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 2000)]
    page_delay_ms: u64,

    /// Output filename, CSV formatted. Overwritten if it exists.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "restaurants_on_street.csv"
    )]
    output: PathBuf,
}

/// What to search: a stretch of one street between two cross streets.
#[derive(Debug, Clone)]
pub struct Route {
    pub street: String,
    pub city: String,
    pub from: String,
    pub to: String,
    pub start: Option<Coordinate>,
    pub end: Option<Coordinate>,
    pub radius: u32,
    pub steps: u32,
    pub street_filter: bool,
}

impl From<&Cli> for Route {
    fn from(cli: &Cli) -> Self {
        Self {
            street: cli.street.clone(),
            city: cli.city.clone(),
            from: cli.from.clone(),
            to: cli.to.clone(),
            start: cli.start_coords,
            end: cli.end_coords,
            radius: cli.radius,
            steps: cli.steps,
            street_filter: !cli.any_street,
        }
    }
}

/// Run the command-line interface
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new(UreqTransport::new(), cli.api_key.clone())
        .with_page_delay(Duration::from_millis(cli.page_delay_ms))
        .strict(cli.strict);
    run_with(&cli, &client)
}

/// Collect the restaurants for `cli` and write them to its output file.
///
/// Nothing is written unless at least one restaurant is found.
pub fn run_with<T: Transport>(cli: &Cli, client: &Client<T>) -> Result<()> {
    let route = Route::from(cli);
    let restaurants = collect(client, &route)?;

    tracing::info!(
        count = restaurants.len(),
        path = %cli.output.display(),
        "found restaurants within the specified range, saving to CSV"
    );
    output::save_csv(&restaurants, &cli.output).with_context(|| {
        format!("Failed to write {}", cli.output.display())
    })?;
    tracing::info!(path = %cli.output.display(), "data saved successfully");
    Ok(())
}

/// Geocode both ends of the route, search along it and filter the results.
///
/// Both ends are resolved before giving up on either. Fails with
/// [`Error::NoResultsInRange`] rather than returning an empty list.
pub fn collect<T: Transport>(
    client: &Client<T>,
    route: &Route,
) -> Result<Vec<Place>, Error> {
    tracing::info!("fetching coordinates for start and end streets");
    let start = endpoint(client, route, route.start, &route.from);
    let end = endpoint(client, route, route.end, &route.to);
    let (start, end) = match (start, end) {
        (Ok(start), Ok(end)) => (start, end),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => return Err(e),
        (Err(e), Err(other)) => {
            tracing::error!(
                error = %other,
                cross_street = %route.to,
                "could not geocode end"
            );
            return Err(e);
        }
    };

    let bbox = BoundingBox::from_corners(start, end);
    tracing::debug!(?bbox, "bounding box");

    tracing::info!(
        street = %route.street,
        "fetching restaurant data along the street"
    );
    let found =
        sample::sample(start, end, route.steps, route.radius, |at, radius| {
            client.nearby(at, radius)
        })?;
    tracing::info!(count = found.len(), "unique places found");

    let street = route.street_filter.then_some(route.street.as_str());
    let restaurants = filter::filter_by_bounding_box(&found, &bbox, street);
    if restaurants.is_empty() {
        return Err(Error::NoResultsInRange);
    }
    Ok(restaurants)
}

fn endpoint<T: Transport>(
    client: &Client<T>,
    route: &Route,
    coords: Option<Coordinate>,
    cross_street: &str,
) -> Result<Coordinate, Error> {
    match coords {
        Some(c) => {
            tracing::info!(
                cross_street,
                lat = c.lat,
                lng = c.lng,
                "using given coordinates"
            );
            Ok(c)
        }
        None => client.geocode(cross_street, &route.street, &route.city),
    }
}
