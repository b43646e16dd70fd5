use std::collections::HashSet;

use crate::{
    error::Result,
    model::{Coordinate, Place},
};

/// `steps + 1` points from `start` to `end`, both included.
///
/// Only longitude is interpolated; every point keeps the latitude of
/// `start`. This fits a short street running roughly east-west and nothing
/// else.
pub fn sample_points(
    start: Coordinate,
    end: Coordinate,
    steps: u32,
) -> Vec<Coordinate> {
    if steps == 0 {
        return vec![start];
    }
    let span = end.lng - start.lng;
    (0..=steps)
        .map(|i| {
            let lng = if i == steps {
                end.lng
            } else {
                start.lng + span * f64::from(i) / f64::from(steps)
            };
            Coordinate::new(start.lat, lng)
        })
        .collect()
}

/// Search around each sample point and merge the results, keeping the first
/// occurrence of every place id.
pub fn sample<F>(
    start: Coordinate,
    end: Coordinate,
    steps: u32,
    radius: u32,
    mut search: F,
) -> Result<Vec<Place>>
where
    F: FnMut(Coordinate, u32) -> Result<Vec<Place>>,
{
    let mut seen = HashSet::new();
    let mut places = Vec::new();
    for point in sample_points(start, end, steps) {
        tracing::info!(
            lat = point.lat,
            lng = point.lng,
            "fetching restaurants near point"
        );
        let found = search(point, radius)?;
        let before = places.len();
        for place in found {
            if seen.insert(place.id.clone()) {
                places.push(place);
            }
        }
        tracing::debug!(
            new = places.len() - before,
            total = places.len(),
            "merged"
        );
    }
    Ok(places)
}
