use crate::model::{BoundingBox, Place};

/// Places inside `bbox` whose address mentions `street`, ignoring case.
///
/// Places without coordinates never match.
pub fn filter_by_bounding_box(
    places: &[Place],
    bbox: &BoundingBox,
    street: Option<&str>,
) -> Vec<Place> {
    let street = street.map(str::to_lowercase);
    places
        .iter()
        .filter(|p| p.coordinate.is_some_and(|c| bbox.contains(c)))
        .filter(|p| match &street {
            Some(s) => p.address.to_lowercase().contains(s.as_str()),
            None => true,
        })
        .cloned()
        .collect()
}
