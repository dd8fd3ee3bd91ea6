//! Mapping of Foursquare place details into [`PlaceRecord`]s.

use placerank_core::{PlaceRecord, Provider};

use super::types::{NamedRef, PlaceDetail, PlaceLocation};

/// Converts a place detail payload into the common record shape.
///
/// `distance_km` is left unset; the caller annotates it.
#[must_use]
pub fn normalize_place(detail: PlaceDetail) -> PlaceRecord {
    let mut record = PlaceRecord::new(Provider::Foursquare);
    record.address = detail.location.as_ref().and_then(format_address);
    record.categories = detail
        .categories
        .as_deref()
        .map(names)
        .filter(|names| !names.is_empty());
    record.chain = detail
        .chains
        .as_deref()
        .and_then(|chains| chains.first())
        .and_then(|c| non_empty(c.name.as_deref()));
    record.fsq_place_id = detail.fsq_place_id;
    record.name = detail.name;
    record.latitude = detail.latitude;
    record.longitude = detail.longitude;
    record.tel = detail.tel;
    record.website = detail.website;
    record
}

/// `formatted_address`, or the `", "` join of the non-empty address parts.
#[must_use]
pub fn format_address(location: &PlaceLocation) -> Option<String> {
    if let Some(formatted) = non_empty(location.formatted_address.as_deref()) {
        return Some(formatted);
    }
    let parts: Vec<&str> = [
        &location.address,
        &location.locality,
        &location.region,
        &location.postcode,
        &location.country,
    ]
    .into_iter()
    .filter_map(|p| p.as_deref().map(str::trim).filter(|s| !s.is_empty()))
    .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn names(refs: &[NamedRef]) -> Vec<String> {
    refs.iter()
        .filter_map(|r| non_empty(r.name.as_deref()))
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_from(json: serde_json::Value) -> PlaceDetail {
        serde_json::from_value(json).expect("valid detail")
    }

    #[test]
    fn normalize_prefers_formatted_address() {
        let detail = detail_from(serde_json::json!({
            "fsq_place_id": "4b0588",
            "name": "Blue Tokai Coffee",
            "latitude": 28.63,
            "longitude": 77.22,
            "location": {
                "formatted_address": "Connaught Place, New Delhi 110001",
                "address": "ignored"
            },
            "categories": [{ "name": "Coffee Shop" }, { "name": "Café" }],
            "chains": [{ "name": "Blue Tokai" }],
            "tel": "011 4000 0000",
            "website": "https://bluetokaicoffee.com"
        }));
        let record = normalize_place(detail);
        assert_eq!(record.provider, Provider::Foursquare);
        assert_eq!(record.fsq_place_id.as_deref(), Some("4b0588"));
        assert_eq!(
            record.address.as_deref(),
            Some("Connaught Place, New Delhi 110001")
        );
        assert_eq!(
            record.categories,
            Some(vec!["Coffee Shop".to_string(), "Café".to_string()])
        );
        assert_eq!(record.chain.as_deref(), Some("Blue Tokai"));
        assert!(record.distance_km.is_none());
    }

    #[test]
    fn address_falls_back_to_joined_parts() {
        let location = PlaceLocation {
            address: Some("N-Block".to_string()),
            locality: Some("New Delhi".to_string()),
            region: Some(String::new()),
            postcode: None,
            country: Some("IN".to_string()),
            ..PlaceLocation::default()
        };
        assert_eq!(
            format_address(&location).as_deref(),
            Some("N-Block, New Delhi, IN")
        );
    }

    #[test]
    fn empty_location_yields_no_address() {
        assert!(format_address(&PlaceLocation::default()).is_none());
    }

    #[test]
    fn missing_categories_and_chains_stay_absent() {
        let record = normalize_place(detail_from(serde_json::json!({
            "fsq_place_id": "x",
            "categories": [{ "id": 1 }],
            "chains": []
        })));
        assert!(record.categories.is_none());
        assert!(record.chain.is_none());
    }
}
