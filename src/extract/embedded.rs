use super::normalize::{normalize_text, to_absolute_link};
use super::{Collected, ListingExtractor, Page};
use crate::models::Listing;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

pub(super) const EMBEDDED_DATA_SELECTOR: &str = "script#__NEXT_DATA__";

/// Any of these marks an object as a listing
const ID_KEYS: [&str; 4] = ["listingId", "listing_id", "adId", "adid"];
const PRICE_KEYS: [&str; 3] = ["priceText", "formattedPrice", "price"];
const LOCATION_KEYS: [&str; 4] = ["address", "location", "locationName", "city"];
const AREA_KEYS: [&str; 3] = ["areaSize", "area", "size"];
const LINK_KEYS: [&str; 4] = ["url", "link", "detailsUrl", "href"];

pub(super) fn from_embedded_data(extractor: &ListingExtractor, page: &Page<'_>) -> Vec<Listing> {
    let mut collected = Collected::default();

    for script in page.document.select(&extractor.embedded_data) {
        let json_text = script.text().collect::<String>();
        let data: Value = match serde_json::from_str(&json_text) {
            Ok(data) => data,
            Err(e) => {
                debug!(error = %e, "Ignoring malformed embedded data");
                continue;
            }
        };

        let mut visited = HashSet::new();
        let mut nodes = Vec::new();
        collect_listing_nodes(&data, &mut visited, &mut nodes);
        debug!("Found {} listing nodes in embedded data", nodes.len());

        for node in nodes {
            if let Some(listing) = listing_from_node(extractor, node) {
                collected.push(listing);
            }
        }
    }

    collected.into_listings()
}

/// Depth-first walk collecting objects that carry a listing id. Matched
/// objects are not searched further.
fn collect_listing_nodes<'a>(
    node: &'a Value,
    visited: &mut HashSet<*const Value>,
    out: &mut Vec<&'a Map<String, Value>>,
) {
    if !visited.insert(node as *const Value) {
        return;
    }

    match node {
        Value::Object(map) => {
            if ID_KEYS.iter().any(|key| scalar_text(map.get(*key)).is_some()) {
                out.push(map);
                return;
            }
            for child in map.values() {
                collect_listing_nodes(child, visited, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_listing_nodes(item, visited, out);
            }
        }
        _ => {}
    }
}

/// String or number rendered as normalised text; `None` when blank
fn scalar_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => normalize_text(s),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn first_field(node: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| scalar_text(node.get(*key)))
}

fn first_field_with_unit(node: &Map<String, Value>, keys: &[&str], unit: &str) -> Option<String> {
    keys.iter().find_map(|key| match node.get(*key)? {
        Value::Number(n) => Some(format!("{} {}", n, unit)),
        other => scalar_text(Some(other)),
    })
}

fn listing_from_node(extractor: &ListingExtractor, node: &Map<String, Value>) -> Option<Listing> {
    let external_id = first_field(node, &ID_KEYS)?;

    let price = first_field_with_unit(node, &PRICE_KEYS, "Ft").unwrap_or_default();

    let place = first_field(node, &LOCATION_KEYS);
    let area = first_field_with_unit(node, &AREA_KEYS, "m²");
    let location = match (place, area) {
        (Some(place), Some(area)) => format!("{}, {}", place, area),
        (Some(place), None) => place,
        (None, Some(area)) => area,
        (None, None) => String::new(),
    };

    let link = match first_field(node, &LINK_KEYS) {
        Some(href) => to_absolute_link(&href, &extractor.rules.site),
        None => extractor.rules.link_for_id(&external_id),
    };

    Some(Listing {
        external_id,
        price,
        location,
        link,
    })
}
