use super::attributes::container_text;
use super::normalize::to_absolute_link;
use super::{Collected, ListingExtractor, Page};
use crate::models::Listing;
use scraper::ElementRef;

const CONTAINER_TAGS: [&str; 4] = ["article", "section", "li", "div"];

pub(super) fn from_listing_anchors(extractor: &ListingExtractor, page: &Page<'_>) -> Vec<Listing> {
    let mut collected = Collected::default();

    for anchor in page.document.select(&extractor.anchor) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        let link = to_absolute_link(href, &extractor.rules.site);
        if !extractor.rules.is_listing_url(&link) {
            continue;
        }

        let external_id = extractor.rules.extract_id(&link);
        if external_id.is_empty() {
            continue;
        }

        let text = container_text(closest_container(anchor).unwrap_or(anchor));
        let price = extractor
            .price_compact
            .find(&text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        collected.push(Listing {
            external_id,
            price,
            location: String::new(),
            link,
        });
    }

    collected.into_listings()
}

fn closest_container(anchor: ElementRef<'_>) -> Option<ElementRef<'_>> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| CONTAINER_TAGS.contains(&element.value().name()))
}
