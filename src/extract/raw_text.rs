use super::{Collected, ListingExtractor, Page};
use crate::models::Listing;

pub(super) fn from_raw_urls(extractor: &ListingExtractor, page: &Page<'_>) -> Vec<Listing> {
    let mut collected = Collected::default();

    for found in extractor.rules.raw_url.find_iter(page.raw) {
        let raw = found.as_str();
        let has_scheme = raw
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http"));
        let link = if has_scheme {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };

        let external_id = extractor.rules.extract_id(&link);
        collected.push(Listing {
            external_id,
            price: String::new(),
            location: String::new(),
            link,
        });
    }

    collected.into_listings()
}
