use super::normalize::{normalize_text, to_absolute_link};
use super::{Collected, ListingExtractor, Page};
use crate::models::Listing;
use scraper::ElementRef;

/// Attributes that mark a listing container and carry its id
const ID_ATTRIBUTES: [&str; 4] = ["data-listing-id", "data-id", "data-ad-id", "data-adid"];

pub(super) const CONTAINER_SELECTORS: [&str; 4] =
    ["[data-listing-id]", "[data-id]", "[data-ad-id]", "[data-adid]"];

pub(super) const PRICE_SELECTORS: [&str; 5] = [
    "[data-testid='listing-price']",
    "[data-test='listing-price']",
    "[data-testid='price']",
    ".price",
    "[class*='price']",
];

pub(super) const LOCATION_SELECTORS: [&str; 5] = [
    "[data-testid='listing-location']",
    "[data-test='listing-location']",
    ".listing__address",
    ".address",
    "[class*='location']",
];

pub(super) fn from_attribute_containers(
    extractor: &ListingExtractor,
    page: &Page<'_>,
) -> Vec<Listing> {
    let mut collected = Collected::default();

    for container_selector in &extractor.containers {
        for container in page.document.select(container_selector) {
            if let Some(listing) = listing_from_container(extractor, container) {
                collected.push(listing);
            }
        }
    }

    collected.into_listings()
}

fn listing_from_container(extractor: &ListingExtractor, container: ElementRef<'_>) -> Option<Listing> {
    let raw_id = ID_ATTRIBUTES
        .iter()
        .filter_map(|name| container.value().attr(name))
        .map(str::trim)
        .find(|id| !id.is_empty())
        .unwrap_or_default();

    let href = container
        .select(&extractor.anchor)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(|href| to_absolute_link(href, &extractor.rules.site))
        .unwrap_or_default();

    let external_id = if raw_id.is_empty() {
        extractor.rules.extract_id(&href)
    } else {
        raw_id.to_string()
    };

    if external_id.is_empty() {
        return None;
    }

    let link = if href.is_empty() {
        extractor.rules.link_for_id(&external_id)
    } else {
        href
    };

    Some(Listing {
        price: extract_price(extractor, container),
        location: extract_location(extractor, container),
        external_id,
        link,
    })
}

fn field_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<String>())
}

/// Text of the whole element, with a space between text nodes
pub(super) fn container_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<Vec<_>>().join(" "))
}

fn extract_price(extractor: &ListingExtractor, container: ElementRef<'_>) -> String {
    for selector in &extractor.price_selectors {
        if let Some(element) = container.select(selector).next() {
            let text = field_text(element);
            if !text.is_empty() && extractor.price_hint.is_match(&text) {
                return text;
            }
        }
    }

    let text = container_text(container);
    extractor
        .price_fallback
        .find(&text)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn extract_location(extractor: &ListingExtractor, container: ElementRef<'_>) -> String {
    for selector in &extractor.location_selectors {
        if let Some(element) = container.select(selector).next() {
            let text = field_text(element);
            if !text.is_empty() {
                return text;
            }
        }
    }

    let text = container_text(container);
    extractor
        .district
        .find(&text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::super::test_extractor;
    use super::*;

    #[test]
    fn price_and_location_from_selectors() {
        let html = r#"
            <div data-listing-id="12345">
              <a href="/hirdetes/12345">Eladó lakás</a>
              <span data-testid="listing-price">  1 200
                000  Ft </span>
              <div class="listing__address">Budapest, VI. kerület, Andrássy út</div>
            </div>
        "#;

        let listings = test_extractor().extract(html);

        assert_eq!(
            listings,
            vec![Listing {
                external_id: "12345".to_string(),
                price: "1 200 000 Ft".to_string(),
                location: "Budapest, VI. kerület, Andrássy út".to_string(),
                link: "https://ingatlan.com/hirdetes/12345".to_string(),
            }]
        );
    }

    #[test]
    fn selector_order_decides_between_candidates() {
        let html = r#"
            <article data-ad-id="1">
              <span class="card-price">99 999 Ft</span>
              <span class="price">54 M Ft</span>
              <p class="card-location">Szeged</p>
              <p class="address">Debrecen</p>
            </article>
        "#;

        let listings = test_extractor().extract(html);

        assert_eq!(listings[0].price, "54 M Ft");
        assert_eq!(listings[0].location, "Debrecen");
    }

    #[test]
    fn price_selector_without_digits_is_skipped() {
        let html = r#"
            <div data-id="9">
              <span class="price">Ár megegyezés szerint</span>
              <p>Irányár: 32 500 000 Ft</p>
            </div>
        "#;

        let listings = test_extractor().extract(html);

        assert_eq!(listings[0].price, "32 500 000 Ft");
    }

    #[test]
    fn regex_fallbacks_over_container_text() {
        let html = r#"
            <div data-adid="77">
              <a href="https://ingatlan.com/77">Tégla lakás</a>
              <p>Budapest XI. kerület</p><p>48 900 000 Ft</p>
            </div>
        "#;

        let listings = test_extractor().extract(html);

        assert_eq!(listings[0].price, "48 900 000 Ft");
        assert_eq!(listings[0].location, "Budapest XI. kerület");
    }

    #[test]
    fn price_fallback_needs_a_number_before_currency() {
        let html = r#"<div data-id="5"><a href="/5">x</a><p>Ár: 45 millió Ft</p></div>"#;

        let listings = test_extractor().extract(html);

        assert_eq!(listings[0].external_id, "5");
        assert_eq!(listings[0].price, "");
    }

    #[test]
    fn id_from_anchor_when_attribute_is_blank() {
        let html = r#"<div data-listing-id=" "><a href="/hirdetes/4321">Lakás</a></div>"#;

        let listings = test_extractor().extract(html);

        assert_eq!(listings[0].external_id, "4321");
        assert_eq!(listings[0].link, "https://ingatlan.com/hirdetes/4321");
    }

    #[test]
    fn link_synthesised_without_anchor() {
        let html = r#"<div data-listing-id="555"><span class="price">20 M Ft</span></div>"#;

        let listings = test_extractor().extract(html);

        assert_eq!(listings[0].link, "https://ingatlan.com/555");
        assert_eq!(listings[0].price, "20 M Ft");
        assert_eq!(listings[0].location, "");
    }
}
