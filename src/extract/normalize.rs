//! Text and link normalisation shared by every extraction strategy.

use crate::scrapers::Site;
use regex::Regex;

/// Path segments that may sit between the host and a listing number,
/// e.g. `/hirdetes/12345`
pub const LISTING_PATH_PREFIXES: [&str; 2] = ["hirdetes", "ingatlan"];

/// Collapse every whitespace run to a single space and trim.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve `href` against the site origin.
pub fn to_absolute_link(href: &str, site: &Site) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    if let Some(rest) = href.strip_prefix("//") {
        let scheme = site.origin.split("://").next().unwrap_or("https");
        return format!("{}://{}", scheme, rest);
    }

    if href.starts_with('/') {
        return format!("{}{}", site.origin, href);
    }

    format!("{}/{}", site.origin, href)
}

/// Host-specific patterns for recognising listing links
#[derive(Debug)]
pub struct LinkRules {
    pub site: Site,
    absolute_id: Regex,
    relative_id: Regex,
    listing_path: Regex,
    pub(crate) raw_url: Regex,
}

impl LinkRules {
    pub fn new(site: Site) -> Result<Self, regex::Error> {
        let host = regex::escape(&site.host);
        let prefixes = LISTING_PATH_PREFIXES.join("|");

        let absolute_id = Regex::new(&format!(
            r"(?i)(?:^|//|\.){host}(?::\d+)?/(?:(?:{prefixes})/)?(\d+)(?:[/?#]|$)"
        ))?;
        let relative_id = Regex::new(r"^/?(\d+)")?;
        let listing_path = Regex::new(&format!(r"^/(?:(?:{prefixes})/)?\d+(?:/|$)"))?;
        let raw_url = Regex::new(&format!(
            r"(?i)\b(?:https?://)?(?:www\.)?{host}(?::\d+)?/(?:(?:{prefixes})/)?\d+\b"
        ))?;

        Ok(Self {
            site,
            absolute_id,
            relative_id,
            listing_path,
            raw_url,
        })
    }

    /// Derive the site's listing identifier from a link, or `""` if none.
    pub fn extract_id(&self, link: &str) -> String {
        let link = link.trim();

        if let Some(caps) = self.absolute_id.captures(link) {
            return caps[1].to_string();
        }

        if link.contains("://") {
            return String::new();
        }

        self.relative_id
            .captures(link)
            .map(|caps| caps[1].to_string())
            .unwrap_or_default()
    }

    /// Whether an absolute URL points at a listing page on this site
    pub fn is_listing_url(&self, link: &str) -> bool {
        let Ok(url) = url::Url::parse(link) else {
            return false;
        };

        let host = url.host_str().unwrap_or_default();
        let host = host.strip_prefix("www.").unwrap_or(host);

        host.eq_ignore_ascii_case(&self.site.host) && self.listing_path.is_match(url.path())
    }

    /// Link used when a listing only carries an identifier
    pub fn link_for_id(&self, external_id: &str) -> String {
        format!("{}/{}", self.site.origin, external_id)
    }
}
