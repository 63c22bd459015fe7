use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::parser::text::{normalize, text};

pub const BASE_URL: &str = "https://www.bbc.co.uk";

static ENTRY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2.programme__titles").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static SPAN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
static CLASSIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Classic Desert Island Discs:").unwrap());

/// One castaway as shown on an episode listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub job: String,
    pub url: String,
}

/// Every usable entry on a listing page, in page order.
pub fn parse_listing(html: &str) -> Vec<ListingEntry> {
    let doc = Html::parse_document(html);
    doc.root_element()
        .select(&ENTRY_SEL)
        .filter_map(parse_entry)
        .collect()
}

/// Name, job and episode link of one listing entry. Entries without a link or
/// without a recoverable name or job are logged and skipped.
///
/// ```text
/// <h2 class="programme__titles"><a href="https://www.bbc.co.uk/programmes/m000cyvf">
///   <span class="programme__title gamma"><span>Rupert Everett, actor</span></span></a></h2>
/// ```
pub fn parse_entry(entry: ElementRef) -> Option<ListingEntry> {
    let Some(link) = entry.select(&LINK_SEL).next() else {
        warn!(entry = %entry.html(), "Invalid castaway entry: no link");
        return None;
    };
    let href = link.value().attr("href").unwrap_or_default().trim();
    if href.is_empty() {
        warn!(entry = %entry.html(), "Invalid castaway entry: empty link");
        return None;
    }
    let url = absolute_url(href);

    let label = entry.select(&SPAN_SEL).next().map(text).unwrap_or_default();
    let (name, job) = name_and_job(&label);
    if name.is_empty() && job.is_empty() {
        warn!(%url, "No name and job");
        return None;
    }

    Some(ListingEntry { name, job, url })
}

/// Split "Rupert Everett, actor" into name and job. The classic-episode prefix
/// is dropped from the name.
pub fn name_and_job(label: &str) -> (String, String) {
    let mut parts = label.split(", ");
    let name = parts.next().unwrap_or_default().trim();
    let name = CLASSIC_RE.replace(name, "");
    let job = parts.collect::<Vec<_>>().join(", ");
    (normalize(&name), normalize(&job))
}

fn absolute_url(href: &str) -> String {
    if href.starts_with('/') {
        format!("{}{}", BASE_URL, href)
    } else {
        href.to_string()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/listing.html").unwrap();
        let entries = parse_listing(&html);
        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries[0],
            ListingEntry {
                name: "Rupert Everett".into(),
                job: "actor".into(),
                url: "https://www.bbc.co.uk/programmes/m000cyvf".into(),
            }
        );
        assert_eq!(entries[1].name, "Freddie Flintoff");
        assert_eq!(entries[1].job, "");
        assert_eq!(entries[1].url, "https://www.bbc.co.uk/programmes/b0b7d63p");
        assert_eq!(entries[2].job, "writer, conservationist");
        // the same castaway twice is two entries
        assert_eq!(entries[3].name, "Rupert Everett");
        assert_ne!(entries[3].url, entries[0].url);
    }

    #[test]
    fn splits_name_and_job() {
        assert_eq!(
            name_and_job("Isabella Tree, writer and conservationist"),
            ("Isabella Tree".to_string(), "writer and conservationist".to_string())
        );
        assert_eq!(
            name_and_job("Classic Desert Island Discs: Leo McKern"),
            ("Leo McKern".to_string(), String::new())
        );
        assert_eq!(name_and_job(""), (String::new(), String::new()));
    }
}
