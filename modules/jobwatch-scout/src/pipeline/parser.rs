use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use jobwatch_common::FeedEntry;

static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<item\b.*?</item>").expect("valid regex"));
static ATOM_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<entry\b.*?</entry>").expect("valid regex"));
static XMLNS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bxmlns(?::[\w.-]+)?\s*=\s*"[^"]*""#).expect("valid regex"));

/// Entries recovered from one feed document, in feed order.
#[derive(Debug, Default)]
pub struct ParsedFeed {
    pub entries: Vec<FeedEntry>,
    /// Set when the document was malformed and entries were recovered item by item.
    pub bozo: Option<String>,
}

impl ParsedFeed {
    pub fn is_bozo(&self) -> bool {
        self.bozo.is_some()
    }
}

/// Parse sanitized feed bytes. Never fails: a malformed document yields the
/// entries that could be salvaged plus a `bozo` description.
pub fn parse_feed(bytes: &[u8]) -> ParsedFeed {
    match parse_document(bytes) {
        Ok(entries) => ParsedFeed {
            entries,
            bozo: None,
        },
        Err(e) => {
            let reason = e.to_string();
            let entries = recover_entries(bytes);
            debug!(error = %reason, recovered = entries.len(), "Feed parse failed, recovered per item");
            ParsedFeed {
                entries,
                bozo: Some(reason),
            }
        }
    }
}

fn feed_parser() -> feed_rs::parser::Parser {
    // Feeds without a guid fall back to the first link as the entry id.
    feed_rs::parser::Builder::new()
        .id_generator(|links, _title, _uri| {
            links.first().map(|l| l.href.clone()).unwrap_or_default()
        })
        .build()
}

fn parse_document(bytes: &[u8]) -> Result<Vec<FeedEntry>, feed_rs::parser::ParseFeedError> {
    let feed = feed_parser().parse(bytes)?;
    Ok(feed.entries.into_iter().filter_map(convert_entry).collect())
}

fn convert_entry(entry: feed_rs::model::Entry) -> Option<FeedEntry> {
    let link = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
        .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))?;

    let title = entry
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty());
    let Some(title) = title else {
        debug!(link = link.as_str(), "Skipping feed entry without a title");
        return None;
    };

    let id = if entry.id.trim().is_empty() {
        link.clone()
    } else {
        entry.id.trim().to_string()
    };

    let summary = entry
        .summary
        .map(|t| t.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .filter(|s| !s.trim().is_empty());

    Some(FeedEntry {
        id,
        title,
        link,
        published_at: entry.published.or(entry.updated),
        summary,
    })
}

/// Re-parse each `<item>`/`<entry>` on its own inside a minimal envelope that
/// carries the original namespace declarations.
fn recover_entries(bytes: &[u8]) -> Vec<FeedEntry> {
    let text = String::from_utf8_lossy(bytes);

    let mut namespaces: Vec<&str> = Vec::new();
    for m in XMLNS_RE.find_iter(&text) {
        let decl = m.as_str();
        // The default namespace decides the feed flavour; the envelope sets its own.
        if !decl.starts_with("xmlns=") && !namespaces.contains(&decl) {
            namespaces.push(decl);
        }
    }
    let ns = namespaces.join(" ");

    let rss_items = ITEM_RE.find_iter(&text).map(|m| {
        format!(
            r#"<rss version="2.0" {ns}><channel><title>recovered</title>{}</channel></rss>"#,
            m.as_str()
        )
    });
    let atom_entries = ATOM_ENTRY_RE.find_iter(&text).map(|m| {
        format!(
            r#"<feed xmlns="http://www.w3.org/2005/Atom" {ns}><title>recovered</title>{}</feed>"#,
            m.as_str()
        )
    });

    let mut entries = Vec::new();
    for (idx, doc) in rss_items.chain(atom_entries).enumerate() {
        match parse_document(doc.as_bytes()) {
            Ok(mut parsed) => entries.append(&mut parsed),
            Err(e) => warn!(item = idx, error = %e, "Dropping unrecoverable feed item"),
        }
    }
    entries
}
