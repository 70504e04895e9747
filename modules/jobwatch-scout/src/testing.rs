// Test mocks for the job check cycle.
//
// Three mocks matching the three trait boundaries:
// - MockFetcher (FeedFetcher): HashMap-based URL -> feed body or error
// - RecordingBackend (NotifyBackend): records messages, optionally fails some
// - MemoryStore (SeenJobStore): in-memory seen-set that counts saves
//
// Plus builders for RSS documents.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use jobwatch_common::{JobWatchError, Result, SeenJobSet};

use crate::notify::backend::NotifyBackend;
use crate::pipeline::fetcher::FeedFetcher;
use crate::store::SeenJobStore;

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

enum MockResponse {
    Body(Vec<u8>),
    Timeout,
    Status(u16),
    Panic,
}

/// Returns `Transport` errors for unregistered URLs.
pub struct MockFetcher {
    responses: HashMap<String, MockResponse>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on_feed(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .insert(url.to_string(), MockResponse::Body(body.into()));
        self
    }

    pub fn on_timeout(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), MockResponse::Timeout);
        self
    }

    pub fn on_status(mut self, url: &str, status: u16) -> Self {
        self.responses
            .insert(url.to_string(), MockResponse::Status(status));
        self
    }

    /// Fetching `url` panics, taking the whole cycle down with it.
    pub fn on_panic(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), MockResponse::Panic);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(MockResponse::Body(body)) => Ok(body.clone()),
            Some(MockResponse::Timeout) => Err(JobWatchError::TransportTimeout {
                url: url.to_string(),
            }),
            Some(MockResponse::Status(status)) => Err(JobWatchError::Transport {
                url: url.to_string(),
                message: format!("HTTP {status}"),
            }),
            Some(MockResponse::Panic) => panic!("mock fetcher panicked on {url}"),
            None => Err(JobWatchError::Transport {
                url: url.to_string(),
                message: "no mock registered".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingBackend
// ---------------------------------------------------------------------------

/// Records every delivered message. Messages containing a registered
/// marker fail instead.
pub struct RecordingBackend {
    sent: Mutex<Vec<String>>,
    fail_markers: Vec<String>,
    fail_all: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_markers: Vec::new(),
            fail_all: false,
        }
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_markers.push(marker.to_string());
        self
    }

    pub fn failing_always(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotifyBackend for RecordingBackend {
    async fn send(&self, message: &str) -> anyhow::Result<()> {
        if self.fail_all || self.fail_markers.iter().any(|m| message.contains(m.as_str())) {
            anyhow::bail!("recording backend refused message");
        }
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

pub struct MemoryStore {
    seen: Mutex<SeenJobSet>,
    saves: AtomicUsize,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_ids(&[])
    }

    pub fn with_ids(ids: &[&str]) -> Self {
        Self {
            seen: Mutex::new(ids.iter().map(|s| s.to_string()).collect()),
            saves: AtomicUsize::new(0),
            fail_saves: false,
        }
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn seen(&self) -> SeenJobSet {
        self.seen.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeenJobStore for MemoryStore {
    async fn load(&self) -> SeenJobSet {
        self.seen()
    }

    async fn save(&self, seen: &SeenJobSet) -> Result<()> {
        if self.fail_saves {
            return Err(JobWatchError::Persistence("disk full".to_string()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.seen.lock().unwrap() = seen.clone();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Feed builders
// ---------------------------------------------------------------------------

/// One RSS `<item>`. `guid` of `None` leaves the id to fall back to the link.
pub fn rss_item(guid: Option<&str>, title: &str, link: &str, description: Option<&str>) -> String {
    let mut item = format!("<item><title>{}</title><link>{}</link>", xml_escape(title), xml_escape(link));
    if let Some(guid) = guid {
        item.push_str(&format!("<guid>{}</guid>", xml_escape(guid)));
    }
    if let Some(description) = description {
        item.push_str(&format!("<description>{}</description>", xml_escape(description)));
    }
    item.push_str("</item>");
    item
}

/// An RSS 2.0 document wrapping `items` in the given (feed) order.
pub fn rss_feed(items: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Jobs</title><link>https://jobs.example</link><description>test</description>{}</channel></rss>"#,
        items.concat()
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
