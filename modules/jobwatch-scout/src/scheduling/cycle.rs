use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use jobwatch_common::{Result, SeenJobSet};

use crate::notify::Notifier;
use crate::pipeline::details::extract_details;
use crate::pipeline::fetcher::FeedFetcher;
use crate::pipeline::filter::{KeywordFilter, Verdict};
use crate::pipeline::formatter::format_message;
use crate::pipeline::parser::parse_feed;
use crate::pipeline::sanitizer::sanitize_feed;
use crate::sources::FeedTarget;
use crate::store::SeenJobStore;

/// Pause after each successful delivery to stay under the chat API rate limit.
pub const MESSAGE_DELAY: Duration = Duration::from_secs(2);

/// Counters for one pass over every feed target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub targets: usize,
    pub targets_failed: usize,
    pub malformed_feeds: usize,
    pub entries_seen: usize,
    pub already_seen: usize,
    pub irrelevant: usize,
    pub notified: usize,
    pub delivery_failures: usize,
    pub store_written: bool,
}

impl fmt::Display for CycleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "targets={} failed={} malformed={} entries={} seen={} irrelevant={} notified={} delivery_failures={} store_written={}",
            self.targets,
            self.targets_failed,
            self.malformed_feeds,
            self.entries_seen,
            self.already_seen,
            self.irrelevant,
            self.notified,
            self.delivery_failures,
            self.store_written,
        )
    }
}

/// Runs check cycles: load the seen-set, walk every feed target, deliver new
/// relevant jobs, and persist the seen-set if anything was delivered.
pub struct JobChecker {
    fetcher: Arc<dyn FeedFetcher>,
    notifier: Notifier,
    store: Arc<dyn SeenJobStore>,
    targets: Vec<FeedTarget>,
    filter: KeywordFilter,
    message_delay: Duration,
}

impl JobChecker {
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        notifier: Notifier,
        store: Arc<dyn SeenJobStore>,
        targets: Vec<FeedTarget>,
        filter: KeywordFilter,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            store,
            targets,
            filter,
            message_delay: MESSAGE_DELAY,
        }
    }

    pub fn with_message_delay(mut self, delay: Duration) -> Self {
        self.message_delay = delay;
        self
    }

    pub async fn run_cycle(&self) -> CycleStats {
        info!(targets = self.targets.len(), "Starting new job check cycle");

        let mut seen = self.store.load().await;
        let mut stats = CycleStats {
            targets: self.targets.len(),
            ..Default::default()
        };

        for target in &self.targets {
            if let Err(e) = self.check_target(target, &mut seen, &mut stats).await {
                stats.targets_failed += 1;
                if e.is_timeout() {
                    error!(source = target.label.as_str(), url = target.url.as_str(), "Timeout fetching feed. The server took too long to respond");
                } else {
                    error!(
                    source = target.label.as_str(),
                    keyword = target.keyword.as_deref(),
                    error = %e,
                    "Failed to check feed"
                );
                }
            }
        }

        if stats.notified > 0 {
            match self.store.save(&seen).await {
                Ok(()) => {
                    stats.store_written = true;
                    info!(notified = stats.notified, "New jobs found and sent. Seen-jobs store updated");
                }
                Err(e) => {
                    error!(error = %e, "Failed to save seen jobs; deliveries this cycle may repeat");
                }
            }
        } else {
            info!("No new jobs found in this cycle");
        }

        info!("Job check cycle complete. {stats}");
        stats
    }

    /// One (source, keyword) pair. Errors abort only this pair.
    async fn check_target(
        &self,
        target: &FeedTarget,
        seen: &mut SeenJobSet,
        stats: &mut CycleStats,
    ) -> Result<()> {
        debug!(
            source = target.label.as_str(),
            keyword = target.keyword.as_deref(),
            url = target.url.as_str(),
            "Fetching feed"
        );
        let raw = self.fetcher.fetch(&target.url).await?;

        let parsed = parse_feed(&sanitize_feed(&raw));
        if let Some(reason) = &parsed.bozo {
            stats.malformed_feeds += 1;
            warn!(
                source = target.label.as_str(),
                recovered = parsed.entries.len(),
                reason = reason.as_str(),
                "Malformed feed data"
            );
        }
        stats.entries_seen += parsed.entries.len();

        // Feeds list newest first; deliver oldest first so the chat reads chronologically.
        for entry in parsed.entries.iter().rev() {
            match self.filter.evaluate(entry, seen) {
                Verdict::AlreadySeen => {
                    stats.already_seen += 1;
                    continue;
                }
                Verdict::Irrelevant => {
                    stats.irrelevant += 1;
                    debug!(title = entry.title.as_str(), "Skipping entry without a keyword in its title");
                    continue;
                }
                Verdict::Deliver => {}
            }

            let details = entry
                .summary
                .as_deref()
                .map(extract_details)
                .unwrap_or_default();
            let message = format_message(entry, &details);

            if self.notifier.deliver(&message).await {
                seen.insert(entry.id.clone());
                stats.notified += 1;
                info!(source = target.label.as_str(), job_id = entry.id.as_str(), title = entry.title.as_str(), "Delivered job");
                if !self.message_delay.is_zero() {
                    tokio::time::sleep(self.message_delay).await;
                }
            } else {
                stats.delivery_failures += 1;
            }
        }

        Ok(())
    }
}
