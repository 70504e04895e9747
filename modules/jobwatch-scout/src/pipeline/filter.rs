use jobwatch_common::{FeedEntry, SeenJobSet};

/// Outcome of checking one entry against the keyword list and the seen-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Novel and relevant: should be delivered.
    Deliver,
    AlreadySeen,
    /// No keyword in the title.
    Irrelevant,
}

/// Case-insensitive keyword match against entry titles.
///
/// Applied locally even for sources whose query URL is already keyword-scoped.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
    enabled: bool,
}

impl KeywordFilter {
    pub fn new<S: AsRef<str>>(keywords: &[S], enabled: bool) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            enabled,
        }
    }

    /// A filter that accepts every entry.
    pub fn disabled() -> Self {
        Self {
            keywords: Vec::new(),
            enabled: false,
        }
    }

    /// First keyword contained in the title, if any.
    pub fn matched_keyword(&self, entry: &FeedEntry) -> Option<&str> {
        let title = entry.title.to_lowercase();
        self.keywords
            .iter()
            .find(|k| title.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn is_relevant(&self, entry: &FeedEntry) -> bool {
        !self.enabled || self.matched_keyword(entry).is_some()
    }

    /// Novelty is checked first so already-delivered jobs never count as irrelevant.
    pub fn evaluate(&self, entry: &FeedEntry, seen: &SeenJobSet) -> Verdict {
        if !is_novel(entry, seen) {
            Verdict::AlreadySeen
        } else if !self.is_relevant(entry) {
            Verdict::Irrelevant
        } else {
            Verdict::Deliver
        }
    }
}

pub fn is_novel(entry: &FeedEntry, seen: &SeenJobSet) -> bool {
    !seen.contains(&entry.id)
}
