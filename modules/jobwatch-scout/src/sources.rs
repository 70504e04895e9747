/// Placeholder in a URL template replaced by the url-encoded keyword.
pub const KEYWORD_PLACEHOLDER: &str = "{}";

pub const NHS_JOBS_URL: &str = "https://www.jobs.nhs.uk/candidate/search/results?keyword={}&field=title&location=UK&sort=publicationDate&jobPostType=all&payBand=all&workArrangement=all&rss=1";
pub const HEALTHJOBSUK_URL: &str = "https://www.healthjobsuk.com/rss/jobs?job_title={}";

/// A named job board feed. Templates containing `{}` are queried once per
/// keyword; anything else is a single static feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub url_template: String,
}

/// One fetchable URL produced from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTarget {
    /// Human label for logs, e.g. `NHS Jobs ('FY1')`.
    pub label: String,
    pub url: String,
    pub keyword: Option<String>,
}

impl FeedSource {
    pub fn new(name: &str, url_template: &str) -> Self {
        Self {
            name: name.to_string(),
            url_template: url_template.to_string(),
        }
    }

    pub fn is_keyword_scoped(&self) -> bool {
        self.url_template.contains(KEYWORD_PLACEHOLDER)
    }

    pub fn targets<S: AsRef<str>>(&self, keywords: &[S]) -> Vec<FeedTarget> {
        if !self.is_keyword_scoped() {
            return vec![FeedTarget {
                label: self.name.clone(),
                url: self.url_template.clone(),
                keyword: None,
            }];
        }

        keywords
            .iter()
            .map(|k| {
                let keyword = k.as_ref();
                FeedTarget {
                    label: format!("{} ('{}')", self.name, keyword),
                    url: self
                        .url_template
                        .replace(KEYWORD_PLACEHOLDER, &encode_keyword(keyword)),
                    keyword: Some(keyword.to_string()),
                }
            })
            .collect()
    }
}

pub fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new("NHS Jobs", NHS_JOBS_URL),
        FeedSource::new("HealthJobsUK", HEALTHJOBSUK_URL),
    ]
}

/// Every (source, keyword) URL for one cycle. Keyword-major: each keyword is
/// queried against every source before moving on. Static sources appear once,
/// after the keyword-scoped ones.
pub fn cycle_targets<S: AsRef<str>>(sources: &[FeedSource], keywords: &[S]) -> Vec<FeedTarget> {
    let (scoped, fixed): (Vec<&FeedSource>, Vec<&FeedSource>) =
        sources.iter().partition(|s| s.is_keyword_scoped());

    let mut targets: Vec<FeedTarget> = keywords
        .iter()
        .flat_map(|k| {
            let keyword = [k.as_ref()];
            scoped
                .iter()
                .flat_map(|s| s.targets(&keyword))
                .collect::<Vec<_>>()
        })
        .collect();
    targets.extend(fixed.iter().flat_map(|s| s.targets(keywords)));
    targets
}

/// Percent-encode a query value with spaces as `%20`.
/// `byte_serialize` emits `+` for a space and `%2B` for a literal plus, so the swap is exact.
fn encode_keyword(keyword: &str) -> String {
    url::form_urlencoded::byte_serialize(keyword.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
