use crate::error::SelectionError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Which sitemap URLs a run should scrape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Keep at most this many URLs (after extension filtering)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<usize>,

    /// File extensions to skip, without the leading dot
    #[serde(default)]
    pub excluded_extensions: Vec<String>,
}

impl Selection {
    /// Selection that keeps every URL
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    pub fn with_excluded_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_extensions = normalize_extensions(extensions);
        self
    }

    /// Check the requested count against the number of sitemap URLs
    pub fn validate(&self, total: usize) -> Result<(), SelectionError> {
        match self.max_count {
            Some(requested) => validate_max_count(requested, total).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Drop excluded extensions, then keep the first `max_count` URLs
    pub fn apply(&self, urls: Vec<String>) -> Vec<String> {
        let filter = UrlFilter::new(self.excluded_extensions.as_slice());
        let mut selected: Vec<String> = urls
            .into_iter()
            .filter(|url| {
                let keep = filter.should_scrape(url);
                if !keep {
                    ::log::debug!("Skipping excluded URL: {}", url);
                }
                keep
            })
            .collect();

        if let Some(max_count) = self.max_count {
            selected.truncate(max_count);
        }
        selected
    }
}

/// Accept a requested page count only if it lies in `1..=total`
pub fn validate_max_count(requested: usize, total: usize) -> Result<usize, SelectionError> {
    if (1..=total).contains(&requested) {
        Ok(requested)
    } else {
        Err(SelectionError::OutOfRange { requested, total })
    }
}

/// Clean up operator-supplied extension tokens.
///
/// Tokens are trimmed and lower-cased, a leading dot is removed, and blanks
/// are dropped, so `" .PDF, jpg,,"` becomes `["pdf", "jpg"]`.
pub fn normalize_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|ext| {
            ext.as_ref()
                .trim()
                .trim_start_matches('.')
                .to_lowercase()
        })
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Split a comma-separated extension list as typed at a prompt or flag
pub fn parse_extension_list(input: &str) -> Vec<String> {
    normalize_extensions(input.split(','))
}

/// Rejects URLs whose path ends in one of a set of file extensions
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    exclude_regex: Option<Regex>,
}

impl UrlFilter {
    /// Build a filter excluding the given extensions (case-insensitive)
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        let extensions = normalize_extensions(extensions);
        if extensions.is_empty() {
            return Self::default();
        }

        let alternatives = extensions
            .iter()
            .map(|ext| regex::escape(ext))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"(?i)\.(?:{})$", alternatives);

        // Every token is escaped, so the pattern is always valid
        let exclude_regex = Regex::new(&pattern).ok();
        ::log::debug!("Excluding URLs matching {}", pattern);

        Self { exclude_regex }
    }

    /// Whether `url` survives the extension exclusion
    pub fn should_scrape(&self, url: &str) -> bool {
        let Some(regex) = &self.exclude_regex else {
            return true;
        };

        match Url::parse(url) {
            Ok(parsed) => !regex.is_match(parsed.path()),
            Err(_) => !regex.is_match(url),
        }
    }
}
