use serde::{Deserialize, Serialize};

/// Placeholder used when a page has no usable `<title>`
pub const NO_TITLE: &str = "No Title";

/// Placeholder used when a page has no usable meta description
pub const NO_META_DESCRIPTION: &str = "No Meta Description";

/// Extracted data for a single scraped page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// URL of the page, as listed in the sitemap
    pub url: String,

    /// Text of the page title, or [`NO_TITLE`]
    pub title: String,

    /// Content of the description meta tag, or [`NO_META_DESCRIPTION`]
    pub meta_description: String,

    /// Paragraph text joined by single spaces
    pub content: String,
}

impl PageRecord {
    /// Create a new page record, substituting placeholders for missing fields
    pub fn new(
        url: String,
        title: Option<String>,
        meta_description: Option<String>,
        content: String,
    ) -> Self {
        Self {
            url,
            title: title.unwrap_or_else(|| NO_TITLE.to_string()),
            meta_description: meta_description.unwrap_or_else(|| NO_META_DESCRIPTION.to_string()),
            content,
        }
    }
}

/// Records produced by one run, in the order their URLs were processed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedCollection {
    pub records: Vec<PageRecord>,

    /// Number of selected URLs that could not be scraped
    pub skipped: usize,
}

impl ScrapedCollection {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of URLs the run attempted
    pub fn attempted(&self) -> usize {
        self.records.len() + self.skipped
    }
}
