//! Scrape the pages listed in a website's sitemap.
//!
//! A run resolves the sitemap location, parses its `<url><loc>` entries,
//! optionally narrows them, extracts title, meta description and paragraph
//! text from each page, and saves the records as JSON, text or XML.

pub mod config;
pub mod error;
pub mod fetchers;
pub mod filter;
pub mod parsers;
pub mod pipeline;
pub mod prompt;
pub mod reporter;
pub mod results;
pub mod sitemap;
pub mod utils;
pub mod writers;

// Re-export commonly used types for convenience
pub use config::ScrapeConfig;
pub use error::{FetchError, ScrapeError};
pub use fetchers::{HttpFetcher, PageFetcher};
pub use filter::Selection;
pub use pipeline::{Abort, Pipeline, RunOutcome, SelectionPolicy};
pub use results::{PageRecord, ScrapedCollection};
pub use writers::{OutputFormat, ResultWriter};
