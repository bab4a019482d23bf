pub mod http;

use crate::error::FetchError;

pub use http::HttpFetcher;

/// Source of documents for the pipeline.
///
/// Everything the scraper downloads, the sitemap and every page, goes through
/// this trait so the network can be swapped out.
pub trait PageFetcher: Send + Sync {
    /// Retrieve the body of `url` as text.
    ///
    /// Non-2xx responses must be reported as [`FetchError::Status`].
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}
