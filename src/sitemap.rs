use crate::error::{FetchError, ScrapeError, SitemapParseError};
use crate::fetchers::PageFetcher;
use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use url::Url;

/// Namespace of the sitemaps.org 0.9 protocol
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Path requested when the operator gives a site rather than a sitemap
pub const DEFAULT_SITEMAP_PATH: &str = "/sitemap.xml";

/// Work out which URL to request for the sitemap of `target`.
///
/// A target whose path already ends in `.xml` is used as is. Anything else is
/// treated as a site and `/sitemap.xml` is resolved against its origin, which
/// drops any path and query the operator typed.
pub fn resolve_sitemap_url(target: &str) -> Result<Url, ScrapeError> {
    let target = target.trim();
    let invalid = |reason: String| ScrapeError::InvalidTarget {
        target: target.to_string(),
        reason,
    };

    if target.is_empty() {
        return Err(invalid("no URL given".to_string()));
    }

    let url = Url::parse(target).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "unsupported scheme {:?}, expected http or https",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    if url.path().ends_with(".xml") {
        Ok(url)
    } else {
        url.join(DEFAULT_SITEMAP_PATH)
            .map_err(|e| invalid(e.to_string()))
    }
}

/// Download the raw sitemap document
pub async fn fetch_sitemap<F: PageFetcher>(
    fetcher: &F,
    sitemap_url: &Url,
) -> Result<String, FetchError> {
    ::log::info!("Fetching sitemap: {}", sitemap_url);
    let document = fetcher.fetch(sitemap_url.as_str()).await?;
    ::log::debug!("Sitemap is {} bytes", document.len());
    Ok(document)
}

/// Extract page URLs from a sitemap, logging and swallowing parse errors.
///
/// Malformed documents produce an empty list.
pub fn parse_sitemap(document: &str) -> Vec<String> {
    match try_parse_sitemap(document) {
        Ok(urls) => urls,
        Err(e) => {
            ::log::error!("Error parsing the sitemap XML: {}", e);
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Root,
    Url,
    Loc,
    Other,
}

/// Extract the text of every `<url><loc>` pair directly under the root.
///
/// Only elements in [`SITEMAP_NS`] count. Sitemap index documents are not
/// followed; a warning reports how many child sitemaps were ignored.
pub fn try_parse_sitemap(document: &str) -> Result<Vec<String>, SitemapParseError> {
    let document = document.trim_start_matches('\u{feff}');
    let mut reader = NsReader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut urls = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut loc_text = String::new();
    let mut seen_root = false;
    let mut is_index = false;
    let mut child_sitemaps = 0usize;

    loop {
        let position = reader.buffer_position() as u64;
        let malformed = |message: String| SitemapParseError::Malformed { position, message };

        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| malformed(e.to_string()))?;
        let in_sitemap_ns = matches!(ns, ResolveResult::Bound(Namespace(n)) if n == SITEMAP_NS.as_bytes());

        match event {
            Event::Start(e) | Event::Empty(e) if stack.is_empty() && seen_root => {
                return Err(malformed(format!(
                    "unexpected element <{}> after the root element",
                    String::from_utf8_lossy(e.name().as_ref())
                )));
            }
            Event::Start(e) => {
                let local = e.local_name();
                let frame = match stack.last() {
                    None => {
                        seen_root = true;
                        is_index = in_sitemap_ns && local.as_ref() == b"sitemapindex";
                        Frame::Root
                    }
                    Some(Frame::Root) if in_sitemap_ns && local.as_ref() == b"url" => Frame::Url,
                    Some(Frame::Root) if is_index && local.as_ref() == b"sitemap" => {
                        child_sitemaps += 1;
                        Frame::Other
                    }
                    Some(Frame::Url) if in_sitemap_ns && local.as_ref() == b"loc" => {
                        loc_text.clear();
                        Frame::Loc
                    }
                    Some(_) => Frame::Other,
                };
                stack.push(frame);
            }
            Event::Empty(e) => {
                // Self-closing elements never carry a location
                if stack.is_empty() {
                    seen_root = true;
                    is_index = in_sitemap_ns && e.local_name().as_ref() == b"sitemapindex";
                }
            }
            Event::Text(e) => {
                match stack.last() {
                    Some(Frame::Loc) => {
                        let text = e.unescape().map_err(|e| malformed(e.to_string()))?;
                        loc_text.push_str(&text);
                    }
                    None => {
                        return Err(malformed("text outside the root element".to_string()));
                    }
                    Some(_) => {}
                }
            }
            Event::CData(e) => {
                if let Some(Frame::Loc) = stack.last() {
                    loc_text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                if stack.pop() == Some(Frame::Loc) {
                    let loc = loc_text.trim();
                    if !loc.is_empty() {
                        urls.push(loc.to_string());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(SitemapParseError::Malformed {
            position: reader.buffer_position() as u64,
            message: "document ended before all elements were closed".to_string(),
        });
    }
    if !seen_root {
        return Err(SitemapParseError::NoRoot);
    }
    if is_index {
        ::log::warn!(
            "Sitemap is a sitemap index referencing {} child sitemaps; nested sitemaps are not followed",
            child_sitemaps
        );
    }

    ::log::info!("Total URLs in sitemap: {}", urls.len());
    Ok(urls)
}
