use url::Url;

/// Directory and file stem used for a site's output.
///
/// The host (and port, when present) with dots replaced by underscores, so
/// `https://docs.example.com/` becomes `docs_example_com`. The port separator
/// is replaced too so the slug is a valid file name everywhere.
pub fn domain_slug(url: &Url) -> String {
    let host = url.host_str().unwrap_or("unknown");
    let netloc = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    netloc.replace(['.', ':'], "_")
}
