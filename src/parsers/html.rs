use crate::results::PageRecord;
use scraper::{ElementRef, Html, Selector};

/// Build a [`PageRecord`] from the HTML served at `url`.
///
/// Title is the first `<title>` element's text, the description comes from the
/// first `<meta name="description">`, and content is every `<p>`'s trimmed
/// text joined by single spaces. Missing title or description fall back to
/// the placeholders in [`crate::results`].
pub fn extract_page(url: &str, html: &str) -> PageRecord {
    let doc = Html::parse_document(html);

    let title = extract_title(&doc);
    let meta_description = extract_meta_description(&doc);
    let content = extract_paragraphs(&doc);

    ::log::debug!(
        "Extracted {} characters of paragraph text from {}",
        content.len(),
        url
    );

    PageRecord::new(url.to_string(), title, meta_description, content)
}

/// Text of the first `<title>` element, if it has any
pub fn extract_title(doc: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").unwrap();
    doc.select(&title_selector)
        .next()
        .map(|title| element_text(&title))
        .filter(|title| !title.is_empty())
}

/// `content` attribute of the first description meta tag, if non-empty
pub fn extract_meta_description(doc: &Html) -> Option<String> {
    let meta_selector = Selector::parse(r#"meta[name="description"]"#).unwrap();
    doc.select(&meta_selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .filter(|content| !content.is_empty())
        .map(|content| content.to_string())
}

/// Trimmed text of every paragraph, in document order, joined by one space
pub fn extract_paragraphs(doc: &Html) -> String {
    let paragraph_selector = Selector::parse("p").unwrap();
    doc.select(&paragraph_selector)
        .map(|p| element_text(&p))
        .collect::<Vec<_>>()
        .join(" ")
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
