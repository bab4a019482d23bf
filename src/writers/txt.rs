use crate::results::PageRecord;
use std::fmt::Write;

/// Width of the rule separating records
pub const RULE_WIDTH: usize = 80;

/// Human-readable report, one block per record
pub fn render(records: &[PageRecord]) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    for page in records {
        // Writing into a String cannot fail
        let _ = writeln!(out, "URL: {}", page.url);
        let _ = writeln!(out, "Title: {}", page.title);
        let _ = writeln!(out, "Meta Description: {}", page.meta_description);
        let _ = writeln!(out, "Content:\n{}", page.content);
        let _ = writeln!(out, "{}", rule);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_layout() {
        let records = vec![
            PageRecord::new(
                "https://ex.com/a".to_string(),
                Some("A".to_string()),
                Some("About A".to_string()),
                "Alpha text".to_string(),
            ),
            PageRecord::new("https://ex.com/b".to_string(), None, None, String::new()),
        ];

        let rule = "-".repeat(80);
        let expected = format!(
            "URL: https://ex.com/a\nTitle: A\nMeta Description: About A\nContent:\nAlpha text\n{rule}\n\
             URL: https://ex.com/b\nTitle: No Title\nMeta Description: No Meta Description\nContent:\n\n{rule}\n"
        );
        assert_eq!(render(&records), expected);
    }

    #[test]
    fn test_empty_collection_is_empty_report() {
        assert_eq!(render(&[]), "");
    }
}
