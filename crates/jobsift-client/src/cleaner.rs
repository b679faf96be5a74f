use std::sync::Arc;

use htmd::HtmlToMarkdown;

/// Turns HTML job descriptions into plain-ish text.
///
/// Some providers ship descriptions as HTML fragments. The description is
/// only an excerpt, so conversion is best effort: on failure the input is
/// returned unchanged.
#[derive(Clone)]
pub struct DescriptionCleaner {
    converter: Arc<HtmlToMarkdown>,
}

impl DescriptionCleaner {
    pub fn new() -> Self {
        let converter = HtmlToMarkdown::builder()
            .skip_tags(vec!["script", "style", "img", "iframe", "svg"])
            .build();

        Self {
            converter: Arc::new(converter),
        }
    }

    pub fn clean(&self, html: &str) -> String {
        if !html.contains('<') {
            return html.to_string();
        }
        match self.converter.convert(html) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(error = %e, "Description conversion failed, keeping raw HTML");
                html.to_string()
            }
        }
    }
}

impl Default for DescriptionCleaner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup() {
        let cleaner = DescriptionCleaner::new();
        let text = cleaner.clean("<p>Own the <b>roadmap</b></p><script>track()</script>");
        assert!(text.contains("roadmap"));
        assert!(!text.contains("<p>"));
        assert!(!text.contains("track()"));
    }

    #[test]
    fn plain_text_passes_through() {
        let cleaner = DescriptionCleaner::new();
        assert_eq!(cleaner.clean("Lead discovery & delivery"), "Lead discovery & delivery");
    }
}
