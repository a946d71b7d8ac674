//! Lightweight HTML summarisation: page title plus the first few paragraphs

use scraper::{Html, Selector};

/// Title and leading paragraph text of a page
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub title: Option<String>,
    pub paragraphs: Vec<String>,
}

impl PageSummary {
    /// Render as `Title: <title>\n\n<p1>\n<p2>...`
    pub fn to_content(&self) -> String {
        format!(
            "Title: {}\n\n{}",
            self.title.as_deref().unwrap_or("No Title"),
            self.paragraphs.join("\n")
        )
    }
}

/// Extract the `<title>` and the text of the first `max_paragraphs` `<p>` elements
pub fn summarize_html(html: &str, max_paragraphs: usize) -> PageSummary {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    });

    let Ok(p_sel) = Selector::parse("p") else {
        return PageSummary {
            title,
            paragraphs: Vec::new(),
        };
    };

    let paragraphs = document
        .select(&p_sel)
        .take(max_paragraphs)
        .map(|el| el.text().collect::<String>())
        .collect();

    PageSummary { title, paragraphs }
}
