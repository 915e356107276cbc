use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::Page;

static PARAGRAPH_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

/// Documentation prose under the element with `anchor_id`, or `None` when the
/// page has no such element.
///
/// Every `<p>` below the anchor contributes its text, joined with `\n`. Only
/// plain-text paragraphs count: one holding any child markup (`<code>`,
/// links, ...) contributes an empty line, so positions are preserved. An
/// anchor without paragraphs yields `Some("")`.
pub fn extract(page: &Page, anchor_id: &str) -> Option<String> {
    let section = page.find_by_id(anchor_id)?;
    let doc = section
        .select(&PARAGRAPH_SELECTOR)
        .map(direct_text)
        .collect::<Vec<_>>()
        .join("\n");
    Some(doc)
}

fn direct_text(paragraph: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in paragraph.children() {
        match node.value().as_text() {
            Some(t) => text.push_str(t),
            None => return String::new(),
        }
    }
    text
}
