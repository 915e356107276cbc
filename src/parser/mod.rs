pub mod fragment;

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static ID_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[id]").unwrap());

/// A documentation page parsed once and queried per anchor.
pub struct Page {
    html: Html,
}

impl Page {
    pub fn parse(text: &str) -> Page {
        Page {
            html: Html::parse_document(text),
        }
    }

    /// First element in document order whose `id` equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        if id.is_empty() {
            return None;
        }
        // Attribute comparison instead of a `#id` selector: schema names may
        // hold characters that are not valid CSS identifiers.
        self.html
            .select(&ID_SELECTOR)
            .find(|el| el.value().attr("id") == Some(id))
    }
}
