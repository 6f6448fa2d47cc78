//! Small query layer over a parsed HTML tree.
//!
//! Lookups are attribute based and order independent, so callers describe
//! *what* they need (`span` with `property="v:itemreviewed"`) rather than
//! where it sits in the document.

use scraper::{ElementRef, Html, Selector};

/// Attribute constraint applied to an element lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrFilter<'a> {
    /// Attribute equals the value exactly
    Equals(&'a str, &'a str),
    /// Whitespace-separated `class` list contains the value
    Class(&'a str),
    /// `class` attribute starts with the value
    ClassPrefix(&'a str),
    Id(&'a str),
}

impl AttrFilter<'_> {
    fn to_css(self) -> String {
        match self {
            AttrFilter::Equals(name, value) => format!("[{}=\"{}\"]", name, escape(value)),
            AttrFilter::Class(value) => format!("[class~=\"{}\"]", escape(value)),
            AttrFilter::ClassPrefix(value) => format!("[class^=\"{}\"]", escape(value)),
            AttrFilter::Id(value) => format!("[id=\"{}\"]", escape(value)),
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn selector(tag: &str, filters: &[AttrFilter<'_>]) -> Option<Selector> {
    let css: String = std::iter::once(tag.to_string())
        .chain(filters.iter().map(|f| f.to_css()))
        .collect();
    // Bound to a local so the parse error stops borrowing `css` before it drops
    let selector = Selector::parse(&css)
        .map_err(|err| tracing::debug!(css = %css, error = ?err, "Invalid selector"))
        .ok();
    selector
}

/// `find_first` / `find_all` over a document or a subtree.
pub trait Query {
    fn find_first(&self, tag: &str, filters: &[AttrFilter<'_>]) -> Option<ElementRef<'_>>;
    fn find_all(&self, tag: &str, filters: &[AttrFilter<'_>]) -> Vec<ElementRef<'_>>;
}

impl Query for Html {
    fn find_first(&self, tag: &str, filters: &[AttrFilter<'_>]) -> Option<ElementRef<'_>> {
        let selector = selector(tag, filters)?;
        self.select(&selector).next()
    }

    fn find_all(&self, tag: &str, filters: &[AttrFilter<'_>]) -> Vec<ElementRef<'_>> {
        match selector(tag, filters) {
            Some(selector) => self.select(&selector).collect(),
            None => Vec::new(),
        }
    }
}

impl<'a> Query for ElementRef<'a> {
    fn find_first(&self, tag: &str, filters: &[AttrFilter<'_>]) -> Option<ElementRef<'_>> {
        let selector = selector(tag, filters)?;
        self.select(&selector).next()
    }

    fn find_all(&self, tag: &str, filters: &[AttrFilter<'_>]) -> Vec<ElementRef<'_>> {
        match selector(tag, filters) {
            Some(selector) => self.select(&selector).collect(),
            None => Vec::new(),
        }
    }
}

/// Concatenated text of an element and its descendants
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text node immediately following an element, trimmed (`<span>IMDb:</span> tt123`)
pub fn next_text_sibling(element: ElementRef<'_>) -> Option<String> {
    let sibling = element.next_sibling()?;
    let text = sibling.value().as_text()?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// First non-blank text after a label, whether a bare text node or a sibling
/// element's text, stopping at the line break that ends the label's row
pub fn following_text(element: ElementRef<'_>) -> Option<String> {
    for sibling in element.next_siblings() {
        let text: String = match (sibling.value().as_text(), ElementRef::wrap(sibling)) {
            (Some(text), _) => (**text).to_string(),
            (None, Some(el)) if el.value().name() == "br" => return None,
            (None, Some(el)) => text_of(el),
            (None, None) => continue,
        };
        let text = text.trim().trim_start_matches(':').trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }
    None
}
