use scraper::html::Select;
use scraper::{ElementRef, Html, Selector};

/// A parsed server-rendered page.
#[derive(Debug)]
pub struct Page {
    html: Html,
}

impl Page {
    #[must_use]
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// All elements matching `selector`, in document order.
    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> Select<'a, 'b> {
        self.html.select(selector)
    }

    /// The first element matching `selector`.
    #[must_use]
    pub fn first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    /// All text of the document, trimmed.
    #[must_use]
    pub fn text(&self) -> String {
        element_text(self.html.root_element())
    }
}

/// Concatenated text content of an element, trimmed.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// The parent of an element, when that parent is itself an element.
#[must_use]
pub fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_and_text() {
        let page = Page::parse(r#"<html><body><p class="a">  one </p><p class="a">two</p></body></html>"#);
        let selector = Selector::parse("p.a").unwrap();

        assert_eq!(page.select(&selector).count(), 2);
        assert_eq!(element_text(page.first(&selector).unwrap()), "one");
    }

    #[test]
    fn test_parent_element() {
        let page = Page::parse(r#"<div id="outer"><span>inner</span> text</div>"#);
        let span = page.first(&Selector::parse("span").unwrap()).unwrap();
        let parent = parent_element(span).unwrap();

        assert_eq!(parent.value().attr("id"), Some("outer"));
        assert_eq!(element_text(parent), "inner text");
    }

    #[test]
    fn test_plain_text_document() {
        let page = Page::parse("Not Found");
        assert_eq!(page.text(), "Not Found");
    }
}
