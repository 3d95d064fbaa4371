use scraper::{ElementRef, Selector};

/// Build a selector from a CSS literal known at compile time
pub fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleaned text content of an element and its descendants
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Trimmed `href` of an element, if present
pub fn href(element: ElementRef<'_>) -> Option<String> {
    element.value().attr("href").map(|h| h.trim().to_string())
}

/// First descendant of `element` matching `selector`
pub fn first<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Acme \n\t Printing  Co. "), "Acme Printing Co.");
        assert_eq!(clean_text(" \n "), "");
    }

    #[test]
    fn test_element_text_joins_nested_nodes() {
        let doc = Html::parse_fragment("<div><b>3D</b>Printers <i>and</i>\n more</div>");
        let div_selector = selector("div");
        let div = doc.select(&div_selector).next().unwrap();
        assert_eq!(element_text(div), "3D Printers and more");
    }

    #[test]
    fn test_href_is_trimmed() {
        let doc = Html::parse_fragment(r#"<a href="  https://acme.test/ ">Acme</a><a>none</a>"#);
        let anchor = selector("a");
        let mut anchors = doc.select(&anchor);
        assert_eq!(
            href(anchors.next().unwrap()),
            Some("https://acme.test/".to_string())
        );
        assert_eq!(href(anchors.next().unwrap()), None);
    }
}
