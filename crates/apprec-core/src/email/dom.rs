//! Thin traversal helpers over `scraper` element trees.
//!
//! Receipt layouts are navigated positionally (direct children, first
//! descendant of a tag name) and by label search (leaf elements whose own
//! text matches a pattern), so the generic CSS selector machinery is not a
//! good fit here.

use regex::Regex;
use scraper::{ElementRef, Html};

/// First element with the given tag name, in document order.
pub fn first_element<'a>(doc: &'a Html, name: &str) -> Option<ElementRef<'a>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name().eq_ignore_ascii_case(name))
}

/// First descendant of `el` (excluding `el` itself) with the given tag name.
pub fn first_descendant<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name().eq_ignore_ascii_case(name))
}

/// All descendants of `el` (excluding `el` itself) with the given tag name.
pub fn descendant_elements<'a>(el: ElementRef<'a>, name: &str) -> Vec<ElementRef<'a>> {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name().eq_ignore_ascii_case(name))
        .collect()
}

/// All element children of `el`, regardless of tag name.
pub fn child_elements(el: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    el.children().filter_map(ElementRef::wrap).collect()
}

/// Element children of `el` whose tag name is one of `names`.
pub fn direct_children<'a>(el: ElementRef<'a>, names: &[&str]) -> Vec<ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|e| {
            names
                .iter()
                .any(|name| e.value().name().eq_ignore_ascii_case(name))
        })
        .collect()
}

/// The nearest element ancestor of `el`.
pub fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

/// All descendant text of `el` concatenated and trimmed.
pub fn full_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Text nodes that are direct children of `el`, joined and trimmed.
/// Descendant element text is excluded.
pub fn own_text(el: ElementRef<'_>) -> String {
    el.children()
        .filter_map(|node| node.value().as_text().map(|t| &**t))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Descendant text split on element boundaries: each text node trimmed,
/// whitespace-only nodes dropped.
pub fn text_fragments(el: ElementRef<'_>) -> Vec<String> {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// First leaf element (no element children) with the given tag name whose
/// own trimmed text matches `pattern`. This is how labels and section
/// headers are located in the label-search layout.
pub fn find_text_element<'a>(
    doc: &'a Html,
    name: &str,
    pattern: &Regex,
) -> Option<ElementRef<'a>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name().eq_ignore_ascii_case(name))
        .find(|el| child_elements(*el).is_empty() && pattern.is_match(&own_text(*el)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_direct_children_filters_by_name() {
        let doc = Html::parse_document(
            "<div id='a'><div>one</div><p>skip</p><table><tr><td>x</td></tr></table></div>",
        );
        let outer = first_element(&doc, "div").unwrap();
        let children = direct_children(outer, &["div", "table"]);
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_first_descendant_skips_self() {
        let doc = Html::parse_document("<div><span><div>inner</div></span></div>");
        let outer = first_element(&doc, "div").unwrap();
        let inner = first_descendant(outer, "div").unwrap();
        assert_eq!(full_text(inner), "inner");
    }

    #[test]
    fn test_own_text_excludes_nested_elements() {
        let doc = Html::parse_document("<p><span>Label:</span> value here </p>");
        let p = first_element(&doc, "p").unwrap();
        assert_eq!(own_text(p), "value here");
        assert_eq!(full_text(p), "Label: value here");
    }

    #[test]
    fn test_text_fragments_drop_whitespace_nodes() {
        // A bare <td> would be foster-parented out of existence by the HTML5
        // tree builder, so the cell needs its table around it.
        let doc = Html::parse_document(
            "<table><tr><td>\n  <p>Blink Twice</p>\n  <p>Thriller</p>\n  <p>Movie Rental</p>\n</td></tr></table>",
        );
        let td = first_element(&doc, "td").unwrap();
        assert_eq!(
            text_fragments(td),
            vec!["Blink Twice", "Thriller", "Movie Rental"]
        );
    }

    #[test]
    fn test_find_text_element_matches_leaf_only() {
        let doc = Html::parse_document(
            "<div><span><b>Order ID</b></span><span>Order ID</span><span>MX123</span></div>",
        );
        let pattern = Regex::new("(?i)order id").unwrap();
        let found = find_text_element(&doc, "span", &pattern).unwrap();
        // The first span has an element child, so the second one matches.
        assert_eq!(own_text(found), "Order ID");
        assert!(child_elements(found).is_empty());
    }
}
