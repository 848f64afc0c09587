use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.results__title").unwrap());
static H2_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());

const TITLE_CLASS: &str = "results__title";
const CARDS_CLASS: &str = "cards";

/// A weight-class heading paired with the text of its content block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: Option<String>,
}

/// Pair every titled heading with the `div.cards` that follows it in document order.
///
/// The search for a heading's block stops at the next title, so a block can
/// only ever belong to the heading directly above it.
pub fn pair_sections(html: &str) -> Vec<Section> {
    let doc = Html::parse_document(html);
    let mut sections = Vec::new();

    for title in doc.select(&TITLE_SEL) {
        let Some(h2) = title.select(&H2_SEL).next() else {
            continue;
        };
        let heading: String = h2.text().map(str::trim).collect();

        sections.push(Section {
            heading,
            body: next_cards(title).map(block_text),
        });
    }

    sections
}

fn next_cards(title: ElementRef<'_>) -> Option<ElementRef<'_>> {
    for sibling in title.next_siblings().filter_map(ElementRef::wrap) {
        if has_class(sibling, TITLE_CLASS) {
            return None;
        }
        if sibling.value().name() == "div" && has_class(sibling, CARDS_CLASS) {
            return Some(sibling);
        }
    }
    None
}

fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

fn block_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_heading_with_next_cards() {
        let html = r#"
            <div class="results__title"><h2>61 kg</h2></div>
            <div class="cards"><p>Snatch</p><p>Record: 141 kg</p></div>
        "#;
        let s = pair_sections(html);
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].heading, "61 kg");
        assert_eq!(s[0].body.as_deref(), Some("Snatch Record: 141 kg"));
    }

    #[test]
    fn block_is_not_reused_by_earlier_heading() {
        // First title has no cards of its own; the cards belong to the second.
        let html = r#"
            <div class="results__title"><h2>55 kg</h2></div>
            <div class="results__title"><h2>61 kg</h2></div>
            <div class="cards">Snatch Record: 141 kg</div>
        "#;
        let s = pair_sections(html);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].body, None);
        assert!(s[1].body.is_some());
    }

    #[test]
    fn skips_unrelated_siblings_before_cards() {
        let html = r#"
            <div class="results__title"><h2>+110 kg</h2></div>
            <span>ad</span>
            <div class="spacer"></div>
            <div class="cards">Total Record: 400 kg</div>
        "#;
        let s = pair_sections(html);
        assert_eq!(s[0].body.as_deref(), Some("Total Record: 400 kg"));
    }

    #[test]
    fn title_without_h2_is_ignored() {
        let html = r#"<div class="results__title"><h3>61 kg</h3></div><div class="cards">x</div>"#;
        assert!(pair_sections(html).is_empty());
    }
}
