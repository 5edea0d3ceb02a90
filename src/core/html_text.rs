use scraper::{Html, Node};

/// Elements whose boundaries separate words.
const BLOCK_ELEMENTS: [&str; 18] = [
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "h1", "h2", "h3", "h4",
    "h5", "h6", "li", "p", "section", "tr",
];

/// Text content of an HTML fragment with whitespace collapsed. Block
/// elements start a new word; inline markup does not.
pub fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::new();
    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(chunk) => text.push_str(chunk),
            Node::Element(element) if BLOCK_ELEMENTS.contains(&element.name()) => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain text cut to `max_chars` characters, marked with `...` when cut.
pub fn excerpt(html: &str, max_chars: usize) -> String {
    let text = plain_text(html);
    if text.chars().count() <= max_chars {
        return text;
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_decodes_entities() {
        let html = "<h2>Koken &amp; Bakken</h2>\n<p>Voor   iedereen</p>";
        assert_eq!(plain_text(html), "Koken & Bakken Voor iedereen");
    }

    #[test]
    fn adjacent_blocks_stay_separate_words() {
        assert_eq!(plain_text("<p>Eerste dag</p><p>Tweede dag</p>"), "Eerste dag Tweede dag");
        assert_eq!(plain_text("<ul><li>Excel</li><li>Word</li></ul>"), "Excel Word");
        assert_eq!(plain_text("Regel<br>regel"), "Regel regel");
        assert_eq!(plain_text("<p><strong>Ex</strong>cel</p>"), "Excel");
    }

    #[test]
    fn short_text_is_not_marked() {
        assert_eq!(excerpt("<p>Kort</p>", 160), "Kort");
        assert_eq!(excerpt("<p>Een lange zin</p>", 4), "Een...");
    }
}
