//! HTML to plain text.

use scraper::{ElementRef, Html};

const SKIPPED: &[&str] = &["script", "style", "noscript", "head", "template"];

const BLOCKS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "tr", "table", "h1", "h2", "h3", "h4", "h5", "h6",
    "section", "article", "header", "footer", "blockquote", "pre", "dd", "dt", "title", "body",
];

#[derive(Default)]
struct Lines {
    done: Vec<String>,
    current: String,
}

impl Lines {
    fn push_words(&mut self, text: &str) {
        for word in text.split_whitespace() {
            if !self.current.is_empty() {
                self.current.push(' ');
            }
            self.current.push_str(word);
        }
    }

    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.done.push(std::mem::take(&mut self.current));
        }
    }
}

fn walk(element: ElementRef<'_>, lines: &mut Lines) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            lines.push_words(text);
        } else if let Some(el) = ElementRef::wrap(child) {
            let name = el.value().name();
            if SKIPPED.contains(&name) {
                continue;
            }
            let block = BLOCKS.contains(&name);
            if block {
                lines.break_line();
            }
            walk(el, lines);
            if block {
                lines.break_line();
            }
        }
    }
}

/// Visible text of an HTML document, one line per block element.
///
/// Scripts and styles are dropped and whitespace inside a block collapses to
/// single spaces.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Lines::default();
    walk(document.root_element(), &mut lines);
    lines.break_line();
    lines.done.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_and_scripts() {
        let html = r#"<html><head><title>Diário</title><style>p{}</style></head>
            <body><script>var x = 1;</script>
            <h1>DECRETO Nº 35.606</h1>
            <p>Regulamenta   a <b>Lei</b> nº 12.527,
               de 18 de novembro de 2011.</p>
            <div>Art. 1º<br>Art. 2º</div></body></html>"#;
        let text = html_to_text(html);
        assert_eq!(
            text,
            "DECRETO Nº 35.606\nRegulamenta a Lei nº 12.527, de 18 de novembro de 2011.\nArt. 1º\nArt. 2º"
        );
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(html_to_text("<p>Jo&atilde;o &amp; Maria</p>"), "João & Maria");
    }

    #[test]
    fn empty_document() {
        assert_eq!(html_to_text(""), "");
    }
}
