//! Markdown-ish model text to the HTML subset the post renderer accepts:
//! `h1`-`h3`, `p`, `br`, `strong`, `em`, `code`, `pre`, `ul`, `ol`, `li`.
//!
//! Source text is escaped before any tag is emitted, so angle brackets in
//! model output never reach the page as markup.

use std::sync::LazyLock;

use regex::Regex;

const UNFORMATTABLE: &str = "<p>Unable to format content</p>";

static CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
static BOLD_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\*([^*<>]+?)\*\*\*").expect("valid regex"));
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^<>]+?)\*\*").expect("valid regex"));
// No angle brackets: a match must not straddle a tag emitted by an earlier pass.
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s<>][^*<>]*)\*").expect("valid regex"));
static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s+(.*)$").expect("valid regex"));
static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```([^\n`]*)\n?(.*?)```").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Unordered => "ul",
            Self::Ordered => "ol",
        }
    }
}

#[derive(Default)]
struct Builder {
    out: String,
    paragraph: Vec<String>,
    list: Option<(ListKind, Vec<String>)>,
}

impl Builder {
    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        self.out.push_str("<p>");
        self.out.push_str(&self.paragraph.join("<br>"));
        self.out.push_str("</p>");
        self.paragraph.clear();
    }

    fn flush_list(&mut self) {
        let Some((kind, items)) = self.list.take() else {
            return;
        };
        self.out.push('<');
        self.out.push_str(kind.tag());
        self.out.push('>');
        for item in items {
            self.out.push_str("<li>");
            self.out.push_str(&item);
            self.out.push_str("</li>");
        }
        self.out.push_str("</");
        self.out.push_str(kind.tag());
        self.out.push('>');
    }

    fn flush(&mut self) {
        self.flush_paragraph();
        self.flush_list();
    }

    fn list_item(&mut self, kind: ListKind, item: String) {
        self.flush_paragraph();
        if self.list.as_ref().is_some_and(|(k, _)| *k != kind) {
            self.flush_list();
        }
        self.list.get_or_insert_with(|| (kind, Vec::new())).1.push(item);
    }

    fn code_block(&mut self, lines: &[&str]) {
        self.flush();
        self.out.push_str("<pre><code>");
        self.out.push_str(&escape_html(&lines.join("\n")));
        self.out.push_str("</code></pre>");
    }
}

pub fn format_as_html(text: &str) -> String {
    if text.trim().is_empty() {
        return UNFORMATTABLE.to_string();
    }

    let mut b = Builder::default();
    let mut fence: Option<Vec<&str>> = None;

    for mut line in text.lines() {
        if let Some(code) = fence.as_mut() {
            // The closing fence may trail the last code line.
            let Some(close) = line.find("```") else {
                code.push(line);
                continue;
            };
            let last = line[..close].trim_end();
            if !last.trim().is_empty() {
                code.push(last);
            }
            let code = std::mem::take(code);
            b.code_block(&code);
            fence = None;
            line = &line[close + 3..];
        }

        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("```") {
            // ```one-liner```
            if let Some(inner) = rest.strip_suffix("```") {
                b.code_block(&[inner.trim()]);
            } else {
                b.flush();
                fence = Some(Vec::new());
            }
            continue;
        }

        if trimmed.is_empty() {
            b.flush();
            continue;
        }

        if let Some((level, heading)) = heading(trimmed) {
            b.flush();
            b.out.push_str(&format!("<h{level}>{}</h{level}>", inline(heading)));
            continue;
        }

        if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
            .or_else(|| trimmed.strip_prefix("+ "))
        {
            b.list_item(ListKind::Unordered, inline(item.trim()));
            continue;
        }

        if let Some(caps) = ORDERED_ITEM.captures(trimmed) {
            b.list_item(ListKind::Ordered, inline(caps[1].trim()));
            continue;
        }

        b.flush_list();
        b.paragraph.push(inline(trimmed));
    }

    // Unterminated fence: keep what was there.
    if let Some(code) = fence {
        b.code_block(&code);
    }
    b.flush();
    b.out
}

/// Bodies of fenced code blocks, language labels dropped.
pub fn extract_code_examples(text: &str) -> Vec<String> {
    FENCED_BLOCK
        .captures_iter(text)
        .filter_map(|caps| {
            let body = caps[2].trim();
            let code = if body.is_empty() { caps[1].trim() } else { body };
            (!code.is_empty()).then(|| code.to_string())
        })
        .collect()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = line[hashes..].strip_prefix(' ')?.trim();
    if rest.is_empty() {
        return None;
    }
    Some((hashes.min(3), rest))
}

/// Escape, then convert inline code, bold and italic. Text inside code
/// spans is left alone.
fn inline(text: &str) -> String {
    let escaped = escape_html(text);
    let mut out = String::with_capacity(escaped.len());
    let mut last = 0;
    for caps in CODE_SPAN.captures_iter(&escaped) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&emphasis(&escaped[last..whole.start()]));
        out.push_str("<code>");
        out.push_str(&caps[1]);
        out.push_str("</code>");
        last = whole.end();
    }
    out.push_str(&emphasis(&escaped[last..]));
    out
}

fn emphasis(text: &str) -> String {
    let strong = BOLD_ITALIC.replace_all(text, "<strong><em>$1</em></strong>");
    let bold = BOLD.replace_all(&strong, "<strong>$1</strong>");
    ITALIC.replace_all(&bold, "<em>$1</em>").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paragraphs() {
        assert_eq!(
            format_as_html("First paragraph.\n\nSecond one\nstill second."),
            "<p>First paragraph.</p><p>Second one<br>still second.</p>"
        );
    }

    #[test]
    fn bold_italic_and_inline_code() {
        assert_eq!(
            format_as_html("Use **Arc** with *care* and `clone()` it, not `**x**`."),
            "<p>Use <strong>Arc</strong> with <em>care</em> and <code>clone()</code> it, not <code>**x**</code>.</p>"
        );
    }

    #[test]
    fn headings() {
        assert_eq!(
            format_as_html("# Title\n## Sub\n### Section\n#### Deep"),
            "<h1>Title</h1><h2>Sub</h2><h3>Section</h3><h3>Deep</h3>"
        );
        assert_eq!(format_as_html("#hashtag"), "<p>#hashtag</p>");
    }

    #[test]
    fn fenced_code_is_escaped_and_preserved() {
        let html = format_as_html("Try this:\n```rust\nif a < b {\n    **not bold**\n}\n```\nDone.");
        assert_eq!(
            html,
            "<p>Try this:</p><pre><code>if a &lt; b {\n    **not bold**\n}</code></pre><p>Done.</p>"
        );
    }

    #[test]
    fn bold_italic_nests_cleanly() {
        assert_eq!(
            format_as_html("This is ***important*** here."),
            "<p>This is <strong><em>important</em></strong> here.</p>"
        );
        assert_eq!(
            format_as_html("**a *b** c*"),
            "<p><strong>a *b</strong> c*</p>"
        );
    }

    #[test]
    fn fence_closed_at_end_of_code_line() {
        let text = "Try:\n```js\nlet a = 1;```\nThen restart the server.\n\n- step one";
        assert_eq!(
            format_as_html(text),
            "<p>Try:</p><pre><code>let a = 1;</code></pre><p>Then restart the server.</p><ul><li>step one</li></ul>"
        );
        assert_eq!(extract_code_examples(text), vec!["let a = 1;"]);
    }

    #[test]
    fn text_after_closing_fence_is_kept() {
        assert_eq!(
            format_as_html("```\nx = 1\n``` and then **done**"),
            "<pre><code>x = 1</code></pre><p>and then <strong>done</strong></p>"
        );
    }

    #[test]
    fn unterminated_fence_still_renders() {
        assert_eq!(
            format_as_html("```\nlet x = 1;"),
            "<pre><code>let x = 1;</code></pre>"
        );
    }

    #[test]
    fn lists_group_consecutive_items() {
        assert_eq!(
            format_as_html("Steps:\n1. Install\n2. Run\n\n- fast\n* safe\nAfter"),
            "<p>Steps:</p><ol><li>Install</li><li>Run</li></ol><ul><li>fast</li><li>safe</li></ul><p>After</p>"
        );
    }

    #[test]
    fn switching_list_kind_closes_previous_list() {
        assert_eq!(
            format_as_html("- a\n1. b"),
            "<ul><li>a</li></ul><ol><li>b</li></ol>"
        );
    }

    #[test]
    fn model_markup_is_escaped() {
        let html = format_as_html("<script>alert(1)</script> & <b>bold</b>");
        assert_eq!(
            html,
            "<p>&lt;script&gt;alert(1)&lt;/script&gt; &amp; &lt;b&gt;bold&lt;/b&gt;</p>"
        );
    }

    #[test]
    fn no_raw_angle_brackets_from_source() {
        let source = "a <b> c\n```\n<div>\n```\n- <li>\n# <h1>";
        let html = format_as_html(source);
        let stripped = [
            "<p>", "</p>", "<br>", "<pre>", "</pre>", "<code>", "</code>", "<ul>", "</ul>", "<li>",
            "</li>", "<h1>", "</h1>",
        ]
        .iter()
        .fold(html, |acc, tag| acc.replace(tag, ""));
        assert!(!stripped.contains('<') && !stripped.contains('>'), "{stripped}");
    }

    #[test]
    fn blank_input_is_unformattable() {
        assert_eq!(format_as_html("  \n "), UNFORMATTABLE);
    }

    #[test]
    fn extracts_code_blocks_without_language_labels() {
        let text = "Intro\n```js\nconst a = 1;\n```\nmid\n```\nfn main() {}\n```\n```inline()```";
        assert_eq!(
            extract_code_examples(text),
            vec!["const a = 1;", "fn main() {}", "inline()"]
        );
    }

    #[test]
    fn no_code_blocks() {
        assert!(extract_code_examples("just prose").is_empty());
    }
}
