//! HTML to Markdown normalization for product descriptions.
//!
//! Shopify stores descriptions as HTML (`Body (HTML)`); Medusa renders
//! plain text or Markdown. [`HtmlToMarkdown`] walks the parsed fragment and
//! emits the usual Markdown equivalents:
//!
//! | HTML                  | Markdown              |
//! |-----------------------|-----------------------|
//! | `<h1>`, `<h2>`        | setext (`===`, `---`) |
//! | `<h3>` .. `<h6>`      | `###` ..              |
//! | `<strong>`, `<b>`     | `**text**`            |
//! | `<em>`, `<i>`         | `_text_`              |
//! | `<a href>`            | `[text](href)`        |
//! | `<img>`               | `![alt](src)`         |
//! | `<ul>` / `<ol>` items | `*   item` / `1.  item` |
//! | `<br>`                | hard line break       |
//! | `<hr>`                | `* * *`               |
//! | `<pre>`               | fenced code block     |
//! | `<blockquote>`        | `> ` prefixed lines   |
//!
//! Parsing goes through html5ever (via `scraper`), which repairs broken
//! markup the way browsers do, so normalization never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static INLINE_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\\*_`\[\]])").expect("valid regex"));
static LINE_START_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#|>|[-+] |=+$|\d+\. )").expect("valid regex"));
static ORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\. ").expect("valid regex"));

/// Placeholder for `<br>` until trailing whitespace has been cleaned up.
const HARD_BREAK: char = '\u{1}';

/// Reduces a markup fragment to plain structured text.
///
/// Implementations must not fail on malformed input.
pub trait MarkupNormalizer {
    fn normalize(&self, markup: &str) -> String;
}

/// [`MarkupNormalizer`] producing Markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlToMarkdown;

impl HtmlToMarkdown {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupNormalizer for HtmlToMarkdown {
    fn normalize(&self, markup: &str) -> String {
        if markup.trim().is_empty() {
            return String::new();
        }
        let fragment = Html::parse_fragment(markup);
        let raw = render_children(fragment.root_element(), Context::default());
        tidy(&raw)
    }
}

/// Convenience wrapper around [`HtmlToMarkdown`].
pub fn html_to_markdown(markup: &str) -> String {
    HtmlToMarkdown.normalize(markup)
}

#[derive(Debug, Clone, Copy, Default)]
struct Context {
    in_pre: bool,
    in_code: bool,
}

fn render_children(element: ElementRef<'_>, ctx: Context) -> String {
    let mut out = String::new();

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                if ctx.in_pre {
                    out.push_str(text);
                    continue;
                }
                let collapsed = WHITESPACE.replace_all(text, " ");
                let at_line_start = out.is_empty() || out.ends_with('\n');
                let piece = if at_line_start || out.ends_with(' ') {
                    collapsed.trim_start()
                } else {
                    collapsed.as_ref()
                };
                if ctx.in_code {
                    out.push_str(piece);
                } else {
                    out.push_str(&escape(piece, at_line_start));
                }
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    out.push_str(&render_element(el, ctx));
                }
            }
            _ => {}
        }
    }

    out
}

fn render_element(el: ElementRef<'_>, ctx: Context) -> String {
    let name = el.value().name();

    match name {
        "script" | "style" | "head" | "title" | "noscript" | "template" => String::new(),

        "h1" | "h2" => {
            let text = render_children(el, ctx).trim().to_string();
            let underline = if name == "h1" { "=" } else { "-" };
            block(&format!("{}\n{}", text, underline.repeat(text.chars().count())))
        }
        "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(3);
            let text = render_children(el, ctx).trim().to_string();
            block(&format!("{} {}", "#".repeat(level), text))
        }

        "p" | "div" | "section" | "article" | "header" | "footer" | "table" | "thead"
        | "tbody" | "tr" => block(&render_children(el, ctx)),

        "td" | "th" => format!("{} ", render_children(el, ctx).trim()),

        "strong" | "b" => wrap_inline(&render_children(el, ctx), "**"),
        "em" | "i" => wrap_inline(&render_children(el, ctx), "_"),
        "code" if !ctx.in_pre => {
            let code = render_children(el, Context { in_code: true, ..ctx });
            wrap_inline(&code, "`")
        }

        "a" => {
            let text = render_children(el, ctx);
            match el.value().attr("href") {
                Some(href) if !text.trim().is_empty() => {
                    format!("[{}]({})", text.trim(), href)
                }
                _ => text,
            }
        }
        "img" => match el.value().attr("src") {
            Some(src) => format!("![{}]({})", el.value().attr("alt").unwrap_or(""), src),
            None => String::new(),
        },

        "br" if ctx.in_pre => "\n".to_string(),
        "br" => format!("{}\n", HARD_BREAK),
        "hr" => block("* * *"),

        "ul" | "ol" => render_list(el, ctx),
        "li" => block(&list_item("*   ", &render_children(el, ctx))),

        "blockquote" => {
            let inner = tidy(&render_children(el, ctx));
            let quoted: Vec<String> = inner
                .lines()
                .map(|line| format!("> {}", line).trim_end().to_string())
                .collect();
            block(&quoted.join("\n"))
        }
        "pre" => {
            let code = render_children(el, Context { in_pre: true, in_code: true });
            let code = code.trim_matches('\n');
            if code.is_empty() {
                String::new()
            } else {
                format!("\n\n```\n{}\n```\n\n", code)
            }
        }

        _ => render_children(el, ctx),
    }
}

fn render_list(list: ElementRef<'_>, ctx: Context) -> String {
    let ordered = list.value().name() == "ol";
    let start = list
        .value()
        .attr("start")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1);

    let items: Vec<String> = list
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .enumerate()
        .map(|(i, li)| {
            let prefix = if ordered {
                format!("{}.  ", start + i)
            } else {
                "*   ".to_string()
            };
            list_item(&prefix, &render_children(li, ctx))
        })
        .collect();

    block(&items.join("\n"))
}

/// Backslash-escape text so it is not re-read as Markdown syntax.
///
/// Block markers (`#`, `>`, bullets, `1. `) only matter at a line start.
fn escape(text: &str, at_line_start: bool) -> String {
    let escaped = INLINE_MARKUP.replace_all(text, r"\$1");
    if !at_line_start || !LINE_START_MARKUP.is_match(&escaped) {
        return escaped.into_owned();
    }
    if ORDERED_MARKER.is_match(&escaped) {
        return ORDERED_MARKER.replace(&escaped, r"$1\. ").into_owned();
    }
    format!("\\{}", escaped)
}

/// Prefixed item; continuation lines are indented under the content.
fn list_item(prefix: &str, content: &str) -> String {
    format!("{}{}", prefix, content.trim().replace('\n', "\n    "))
}

/// Block-level content separated from its neighbours by a blank line.
fn block(content: &str) -> String {
    let content = content.trim();
    if content.is_empty() {
        String::new()
    } else {
        format!("\n\n{}\n\n", content)
    }
}

/// Surround with `delim`, keeping outer spaces outside the delimiters.
fn wrap_inline(content: &str, delim: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content.to_string();
    }
    let lead = if content.starts_with(char::is_whitespace) { " " } else { "" };
    let trail = if content.ends_with(char::is_whitespace) { " " } else { "" };
    format!("{}{}{}{}{}", lead, delim, trimmed, delim, trail)
}

fn tidy(raw: &str) -> String {
    let lines: Vec<String> = raw
        .lines()
        .map(|line| line.trim_end().replace(HARD_BREAK, "  "))
        .collect();
    BLANK_LINES
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}
