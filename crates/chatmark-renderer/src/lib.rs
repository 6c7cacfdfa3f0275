mod markdown;

use std::collections::{BTreeMap, HashMap, HashSet};

use ammonia::Builder;
use chatmark_core::Prepared;

const BASE_CSS: &str = include_str!("../assets/chatmark.css");
const BASE_JS: &str = include_str!("../assets/chatmark.js");

#[derive(Debug, Clone, Copy)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

/// Resolved table styling for one theme. Light mode mirrors the GitHub-ish
/// palette; anything else falls back to the dark surface colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStyle {
    pub row_background: &'static str,
    pub cell_border: &'static str,
}

pub fn table_style(theme: ThemeMode) -> TableStyle {
    match theme {
        ThemeMode::Light => TableStyle {
            row_background: "#fff",
            cell_border: "1px solid #d0d7de",
        },
        ThemeMode::Auto | ThemeMode::Dark => TableStyle {
            row_background: "#0e1116",
            cell_border: "1px solid #2a313b",
        },
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    theme: ThemeMode,
    custom_vars: BTreeMap<String, String>,
}

impl Renderer {
    pub fn new(theme: ThemeMode) -> Self {
        Self {
            theme,
            custom_vars: BTreeMap::new(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_vars.insert(key.into(), value.into());
        self
    }

    /// Renders one prepared message to an HTML fragment: markdown body with
    /// the link/code/table overrides, then the inlined-elements block.
    pub fn render_message(&self, prepared: &Prepared) -> String {
        markdown::render_message(prepared, self.theme)
    }

    /// Like [`render_message`](Self::render_message), passed through the
    /// ammonia allow-list afterwards.
    pub fn render_message_sanitized(&self, prepared: &Prepared) -> String {
        sanitize(&self.render_message(prepared))
    }

    pub fn stylesheet(&self) -> String {
        let mut out = String::new();
        let (light_vars, dark_vars) = default_theme_vars();

        match self.theme {
            ThemeMode::Auto => {
                out.push_str(&root_block(&light_vars, true));
                out.push_str("@media (prefers-color-scheme: dark) {\n");
                out.push_str(&indent_root_block(&dark_vars));
                out.push_str("}\n");
            }
            ThemeMode::Light => {
                out.push_str(&root_block(&light_vars, true));
            }
            ThemeMode::Dark => {
                out.push_str(&root_block(&dark_vars, true));
            }
        }

        if !self.custom_vars.is_empty() {
            out.push_str(&root_block(&self.custom_vars, false));
        }

        out.push_str(BASE_CSS);
        out
    }

    pub fn embed_html(&self, html: &str, with_inline_css: bool, with_inline_js: bool) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str("<html lang=\"en\">\n");
        out.push_str("<head>\n");
        out.push_str("  <meta charset=\"utf-8\" />\n");
        out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
        if with_inline_css {
            out.push_str("  <style>\n");
            out.push_str(&self.stylesheet());
            out.push_str("\n  </style>\n");
        }
        out.push_str("</head>\n");
        out.push_str("<body>\n");
        out.push_str(html);
        if !html.ends_with('\n') {
            out.push('\n');
        }
        if with_inline_js {
            out.push_str("  <script>\n");
            out.push_str(BASE_JS);
            out.push_str("\n  </script>\n");
        }
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        out
    }
}

/// Sanitizes rendered HTML against an allow-list that keeps the chatmark
/// widget markup (element refs, embeds, inlined block, themed tables) and
/// drops everything else.
pub fn sanitize(html: &str) -> String {
    let tags: HashSet<&'static str> = [
        "a",
        "blockquote",
        "br",
        "button",
        "code",
        "del",
        "div",
        "em",
        "figcaption",
        "figure",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "iframe",
        "img",
        "li",
        "menu",
        "ol",
        "p",
        "pre",
        "section",
        "span",
        "strong",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "ul",
    ]
    .iter()
    .copied()
    .collect();

    let mut generic_attributes: HashSet<&'static str> = HashSet::new();
    generic_attributes.insert("class");

    let mut tag_attributes: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
    tag_attributes.insert("a", ["href", "target", "title"].iter().copied().collect());
    tag_attributes.insert("iframe", ["src"].iter().copied().collect());
    tag_attributes.insert("img", ["alt", "src", "title"].iter().copied().collect());
    tag_attributes.insert("button", ["type"].iter().copied().collect());
    tag_attributes.insert("span", ["tabindex"].iter().copied().collect());
    tag_attributes.insert("tr", ["style"].iter().copied().collect());
    tag_attributes.insert("th", ["style"].iter().copied().collect());
    tag_attributes.insert("td", ["style"].iter().copied().collect());

    let mut generic_attribute_prefixes = HashSet::new();
    generic_attribute_prefixes.insert("data-");

    Builder::new()
        .tags(tags)
        .generic_attributes(generic_attributes)
        .tag_attributes(tag_attributes)
        .generic_attribute_prefixes(generic_attribute_prefixes)
        .clean(html)
        .to_string()
}

fn default_theme_vars() -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let light = BTreeMap::from([
        ("--chatmark-bg".to_string(), "#fbfbf8".to_string()),
        ("--chatmark-fg".to_string(), "#1f2328".to_string()),
        ("--chatmark-muted".to_string(), "#5f6b76".to_string()),
        ("--chatmark-border".to_string(), "#d0d7de".to_string()),
        ("--chatmark-accent".to_string(), "#2b6cb0".to_string()),
        ("--chatmark-code-bg".to_string(), "#f4f6f8".to_string()),
        ("--chatmark-code-fg".to_string(), "#1f2328".to_string()),
        ("--chatmark-row-bg".to_string(), "#fff".to_string()),
    ]);

    let dark = BTreeMap::from([
        ("--chatmark-bg".to_string(), "#0e1116".to_string()),
        ("--chatmark-fg".to_string(), "#e6edf3".to_string()),
        ("--chatmark-muted".to_string(), "#9aa4af".to_string()),
        ("--chatmark-border".to_string(), "#2a313b".to_string()),
        ("--chatmark-accent".to_string(), "#63b3ed".to_string()),
        ("--chatmark-code-bg".to_string(), "#202634".to_string()),
        ("--chatmark-code-fg".to_string(), "#f0f6fc".to_string()),
        ("--chatmark-row-bg".to_string(), "#0e1116".to_string()),
    ]);

    (light, dark)
}

fn format_vars(vars: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in vars {
        out.push_str("  ");
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    out
}

fn root_block(vars: &BTreeMap<String, String>, include_color_scheme: bool) -> String {
    let mut out = String::new();
    out.push_str(":root {\n");
    if include_color_scheme {
        out.push_str("  color-scheme: light dark;\n");
    }
    out.push_str(&format_vars(vars));
    out.push_str("}\n");
    out
}

fn indent_root_block(vars: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    out.push_str("  :root {\n");
    out.push_str("    color-scheme: light dark;\n");
    for (key, value) in vars {
        out.push_str("    ");
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    out.push_str("  }\n");
    out
}
