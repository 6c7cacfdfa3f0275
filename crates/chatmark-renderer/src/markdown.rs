use chatmark_core::{Element, ElementDisplay, Prepared};
use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::SyntaxSet;

use crate::{TableStyle, ThemeMode, table_style};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Translates one prepared message into its displayed HTML structure: the
/// markdown body with the link/code/table overrides applied, followed by the
/// inlined-elements block scoped to the same action set.
pub(crate) fn render_message(prepared: &Prepared, theme: ThemeMode) -> String {
    let mut out = String::new();
    let body_class = if prepared.author_is_user {
        "chatmark-body chatmark-body--user"
    } else {
        "chatmark-body"
    };
    out.push_str(&format!("<div class=\"{}\">\n", body_class));
    render_markdown(&mut out, &prepared.content, &prepared.refs, theme);
    out.push_str("</div>\n");
    render_inlined(&mut out, prepared);
    out
}

struct LinkState {
    dest: String,
    label: String,
}

struct ImageState {
    dest: String,
    title: String,
    alt: String,
}

fn render_markdown(out: &mut String, content: &str, refs: &[Element], theme: ThemeMode) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(content, options);

    let style = table_style(theme);
    let mut link: Option<LinkState> = None;
    let mut image: Option<ImageState> = None;
    let mut code_lang: Option<String> = None;
    let mut code_text = String::new();
    let mut in_code_block = false;
    let mut in_table_head = false;

    for event in parser {
        // Links and images buffer their inner text; nothing inside them is
        // written until the closing event decides what to emit.
        if let Some(state) = image.as_mut() {
            match event {
                Event::Text(text) | Event::Code(text) => state.alt.push_str(&text),
                Event::SoftBreak | Event::HardBreak => state.alt.push(' '),
                Event::End(TagEnd::Image) => {
                    let state = image.take().expect("image state");
                    out.push_str(&format!(
                        "<img src=\"{}\" alt=\"{}\"{}>",
                        escape_url_attr(&state.dest),
                        escape_attr(&state.alt),
                        title_attr(&state.title)
                    ));
                }
                _ => {}
            }
            continue;
        }
        if let Some(state) = link.as_mut() {
            match event {
                Event::Text(text) | Event::Code(text) => state.label.push_str(&text),
                // A wrapped label is still one name; breaks count as a space.
                Event::SoftBreak | Event::HardBreak => state.label.push(' '),
                Event::End(TagEnd::Link) => {
                    let state = link.take().expect("link state");
                    render_link(out, &state, refs);
                }
                _ => {}
            }
            continue;
        }
        if in_code_block {
            match event {
                Event::Text(text) => code_text.push_str(&text),
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    render_code_block(out, code_lang.as_deref(), &code_text, theme);
                    code_lang = None;
                    code_text.clear();
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                link = Some(LinkState {
                    dest: dest_url.to_string(),
                    label: String::new(),
                });
            }
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                image = Some(ImageState {
                    dest: dest_url.to_string(),
                    title: title.to_string(),
                    alt: String::new(),
                });
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                code_lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .filter(|token| !token.is_empty())
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
            }
            Event::Code(text) => {
                out.push_str("<code class=\"chatmark-code\">");
                out.push_str(&escape_html(&text));
                out.push_str("</code>");
            }
            Event::Start(Tag::Table(_)) => {
                out.push_str("<table class=\"chatmark-table\">\n");
            }
            Event::End(TagEnd::Table) => {
                out.push_str("</tbody></table>\n");
            }
            Event::Start(Tag::TableHead) => {
                in_table_head = true;
                out.push_str("<thead>");
                push_row_open(out, &style);
            }
            Event::End(TagEnd::TableHead) => {
                in_table_head = false;
                out.push_str("</tr></thead>\n<tbody>\n");
            }
            Event::Start(Tag::TableRow) => {
                push_row_open(out, &style);
            }
            Event::End(TagEnd::TableRow) => {
                out.push_str("</tr>\n");
            }
            Event::Start(Tag::TableCell) => {
                let tag = if in_table_head { "th" } else { "td" };
                out.push_str(&format!(
                    "<{} style=\"border: {}\">",
                    tag, style.cell_border
                ));
            }
            Event::End(TagEnd::TableCell) => {
                out.push_str(if in_table_head { "</th>" } else { "</td>" });
            }
            other => {
                html::push_html(out, std::iter::once(other));
            }
        }
    }
}

/// The link override. A label naming a reference element renders the
/// dedicated widget and the placeholder target is discarded; an embed element
/// renders the link and the panel side by side; anything else is an external
/// link opening in a new viewing context.
fn render_link(out: &mut String, state: &LinkState, refs: &[Element]) {
    let element = refs.iter().find(|element| element.name == state.label);
    match element {
        Some(element) if element.display == ElementDisplay::Embed => {
            log::trace!("link {:?} resolved to embedded panel", element.name);
            let src = element.url.as_deref().unwrap_or(&state.dest);
            out.push_str(&format!(
                "<a class=\"chatmark-link\" href=\"{}\" target=\"_blank\">{}</a>",
                escape_url_attr(src),
                escape_html(&state.label)
            ));
            out.push_str(&format!(
                "<iframe class=\"chatmark-embed\" src=\"{}\"></iframe>",
                escape_url_attr(src)
            ));
        }
        Some(element) => {
            log::trace!("link {:?} resolved to reference widget", element.name);
            out.push_str(&format!(
                "<span class=\"chatmark-element-ref\" data-element=\"{}\" tabindex=\"0\">{}</span>",
                escape_attr(&element.name),
                escape_html(&element.name)
            ));
        }
        None => {
            out.push_str(&format!(
                "<a class=\"chatmark-link\" href=\"{}\" target=\"_blank\">{}</a>",
                escape_url_attr(&state.dest),
                escape_html(&state.label)
            ));
        }
    }
}

fn render_code_block(out: &mut String, lang: Option<&str>, text: &str, theme: ThemeMode) {
    let lang_attr = lang
        .map(|value| format!(" data-lang=\"{}\"", escape_attr(value)))
        .unwrap_or_default();
    let code_class = lang
        .map(|value| format!("language-{}", escape_attr(value)))
        .unwrap_or_else(|| "language-".to_string());
    out.push_str(&format!(
        "<figure class=\"chatmark-codeblock\"{}>\n<pre class=\"chatmark-pre\"><code class=\"{}\">",
        lang_attr, code_class
    ));
    out.push_str(&highlight_code(lang, text, theme));
    out.push_str("</code></pre>\n</figure>\n");
}

fn highlight_code(lang: Option<&str>, text: &str, theme: ThemeMode) -> String {
    let syntax = lang
        .and_then(|token| SYNTAX_SET.find_syntax_by_token(token))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let theme = pick_theme(theme, &THEME_SET);
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let with_newline = format!("{}\n", line);
        match highlighter.highlight_line(&with_newline, &SYNTAX_SET) {
            Ok(ranges) => match styled_line_to_highlighted_html(&ranges, IncludeBackground::No) {
                Ok(html) => out.push_str(&html),
                Err(_) => {
                    out.push_str(&escape_html(&with_newline));
                }
            },
            Err(_) => {
                out.push_str(&escape_html(&with_newline));
            }
        }
    }
    out
}

fn pick_theme(theme: ThemeMode, theme_set: &ThemeSet) -> &SyntectTheme {
    let candidates = match theme {
        ThemeMode::Dark => [
            "Monokai Extended Bright",
            "Monokai Extended",
            "base16-ocean.dark",
        ],
        ThemeMode::Light | ThemeMode::Auto => {
            ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"]
        }
    };
    for name in candidates {
        if let Some(found) = theme_set.themes.get(name) {
            return found;
        }
    }
    log::debug!("no preferred highlight theme loaded, falling back to the first");
    theme_set
        .themes
        .values()
        .next()
        .expect("theme set has at least one theme")
}

/// The secondary block beneath the body: inline elements plus the scoped
/// actions. Deep per-type element rendering stays with the host; only stable
/// markers and data attributes are emitted here.
fn render_inlined(out: &mut String, prepared: &Prepared) {
    if prepared.inlined.is_empty() && prepared.actions.is_empty() {
        return;
    }
    out.push_str("<section class=\"chatmark-inlined\">\n");
    for element in &prepared.inlined {
        let url_attr = element
            .url
            .as_deref()
            .map(|url| format!(" data-url=\"{}\"", escape_url_attr(url)))
            .unwrap_or_default();
        out.push_str(&format!(
            "<figure class=\"chatmark-element\" data-element=\"{}\"{}><figcaption>{}</figcaption></figure>\n",
            escape_attr(&element.name),
            url_attr,
            escape_html(&element.name)
        ));
    }
    if !prepared.actions.is_empty() {
        out.push_str("<menu class=\"chatmark-actions\">\n");
        for action in &prepared.actions {
            let value_attr = action
                .value
                .as_deref()
                .map(|value| format!(" data-value=\"{}\"", escape_attr(value)))
                .unwrap_or_default();
            let label = action.label.as_deref().unwrap_or(&action.name);
            out.push_str(&format!(
                "<li><button type=\"button\" data-action=\"{}\"{}>{}</button></li>\n",
                escape_attr(&action.name),
                value_attr,
                escape_html(label)
            ));
        }
        out.push_str("</menu>\n");
    }
    out.push_str("</section>\n");
}

fn push_row_open(out: &mut String, style: &TableStyle) {
    out.push_str(&format!(
        "<tr style=\"background-color: {}\">",
        style.row_background
    ));
}

fn title_attr(title: &str) -> String {
    if title.is_empty() {
        String::new()
    } else {
        format!(" title=\"{}\"", escape_attr(title))
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn escape_attr(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn escape_url_attr(text: &str) -> String {
    let mut encoded = String::new();
    for &byte in text.as_bytes() {
        match byte {
            b' ' => encoded.push_str("%20"),
            b'\\' => encoded.push_str("%5C"),
            0x00..=0x1F | 0x7F..=0xFF => {
                encoded.push_str(&format!("%{:02X}", byte));
            }
            _ => encoded.push(byte as char),
        }
    }
    escape_attr(&encoded)
}
