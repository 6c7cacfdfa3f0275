use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use chatmark_core::{Action, Element, ElementDisplay, Message};
use chatmark_renderer::{Renderer, ThemeMode};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageRecord {
    id: Option<String>,
    content: Option<String>,
    #[serde(default)]
    elements: Vec<ElementRecord>,
    #[serde(default)]
    actions: Vec<ActionRecord>,
    language: Option<String>,
    #[serde(default)]
    author_is_user: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementRecord {
    name: String,
    for_id: Option<String>,
    display: Option<String>,
    url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionRecord {
    name: String,
    label: Option<String>,
    value: Option<String>,
    for_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderOptions {
    theme: Option<String>,
    sanitized: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderResult {
    html: String,
    inlined_elements: Vec<String>,
    ref_elements: Vec<String>,
    scoped_actions: Vec<String>,
}

#[wasm_bindgen]
pub fn render_message(message: JsValue) -> Result<JsValue, JsValue> {
    render_message_with_options(message, JsValue::UNDEFINED)
}

#[wasm_bindgen]
pub fn render_message_with_options(
    message: JsValue,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let record: MessageRecord =
        serde_wasm_bindgen::from_value(message).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let (theme, sanitized) = options_from_js(options)?;
    let message = into_message(record);

    let result = match chatmark_core::prepare(&message) {
        Some(prepared) => {
            let renderer = Renderer::new(theme);
            let html = if sanitized {
                renderer.render_message_sanitized(&prepared)
            } else {
                renderer.render_message(&prepared)
            };
            RenderResult {
                html,
                inlined_elements: prepared
                    .inlined
                    .iter()
                    .map(|element| element.name.clone())
                    .collect(),
                ref_elements: prepared
                    .refs
                    .iter()
                    .map(|element| element.name.clone())
                    .collect(),
                scoped_actions: prepared
                    .actions
                    .iter()
                    .map(|action| action.name.clone())
                    .collect(),
            }
        }
        // Nothing to render: an empty result, not an error.
        None => RenderResult {
            html: String::new(),
            inlined_elements: Vec::new(),
            ref_elements: Vec::new(),
            scoped_actions: Vec::new(),
        },
    };

    serde_wasm_bindgen::to_value(&result).map_err(|err| JsValue::from_str(&err.to_string()))
}

#[wasm_bindgen]
pub fn stylesheet(theme: Option<String>) -> String {
    Renderer::new(theme_mode(theme.as_deref())).stylesheet()
}

fn options_from_js(value: JsValue) -> Result<(ThemeMode, bool), JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok((ThemeMode::Auto, false));
    }
    let parsed: RenderOptions =
        serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))?;
    Ok((
        theme_mode(parsed.theme.as_deref()),
        parsed.sanitized.unwrap_or(false),
    ))
}

fn theme_mode(value: Option<&str>) -> ThemeMode {
    match value {
        Some("light") => ThemeMode::Light,
        Some("dark") => ThemeMode::Dark,
        _ => ThemeMode::Auto,
    }
}

fn into_message(record: MessageRecord) -> Message {
    Message {
        id: record.id,
        content: record.content,
        elements: record
            .elements
            .into_iter()
            .map(|element| Element {
                name: element.name,
                for_id: element.for_id,
                display: match element.display.as_deref() {
                    Some("inline") => ElementDisplay::Inline,
                    Some("embed") => ElementDisplay::Embed,
                    _ => ElementDisplay::Reference,
                },
                url: element.url,
            })
            .collect(),
        actions: record
            .actions
            .into_iter()
            .map(|action| Action {
                name: action.name,
                label: action.label,
                value: action.value,
                for_id: action.for_id,
            })
            .collect(),
        language: record.language,
        author_is_user: record.author_is_user,
    }
}
