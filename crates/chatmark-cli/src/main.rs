use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use serde::{Deserialize, Serialize};

use chatmark_core::{Action, Element, ElementDisplay, Message, Prepared, prepare};
use chatmark_renderer::{Renderer, ThemeMode};

fn main() {
    env_logger::init();

    let mut input: Option<String> = None;
    let mut theme = ThemeMode::Auto;
    let mut raw = false;
    let mut sanitized = false;
    let mut json = false;
    let mut with_js = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--raw" => raw = true,
            "--sanitized" => sanitized = true,
            "--json" => json = true,
            "--js" => with_js = true,
            "--theme" => {
                theme = match args.next().as_deref() {
                    Some("auto") => ThemeMode::Auto,
                    Some("light") => ThemeMode::Light,
                    Some("dark") => ThemeMode::Dark,
                    _ => {
                        eprintln!("--theme expects: auto | light | dark");
                        print_usage();
                        process::exit(2);
                    }
                };
            }
            _ => {
                if input.is_none() {
                    input = Some(arg);
                } else {
                    eprintln!("unexpected argument: {}", arg);
                    print_usage();
                    process::exit(2);
                }
            }
        }
    }

    let source = match input {
        Some(path) => fs::read_to_string(&path).unwrap_or_else(|err| {
            eprintln!("failed to read {}: {}", path, err);
            process::exit(1);
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .unwrap_or_else(|err| {
                    eprintln!("failed to read stdin: {}", err);
                    process::exit(1);
                });
            buffer
        }
    };

    let record: MessageRecord = serde_json::from_str(&source).unwrap_or_else(|err| {
        eprintln!("failed to parse message JSON: {}", err);
        process::exit(1);
    });
    let message = record.into_message();
    log::debug!(
        "rendering message {:?} with {} elements, {} actions",
        message.id,
        message.elements.len(),
        message.actions.len()
    );

    // Empty content is the "nothing to render" signal, not an error.
    let Some(prepared) = prepare(&message) else {
        return;
    };

    let renderer = Renderer::new(theme);
    let fragment = if sanitized {
        renderer.render_message_sanitized(&prepared)
    } else {
        renderer.render_message(&prepared)
    };

    if json {
        print!("{}", render_result_json(&prepared, &fragment));
        return;
    }

    if raw {
        print!("{}", fragment);
    } else {
        print!("{}", renderer.embed_html(&fragment, true, with_js));
    }
}

fn print_usage() {
    eprintln!(
        "Usage: chatmark-cli [--theme auto|light|dark] [--raw] [--sanitized] [--json] [--js] [input.json]"
    );
}

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

impl MessageRecord {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            content: self.content,
            elements: self.elements.into_iter().map(ElementRecord::into_element).collect(),
            actions: self.actions.into_iter().map(ActionRecord::into_action).collect(),
            language: self.language,
            author_is_user: self.author_is_user,
        }
    }
}

impl ElementRecord {
    fn into_element(self) -> Element {
        Element {
            name: self.name,
            for_id: self.for_id,
            display: match self.display.as_deref() {
                Some("inline") => ElementDisplay::Inline,
                Some("embed") => ElementDisplay::Embed,
                _ => ElementDisplay::Reference,
            },
            url: self.url,
        }
    }
}

impl ActionRecord {
    fn into_action(self) -> Action {
        Action {
            name: self.name,
            label: self.label,
            value: self.value,
            for_id: self.for_id,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderResult<'a> {
    html: &'a str,
    inlined_elements: Vec<&'a str>,
    ref_elements: Vec<&'a str>,
    scoped_actions: Vec<&'a str>,
}

fn render_result_json(prepared: &Prepared, html: &str) -> String {
    let result = RenderResult {
        html,
        inlined_elements: prepared
            .inlined
            .iter()
            .map(|element| element.name.as_str())
            .collect(),
        ref_elements: prepared
            .refs
            .iter()
            .map(|element| element.name.as_str())
            .collect(),
        scoped_actions: prepared
            .actions
            .iter()
            .map(|action| action.name.as_str())
            .collect(),
    };
    serde_json::to_string_pretty(&result).unwrap_or_else(|err| {
        eprintln!("failed to serialize result: {}", err);
        process::exit(1);
    })
}
