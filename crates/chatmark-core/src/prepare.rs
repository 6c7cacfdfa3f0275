use regex::Captures;

use crate::action::scoped_actions;
use crate::matcher::NameMatcher;
use crate::message::{Element, ElementDisplay, Message, Prepared};
use crate::scope::{NameScope, classify};

/// Runs the full annotation pipeline over one message.
///
/// One left-to-right substitution pass over the trimmed content: every match
/// of the name pattern is classified against the element catalog and either
/// left as plain text, registered as inline content, or rewritten into a link
/// token. Returns `None` when there is nothing to render.
pub fn prepare(message: &Message) -> Option<Prepared> {
    let message_id = message.id.as_deref();
    let actions = scoped_actions(&message.actions, message_id);

    let mut content = message
        .content
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    // Inline elements scoped to this message always render beneath the body,
    // whether or not their name occurs in the text.
    let mut inlined: Vec<Element> = Vec::new();
    for element in &message.elements {
        if element.for_id.as_deref() == message_id
            && element.display == ElementDisplay::Inline
            && !inlined.contains(element)
        {
            inlined.push(element.clone());
        }
    }
    let mut refs = Vec::new();

    let names: Vec<&str> = message
        .elements
        .iter()
        .map(|element| element.name.as_str())
        .collect();

    if let Some(matcher) = NameMatcher::from_names(&names) {
        content = matcher
            .regex()
            .replace_all(&content, |caps: &Captures| {
                let matched = &caps[0];
                match classify(matched, message_id, &message.elements) {
                    NameScope::NotFound | NameScope::WrongScope => matched.to_string(),
                    NameScope::Inline(element) => {
                        if !inlined.contains(element) {
                            inlined.push(element.clone());
                        }
                        matched.to_string()
                    }
                    NameScope::Reference(element) => {
                        refs.push(element.clone());
                        // Spaces break markdown link targets. The target is a
                        // placeholder; only the label is used downstream.
                        format!("[{}]({})", matched, matched.replace(' ', "_"))
                    }
                }
            })
            .into_owned();
    }

    if content.is_empty() {
        log::debug!("message {:?} has no content to render", message_id);
        return None;
    }

    if let Some(language) = message.language.as_deref() {
        // Code-formatted messages are shown verbatim, link tokens included.
        content = format!("```{}\n{}\n```", language, content);
    }

    Some(Prepared {
        content,
        inlined,
        refs,
        actions,
        author_is_user: message.author_is_user,
    })
}
