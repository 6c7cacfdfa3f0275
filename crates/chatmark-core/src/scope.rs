use crate::message::{Element, ElementDisplay};

/// Classification of one matched name against the element catalog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NameScope<'a> {
    /// No catalog element has this name; the occurrence is coincidental text.
    NotFound,
    /// Elements with this name exist, but every one is scoped to a different
    /// message. Scoping is strict: a name never leaks across messages.
    WrongScope,
    /// An in-scope inline element. The element renders beneath the body, so
    /// the matched text stays plain.
    Inline(&'a Element),
    /// An in-scope reference (or embed) element. The matched text becomes a
    /// link token.
    Reference(&'a Element),
}

/// Resolves a matched name to the first in-scope catalog element with that
/// exact name. Catalog order decides ties between duplicate names; an
/// in-scope element later in the catalog beats an out-of-scope one earlier.
pub fn classify<'a>(
    name: &str,
    message_id: Option<&str>,
    elements: &'a [Element],
) -> NameScope<'a> {
    let element = elements
        .iter()
        .find(|element| element.name == name && element.in_scope(message_id));

    match element {
        Some(element) => match element.display {
            ElementDisplay::Inline => NameScope::Inline(element),
            ElementDisplay::Reference | ElementDisplay::Embed => NameScope::Reference(element),
        },
        None => {
            if elements.iter().any(|element| element.name == name) {
                NameScope::WrongScope
            } else {
                NameScope::NotFound
            }
        }
    }
}
