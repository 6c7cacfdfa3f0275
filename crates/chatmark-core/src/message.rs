/// A named artifact (file, image, generated panel) attached to a
/// conversation and referenced by name from message text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Restricts the element to one message. `None` means global.
    pub for_id: Option<String>,
    pub display: ElementDisplay,
    /// Target the rendered widget points at, when the element has one.
    pub url: Option<String>,
}

impl Element {
    pub fn in_scope(&self, message_id: Option<&str>) -> bool {
        match self.for_id.as_deref() {
            Some(for_id) => Some(for_id) == message_id,
            None => true,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ElementDisplay {
    /// Rendered directly beneath the message body.
    Inline,
    /// Rendered as a link that reveals the element instead of navigating.
    Reference,
    /// Rendered as a link plus an embedded panel pointing at the element URL.
    Embed,
}

/// A message-scoped command offered alongside rendered content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub label: Option<String>,
    pub value: Option<String>,
    /// Same scoping rule as [`Element::for_id`].
    pub for_id: Option<String>,
}

impl Action {
    pub fn in_scope(&self, message_id: Option<&str>) -> bool {
        match self.for_id.as_deref() {
            Some(for_id) => Some(for_id) == message_id,
            None => true,
        }
    }
}

/// One message's text plus the catalogs visible to its render call.
///
/// `elements` and `actions` are the FULL catalogs, not pre-filtered; scope
/// filtering happens fresh on every [`prepare`](crate::prepare) call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    pub id: Option<String>,
    pub content: Option<String>,
    pub elements: Vec<Element>,
    pub actions: Vec<Action>,
    /// Fenced-code language tag. When set, the prepared content is shown
    /// verbatim inside one fenced block.
    pub language: Option<String>,
    /// Affects only presentational weight, never the rewrite.
    pub author_is_user: bool,
}

/// The result of one rewrite pass. Recomputed per render, never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prepared {
    pub content: String,
    /// Unique, insertion order = first encounter.
    pub inlined: Vec<Element>,
    /// One entry per textual occurrence; duplicates allowed.
    pub refs: Vec<Element>,
    pub actions: Vec<Action>,
    pub author_is_user: bool,
}
