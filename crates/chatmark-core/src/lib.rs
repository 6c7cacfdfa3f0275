mod action;
mod matcher;
mod message;
mod prepare;
mod scope;

pub use action::scoped_actions;
pub use matcher::NameMatcher;
pub use message::{Action, Element, ElementDisplay, Message, Prepared};
pub use prepare::prepare;
pub use scope::{NameScope, classify};
