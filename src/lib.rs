//! Click-triggered visual effects over a deterministic in-memory document.
//!
//! A [`Harness`] parses an HTML fragment into a small document runtime.
//! [`ClickEffects::install`] then resolves three fixed element collections and
//! one control element, and wires them to their effects:
//!
//! - `ol li` items get `text-decoration: line-through` when clicked,
//! - `ul li` items get `opacity: 0` when clicked,
//! - `#row img` images get `width: 0px` when clicked,
//! - clicking `#destroy-all` applies every effect to every collected element.
//!
//! ```
//! use click_effects::{ClickEffects, Harness};
//!
//! let mut h = Harness::from_html(
//!     r#"<ol><li id="a">x</li></ol><button id="destroy-all">go</button>"#,
//! )?;
//! ClickEffects::install(&mut h)?;
//! h.click("#a")?;
//! h.assert_style("#a", "text-decoration", "line-through")?;
//! # Ok::<(), click_effects::Error>(())
//! ```

use std::collections::{HashMap, VecDeque};
use std::error::Error as StdError;
use std::fmt;
use std::rc::Rc;

mod dom;
mod effects;
mod events;
mod harness;
mod html;
mod selector;


use dom::*;
use events::*;
use harness::TraceCategory;
use html::*;

pub use dom::NodeId;
pub use effects::{ClickEffects, Effect, EffectSelectors, TargetCollection};
pub use events::{EventState, ListenerAction};
pub use harness::Harness;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    DomRuntime(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::DomRuntime(msg) => write!(f, "dom runtime error: {msg}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}
