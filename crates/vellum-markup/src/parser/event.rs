//! # Parser Events
//!
//! The parser does not build [`ViewNode`]s directly. It emits a flat list of
//! events that the [`Sink`](super::sink::Sink) replays onto a stack:
//!
//! ```text
//! Open(p)            <p>
//!   Text("Hello ")   Hello
//!   Open(b)          <b>
//!     Text("world")  world
//!   Close            </b>
//! Close              </p>
//! ```
//!
//! Balancing is checked while the events are produced, so a sink only ever
//! sees a well-nested sequence.
//!
//! [`ViewNode`]: crate::view::ViewNode

/// An event emitted by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin an element.
    Open {
        tag: String,
        attributes: Vec<(String, String)>,
    },

    /// Character data, already entity-decoded.
    Text(String),

    /// End the innermost open element.
    Close,
}

impl Event {
    pub fn open(tag: impl Into<String>) -> Self {
        Event::Open {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Event::Text(text.into())
    }
}
