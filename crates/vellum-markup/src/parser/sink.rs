//! Sink for turning parser events into view nodes.

use crate::parser::event::Event;
use crate::view::{ViewElement, ViewNode};

/// Replays a balanced event list onto a stack of open elements.
pub struct Sink {
    events: Vec<Event>,
}

impl Sink {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Consume the sink and return the top-level nodes.
    pub fn finish(self) -> Vec<ViewNode> {
        let mut top = Vec::new();
        let mut stack: Vec<ViewElement> = Vec::new();

        for event in self.events {
            match event {
                Event::Open { tag, attributes } => {
                    stack.push(ViewElement {
                        tag,
                        attributes,
                        children: Vec::new(),
                    });
                }
                Event::Text(text) => {
                    let siblings = match stack.last_mut() {
                        Some(parent) => &mut parent.children,
                        None => &mut top,
                    };
                    // Consecutive text events form one node
                    match siblings.last_mut() {
                        Some(ViewNode::Text(previous)) => previous.push_str(&text),
                        _ => siblings.push(ViewNode::Text(text)),
                    }
                }
                Event::Close => {
                    if let Some(element) = stack.pop() {
                        let node = ViewNode::Element(element);
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(node),
                            None => top.push(node),
                        }
                    }
                }
            }
        }

        top
    }
}
