/*!
# Vellum Markup

An HTML-like markup front end for [`vellum_model`] documents.

## Pipeline

```text
markup text ──lex──▶ tokens ──parse──▶ events ──sink──▶ ViewNode tree
                                                          │      ▲
                                             HtmlReader   │      │  HtmlWriter
                                                          ▼      │
                                                        model Tree
```

- [`lexer`] cuts text into tag and text tokens with Logos.
- [`parser`] checks tag balance and emits a flat event list, folded into
  [`ViewNode`]s by the sink.
- [`HtmlReader`] and [`HtmlWriter`] implement the model's `Reader` and
  `Writer` seams, turning mark elements (`<strong>`, `<em>`, ...) into marks
  and back.
- [`TextOffsetAdapter`] implements the model's `SelectionAdapter` for
  selections given as character offsets.
- [`vdom`](mod@vdom) is a fixture notation that builds model trees exactly as
  written, for tests and debugging.

## Round trip

Reading what the writer produced gives back the same tree, as long as the
tree was normalized (which every edit guarantees):

```
use vellum_markup::{HtmlReader, HtmlWriter};
use vellum_model::{Reader, Writer};

let parsed = HtmlReader::default()
    .read_str("<div><p>plain <b>bold <i>both</i></b></p></div>")
    .unwrap();
let view = HtmlWriter::default().write(&parsed.tree);
let again = HtmlReader::default().parse(&view).unwrap();
assert!(again.tree.same_tree(&parsed.tree));
```
*/

pub mod error;
pub mod lexer;
pub mod marks;
pub mod parser;
pub mod reader;
pub mod selection;
pub mod vdom;
pub mod view;
pub mod writer;

// Re-export key types for easier usage
pub use error::{MarkupError, Result};
pub use marks::MarkTags;
pub use parser::{parse, parse_element};
pub use reader::{HtmlReader, ViewPath};
pub use selection::{TextOffsetAdapter, TextSelection};
pub use vdom::{Fixture, to_vdom, vdom, vdom_with};
pub use view::{ViewElement, ViewNode, to_markup};
pub use writer::HtmlWriter;
