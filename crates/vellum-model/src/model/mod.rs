pub mod fragment;
pub mod mark;
pub mod node;
pub mod position;
pub mod range;
pub mod table;
pub mod tree;
pub mod walk;

pub use fragment::Fragment;
pub use mark::{CORE_OWNER, Mark, MarkAttributes, MarkKind, MarkRegistry, MarkSet, MarkSpec};
pub use node::{ElementKind, ElementNode, INVISIBLE_SPACE, NodeData, NodeId, TextNode};
pub use position::{Location, Position};
pub use range::{Confinement, Range};
pub use table::{CellIndex, Dimensions};
pub use tree::Tree;
pub use walk::{Ancestors, Descendants, NodesInRange, text_nodes_in};
