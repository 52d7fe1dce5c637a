use vellum_model::{NodeId, Tree};

/// Validates tree invariants after an edit.
///
/// Asserts that:
/// - Every child points back at its parent
/// - No two sibling text nodes carry identical mark sets
/// - No text node is empty
///
/// # Panics
/// Panics with a descriptive message if any invariant is violated.
pub fn check(tree: &Tree) {
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        let children = tree.children(node);
        for &child in children {
            assert_eq!(tree.parent(child), Some(node), "broken parent link for {child:?}");
            if let Ok(text) = tree.text(child) {
                assert!(!text.is_empty(), "empty text node {child:?}");
            }
        }
        for pair in children.windows(2) {
            if let (Ok(a), Ok(b)) = (tree.text(pair[0]), tree.text(pair[1])) {
                assert!(
                    a.marks != b.marks,
                    "adjacent text nodes {:?} and {:?} share marks",
                    a.content,
                    b.content
                );
            }
        }
        stack.extend(children.iter().copied().filter(|c: &NodeId| tree.is_element(*c)));
    }
}

/// Helper to format a tree for snapshot testing: elements with their offset
/// in the parent and their size, text with its offset span and marks by
/// descending priority.
pub fn format_tree(tree: &Tree) -> String {
    let mut lines = Vec::new();
    format_node(tree, tree.root(), 0, 0, &mut lines);
    lines.join("\n")
}

fn format_node(tree: &Tree, node: NodeId, offset: usize, indent: usize, lines: &mut Vec<String>) {
    let prefix = "  ".repeat(indent);
    if let Ok(text) = tree.text(node) {
        let marks: Vec<&str> = text.marks.by_priority().into_iter().map(|mark| mark.name()).collect();
        let content = if text.is_placeholder() {
            "<placeholder>".to_string()
        } else {
            format!("{:?}", text.content)
        };
        lines.push(format!(
            "{prefix}{content}@{offset}..{} [{}]",
            offset + text.len(),
            marks.join(",")
        ));
        return;
    }
    if let Ok(element) = tree.element(node) {
        let attributes: String = element
            .attributes
            .iter()
            .map(|(key, value)| format!(" {key}={value:?}"))
            .collect();
        lines.push(format!(
            "{prefix}{}@{offset}{attributes} size={}",
            element.kind.tag(),
            tree.size(node)
        ));
        let mut child_offset = 0;
        for &child in tree.children(node) {
            format_node(tree, child, child_offset, indent + 1, lines);
            child_offset += tree.width(child);
        }
    }
}
