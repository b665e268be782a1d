//! Plain-text rendering of a permission tree and its selection.

use std::fmt::Write;

use permtree_core::{LockedSet, PermissionTree, SelectionSet, SelectionState};


pub fn checkbox_glyph(state: SelectionState) -> &'static str {
    match state {
        SelectionState::Unselected => "[ ]",
        SelectionState::Selected => "[x]",
        SelectionState::Partial => "[-]",
    }
}

/// Renders one line per node, indented by depth:
///
/// ```text
/// [-] Customers (customers)
///   [x] View (customers.view) (locked)
///   [ ] Update (customers.update)
/// ```
pub fn render_tree(tree: &PermissionTree, selected: &SelectionSet, locked: &LockedSet) -> String {
    let mut output = String::new();

    for (node, state) in tree.states(selected) {
        let indentation = "  ".repeat(node.depth());
        let locked_marker = if locked.contains(node.id()) {
            " (locked)"
        } else {
            ""
        };

        // PANIC SAFETY: `fmt::Write` for `String` never returns an error.
        writeln!(
            output,
            "{}{} {} ({}){}",
            indentation,
            checkbox_glyph(state),
            node.label(),
            node.id(),
            locked_marker
        )
        .unwrap();
    }

    output
}
