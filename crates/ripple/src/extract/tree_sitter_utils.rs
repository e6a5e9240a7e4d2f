//! Shared tree-sitter utilities for grammar-backed extractors.
//!
//! Provides common functions for extracting text and positions from tree-sitter nodes.

// Tree-sitter returns usize for positions, but we store u32 for compactness.
#![allow(clippy::cast_possible_truncation)]

use crate::types::LineRange;

/// Get text content of a tree-sitter node.
///
/// Returns `None` if the node's byte range contains invalid UTF-8.
pub fn node_text(node: &tree_sitter::Node, content: &[u8]) -> Option<String> {
    match std::str::from_utf8(&content[node.byte_range()]) {
        Ok(s) => Some(s.to_string()),
        Err(e) => {
            tracing::trace!(
                byte_range = ?node.byte_range(),
                error = %e,
                node_kind = %node.kind(),
                "Failed to decode node text as UTF-8"
            );
            None
        }
    }
}

/// 1-indexed line on which a node starts.
pub fn node_line(node: &tree_sitter::Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// 1-indexed inclusive line range a node covers.
pub fn node_lines(node: &tree_sitter::Node) -> LineRange {
    LineRange::new(node_line(node), node.end_position().row as u32 + 1)
}

/// Line of the first error or missing node under `node`, in document order.
///
/// Returns `None` when the subtree is error-free.
pub fn first_error_line(node: &tree_sitter::Node) -> Option<u32> {
    if node.is_error() || node.is_missing() {
        return Some(node_line(node));
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(line) = first_error_line(&child) {
            return Some(line);
        }
    }
    // has_error() without an error descendant: report the node itself.
    Some(node_line(node))
}
