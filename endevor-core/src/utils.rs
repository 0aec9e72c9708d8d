//! Pure helpers over tree nodes, workspace paths and lists.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::{ElementNode, EndevorElement, EndevorId, Node};

/// Keep only the element nodes, in order.
pub fn filter_element_nodes(nodes: &[Node]) -> Vec<&ElementNode> {
    nodes
        .iter()
        .filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
        .collect()
}

/// Group element nodes by their search location id. Input order is kept
/// within each group.
pub fn group_by_search_location_id(
    nodes: &[ElementNode],
) -> BTreeMap<EndevorId, Vec<ElementNode>> {
    let mut groups: BTreeMap<EndevorId, Vec<ElementNode>> = BTreeMap::new();
    for node in nodes {
        groups
            .entry(node.search_location_id.clone())
            .or_default()
            .push(node.clone());
    }
    groups
}

/// `<workspace>/<edit_folder>/<service>/<location>/<system>/<subsystem>/<type>`
pub fn edit_folder_path(
    workspace: &Path,
    edit_folder: &Path,
    service_name: &str,
    location_name: &str,
    element: &EndevorElement,
) -> PathBuf {
    edit_root_folder_path(workspace, edit_folder)
        .join(service_name)
        .join(location_name)
        .join(&element.system)
        .join(&element.sub_system)
        .join(&element.element_type)
}

/// `<workspace>/<edit_folder>`
pub fn edit_root_folder_path(workspace: &Path, edit_folder: &Path) -> PathBuf {
    workspace.join(edit_folder)
}

/// A file path split into directory, stem and extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilePath {
    pub path: PathBuf,
    pub file_name: String,
    /// Includes the leading dot; `None` when the file name has no dot after
    /// its first character.
    pub file_extension: Option<String>,
}

pub fn parse_file_path(file_path: &Path) -> ParsedFilePath {
    ParsedFilePath {
        path: file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
        file_name: file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        // `PROG.` keeps a bare "." extension; dotfiles have none
        file_extension: file_path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy())),
    }
}

/// New list where every item matching `is_replacement(item, replacement)` is
/// swapped for `replacement`.
pub fn replace_with<T: Clone>(
    items: &[T],
    is_replacement: impl Fn(&T, &T) -> bool,
    replacement: &T,
) -> Vec<T> {
    items
        .iter()
        .map(|item| {
            if is_replacement(item, replacement) {
                replacement.clone()
            } else {
                item.clone()
            }
        })
        .collect()
}

/// Each line prefixed with a newline, for appending to a headline.
pub fn format_with_new_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| format!("\n{}", line.as_ref()))
        .collect()
}
