//! Local study-material manifest.
//!
//! Walks the configured files directory and returns a tree of folders and
//! supported documents.  Node ids are derived from the relative path so
//! they stay stable across scans.

use std::cmp::Ordering;
use std::io;
use std::path::{Component, Path};

use ring::digest;
use serde::Serialize;

const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "md", "txt", "docx", "png", "jpg", "jpeg", "gif", "webp",
];

const IGNORED_NAMES: &[&str] = &[".DS_Store", "Thumbs.db", ".git", "node_modules"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

/// One entry of the manifest tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// `/`-separated path relative to the scan root.
    pub relative_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
}

/// `local-` followed by the first 8 hex chars of the path's SHA-256.
pub fn node_id(relative_path: &str) -> String {
    let hash = digest::digest(&digest::SHA256, relative_path.as_bytes());
    let hex: String = hash.as_ref()[..4].iter().map(|b| format!("{b:02x}")).collect();
    format!("local-{hex}")
}

/// Scan `root` recursively.
///
/// Blocking; run it on the blocking pool.
pub fn scan_directory(root: &Path) -> io::Result<Vec<FileNode>> {
    scan(root, root)
}

fn scan(dir: &Path, root: &Path) -> io::Result<Vec<FileNode>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || IGNORED_NAMES.contains(&name.as_str()) {
            continue;
        }
        let is_dir = entry.file_type()?.is_dir();
        entries.push((name, is_dir, entry.path()));
    }

    entries.sort_by(|(a, a_dir, _), (b, b_dir, _)| match (a_dir, b_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)),
    });

    let mut nodes = Vec::with_capacity(entries.len());
    for (name, is_dir, path) in entries {
        let relative_path = relative(&path, root);
        if is_dir {
            let children = scan(&path, root)?;
            nodes.push(FileNode {
                id: node_id(&relative_path),
                title: name,
                kind: NodeKind::Folder,
                relative_path,
                children: Some(children),
            });
        } else if is_supported(&path) {
            nodes.push(FileNode {
                id: node_id(&relative_path),
                title: name,
                kind: NodeKind::File,
                relative_path,
                children: None,
            });
        }
    }
    Ok(nodes)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

fn relative(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
