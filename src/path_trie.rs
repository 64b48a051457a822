//! Prefix tree over path components
//!
//! Used to plan directory creation: only leaf directories are created, since
//! creating a leaf creates all of its ancestors. The root directory of an
//! absolute path is kept as its own component, so relative and absolute
//! paths live in separate branches of one tree.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR};

#[derive(Debug, Default, Clone)]
struct PathTrieNode {
    children: BTreeMap<String, PathTrieNode>,
}

#[derive(Debug, Default, Clone)]
pub struct PathTrie {
    root: PathTrieNode,
}

impl PathTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `path`, extending the tree with any components not yet present
    pub fn insert(&mut self, path: impl AsRef<Path>) {
        let mut node = &mut self.root;
        for component in path.as_ref().components() {
            let part = match component {
                Component::RootDir => MAIN_SEPARATOR_STR.to_string(),
                Component::CurDir | Component::Prefix(_) => continue,
                Component::ParentDir => "..".to_string(),
                Component::Normal(part) => part.to_string_lossy().into_owned(),
            };
            node = node.children.entry(part).or_default();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Full paths of every leaf in the tree
    pub fn leaf_paths(&self) -> Vec<PathBuf> {
        let mut leaves = Vec::new();
        let mut stack: Vec<(PathBuf, &PathTrieNode)> = self
            .root
            .children
            .iter()
            .map(|(name, child)| (PathBuf::from(name), child))
            .collect();

        while let Some((path, node)) = stack.pop() {
            if node.children.is_empty() {
                leaves.push(path);
                continue;
            }
            for (name, child) in &node.children {
                stack.push((path.join(name), child));
            }
        }
        leaves
    }
}
