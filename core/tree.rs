use crate::gather::FileEntry;
use log;
use std::collections::BTreeMap;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const INDENT: &str = "  ";

/// A directory tree keyed by path segment. Files are nodes without children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    pub fn root() -> Self {
        Self::default()
    }

    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: BTreeMap::new(),
        }
    }

    /// Inserts the segments of a relative path, creating intermediate nodes.
    pub fn insert(&mut self, relative_path: &str) {
        let mut current = self;
        for segment in relative_path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .children
                .entry(segment.to_string())
                .or_insert_with(|| TreeNode::named(segment));
        }
    }

    pub fn from_entries(entries: &[FileEntry]) -> Self {
        let mut root = Self::root();
        for entry in entries {
            root.insert(&entry.relative_path);
        }
        root
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Renders the children of this node, one line per entry.
    pub fn render(&self) -> String {
        let mut output = String::new();
        self.render_into(0, &mut output);
        output
    }

    fn render_into(&self, depth: usize, output: &mut String) {
        let count = self.children.len();
        for (i, child) in self.children.values().enumerate() {
            let connector = if i + 1 == count { LAST_BRANCH } else { BRANCH };
            output.push_str(&INDENT.repeat(depth));
            output.push_str(connector);
            output.push_str(&child.name);
            output.push('\n');
            child.render_into(depth + 1, output);
        }
    }
}

pub fn render_tree(entries: &[FileEntry]) -> String {
    log::debug!("Building tree structure from {} paths...", entries.len());
    TreeNode::from_entries(entries).render()
}
