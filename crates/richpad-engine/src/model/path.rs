use std::fmt;

use crate::model::inline::{self, Inline};

/// Structural index path to a caret-holding container.
///
/// - `[b]`: top-level Paragraph, Heading, Quote or CodeBlock `b`
/// - `[b, i0, i1, ..]`: list item, descending through nested lists
/// - `[b, r, c]`: table cell
///
/// Paths are recomputed against the current tree rather than held as node
/// handles, so a stale path simply fails to resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn root(block: usize) -> Self {
        Self(vec![block])
    }

    /// Index of the top-level block the path starts in.
    pub fn block(&self) -> usize {
        self.0.first().copied().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Path segments below the top-level block.
    pub fn rest(&self) -> &[usize] {
        self.0.get(1..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        (self.0.len() > 1).then(|| Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Same depth, different final index.
    pub fn with_last(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        if let Some(last) = indices.last_mut() {
            *last = index;
        }
        Self(indices)
    }

    /// Same path re-rooted at another top-level block.
    pub fn with_block(&self, block: usize) -> Self {
        let mut indices = self.0.clone();
        if let Some(first) = indices.first_mut() {
            *first = block;
        }
        Self(indices)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "[{}]", parts.join("/"))
    }
}

/// A caret position: a container path plus an offset in caret units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub path: NodePath,
    pub offset: usize,
}

impl Position {
    pub fn new(path: impl Into<NodePath>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

/// Borrowed view of a caret-holding container.
#[derive(Debug, Clone, Copy)]
pub enum Container<'a> {
    Inlines(&'a Vec<Inline>),
    Code(&'a String),
}

impl Container<'_> {
    pub fn units(&self) -> usize {
        match self {
            Container::Inlines(inlines) => inline::units(inlines),
            Container::Code(text) => text.chars().count(),
        }
    }
}

#[derive(Debug)]
pub enum ContainerMut<'a> {
    Inlines(&'a mut Vec<Inline>),
    Code(&'a mut String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let path = NodePath::new(vec![2, 0, 1]);
        assert_eq!(path.block(), 2);
        assert_eq!(path.rest(), &[0, 1]);
        assert_eq!(path.parent(), Some(NodePath::new(vec![2, 0])));
        assert_eq!(path.with_last(4), NodePath::new(vec![2, 0, 4]));
        assert_eq!(path.with_block(5), NodePath::new(vec![5, 0, 1]));
        assert_eq!(path.child(3).len(), 4);
        assert_eq!(path.to_string(), "[2/0/1]");
        assert_eq!(NodePath::root(1).parent(), None);
    }
}
