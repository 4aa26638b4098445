//! Scene-graph accumulator filled in while a program runs.
//!
//! Records are flat: each shape names its parent, and the nested tree is
//! only assembled afterwards (see `tree`).

use std::fmt;

use tracing::trace;

use crate::token::{AttributeName, ShapeTag};

/// Where new shapes attach: the root `size` block or an enclosing group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentId {
    Size,
    Shape(usize),
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentId::Size => f.write_str("size"),
            ParentId::Shape(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRecord {
    pub width: f64,
    pub height: f64,
}

/// Attributes in declaration order. Declaring a key twice keeps its first
/// position and the last value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    entries: Vec<(AttributeName, f64)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: AttributeName, value: f64) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: AttributeName) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttributeName, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One shape, in creation order. `id` equals its index in `Product::shapes`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    pub id: usize,
    pub parent: ParentId,
    pub tag: ShapeTag,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Product {
    pub size: Option<SizeRecord>,
    /// Append-only.
    pub shapes: Vec<ShapeRecord>,
    /// `None` until a size block has been entered.
    pub current_scope: Option<ParentId>,
}

impl Product {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a shape under the current scope and return its id, or `None`
    /// when no size block has been entered.
    pub fn add_shape(&mut self, tag: ShapeTag, attributes: Attributes) -> Option<usize> {
        self.size?;
        let parent = self.current_scope?;
        let id = self.shapes.len();
        trace!(id, %parent, %tag, "shape record");
        self.shapes.push(ShapeRecord {
            id,
            parent,
            tag,
            attributes,
        });
        Some(id)
    }
}
