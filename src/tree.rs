use std::collections::HashMap;

use tracing::debug;

use crate::product::{ParentId, Product};
use crate::token::{AttributeName, ShapeTag};

/// The root `size` node.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeNode {
    pub width: f64,
    pub height: f64,
}

/// One shape in the nested output tree.
///
/// `parent` is `None` for top-level shapes and the parent's id otherwise.
/// Only groups carry `children` (possibly empty); groups never carry
/// `width`/`height`.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: String,
    pub parent: Option<String>,
    pub tag: String,
    /// Attributes in declaration order.
    pub attributes: Vec<(String, f64)>,
    pub children: Option<Vec<SceneNode>>,
}

impl SceneNode {
    pub fn attribute(&self, key: &str) -> Option<f64> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn is_group(&self) -> bool {
        self.tag == ShapeTag::Group.as_str()
    }
}

/// The `data` part of a successful run: the root size plus the top-level
/// shapes, each nesting its own children.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    pub size: SizeNode,
    pub grid: Vec<SceneNode>,
}

impl SceneGraph {
    /// Fold the flat shape records of `product` into a tree. `None` when the
    /// program never entered a size block.
    pub fn from_product(product: &Product) -> Option<SceneGraph> {
        let size = product.size?;

        let mut children: HashMap<ParentId, Vec<usize>> = HashMap::new();
        for shape in &product.shapes {
            children.entry(shape.parent).or_default().push(shape.id);
        }

        let grid = build_children(product, &children, ParentId::Size);
        debug!(shapes = product.shapes.len(), top_level = grid.len(), "scene graph");
        Some(SceneGraph {
            size: SizeNode {
                width: size.width,
                height: size.height,
            },
            grid,
        })
    }

    /// Total number of shape nodes at every depth.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[SceneNode]) -> usize {
            nodes
                .iter()
                .map(|n| 1 + n.children.as_deref().map_or(0, count))
                .sum()
        }
        count(&self.grid)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> String {
        crate::json::to_json(self)
    }

    /// Serialize to pretty-printed JSON (2-space indent).
    pub fn to_json_pretty(&self) -> String {
        crate::json::to_json_pretty(self)
    }
}

fn build_children(
    product: &Product,
    children: &HashMap<ParentId, Vec<usize>>,
    parent: ParentId,
) -> Vec<SceneNode> {
    let Some(ids) = children.get(&parent) else {
        return Vec::new();
    };
    ids.iter()
        .filter_map(|&id| product.shapes.get(id))
        .map(|shape| {
            let is_group = shape.tag.is_group();
            let attributes = shape
                .attributes
                .iter()
                .filter(|(key, _)| {
                    !(is_group && matches!(key, AttributeName::Width | AttributeName::Height))
                })
                .map(|(key, value)| (key.as_str().to_string(), value))
                .collect();
            SceneNode {
                id: shape.id.to_string(),
                parent: match shape.parent {
                    ParentId::Size => None,
                    ParentId::Shape(id) => Some(id.to_string()),
                },
                tag: shape.tag.as_str().to_string(),
                attributes,
                children: is_group.then(|| {
                    crate::stack::ensure_sufficient_stack(|| {
                        build_children(product, children, ParentId::Shape(shape.id))
                    })
                }),
            }
        })
        .collect()
}
