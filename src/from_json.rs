use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};

use crate::tree::{SceneGraph, SceneNode, SizeNode};

/// Deserialize the `data` object of an interpreter result back into a
/// `SceneGraph`. This is the inverse of `SceneGraph::to_json`.
///
/// Shape nodes keep their attributes in document order; any key other than
/// `id`, `parent`, `tag` and `children` must hold a number.
pub fn from_json(input: &str) -> Result<SceneGraph, serde_json::Error> {
    serde_json::from_str(input)
}

impl<'de> Deserialize<'de> for SceneGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        struct RawGraph {
            size: SizeNode,
            grid: Vec<SceneNode>,
        }

        let raw = RawGraph::deserialize(deserializer)?;
        Ok(SceneGraph {
            size: raw.size,
            grid: raw.grid,
        })
    }
}

impl<'de> Deserialize<'de> for SizeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        struct RawSize {
            id: String,
            width: f64,
            height: f64,
        }

        let raw = RawSize::deserialize(deserializer)?;
        if raw.id != "size" {
            return Err(de::Error::invalid_value(
                de::Unexpected::Str(&raw.id),
                &"\"size\"",
            ));
        }
        Ok(SizeNode {
            width: raw.width,
            height: raw.height,
        })
    }
}

impl<'de> Deserialize<'de> for SceneNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SceneNodeVisitor)
    }
}

struct SceneNodeVisitor;

impl<'de> Visitor<'de> for SceneNodeVisitor {
    type Value = SceneNode;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a shape node object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SceneNode, A::Error> {
        let mut id: Option<String> = None;
        let mut parent: Option<Option<String>> = None;
        let mut tag: Option<String> = None;
        let mut children: Option<Vec<SceneNode>> = None;
        let mut attributes: Vec<(String, f64)> = Vec::new();

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "id" => id = Some(map.next_value()?),
                "parent" => parent = Some(map.next_value()?),
                "tag" => tag = Some(map.next_value()?),
                "children" => {
                    children = Some(crate::stack::ensure_sufficient_stack(|| map.next_value())?)
                }
                _ => {
                    if attributes.iter().any(|(k, _)| *k == key) {
                        return Err(de::Error::custom(format!("duplicate attribute `{}`", key)));
                    }
                    let value: f64 = map.next_value()?;
                    attributes.push((key, value));
                }
            }
        }

        Ok(SceneNode {
            id: id.ok_or_else(|| de::Error::missing_field("id"))?,
            parent: parent.flatten(),
            tag: tag.ok_or_else(|| de::Error::missing_field("tag"))?,
            attributes,
            children,
        })
    }
}
