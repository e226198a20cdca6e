//! Loading a tag tree from JSON.
//!
//! The engine does not parse HTML; an external tree builder hands it a
//! finished tree. For the command-line front end and fixtures that tree is
//! written as JSON:
//!
//! ```json
//! {"tag": "p", "attrs": {"class": "warn"}, "children": [{"text": "Hi"}]}
//! ```
//!
//! The top level may be a single node or an array of nodes.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::{ElementData, NodeId, NodeType, TagTree};

/// Failure to load a tag tree.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input was not valid tag tree JSON.
    #[error("invalid tag tree JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// An element had an empty tag name.
    #[error("element without a tag name")]
    EmptyTag,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonNode {
    Text {
        text: String,
    },
    Element {
        tag: String,
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<JsonNode>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Many(Vec<JsonNode>),
    One(JsonNode),
}

impl TagTree {
    /// Parse a tag tree from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the text is not valid JSON of the expected
    /// shape or an element has an empty tag name.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let document: JsonDocument = serde_json::from_str(text)?;
        let nodes = match document {
            JsonDocument::Many(nodes) => nodes,
            JsonDocument::One(node) => vec![node],
        };

        let mut tree = Self::new();
        let mut stack: Vec<(NodeId, JsonNode)> =
            nodes.into_iter().rev().map(|n| (NodeId::ROOT, n)).collect();
        while let Some((parent, node)) = stack.pop() {
            match node {
                JsonNode::Text { text } => {
                    let _ = tree.append_text(parent, &text);
                }
                JsonNode::Element { tag, attrs, children } => {
                    if tag.trim().is_empty() {
                        return Err(LoadError::EmptyTag);
                    }
                    let element = ElementData::new(
                        tag.trim(),
                        attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                    );
                    let id = tree.alloc(NodeType::Element(element));
                    tree.append_child(parent, id);
                    stack.extend(children.into_iter().rev().map(|c| (id, c)));
                }
            }
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HtmlTag;

    #[test]
    fn test_load_nested_document() {
        let tree = TagTree::from_json(
            r#"{"tag": "body", "children": [
                {"tag": "p", "attrs": {"class": "warn"}, "children": [{"text": "Hi"}]},
                {"tag": "div"}
            ]}"#,
        )
        .unwrap();

        let body = tree.document_element().unwrap();
        assert_eq!(tree.as_element(body).unwrap().tag, HtmlTag::Body);
        let children = tree.children(body);
        assert_eq!(children.len(), 2);
        assert_eq!(tree.as_element(children[0]).unwrap().class(), Some("warn"));
        assert_eq!(tree.as_text(tree.children(children[0])[0]), Some("Hi"));
    }

    #[test]
    fn test_rejects_empty_tag() {
        assert!(matches!(
            TagTree::from_json(r#"{"tag": " "}"#),
            Err(LoadError::EmptyTag)
        ));
    }
}
