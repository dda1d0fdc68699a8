//! Node reference consumed by the indexer, and a plain-data implementation of it.

use serde::Deserialize;

use crate::types::Dimensions;

/// Reference to the persisted entity behind a node. `key` is `None` until the entity is persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityRef<'a> {
    pub type_name: &'a str,
    pub key: Option<&'a str>,
}

/// What the indexer needs to know about a content node.
pub trait Node {
    /// Identity, stable across workspaces.
    fn identifier(&self) -> &str;
    fn node_type(&self) -> &str;
    fn path(&self) -> &str;
    fn dimensions(&self) -> &Dimensions;
    /// Workspace the node currently belongs to.
    fn workspace_name(&self) -> &str;
    /// Tombstone flag.
    fn is_removed(&self) -> bool;
    fn entity(&self) -> EntityRef<'_>;
}

/// Default entity type name for [`NodeRecord`].
fn default_entity_type() -> String {
    "NodeData".to_string()
}

/// Owned node snapshot, as read from an event stream.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub identifier: String,
    pub node_type: String,
    pub path: String,
    #[serde(default)]
    pub dimensions: Dimensions,
    pub workspace: String,
    #[serde(default)]
    pub removed: bool,
    #[serde(default = "default_entity_type")]
    pub entity_type: String,
    /// Persistence key; absent for nodes whose entity was never persisted.
    #[serde(default)]
    pub entity_key: Option<String>,
}

impl NodeRecord {
    /// Persisted, non-removed node without dimensions. The entity key is `<workspace>:<identifier>`.
    pub fn new(identifier: &str, node_type: &str, path: &str, workspace: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            node_type: node_type.to_string(),
            path: path.to_string(),
            dimensions: Dimensions::new(),
            workspace: workspace.to_string(),
            removed: false,
            entity_type: default_entity_type(),
            entity_key: Some(format!("{workspace}:{identifier}")),
        }
    }

    pub fn with_dimension(mut self, name: &str, values: &[&str]) -> Self {
        self.dimensions.insert(
            name.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn removed(mut self) -> Self {
        self.removed = true;
        self
    }

    pub fn unpersisted(mut self) -> Self {
        self.entity_key = None;
        self
    }
}

impl Node for NodeRecord {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn node_type(&self) -> &str {
        &self.node_type
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    fn workspace_name(&self) -> &str {
        &self.workspace
    }

    fn is_removed(&self) -> bool {
        self.removed
    }

    fn entity(&self) -> EntityRef<'_> {
        EntityRef {
            type_name: &self.entity_type,
            key: self.entity_key.as_deref(),
        }
    }
}
