//! Node → queueable payload.

use crate::engine::collaborators::PersistenceResolver;
use crate::error::IndexerError;
use crate::node::Node;
use crate::types::NodePayload;

/// Project `node` into a [`NodePayload`]. `workspace` is `workspace_override` when given, else the node's own.
pub fn project<R: PersistenceResolver + ?Sized>(
    resolver: &R,
    node: &dyn Node,
    workspace_override: Option<&str>,
) -> Result<NodePayload, IndexerError> {
    let persistence_object_identifier =
        resolver
            .resolve(&node.entity())
            .map_err(|source| IndexerError::Projection {
                identifier: node.identifier().to_string(),
                source,
            })?;
    Ok(NodePayload {
        persistence_object_identifier,
        identifier: node.identifier().to_string(),
        dimensions: node.dimensions().clone(),
        workspace: workspace_override
            .unwrap_or_else(|| node.workspace_name())
            .to_string(),
        node_type: node.node_type().to_string(),
        path: node.path().to_string(),
    })
}
