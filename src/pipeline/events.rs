//! Event records read from a JSON-lines stream.

use serde::Deserialize;

use crate::node::NodeRecord;
use crate::types::JobKind;

/// One line of an event stream: `{"op":"index","node":{...},"targetWorkspace":"live"}`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEvent {
    pub op: JobKind,
    pub node: NodeRecord,
    /// Set when the event comes from publishing into another workspace.
    #[serde(default)]
    pub target_workspace: Option<String>,
}

/// One result from reading the stream: an event, or a line that could not be parsed.
pub enum LineOutcome {
    Ok(NodeEvent),
    Err { line: usize, msg: String },
}

/// Parse one line. Blank lines yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> Option<LineOutcome> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match serde_json::from_str::<NodeEvent>(trimmed) {
        Ok(event) => LineOutcome::Ok(event),
        Err(err) => LineOutcome::Err {
            line: line_no,
            msg: err.to_string(),
        },
    })
}
