//! Encoding of the object graph into the `project.pbxproj` payload

use super::graph::ProjectGraph;
use anyhow::{Context, Result};

/// Encodes a finished project graph
///
/// The format is opaque to the pipeline; it only needs the bytes to write.
pub trait ProjectSerializer: Send + Sync {
    fn serialize(&self, project: &ProjectGraph) -> Result<Vec<u8>>;
}

/// Serializer that emits the graph as pretty-printed JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonProjectSerializer;

impl ProjectSerializer for JsonProjectSerializer {
    fn serialize(&self, project: &ProjectGraph) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(project)
            .with_context(|| format!("Failed to encode project '{}'", project.name))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
