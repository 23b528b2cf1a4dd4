//! Generated workflow artifact model
//!
//! The synthesis stage emits a node/connection graph whose shape is only as
//! trustworthy as the model that produced it. Parsing is deliberately
//! lenient: unknown node fields are preserved, and structural problems are
//! the rule engine's job, not serde's.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single node in the generated workflow graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(
        rename = "typeVersion",
        alias = "version",
        skip_serializing_if = "Option::is_none"
    )]
    pub type_version: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl NodeDescriptor {
    /// Identifier the connections object may reference: `id`, else `name`
    pub fn identifier(&self) -> Option<&str> {
        self.id.as_deref().or(self.name.as_deref())
    }
}

/// The generated workflow graph: a name, at least one node, and a
/// connections object keyed by node identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    #[serde(default)]
    pub name: String,
    pub nodes: Vec<NodeDescriptor>,
    pub connections: Map<String, Value>,
}

impl GeneratedArtifact {
    /// Structural gate over a freshly parsed JSON value.
    ///
    /// Returns the exact defect on violation so the synthesis stage can put
    /// it in its envelope: `"missing nodes array"`, `"workflow has no
    /// nodes"`, or `"missing connections object"`.
    pub fn from_value(value: &Value) -> Result<Self, &'static str> {
        let object = value.as_object().ok_or("missing nodes array")?;

        let nodes = match object.get("nodes") {
            Some(Value::Array(nodes)) => nodes,
            _ => return Err("missing nodes array"),
        };
        if nodes.is_empty() {
            return Err("workflow has no nodes");
        }

        let connections = match object.get("connections") {
            Some(Value::Object(connections)) => connections.clone(),
            _ => return Err("missing connections object"),
        };

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        // A node that is not even an object becomes an empty descriptor and
        // fails the required-fields rule downstream.
        let nodes = nodes
            .iter()
            .map(|node| serde_json::from_value(node.clone()).unwrap_or_default())
            .collect();

        Ok(Self {
            name,
            nodes,
            connections,
        })
    }

    /// Set of identifiers a connection may legally reference (both `id` and
    /// `name` spellings, since generated graphs use either)
    pub fn identifier_set(&self) -> HashSet<&str> {
        let mut ids = HashSet::new();
        for node in &self.nodes {
            if let Some(id) = node.id.as_deref() {
                ids.insert(id);
            }
            if let Some(name) = node.name.as_deref() {
                ids.insert(name);
            }
        }
        ids
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Serialized size in bytes, used for result metadata
    pub fn serialized_size(&self) -> usize {
        serde_json::to_string(self).map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_minimal_artifact() {
        let value = json!({
            "name": "Order sync",
            "nodes": [{"id": "1", "name": "Webhook", "type": "webhook", "typeVersion": 1}],
            "connections": {}
        });
        let artifact = GeneratedArtifact::from_value(&value).unwrap();
        assert_eq!(artifact.name, "Order sync");
        assert_eq!(artifact.node_count(), 1);
        assert_eq!(artifact.connection_count(), 0);
    }

    #[test]
    fn rejects_missing_nodes_array() {
        assert_eq!(
            GeneratedArtifact::from_value(&json!({"connections": {}})),
            Err("missing nodes array")
        );
        assert_eq!(
            GeneratedArtifact::from_value(&json!({"nodes": "oops", "connections": {}})),
            Err("missing nodes array")
        );
    }

    #[test]
    fn rejects_empty_nodes() {
        assert_eq!(
            GeneratedArtifact::from_value(&json!({"nodes": [], "connections": {}})),
            Err("workflow has no nodes")
        );
    }

    #[test]
    fn rejects_missing_connections_object() {
        assert_eq!(
            GeneratedArtifact::from_value(&json!({"nodes": [{"id": "1"}]})),
            Err("missing connections object")
        );
        assert_eq!(
            GeneratedArtifact::from_value(&json!({"nodes": [{"id": "1"}], "connections": []})),
            Err("missing connections object")
        );
    }

    #[test]
    fn non_object_input_is_a_missing_nodes_defect() {
        assert_eq!(
            GeneratedArtifact::from_value(&json!("just a string")),
            Err("missing nodes array")
        );
    }

    #[test]
    fn identifier_set_unions_ids_and_names() {
        let value = json!({
            "nodes": [
                {"id": "a", "name": "Webhook"},
                {"name": "Airtable"}
            ],
            "connections": {}
        });
        let artifact = GeneratedArtifact::from_value(&value).unwrap();
        let ids = artifact.identifier_set();
        assert!(ids.contains("a"));
        assert!(ids.contains("Webhook"));
        assert!(ids.contains("Airtable"));
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn unknown_node_fields_survive_round_trip() {
        let value = json!({
            "nodes": [{"id": "1", "parameters": {"path": "hook"}}],
            "connections": {}
        });
        let artifact = GeneratedArtifact::from_value(&value).unwrap();
        let back = serde_json::to_value(&artifact).unwrap();
        assert_eq!(back["nodes"][0]["parameters"]["path"], "hook");
    }

    #[test]
    fn version_alias_is_accepted() {
        let value = json!({
            "nodes": [{"id": "1", "version": "2"}],
            "connections": {}
        });
        let artifact = GeneratedArtifact::from_value(&value).unwrap();
        assert_eq!(artifact.nodes[0].type_version, Some(json!("2")));
    }
}
