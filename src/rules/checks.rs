//! Executable structural checks over a generated artifact
//!
//! Pure predicates: no I/O, no state, true means the artifact passes.

use serde_json::Value;

use crate::artifact::GeneratedArtifact;

/// Substrings that indicate an inlined credential. Matched against the
/// case-folded serialized artifact with quotes removed, so JSON keys like
/// `"api_key":` match the same as prose `api_key:`.
const CREDENTIAL_MARKERS: &[&str] = &["api_key:", "password:", "secret:"];

/// All node identifiers distinct
pub fn unique_node_ids(artifact: &GeneratedArtifact) -> bool {
    let mut seen = std::collections::HashSet::new();
    for node in &artifact.nodes {
        if let Some(id) = node.identifier() {
            if !seen.insert(id) {
                return false;
            }
        }
    }
    true
}

/// Every node carries a 2-element numeric coordinate
pub fn node_positions(artifact: &GeneratedArtifact) -> bool {
    artifact.nodes.iter().all(|node| {
        node.position
            .as_ref()
            .and_then(Value::as_array)
            .is_some_and(|coords| coords.len() == 2 && coords.iter().all(Value::is_number))
    })
}

/// Every connection source and target references an existing node
/// identifier. An artifact with zero connections passes.
pub fn valid_connections(artifact: &GeneratedArtifact) -> bool {
    let ids = artifact.identifier_set();
    artifact.connections.iter().all(|(source, targets)| {
        ids.contains(source.as_str()) && referenced_nodes_exist(targets, &ids)
    })
}

/// Walk a connection subtree; every `"node": "..."` reference must resolve
fn referenced_nodes_exist(value: &Value, ids: &std::collections::HashSet<&str>) -> bool {
    match value {
        Value::Object(map) => map.iter().all(|(key, nested)| {
            if key == "node" {
                match nested.as_str() {
                    Some(target) => ids.contains(target),
                    None => false,
                }
            } else {
                referenced_nodes_exist(nested, ids)
            }
        }),
        Value::Array(items) => items.iter().all(|item| referenced_nodes_exist(item, ids)),
        _ => true,
    }
}

/// Serialized artifact must not embed credential-looking values
pub fn no_hardcoded_credentials(artifact: &GeneratedArtifact) -> bool {
    let serialized = serde_json::to_string(artifact)
        .unwrap_or_default()
        .to_lowercase()
        .replace('"', "");
    !CREDENTIAL_MARKERS
        .iter()
        .any(|marker| serialized.contains(marker))
}

/// Every node has non-empty name, type, and version fields
pub fn required_node_fields(artifact: &GeneratedArtifact) -> bool {
    artifact.nodes.iter().all(|node| {
        let named = node.name.as_deref().is_some_and(|name| !name.is_empty());
        let typed = node.kind.as_deref().is_some_and(|kind| !kind.is_empty());
        let versioned = match &node.type_version {
            Some(Value::Number(_)) => true,
            Some(Value::String(version)) => !version.is_empty(),
            _ => false,
        };
        named && typed && versioned
    })
}
