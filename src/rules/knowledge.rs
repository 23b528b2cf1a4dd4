//! Static best-practice guidance and structural pattern library
//!
//! All literal data: no file or network reads, stable for the lifetime of a
//! pipeline run. The architect stage attaches the lessons-learned digest to
//! its prepared context; the knowledge base carries the full set.

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Value};

pub const KNOWLEDGE_BASE_VERSION: &str = "2025.3";

/// One piece of category-grouped guidance
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BestPractice {
    pub category: &'static str,
    pub guidance: &'static str,
}

pub const BEST_PRACTICES: &[BestPractice] = &[
    BestPractice {
        category: "naming",
        guidance: "Give every node a descriptive name; downstream connections reference names",
    },
    BestPractice {
        category: "naming",
        guidance: "Name the workflow after its outcome, not its trigger",
    },
    BestPractice {
        category: "error-handling",
        guidance: "Add an error route after any node that calls an external service",
    },
    BestPractice {
        category: "error-handling",
        guidance: "Prefer continue-on-fail with a notification over silent retries",
    },
    BestPractice {
        category: "security",
        guidance: "Reference credentials from the credential store; never inline keys or passwords",
    },
    BestPractice {
        category: "security",
        guidance: "Validate webhook payloads before acting on them",
    },
    BestPractice {
        category: "structure",
        guidance: "One trigger per workflow; split unrelated automations into separate workflows",
    },
    BestPractice {
        category: "structure",
        guidance: "Keep linear chains short; branch early when handling multiple record types",
    },
];

/// A named node-sequence shape that recurs across generated workflows
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StructuralPattern {
    pub name: &'static str,
    pub description: &'static str,
    pub node_sequence: &'static [&'static str],
}

pub const PATTERNS: &[StructuralPattern] = &[
    StructuralPattern {
        name: "webhook-to-store",
        description: "Receive an event, transform it, and upsert a record",
        node_sequence: &["webhook", "transform", "upsert"],
    },
    StructuralPattern {
        name: "scheduled-digest",
        description: "On a schedule, collect records and send one summary message",
        node_sequence: &["schedule", "query", "aggregate", "notify"],
    },
    StructuralPattern {
        name: "enrich-and-route",
        description: "Look up extra context for an item, then branch on the result",
        node_sequence: &["trigger", "enrich", "switch", "action"],
    },
    StructuralPattern {
        name: "approval-gate",
        description: "Hold an action until a human approves it",
        node_sequence: &["trigger", "notify", "wait", "action"],
    },
];

/// Digest attached by the context preparer to every architect spec
pub static LESSONS_LEARNED: Lazy<Value> = Lazy::new(|| {
    json!({
        "version": KNOWLEDGE_BASE_VERSION,
        "headline": "Recurring causes of rejected workflows",
        "lessons": [
            "Connections referencing renamed nodes are the most common structural defect",
            "Workflows without positions render as a single stacked column in the editor",
            "Inlined credentials fail review every time; use credential references",
            "Briefs mentioning 'daily' or 'weekly' need an explicit schedule trigger node"
        ]
    })
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guidance_covers_the_core_categories() {
        for category in ["naming", "error-handling", "security", "structure"] {
            assert!(
                BEST_PRACTICES.iter().any(|p| p.category == category),
                "missing guidance category {category}"
            );
        }
    }

    #[test]
    fn patterns_have_nonempty_sequences() {
        for pattern in PATTERNS {
            assert!(!pattern.node_sequence.is_empty(), "{}", pattern.name);
        }
    }

    #[test]
    fn lessons_digest_is_versioned() {
        assert_eq!(LESSONS_LEARNED["version"], KNOWLEDGE_BASE_VERSION);
        assert!(LESSONS_LEARNED["lessons"].as_array().is_some_and(|l| !l.is_empty()));
    }
}
