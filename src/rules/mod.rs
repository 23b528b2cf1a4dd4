//! Rule Loader - stage 4
//!
//! A fixed, versioned set of structural rules plus static best-practice
//! metadata. The rule identifiers are a closed enum rather than free-form
//! strings, so adding a rule forces every match site to handle it.

pub mod checks;
pub mod knowledge;

use serde::Serialize;

use crate::artifact::GeneratedArtifact;
use crate::envelope::{Severity, SynthesisResult};

pub use knowledge::{BestPractice, StructuralPattern, KNOWLEDGE_BASE_VERSION};

/// The structural rule set, one variant per check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    UniqueNodeIds,
    NodePositions,
    ValidConnections,
    NoHardcodedCredentials,
    RequiredNodeFields,
}

impl RuleId {
    pub const ALL: [RuleId; 5] = [
        RuleId::UniqueNodeIds,
        RuleId::NodePositions,
        RuleId::ValidConnections,
        RuleId::NoHardcodedCredentials,
        RuleId::RequiredNodeFields,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::UniqueNodeIds => "unique-node-ids",
            RuleId::NodePositions => "node-positions",
            RuleId::ValidConnections => "valid-connections",
            RuleId::NoHardcodedCredentials => "no-hardcoded-credentials",
            RuleId::RequiredNodeFields => "required-node-fields",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RuleId::UniqueNodeIds => "all node identifiers are distinct",
            RuleId::NodePositions => "every node carries a 2-element coordinate",
            RuleId::ValidConnections => {
                "every connection source and target references an existing node"
            }
            RuleId::NoHardcodedCredentials => "no credential values are inlined in the workflow",
            RuleId::RequiredNodeFields => "every node has non-empty name, type, and version",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RuleId::UniqueNodeIds => Severity::Critical,
            RuleId::NodePositions => Severity::High,
            RuleId::ValidConnections => Severity::Critical,
            RuleId::NoHardcodedCredentials => Severity::Critical,
            RuleId::RequiredNodeFields => Severity::High,
        }
    }

    /// Run this rule against an artifact. Pure; true means pass.
    pub fn check(&self, artifact: &GeneratedArtifact) -> bool {
        match self {
            RuleId::UniqueNodeIds => checks::unique_node_ids(artifact),
            RuleId::NodePositions => checks::node_positions(artifact),
            RuleId::ValidConnections => checks::valid_connections(artifact),
            RuleId::NoHardcodedCredentials => checks::no_hardcoded_credentials(artifact),
            RuleId::RequiredNodeFields => checks::required_node_fields(artifact),
        }
    }

    pub fn descriptor(&self) -> RuleDescriptor {
        RuleDescriptor {
            id: *self,
            description: self.description(),
            severity: self.severity(),
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable rule metadata (the executable check stays on [`RuleId`])
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuleDescriptor {
    pub id: RuleId,
    pub description: &'static str,
    pub severity: Severity,
}

/// One evaluated rule
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuleOutcome {
    pub rule: RuleId,
    pub passed: bool,
}

/// Evaluate the whole rule set against an artifact
pub fn evaluate_rules(artifact: &GeneratedArtifact) -> Vec<RuleOutcome> {
    RuleId::ALL
        .iter()
        .map(|rule| RuleOutcome {
            rule: *rule,
            passed: rule.check(artifact),
        })
        .collect()
}

/// The synthesis payload extended with the static knowledge base.
/// Composition only: nothing already set by the synthesis stage is
/// overwritten, and the flattened serialization preserves its fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBase {
    #[serde(flatten)]
    pub synthesis: SynthesisResult,
    pub validation_rules: Vec<RuleDescriptor>,
    pub best_practices: &'static [BestPractice],
    pub workflow_patterns: &'static [StructuralPattern],
    pub knowledge_base_version: &'static str,
    pub knowledge_base_ready: bool,
}

/// Attach the static knowledge base to a synthesis payload
pub fn load_knowledge_base(synthesis: SynthesisResult) -> KnowledgeBase {
    KnowledgeBase {
        synthesis,
        validation_rules: RuleId::ALL.iter().map(RuleId::descriptor).collect(),
        best_practices: knowledge::BEST_PRACTICES,
        workflow_patterns: knowledge::PATTERNS,
        knowledge_base_version: KNOWLEDGE_BASE_VERSION,
        knowledge_base_ready: true,
    }
}
