//! Brieflow - staged intake-to-workflow generation pipeline
//!
//! Turns an untrusted inbound request (an email or a web-form submission)
//! into a validated workflow artifact via LLM-backed stages, or into a
//! safely rendered error report. Failures propagate as typed data, never
//! exceptions, so the client always receives exactly one notification.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        INTAKE                                │
//! │  intake/    classify, extract, validate, sanitize            │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     GENERATION STAGES                        │
//! │  stage/     architect, synthesis, review, failure            │
//! │  rules/     structural rule set + knowledge base             │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      SHARED PLUMBING                         │
//! │  envelope   stage payloads + error envelope                  │
//! │  artifact   generated workflow graph model                   │
//! │  llm        external LLM call contract                       │
//! │  render     HTML with mandatory escaping                     │
//! │  util/      fence stripping, truncation, limits              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`intake`] | Stage 1: raw payload → `NormalizedRequest` |
//! | [`stage`] | Stages 2, 3, 5, 6: LLM output parsing, reporting |
//! | [`rules`] | Stage 4: static structural rules + knowledge base |
//! | [`pipeline`] | Orchestrator adapter wiring the stages together |
//! | [`envelope`] | Typed payloads and the inter-stage error envelope |
//! | [`artifact`] | Node/connection graph model |
//! | [`llm`] | Tolerant external LLM response contract |
//! | [`render`] | Escaped HTML fragments |
//! | [`error`] | Driver-facing errors with fix suggestions |

// ═══════════════════════════════════════════════════════════════
// INTAKE - untrusted input → canonical request
// ═══════════════════════════════════════════════════════════════
pub mod intake;

// ═══════════════════════════════════════════════════════════════
// GENERATION - LLM-backed stages and the rule engine
// ═══════════════════════════════════════════════════════════════
pub mod pipeline;
pub mod rules;
pub mod stage;

// ═══════════════════════════════════════════════════════════════
// SHARED PLUMBING - payloads, contracts, rendering
// ═══════════════════════════════════════════════════════════════
pub mod artifact;
pub mod envelope;
pub mod llm;
pub mod render;
pub mod util;

// ═══════════════════════════════════════════════════════════════
// CROSS-CUTTING - error handling
// ═══════════════════════════════════════════════════════════════
pub mod error;

// ═══════════════════════════════════════════════════════════════
// PUBLIC API RE-EXPORTS
// ═══════════════════════════════════════════════════════════════

// Error types
pub use error::{BrieflowError, FixSuggestion};

// Intake
pub use intake::normalize;

// Stage payloads and plumbing
pub use envelope::{
    DetailCode, ErrorDetail, ErrorEnvelope, NormalizedRequest, Severity, Source, StageResult,
    StageSpec, SynthesisResult,
};

// Artifact model
pub use artifact::{GeneratedArtifact, NodeDescriptor};

// LLM contract
pub use llm::LlmCallResult;

// Rules
pub use rules::{evaluate_rules, load_knowledge_base, KnowledgeBase, RuleId, RuleOutcome};

// Pipeline driver
pub use pipeline::{run, DeliveredNotification, PipelineOutcome};

// Terminal stage payloads
pub use stage::failure::FailureReport;
pub use stage::review::ReviewResult;
