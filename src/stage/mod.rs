//! Pipeline stages 2, 3, 5, and 6
//!
//! Each stage is a pure function of its explicit inputs: the relevant LLM
//! call result plus the previous stage's payload, both passed in by the
//! orchestrator (never looked up implicitly). Failures come back as
//! [`crate::envelope::ErrorEnvelope`] values; the terminal failure stage
//! is additionally guarded against its own collapse.

pub mod architect;
pub mod failure;
pub mod review;
pub mod synthesis;
