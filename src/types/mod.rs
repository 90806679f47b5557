//! Core types shared across the crate

/// Language model (LLM) types and interfaces.
///
/// This module provides:
/// - Common types for LLM interactions
/// - Client trait definitions
/// - Configuration structures
/// - Error types specific to LLM operations
pub mod llm;

/// Crate-level error and result types.
pub mod error;

// Re-exports
pub use error::{Error, Result};
pub use llm::{LLMClient, LLMConfig, LLMError, LLMParams, LLMResponse};
