use std::fs;
use std::path::Path;

use cprop_shared::config::PARALLEL;
use log::debug;

use crate::error::{EngineError, EngineResult};
use crate::ir::{adapter, bridge};

/// Context for all workflow
pub struct Context {
    /// Whether procedures are analyzed in parallel
    pub parallel: bool,
}

impl Context {
    pub fn new() -> Self {
        Self {
            parallel: *PARALLEL,
        }
    }

    fn deserialize(content: &str) -> EngineResult<bridge::program::Program> {
        let program_adapted: adapter::program::Program =
            serde_json::from_str(content).map_err(|e| {
                EngineError::LoadingError(format!("Error during deserialization: {}", e))
            })?;
        bridge::convert(&program_adapted)
    }

    /// Load a JSON-serialized program and validate it
    pub fn load(&self, input: &Path) -> EngineResult<bridge::program::Program> {
        let content = fs::read_to_string(input)
            .map_err(|e| EngineError::LoadingError(format!("Corrupted JSON file: {}", e)))?;
        let program = Self::deserialize(&content)?;
        debug!(
            "{} procedure(s) loaded from {}",
            program.procedures.len(),
            input.display()
        );
        Ok(program)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
