use crate::error::EngineResult;
use crate::ir::adapter;
use crate::ir::bridge::program::Program;

pub mod cfg;
pub mod expression;
pub mod procedure;
pub mod program;
pub mod shared;
pub mod statement;
pub mod typing;

/// Convert a deserialized program into its validated form
pub fn convert(program: &adapter::program::Program) -> EngineResult<Program> {
    Program::convert(program)
}
