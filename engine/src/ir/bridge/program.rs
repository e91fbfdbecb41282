use std::collections::BTreeSet;

use crate::error::{EngineError, EngineResult};
use crate::ir::adapter;
use crate::ir::bridge::procedure::Procedure;

/// A validated program
#[derive(Debug)]
pub struct Program {
    /// procedures, in input order
    pub procedures: Vec<Procedure>,
}

impl Program {
    pub fn convert(program: &adapter::program::Program) -> EngineResult<Self> {
        let adapter::program::Program { procedures } = program;

        let mut names = BTreeSet::new();
        let mut procedures_new = vec![];
        for procedure in procedures {
            if !names.insert(procedure.name.as_str()) {
                return Err(EngineError::InvariantViolation(format!(
                    "duplicated procedure {}",
                    procedure.name
                )));
            }
            procedures_new.push(Procedure::convert(procedure)?);
        }

        Ok(Self {
            procedures: procedures_new,
        })
    }

    pub fn procedure(&self, name: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.name.as_ref() == name)
    }
}
