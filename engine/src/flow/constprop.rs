use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use log::info;
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::constant::{execute_constant_propagation, CPFact, ConstantPropagation};
use crate::error::{EngineError, EngineResult};
use crate::flow::shared::Context;
use crate::ir::bridge::cfg::Node;
use crate::ir::bridge::procedure::Procedure;
use crate::ir::bridge::program::Program;

/// Facts around one statement, keyed by variable name
#[derive(Serialize, PartialEq, Eq, Clone, Debug)]
pub struct StmtReport {
    pub index: usize,
    pub stmt: String,
    pub incoming: BTreeMap<String, String>,
    pub outgoing: BTreeMap<String, String>,
}

/// Constant propagation result of one procedure
#[derive(Serialize, PartialEq, Eq, Clone, Debug)]
pub struct ProcedureReport {
    pub name: String,
    pub stmts: Vec<StmtReport>,
}

fn render_fact(procedure: &Procedure, fact: &CPFact) -> EngineResult<BTreeMap<String, String>> {
    fact.iter()
        .map(|(id, value)| {
            let var = procedure.var(*id).ok_or_else(|| {
                EngineError::InvariantViolation(format!(
                    "unknown variable {} in procedure {}",
                    id, procedure.name
                ))
            })?;
            Ok((var.name.to_string(), value.to_string()))
        })
        .collect()
}

impl ProcedureReport {
    fn build(procedure: &Procedure) -> EngineResult<Self> {
        let state = execute_constant_propagation(procedure)?;

        let mut stmts = vec![];
        for (index, stmt) in procedure.stmts.iter().enumerate() {
            let node = Node::Stmt(index);
            let missing = || {
                EngineError::InvariantViolation(format!(
                    "no dataflow state for node {} in procedure {}",
                    node, procedure.name
                ))
            };
            let incoming = state.get_in_fact(node).ok_or_else(missing)?;
            let outgoing = state.get_out_fact(node).ok_or_else(missing)?;
            stmts.push(StmtReport {
                index,
                stmt: stmt.to_string(),
                incoming: render_fact(procedure, incoming)?,
                outgoing: render_fact(procedure, outgoing)?,
            });
        }

        Ok(Self {
            name: procedure.name.to_string(),
            stmts,
        })
    }
}

impl Display for ProcedureReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        for item in &self.stmts {
            let values: Vec<_> = item
                .outgoing
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect();
            write!(f, "\n  [{}] {} {{{}}}", item.index, item.stmt, values.join(", "))?;
        }
        Ok(())
    }
}

pub struct FlowConstProp<'a> {
    /// Context manager
    ctxt: &'a Context,
    /// Program under analysis
    program: &'a Program,
    /// Procedures to analyze, all of them if empty
    procedures: Vec<String>,
    /// Where to save the JSON report
    output: Option<PathBuf>,
}

impl<'a> FlowConstProp<'a> {
    pub fn new(
        ctxt: &'a Context,
        program: &'a Program,
        procedures: Vec<String>,
        output: Option<PathBuf>,
    ) -> Self {
        Self {
            ctxt,
            program,
            procedures,
            output,
        }
    }

    fn select(&self) -> EngineResult<Vec<&'a Procedure>> {
        if self.procedures.is_empty() {
            return Ok(self.program.procedures.iter().collect());
        }

        let mut wanted = BTreeSet::new();
        for name in &self.procedures {
            if self.program.procedure(name).is_none() {
                return Err(EngineError::InvalidAssumption(format!(
                    "no such procedure: {}",
                    name
                )));
            }
            wanted.insert(name.as_str());
        }
        Ok(self
            .program
            .procedures
            .iter()
            .filter(|p| {
                let name: &str = p.name.as_ref();
                wanted.contains(name)
            })
            .collect())
    }

    pub fn execute(self) -> EngineResult<Vec<ProcedureReport>> {
        let targets = self.select()?;
        info!(
            "running {} on {} procedure(s)",
            ConstantPropagation::ID,
            targets.len()
        );

        let reports = if self.ctxt.parallel {
            targets
                .into_par_iter()
                .map(ProcedureReport::build)
                .collect::<EngineResult<Vec<_>>>()?
        } else {
            targets
                .into_iter()
                .map(ProcedureReport::build)
                .collect::<EngineResult<Vec<_>>>()?
        };

        if let Some(path) = &self.output {
            let file = File::create(path).map_err(|e| {
                EngineError::LoadingError(format!("unable to create the report file: {}", e))
            })?;
            serde_json::to_writer_pretty(BufWriter::new(file), &reports).map_err(|e| {
                EngineError::LoadingError(format!("unable to write the report: {}", e))
            })?;
            info!("report saved at {}", path.display());
        }

        Ok(reports)
    }
}
