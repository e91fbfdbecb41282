use std::collections::{BTreeMap, BTreeSet};

use crate::error::{EngineError, EngineResult};
use crate::ir::adapter;
use crate::ir::bridge::cfg::{ControlFlowGraph, Node};
use crate::ir::bridge::expression::{Var, VarId};
use crate::ir::bridge::shared::Identifier;
use crate::ir::bridge::statement::{Context, Stmt};
use crate::ir::bridge::typing::Type;

/// Statement carried by the synthetic entry and exit nodes
static NOP: Stmt = Stmt::Nop;

/// A validated procedure
#[derive(Debug)]
pub struct Procedure {
    /// procedure name
    pub name: Identifier,
    /// local variables, indexed by `VarId`
    pub vars: Vec<Var>,
    /// formal parameters, in declaration order
    pub params: Vec<Var>,
    /// body of the procedure
    pub stmts: Vec<Stmt>,
    /// control-flow graph over the body
    pub cfg: ControlFlowGraph,
}

impl Procedure {
    pub fn convert(procedure: &adapter::procedure::Procedure) -> EngineResult<Self> {
        let adapter::procedure::Procedure {
            name,
            vars,
            params,
            stmts,
        } = procedure;

        // declare variables
        let mut vars_new = vec![];
        let mut scope = BTreeMap::new();
        for (index, decl) in vars.iter().enumerate() {
            let ty = Type::convert(&decl.ty);
            if matches!(ty, Type::Void) {
                return Err(EngineError::InvalidAssumption(format!(
                    "variable {} declared with void type",
                    decl.name
                )));
            }
            let var = Var {
                id: VarId::from(index),
                name: (&decl.name).into(),
                ty,
            };
            if scope.insert(decl.name.clone(), var.clone()).is_some() {
                return Err(EngineError::InvariantViolation(format!(
                    "duplicated variable {} in procedure {}",
                    decl.name, name
                )));
            }
            vars_new.push(var);
        }

        // create the context
        let ctxt = Context {
            vars: &scope,
            size: stmts.len(),
        };

        // resolve parameters
        let mut seen = BTreeSet::new();
        let mut params_new = vec![];
        for param in params {
            if !seen.insert(param.as_str()) {
                return Err(EngineError::InvariantViolation(format!(
                    "duplicated parameter {} in procedure {}",
                    param, name
                )));
            }
            params_new.push(ctxt.resolve(param)?);
        }

        // convert statement by statement
        let stmts_new: Vec<_> = stmts
            .iter()
            .map(|stmt| ctxt.parse_stmt(stmt))
            .collect::<EngineResult<_>>()?;
        let cfg = ControlFlowGraph::build(&stmts_new)?;

        Ok(Self {
            name: name.into(),
            vars: vars_new,
            params: params_new,
            stmts: stmts_new,
            cfg,
        })
    }

    pub fn var(&self, id: VarId) -> Option<&Var> {
        self.vars.get(id.index())
    }

    /// Statement at a CFG node, entry and exit carry a `nop`
    pub fn stmt(&self, node: Node) -> Option<&Stmt> {
        match node {
            Node::Entry | Node::Exit => Some(&NOP),
            Node::Stmt(index) => self.stmts.get(index),
        }
    }
}
