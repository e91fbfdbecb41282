use serde::{Deserialize, Serialize};

use crate::ir::adapter::expression::Exp;

/// Target of a definition
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub enum LValue {
    Var(String),
    FieldAccess { base: Option<String>, field: String },
    ArrayAccess { base: String, index: Exp },
}

/// A representation of a statement, jump targets are statement indices
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub enum Stmt {
    /// assignment of the rvalue to the lvalue
    Definition { lvalue: LValue, rvalue: Exp },
    /// call whose result is discarded
    Invoke(Exp),
    /// unconditional jump
    Goto { target: usize },
    /// conditional jump, falls through otherwise
    If { condition: Exp, target: usize },
    /// multi-way jump on an int variable
    Switch {
        var: String,
        cases: Vec<(i32, usize)>,
        default: usize,
    },
    /// procedure return
    Return { value: Option<String> },
    /// raise an exception
    Throw { exception: String },
    /// no operation
    Nop,
}
