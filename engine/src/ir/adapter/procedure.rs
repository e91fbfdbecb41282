use serde::{Deserialize, Serialize};

use crate::ir::adapter::statement::Stmt;
use crate::ir::adapter::typing::Type;

/// A local variable declaration
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct VarDecl {
    /// name of the variable
    pub name: String,
    /// declared type
    pub ty: Type,
}

/// A representation of a procedure
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct Procedure {
    /// name of the procedure
    pub name: String,
    /// every local variable, parameters included
    pub vars: Vec<VarDecl>,
    /// names of the formal parameters, in order
    pub params: Vec<String>,
    /// body of the procedure
    pub stmts: Vec<Stmt>,
}
