use serde::{Deserialize, Serialize};

use crate::ir::adapter::procedure::Procedure;

/// A representation of a program dump
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct Program {
    /// procedures in the program
    pub procedures: Vec<Procedure>,
}
