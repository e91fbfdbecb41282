use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use crate::analysis::evaluate::evaluate;
use crate::analysis::generic::*;
use crate::error::EngineResult;
use crate::ir::bridge::expression::{Var, VarId};
use crate::ir::bridge::procedure::Procedure;
use crate::ir::bridge::statement::{LValue, Stmt};

//
// Constant Propagation
//

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum Value {
    /// No definition has reached this point yet
    Undefined,
    /// Holds exactly this value on every path
    Constant(i32),
    /// Not a constant
    Nac,
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    pub fn is_nac(&self) -> bool {
        matches!(self, Self::Nac)
    }

    pub fn as_constant(&self) -> Option<i32> {
        match self {
            Self::Constant(v) => Some(*v),
            Self::Undefined | Self::Nac => None,
        }
    }
}

impl AbstractDomain for Value {
    fn meet(&self, other: &Self) -> Self {
        use Value::*;
        match (self, other) {
            (Nac, _) | (_, Nac) => Nac,
            (Undefined, x) | (x, Undefined) => *x,
            (Constant(x), Constant(y)) if x == y => Constant(*x),
            (Constant(_), Constant(_)) => Nac,
        }
    }

    fn partial_order(&self, other: &Self) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Undefined, Undefined) | (Nac, Nac) => Some(Ordering::Equal),
            (Undefined, _) | (_, Nac) => Some(Ordering::Less),
            (_, Undefined) | (Nac, _) => Some(Ordering::Greater),
            (Constant(x), Constant(y)) if x == y => Some(Ordering::Equal),
            (Constant(_), Constant(_)) => None,
        }
    }

    fn bottom() -> Self {
        Value::Undefined
    }

    fn top() -> Self {
        Value::Nac
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => write!(f, "UNDEF"),
            Self::Constant(v) => write!(f, "{}", v),
            Self::Nac => write!(f, "NAC"),
        }
    }
}

pub type CPFact = MapFact<VarId, Value>;

/// Forward constant propagation over int-like local variables
pub struct ConstantPropagation;

impl ConstantPropagation {
    pub const ID: &'static str = "constprop";

    /// Whether the variable can hold an int value
    pub fn can_hold_int(var: &Var) -> bool {
        var.can_hold_int()
    }

    pub fn meet_value(v1: &Value, v2: &Value) -> Value {
        v1.meet(v2)
    }
}

impl DataflowAnalysis for ConstantPropagation {
    type Fact = CPFact;

    fn is_forward(&self) -> bool {
        true
    }

    fn new_boundary_fact(&self, procedure: &Procedure) -> CPFact {
        // parameters hold some unknown value on entry
        procedure
            .params
            .iter()
            .filter(|param| Self::can_hold_int(param))
            .map(|param| (param.id, Value::Nac))
            .collect()
    }

    fn new_initial_fact(&self) -> CPFact {
        CPFact::new()
    }

    fn meet_into(&self, fact: &CPFact, target: &mut CPFact) {
        for (var, value) in fact {
            let merged = Self::meet_value(&target.get(var), value);
            target.update(*var, merged);
        }
    }

    fn transfer_node(&self, stmt: &Stmt, input: &CPFact, output: &mut CPFact) -> bool {
        match stmt {
            Stmt::Definition {
                lvalue: LValue::Var(gen),
                rvalue,
            } if Self::can_hold_int(gen) => {
                let result = evaluate(rvalue, input);
                let mut fact = input.copy();
                fact.update(gen.id, result);
                output.copy_from(&fact)
            }
            _ => output.copy_from(input),
        }
    }
}

pub fn execute_constant_propagation(procedure: &Procedure) -> EngineResult<CfgState<CPFact>> {
    execute(procedure, &ConstantPropagation)
}
