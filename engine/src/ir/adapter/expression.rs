use serde::{Deserialize, Serialize};

use crate::ir::adapter::typing::Type;

/// A flat list of binary operators
#[derive(Serialize, Deserialize, Eq, PartialEq, Copy, Clone, Debug)]
pub enum BinaryOp {
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    // condition
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
    // shift
    Shl,
    Shr,
    Ushr,
    // bitwise
    And,
    Or,
    Xor,
}

/// A representation of an expression, variables are referred to by name
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub enum Exp {
    /// reference to a local variable
    Var(String),
    // literals
    IntLiteral(i32),
    LongLiteral(i64),
    FloatLiteral(f32),
    DoubleLiteral(f64),
    StringLiteral(String),
    NullLiteral,
    ClassLiteral(String),
    /// binary operation
    Binary {
        op: BinaryOp,
        lhs: Box<Exp>,
        rhs: Box<Exp>,
    },
    /// arithmetic negation
    Neg(Box<Exp>),
    /// type cast
    Cast { ty: Type, operand: Box<Exp> },
    /// type test
    InstanceOf { operand: Box<Exp>, ty: Type },
    /// method or function call
    Invoke { callee: String, args: Vec<String> },
    /// object or array allocation
    New(Type),
    /// field load, static when there is no base
    FieldAccess { base: Option<String>, field: String },
    /// array element load
    ArrayAccess { base: String, index: Box<Exp> },
    /// length of an array
    ArrayLength(String),
}
