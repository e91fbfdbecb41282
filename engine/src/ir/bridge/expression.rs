use std::fmt::{Display, Formatter};

use crate::ir::adapter;
use crate::ir::bridge::shared::Identifier;
use crate::ir::bridge::typing::Type;

/// Index of a local variable within its procedure
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug, Hash)]
pub struct VarId(usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for VarId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl Display for VarId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// A resolved reference to a local variable
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct Var {
    pub id: VarId,
    pub name: Identifier,
    pub ty: Type,
}

impl Var {
    pub fn can_hold_int(&self) -> bool {
        self.ty.can_hold_int()
    }
}

impl Display for Var {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.name.fmt(f)
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum ConditionOp {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum ShiftOp {
    Shl,
    Shr,
    Ushr,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
}

/// Binary operators, grouped by family
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum BinaryOp {
    Arithmetic(ArithmeticOp),
    Condition(ConditionOp),
    Shift(ShiftOp),
    Bitwise(BitwiseOp),
}

impl BinaryOp {
    /// Division-family operators, which trap on a zero divisor
    pub fn is_division(&self) -> bool {
        matches!(
            self,
            Self::Arithmetic(ArithmeticOp::Div) | Self::Arithmetic(ArithmeticOp::Rem)
        )
    }
}

impl From<adapter::expression::BinaryOp> for BinaryOp {
    fn from(op: adapter::expression::BinaryOp) -> Self {
        use adapter::expression::BinaryOp as AdaptedOp;

        match op {
            AdaptedOp::Add => Self::Arithmetic(ArithmeticOp::Add),
            AdaptedOp::Sub => Self::Arithmetic(ArithmeticOp::Sub),
            AdaptedOp::Mul => Self::Arithmetic(ArithmeticOp::Mul),
            AdaptedOp::Div => Self::Arithmetic(ArithmeticOp::Div),
            AdaptedOp::Rem => Self::Arithmetic(ArithmeticOp::Rem),
            AdaptedOp::Eq => Self::Condition(ConditionOp::Eq),
            AdaptedOp::Ne => Self::Condition(ConditionOp::Ne),
            AdaptedOp::Ge => Self::Condition(ConditionOp::Ge),
            AdaptedOp::Le => Self::Condition(ConditionOp::Le),
            AdaptedOp::Gt => Self::Condition(ConditionOp::Gt),
            AdaptedOp::Lt => Self::Condition(ConditionOp::Lt),
            AdaptedOp::Shl => Self::Shift(ShiftOp::Shl),
            AdaptedOp::Shr => Self::Shift(ShiftOp::Shr),
            AdaptedOp::Ushr => Self::Shift(ShiftOp::Ushr),
            AdaptedOp::And => Self::Bitwise(BitwiseOp::And),
            AdaptedOp::Or => Self::Bitwise(BitwiseOp::Or),
            AdaptedOp::Xor => Self::Bitwise(BitwiseOp::Xor),
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Self::Arithmetic(op) => match op {
                ArithmeticOp::Add => "+",
                ArithmeticOp::Sub => "-",
                ArithmeticOp::Mul => "*",
                ArithmeticOp::Div => "/",
                ArithmeticOp::Rem => "%",
            },
            Self::Condition(op) => match op {
                ConditionOp::Eq => "==",
                ConditionOp::Ne => "!=",
                ConditionOp::Ge => ">=",
                ConditionOp::Le => "<=",
                ConditionOp::Gt => ">",
                ConditionOp::Lt => "<",
            },
            Self::Shift(op) => match op {
                ShiftOp::Shl => "<<",
                ShiftOp::Shr => ">>",
                ShiftOp::Ushr => ">>>",
            },
            Self::Bitwise(op) => match op {
                BitwiseOp::And => "&",
                BitwiseOp::Or => "|",
                BitwiseOp::Xor => "^",
            },
        };
        write!(f, "{}", symbol)
    }
}

/// Literals other than 32-bit ints
#[derive(PartialEq, Clone, Debug)]
pub enum Literal {
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Null,
    Class(Identifier),
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long(v) => write!(f, "{}L", v),
            Self::Float(v) => write!(f, "{}F", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "\"{}\"", v),
            Self::Null => write!(f, "null"),
            Self::Class(name) => write!(f, "{}.class", name),
        }
    }
}

/// A validated expression
#[derive(PartialEq, Clone, Debug)]
pub enum Exp {
    Var(Var),
    IntLiteral(i32),
    Literal(Literal),
    Binary {
        op: BinaryOp,
        lhs: Box<Exp>,
        rhs: Box<Exp>,
    },
    Neg(Box<Exp>),
    Cast {
        ty: Type,
        operand: Box<Exp>,
    },
    InstanceOf {
        operand: Box<Exp>,
        ty: Type,
    },
    Invoke {
        callee: Identifier,
        args: Vec<Var>,
    },
    New(Type),
    FieldAccess {
        base: Option<Var>,
        field: Identifier,
    },
    ArrayAccess {
        base: Var,
        index: Box<Exp>,
    },
    ArrayLength(Var),
}

impl Exp {
    /// Whether this is a relational test usable as a branch condition
    pub fn is_condition(&self) -> bool {
        matches!(
            self,
            Self::Binary {
                op: BinaryOp::Condition(_),
                ..
            }
        )
    }

    fn fmt_operand(exp: &Exp, f: &mut Formatter<'_>) -> std::fmt::Result {
        match exp {
            Self::Binary { .. } | Self::Cast { .. } | Self::InstanceOf { .. } => {
                write!(f, "({})", exp)
            }
            _ => exp.fmt(f),
        }
    }
}

impl Display for Exp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Var(var) => var.fmt(f),
            Self::IntLiteral(v) => write!(f, "{}", v),
            Self::Literal(literal) => literal.fmt(f),
            Self::Binary { op, lhs, rhs } => {
                Self::fmt_operand(lhs, f)?;
                write!(f, " {} ", op)?;
                Self::fmt_operand(rhs, f)
            }
            Self::Neg(operand) => {
                write!(f, "-")?;
                Self::fmt_operand(operand, f)
            }
            Self::Cast { ty, operand } => {
                write!(f, "({}) ", ty)?;
                Self::fmt_operand(operand, f)
            }
            Self::InstanceOf { operand, ty } => {
                Self::fmt_operand(operand, f)?;
                write!(f, " instanceof {}", ty)
            }
            Self::Invoke { callee, args } => {
                let repr: Vec<_> = args.iter().map(|e| e.to_string()).collect();
                write!(f, "{}({})", callee, repr.join(", "))
            }
            Self::New(ty) => write!(f, "new {}", ty),
            Self::FieldAccess { base, field } => match base {
                None => field.fmt(f),
                Some(var) => write!(f, "{}.{}", var, field),
            },
            Self::ArrayAccess { base, index } => write!(f, "{}[{}]", base, index),
            Self::ArrayLength(base) => write!(f, "{}.length", base),
        }
    }
}
