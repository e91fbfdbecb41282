use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::error::{EngineError, EngineResult};
use crate::ir::adapter;
use crate::ir::bridge::expression::{BinaryOp, Exp, Literal, Var};
use crate::ir::bridge::shared::Identifier;
use crate::ir::bridge::typing::Type;

/// Target of a definition
#[derive(PartialEq, Clone, Debug)]
pub enum LValue {
    Var(Var),
    FieldAccess { base: Option<Var>, field: Identifier },
    ArrayAccess { base: Var, index: Exp },
}

impl Display for LValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Var(var) => var.fmt(f),
            Self::FieldAccess { base, field } => match base {
                None => field.fmt(f),
                Some(var) => write!(f, "{}.{}", var, field),
            },
            Self::ArrayAccess { base, index } => write!(f, "{}[{}]", base, index),
        }
    }
}

/// A validated statement
#[derive(PartialEq, Clone, Debug)]
pub enum Stmt {
    Definition {
        lvalue: LValue,
        rvalue: Exp,
    },
    Invoke(Exp),
    Goto {
        target: usize,
    },
    If {
        condition: Exp,
        target: usize,
    },
    Switch {
        var: Var,
        cases: Vec<(i32, usize)>,
        default: usize,
    },
    Return {
        value: Option<Var>,
    },
    Throw {
        exception: Var,
    },
    Nop,
}

impl Stmt {
    /// The assignment target and right-hand side, if this is a definition
    pub fn as_definition(&self) -> Option<(&LValue, &Exp)> {
        match self {
            Self::Definition { lvalue, rvalue } => Some((lvalue, rvalue)),
            _ => None,
        }
    }

    /// The local variable defined by this statement
    pub fn defined_var(&self) -> Option<&Var> {
        match self.as_definition() {
            Some((LValue::Var(var), _)) => Some(var),
            _ => None,
        }
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Definition { lvalue, rvalue } => write!(f, "{} = {};", lvalue, rvalue),
            Self::Invoke(call) => write!(f, "{};", call),
            Self::Goto { target } => write!(f, "goto {};", target),
            Self::If { condition, target } => write!(f, "if ({}) goto {};", condition, target),
            Self::Switch {
                var,
                cases,
                default,
            } => {
                let repr: Vec<_> = cases
                    .iter()
                    .map(|(label, target)| format!("case {}: {}", label, target))
                    .collect();
                write!(
                    f,
                    "switch ({}) {{{}, default: {}}};",
                    var,
                    repr.join(", "),
                    default
                )
            }
            Self::Return { value } => match value {
                None => write!(f, "return;"),
                Some(var) => write!(f, "return {};", var),
            },
            Self::Throw { exception } => write!(f, "throw {};", exception),
            Self::Nop => write!(f, "nop;"),
        }
    }
}

/// A context manager for converting statements of one procedure
pub struct Context<'a> {
    /// variables in scope, by name
    pub vars: &'a BTreeMap<String, Var>,
    /// number of statements in the procedure
    pub size: usize,
}

impl<'a> Context<'a> {
    /// resolve a variable by name
    pub fn resolve(&self, name: &str) -> EngineResult<Var> {
        self.vars.get(name).cloned().ok_or_else(|| {
            EngineError::InvalidAssumption(format!("reference to undeclared variable: {}", name))
        })
    }

    fn check_target(&self, target: usize) -> EngineResult<usize> {
        if target >= self.size {
            return Err(EngineError::InvalidAssumption(format!(
                "jump target {} out of range",
                target
            )));
        }
        Ok(target)
    }

    /// convert an expression
    pub fn parse_exp(&self, exp: &adapter::expression::Exp) -> EngineResult<Exp> {
        use adapter::expression::Exp as AdaptedExp;

        let converted = match exp {
            AdaptedExp::Var(name) => Exp::Var(self.resolve(name)?),
            AdaptedExp::IntLiteral(v) => Exp::IntLiteral(*v),
            AdaptedExp::LongLiteral(v) => Exp::Literal(Literal::Long(*v)),
            AdaptedExp::FloatLiteral(v) => Exp::Literal(Literal::Float(*v)),
            AdaptedExp::DoubleLiteral(v) => Exp::Literal(Literal::Double(*v)),
            AdaptedExp::StringLiteral(v) => Exp::Literal(Literal::String(v.clone())),
            AdaptedExp::NullLiteral => Exp::Literal(Literal::Null),
            AdaptedExp::ClassLiteral(name) => Exp::Literal(Literal::Class(name.into())),
            AdaptedExp::Binary { op, lhs, rhs } => Exp::Binary {
                op: BinaryOp::from(*op),
                lhs: Box::new(self.parse_exp(lhs)?),
                rhs: Box::new(self.parse_exp(rhs)?),
            },
            AdaptedExp::Neg(operand) => Exp::Neg(Box::new(self.parse_exp(operand)?)),
            AdaptedExp::Cast { ty, operand } => Exp::Cast {
                ty: Type::convert(ty),
                operand: Box::new(self.parse_exp(operand)?),
            },
            AdaptedExp::InstanceOf { operand, ty } => Exp::InstanceOf {
                operand: Box::new(self.parse_exp(operand)?),
                ty: Type::convert(ty),
            },
            AdaptedExp::Invoke { callee, args } => Exp::Invoke {
                callee: callee.into(),
                args: args
                    .iter()
                    .map(|name| self.resolve(name))
                    .collect::<EngineResult<_>>()?,
            },
            AdaptedExp::New(ty) => Exp::New(Type::convert(ty)),
            AdaptedExp::FieldAccess { base, field } => Exp::FieldAccess {
                base: base.as_deref().map(|name| self.resolve(name)).transpose()?,
                field: field.into(),
            },
            AdaptedExp::ArrayAccess { base, index } => Exp::ArrayAccess {
                base: self.resolve(base)?,
                index: Box::new(self.parse_exp(index)?),
            },
            AdaptedExp::ArrayLength(base) => Exp::ArrayLength(self.resolve(base)?),
        };
        Ok(converted)
    }

    /// convert an assignment target
    pub fn parse_lvalue(&self, lvalue: &adapter::statement::LValue) -> EngineResult<LValue> {
        use adapter::statement::LValue as AdaptedLValue;

        let converted = match lvalue {
            AdaptedLValue::Var(name) => LValue::Var(self.resolve(name)?),
            AdaptedLValue::FieldAccess { base, field } => LValue::FieldAccess {
                base: base.as_deref().map(|name| self.resolve(name)).transpose()?,
                field: field.into(),
            },
            AdaptedLValue::ArrayAccess { base, index } => LValue::ArrayAccess {
                base: self.resolve(base)?,
                index: self.parse_exp(index)?,
            },
        };
        Ok(converted)
    }

    /// convert a statement
    pub fn parse_stmt(&self, stmt: &adapter::statement::Stmt) -> EngineResult<Stmt> {
        use adapter::statement::Stmt as AdaptedStmt;

        let converted = match stmt {
            AdaptedStmt::Definition { lvalue, rvalue } => Stmt::Definition {
                lvalue: self.parse_lvalue(lvalue)?,
                rvalue: self.parse_exp(rvalue)?,
            },
            AdaptedStmt::Invoke(call) => {
                let call_new = self.parse_exp(call)?;
                if !matches!(call_new, Exp::Invoke { .. }) {
                    return Err(EngineError::InvalidAssumption(format!(
                        "invoke statement without a call: {}",
                        call_new
                    )));
                }
                Stmt::Invoke(call_new)
            }
            AdaptedStmt::Goto { target } => Stmt::Goto {
                target: self.check_target(*target)?,
            },
            AdaptedStmt::If { condition, target } => {
                let condition_new = self.parse_exp(condition)?;
                if !condition_new.is_condition() {
                    return Err(EngineError::InvalidAssumption(format!(
                        "branch condition is not a relational test: {}",
                        condition_new
                    )));
                }
                Stmt::If {
                    condition: condition_new,
                    target: self.check_target(*target)?,
                }
            }
            AdaptedStmt::Switch {
                var,
                cases,
                default,
            } => {
                let var_new = self.resolve(var)?;
                if !var_new.can_hold_int() {
                    return Err(EngineError::InvalidAssumption(format!(
                        "switch on a non-int variable: {}",
                        var_new
                    )));
                }
                let cases_new = cases
                    .iter()
                    .map(|(label, target)| self.check_target(*target).map(|t| (*label, t)))
                    .collect::<EngineResult<_>>()?;
                Stmt::Switch {
                    var: var_new,
                    cases: cases_new,
                    default: self.check_target(*default)?,
                }
            }
            AdaptedStmt::Return { value } => Stmt::Return {
                value: value.as_deref().map(|name| self.resolve(name)).transpose()?,
            },
            AdaptedStmt::Throw { exception } => Stmt::Throw {
                exception: self.resolve(exception)?,
            },
            AdaptedStmt::Nop => Stmt::Nop,
        };
        Ok(converted)
    }
}
