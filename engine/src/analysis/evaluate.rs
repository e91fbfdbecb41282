//! Abstract constant folding
//!
//! Evaluates an expression against the constant-propagation fact at a program
//! point, following 32-bit two's-complement semantics with wraparound.

use crate::analysis::constant::{CPFact, Value};
use crate::ir::bridge::expression::{ArithmeticOp, BinaryOp, BitwiseOp, ConditionOp, Exp, ShiftOp};

/// Evaluates the [`Value`] of `exp` given the IN fact of its statement
pub fn evaluate(exp: &Exp, fact: &CPFact) -> Value {
    match exp {
        Exp::Var(var) => fact.get(&var.id),
        Exp::IntLiteral(v) => Value::Constant(*v),
        Exp::Binary { op, lhs, rhs } => {
            let v1 = evaluate(lhs, fact);
            let v2 = evaluate(rhs, fact);

            // dividing by zero traps, so nothing flows out of this point
            if op.is_division() && v2 == Value::Constant(0) {
                return Value::Undefined;
            }
            match (v1, v2) {
                (Value::Nac, _) | (_, Value::Nac) => Value::Nac,
                (Value::Constant(c1), Value::Constant(c2)) => {
                    Value::Constant(evaluate_binary_constant(*op, c1, c2))
                }
                _ => Value::Undefined,
            }
        }
        Exp::Literal(_)
        | Exp::Neg(_)
        | Exp::Cast { .. }
        | Exp::InstanceOf { .. }
        | Exp::Invoke { .. }
        | Exp::New(_)
        | Exp::FieldAccess { .. }
        | Exp::ArrayAccess { .. }
        | Exp::ArrayLength(_) => Value::Nac,
    }
}

/// Folds `op` over two known operands, the divisor of DIV and REM must be non-zero
pub fn evaluate_binary_constant(op: BinaryOp, v1: i32, v2: i32) -> i32 {
    match op {
        BinaryOp::Arithmetic(op) => match op {
            ArithmeticOp::Add => v1.wrapping_add(v2),
            ArithmeticOp::Sub => v1.wrapping_sub(v2),
            ArithmeticOp::Mul => v1.wrapping_mul(v2),
            ArithmeticOp::Div => v1.wrapping_div(v2),
            ArithmeticOp::Rem => v1.wrapping_rem(v2),
        },
        BinaryOp::Condition(op) => {
            let holds = match op {
                ConditionOp::Eq => v1 == v2,
                ConditionOp::Ne => v1 != v2,
                ConditionOp::Ge => v1 >= v2,
                ConditionOp::Le => v1 <= v2,
                ConditionOp::Gt => v1 > v2,
                ConditionOp::Lt => v1 < v2,
            };
            i32::from(holds)
        }
        // shift amounts only use their low five bits
        BinaryOp::Shift(op) => match op {
            ShiftOp::Shl => v1.wrapping_shl(v2 as u32),
            ShiftOp::Shr => v1.wrapping_shr(v2 as u32),
            ShiftOp::Ushr => (v1 as u32).wrapping_shr(v2 as u32) as i32,
        },
        BinaryOp::Bitwise(op) => match op {
            BitwiseOp::And => v1 & v2,
            BitwiseOp::Or => v1 | v2,
            BitwiseOp::Xor => v1 ^ v2,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::bridge::expression::{Literal, Var, VarId};
    use crate::ir::bridge::typing::{PrimitiveType, Type};

    fn var(index: usize) -> Var {
        Var {
            id: VarId::from(index),
            name: format!("v{}", index).into(),
            ty: Type::Primitive(PrimitiveType::Int),
        }
    }

    fn binary(op: BinaryOp, lhs: Exp, rhs: Exp) -> Exp {
        Exp::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    fn lit(v: i32) -> Exp {
        Exp::IntLiteral(v)
    }

    fn x() -> Exp {
        Exp::Var(var(0))
    }

    fn y() -> Exp {
        Exp::Var(var(1))
    }

    fn with_x(value: Value) -> CPFact {
        [(VarId::from(0), value)].into_iter().collect()
    }

    const ADD: BinaryOp = BinaryOp::Arithmetic(ArithmeticOp::Add);
    const DIV: BinaryOp = BinaryOp::Arithmetic(ArithmeticOp::Div);
    const REM: BinaryOp = BinaryOp::Arithmetic(ArithmeticOp::Rem);

    #[test]
    fn variables_and_literals() {
        let fact = with_x(Value::Constant(9));
        assert_eq!(evaluate(&x(), &fact), Value::Constant(9));
        assert_eq!(evaluate(&y(), &fact), Value::Undefined);
        assert_eq!(evaluate(&lit(-4), &fact), Value::Constant(-4));
    }

    #[test]
    fn folds_arithmetic() {
        let empty = CPFact::new();
        assert_eq!(evaluate(&binary(ADD, lit(3), lit(4)), &empty), Value::Constant(7));
        assert_eq!(evaluate(&binary(DIV, lit(7), lit(2)), &empty), Value::Constant(3));
        assert_eq!(evaluate(&binary(DIV, lit(-7), lit(2)), &empty), Value::Constant(-3));
        assert_eq!(evaluate(&binary(REM, lit(-7), lit(2)), &empty), Value::Constant(-1));
        assert_eq!(evaluate(&binary(REM, lit(7), lit(-2)), &empty), Value::Constant(1));
    }

    #[test]
    fn arithmetic_wraps_around() {
        use ArithmeticOp::*;
        let fold = |op, a, b| evaluate_binary_constant(BinaryOp::Arithmetic(op), a, b);
        assert_eq!(fold(Add, i32::MAX, 1), i32::MIN);
        assert_eq!(fold(Sub, i32::MIN, 1), i32::MAX);
        assert_eq!(fold(Mul, 0x10000, 0x10000), 0);
        assert_eq!(fold(Div, i32::MIN, -1), i32::MIN);
        assert_eq!(fold(Rem, i32::MIN, -1), 0);
    }

    #[test]
    fn conditions_yield_zero_or_one() {
        use ConditionOp::*;
        let fold = |op, a, b| evaluate_binary_constant(BinaryOp::Condition(op), a, b);
        assert_eq!(fold(Eq, 2, 2), 1);
        assert_eq!(fold(Ne, 2, 2), 0);
        assert_eq!(fold(Ge, 2, 3), 0);
        assert_eq!(fold(Le, 2, 3), 1);
        assert_eq!(fold(Gt, -1, -2), 1);
        assert_eq!(fold(Lt, -1, -2), 0);
    }

    #[test]
    fn shifts_mask_the_amount() {
        use ShiftOp::*;
        let fold = |op, a, b| evaluate_binary_constant(BinaryOp::Shift(op), a, b);
        assert_eq!(fold(Shl, 1, 4), 16);
        assert_eq!(fold(Shl, 1, 33), 2);
        assert_eq!(fold(Shl, 1, 31), i32::MIN);
        assert_eq!(fold(Shr, -16, 2), -4);
        assert_eq!(fold(Shr, -1, 40), -1);
        assert_eq!(fold(Ushr, -16, 28), 15);
        assert_eq!(fold(Ushr, -1, 32), -1);
        assert_eq!(fold(Shl, 3, -1), i32::MIN);
    }

    #[test]
    fn bitwise() {
        use BitwiseOp::*;
        let fold = |op, a, b| evaluate_binary_constant(BinaryOp::Bitwise(op), a, b);
        assert_eq!(fold(And, 0b1100, 0b1010), 0b1000);
        assert_eq!(fold(Or, 0b1100, 0b1010), 0b1110);
        assert_eq!(fold(Xor, 0b1100, 0b1010), 0b0110);
        assert_eq!(fold(Xor, -1, 0), -1);
    }

    #[test]
    fn zero_divisor_is_undefined() {
        assert_eq!(
            evaluate(&binary(DIV, x(), lit(0)), &with_x(Value::Constant(5))),
            Value::Undefined
        );
        // checked before the NAC short-circuit
        assert_eq!(
            evaluate(&binary(REM, x(), lit(0)), &with_x(Value::Nac)),
            Value::Undefined
        );
        // only a known zero divisor counts
        assert_eq!(
            evaluate(&binary(DIV, lit(1), x()), &with_x(Value::Nac)),
            Value::Nac
        );
        assert_eq!(
            evaluate(&binary(ADD, x(), lit(0)), &with_x(Value::Nac)),
            Value::Nac
        );
    }

    #[test]
    fn nac_propagates() {
        let fact: CPFact = [
            (VarId::from(0), Value::Nac),
            (VarId::from(1), Value::Constant(1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(evaluate(&binary(ADD, x(), y()), &fact), Value::Nac);
        // NAC wins over an undefined operand too
        assert_eq!(
            evaluate(&binary(ADD, x(), Exp::Var(var(2))), &fact),
            Value::Nac
        );
    }

    #[test]
    fn undefined_operand_defers() {
        let fact = with_x(Value::Constant(1));
        assert_eq!(evaluate(&binary(ADD, x(), y()), &fact), Value::Undefined);
    }

    #[test]
    fn nested_expressions() {
        // (x + 1) * (x - 1)
        let exp = binary(
            BinaryOp::Arithmetic(ArithmeticOp::Mul),
            binary(ADD, x(), lit(1)),
            binary(BinaryOp::Arithmetic(ArithmeticOp::Sub), x(), lit(1)),
        );
        assert_eq!(evaluate(&exp, &with_x(Value::Constant(5))), Value::Constant(24));
        assert_eq!(exp.to_string(), "(v0 + 1) * (v0 - 1)");
    }

    #[test]
    fn other_shapes_are_nac() {
        let fact = with_x(Value::Constant(5));
        let shapes = vec![
            Exp::Literal(Literal::Long(1)),
            Exp::Literal(Literal::Null),
            Exp::Neg(Box::new(x())),
            Exp::Cast {
                ty: Type::Primitive(PrimitiveType::Short),
                operand: Box::new(x()),
            },
            Exp::Invoke {
                callee: "f".into(),
                args: vec![var(0)],
            },
            Exp::FieldAccess {
                base: None,
                field: "g".into(),
            },
            Exp::ArrayLength(var(0)),
        ];
        for exp in &shapes {
            assert_eq!(evaluate(exp, &fact), Value::Nac, "{}", exp);
        }
    }
}
