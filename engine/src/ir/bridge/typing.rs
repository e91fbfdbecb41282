use std::fmt::{Display, Formatter};

use crate::ir::adapter;
use crate::ir::bridge::shared::Identifier;

/// Primitive (non-reference) types
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum PrimitiveType {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Boolean,
}

impl PrimitiveType {
    /// Whether values of this type are represented as a 32-bit int
    pub fn can_hold_int(&self) -> bool {
        match self {
            Self::Byte | Self::Short | Self::Int | Self::Char | Self::Boolean => true,
            Self::Long | Self::Float | Self::Double => false,
        }
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
            Self::Boolean => "boolean",
        };
        write!(f, "{}", name)
    }
}

/// A validated type
#[derive(Eq, PartialEq, Clone, Debug, Hash)]
pub enum Type {
    Primitive(PrimitiveType),
    Class(Identifier),
    Array(Box<Type>),
    Null,
    Void,
}

impl Type {
    pub fn convert(ty: &adapter::typing::Type) -> Self {
        use adapter::typing::Type as AdaptedType;

        match ty {
            AdaptedType::Byte => Self::Primitive(PrimitiveType::Byte),
            AdaptedType::Short => Self::Primitive(PrimitiveType::Short),
            AdaptedType::Int => Self::Primitive(PrimitiveType::Int),
            AdaptedType::Long => Self::Primitive(PrimitiveType::Long),
            AdaptedType::Float => Self::Primitive(PrimitiveType::Float),
            AdaptedType::Double => Self::Primitive(PrimitiveType::Double),
            AdaptedType::Char => Self::Primitive(PrimitiveType::Char),
            AdaptedType::Boolean => Self::Primitive(PrimitiveType::Boolean),
            AdaptedType::Class(name) => Self::Class(name.into()),
            AdaptedType::Array(element) => Self::Array(Box::new(Self::convert(element))),
            AdaptedType::Null => Self::Null,
            AdaptedType::Void => Self::Void,
        }
    }

    /// Whether a variable of this type participates in constant propagation
    pub fn can_hold_int(&self) -> bool {
        match self {
            Self::Primitive(prim) => prim.can_hold_int(),
            Self::Class(_) | Self::Array(_) | Self::Null | Self::Void => false,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(prim) => prim.fmt(f),
            Self::Class(name) => name.fmt(f),
            Self::Array(element) => write!(f, "{}[]", element),
            Self::Null => write!(f, "null"),
            Self::Void => write!(f, "void"),
        }
    }
}
