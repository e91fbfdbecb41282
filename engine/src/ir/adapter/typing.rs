use serde::{Deserialize, Serialize};

/// A representation of a declared type
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Debug)]
pub enum Type {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Boolean,
    /// Class or interface type (by its qualified name)
    Class(String),
    /// Array type
    Array(Box<Type>),
    /// The type of the `null` literal
    Null,
    /// Void type
    Void,
}
