pub mod expression;
pub mod procedure;
pub mod program;
pub mod statement;
pub mod typing;
