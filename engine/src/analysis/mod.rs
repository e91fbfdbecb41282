//
// Abstract Interpretation framework
//
pub mod generic;
pub mod constant;
pub mod evaluate;
