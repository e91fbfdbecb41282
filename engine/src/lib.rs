pub use error::{EngineError, EngineResult};

pub mod analysis;
pub mod error;
pub mod flow;
pub mod ir;
