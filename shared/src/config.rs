use std::env;

use lazy_static::lazy_static;

// common configurations
lazy_static! {
    pub static ref PARALLEL: bool = matches!(env::var("CPROP_PARALLEL"), Ok(val) if val == "1");
}
