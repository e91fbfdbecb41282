//! Program representation
//!
//! `adapter` mirrors the serialized program dump one-to-one, `bridge` is the
//! validated model that analyses operate on.

pub mod adapter;
pub mod bridge;
