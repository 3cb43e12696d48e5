//! Domain modules

pub mod search;
