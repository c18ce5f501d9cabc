// src/cli/mod.rs
pub mod args;
pub mod script;
