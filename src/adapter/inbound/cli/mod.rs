//! CLI module graph.

pub mod check;
pub mod command;
pub mod containers;
pub mod models;
pub mod operator;
pub mod output;
pub mod paths;
pub mod run;
pub mod sweep;
