//! Docker engine driven through its CLI.

pub mod engine;

pub use engine::DockerCli;
