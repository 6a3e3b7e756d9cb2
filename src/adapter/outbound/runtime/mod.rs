//! Model runtimes.

pub mod serving;

pub use serving::ServingRuntime;
