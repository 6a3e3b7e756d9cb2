//! Container record persistence.

pub mod json;

pub use json::JsonRecordStore;
