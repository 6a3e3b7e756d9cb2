pub mod source;

pub use source::LocalDirectorySource;
