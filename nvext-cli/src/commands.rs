pub mod build;
pub mod flags;
pub mod version;
