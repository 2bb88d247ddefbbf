//! Command implementations

pub mod lifecycle;
pub mod show;
pub mod version;
