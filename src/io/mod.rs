pub mod autosave;
pub mod paths;
pub mod registry;
pub mod session;
pub mod snapshot;
