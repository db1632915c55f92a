// file: src/system/mod.rs
// version: 1.0.0
// guid: c07116c8-6ae9-4097-bec7-63bfe6e05677

//! Host access: command execution, file mutation and environment probes

pub mod command;
pub mod local;
pub mod mutator;
pub mod probe;
pub mod recording;

pub use command::{CommandOutput, SystemCommand};
pub use local::LocalSystem;
pub use mutator::SystemMutator;
pub use probe::{HostProbe, SystemProbe};
pub use recording::{FileOperation, RecordingSystem};
