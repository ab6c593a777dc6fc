// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod process;

pub use process::ProcessRunner;
