// All core functionality is in restyle-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod summary;

// Re-export core types for convenience
pub use restyle_core::*;

// Re-export CLI utilities
pub use summary::{default_output_path, RunSummary};
