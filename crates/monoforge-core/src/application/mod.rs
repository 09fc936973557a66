//! Application layer for Monoforge.
//!
//! This layer contains:
//! - **Tree**: the staged virtual file hierarchy every generator writes to
//! - **Tasks**: side effects deferred until after a successful flush
//! - **Services**: use case orchestration (GeneratorService, relocation, templating)
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;
pub mod tasks;
pub mod tree;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main services
pub use services::{Generation, GeneratorInfo, GeneratorService, Phase, WorkspaceLayout};

// Re-export port traits (for adapter implementation)
pub use ports::{
    DependencyInstaller, Formatter, SkeletonGenerator, SkeletonRequest, Storage, TemplateCatalog,
};

pub use error::ApplicationError;
pub use tasks::{DeferredTask, DeferredTasks, TaskError, TaskReport};
pub use tree::{FlushReceipt, TreeOperation, VirtualTree};
