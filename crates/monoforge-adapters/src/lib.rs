//! Infrastructure adapters for Monoforge.
//!
//! This crate implements the ports defined in `monoforge_core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod builtin_templates;
pub mod formatter;
pub mod installer;
pub mod skeleton;
pub mod storage;
pub mod template_loader;

// Re-export commonly used adapters
pub use builtin_templates::{BuiltinCatalog, LayeredCatalog, discover};
pub use formatter::BasicFormatter;
pub use installer::{PackageManager, PackageManagerInstaller};
pub use skeleton::NxSkeleton;
pub use storage::{LocalStorage, MemoryStorage};
pub use template_loader::DirectoryCatalog;
