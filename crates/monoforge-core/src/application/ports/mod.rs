//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `monoforge-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Storage`: the real file hierarchy behind the virtual tree
//!   - `SkeletonGenerator`: base application/library generator
//!   - `TemplateCatalog`: template set lookup
//!   - `Formatter`: post-generation formatting
//!   - `DependencyInstaller`: package manager install
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    DependencyInstaller, Formatter, SkeletonGenerator, SkeletonRequest, Storage, TemplateCatalog,
};

#[cfg(test)]
pub use output::{
    MockDependencyInstaller, MockFormatter, MockSkeletonGenerator, MockStorage,
    MockTemplateCatalog,
};
