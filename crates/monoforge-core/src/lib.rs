//! Monoforge Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Monoforge
//! workspace generators, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          monoforge-cli (CLI)            │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (GeneratorService, VirtualTree, tasks) │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Storage, Skeleton, Catalog, Formatter) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   monoforge-adapters (Infrastructure)   │
//! │  (LocalStorage, NxSkeleton, Installer)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (GeneratorSpec, Options, Tokens, Plans) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use monoforge_core::prelude::*;
//!
//! let mut tree = VirtualTree::new(Arc::new(storage));
//! let service = GeneratorService::new(Box::new(skeleton), Box::new(catalog));
//!
//! let generation = service.generate(&mut tree, "utils-lib", &GeneratorOptions::new("widget"))?;
//! let receipt = tree.flush()?;
//! let report = generation.tasks.run(&receipt);
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        DeferredTask, DeferredTasks, FlushReceipt, Generation, GeneratorService, TaskReport,
        VirtualTree, WorkspaceLayout,
        ports::{
            DependencyInstaller, Formatter, SkeletonGenerator, SkeletonRequest, Storage,
            TemplateCatalog,
        },
    };
    pub use crate::domain::{
        Category, GeneratorOptions, GeneratorSpec, ProjectKind, RelativePath, TemplateContext,
        TemplateEntry, TemplateSet,
    };
    pub use crate::error::{ForgeError, ForgeResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
