//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer, the virtual tree and the ports to
//! accomplish high-level use cases like "generate a library".

pub mod generator_service;
pub mod relocation_service;
pub mod template_engine;

pub use generator_service::{Generation, GeneratorInfo, GeneratorService, Phase, WorkspaceLayout};
pub use relocation_service::{RelocationOutcome, apply_plan, relocate, repair_references};
pub use template_engine::instantiate;
