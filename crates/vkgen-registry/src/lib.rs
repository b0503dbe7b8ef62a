//! Registry model builder for Vulkan-style API registries.
//!
//! Reads the registry XML into a typed model, orders every entity after its
//! dependencies, analyzes command signatures and computes default values:
//! the inputs a binding generator needs.

pub mod analyzer;
pub mod config;
pub mod defaults;
pub mod error;
pub mod exceptions;
pub mod ident;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod resolver;

pub use analyzer::{analyze_command, CommandAnalysis, TypeExpr};
pub use config::RegistryConfig;
pub use defaults::{synthesize_defaults, DefaultValue, DefaultValues};
pub use error::{IdentError, RegistryError, Result, Section, StuckEntity};
pub use exceptions::ExceptionTable;
pub use model::{Category, DependencyNode, Registry};
pub use parser::parse_registry;
pub use pipeline::{build_model, ResolvedModel};
pub use resolver::sort_dependencies;
