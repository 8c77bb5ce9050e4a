//! Code generation core for connecpy service stubs.
//!
//! Given descriptors for a set of `.proto` files, this crate resolves every
//! message type a service method refers to into an aliased Python symbol,
//! aggregates the imports those symbols need, and renders one stub module
//! per file.
//!
//! Pipeline per file:
//!
//! 1. [`DescriptorGraph`] indexes messages with a back-reference to their file
//! 2. [`build_file_model`] resolves symbols ([`symbols`]) and imports ([`imports`])
//! 3. a [`Renderer`] turns the [`FileModel`] into text
//!
//! Files never share state, so a failure is always attributable to one file.

pub mod descriptor;
pub mod error;
pub mod generate;
pub mod imports;
pub mod model;
pub mod naming;
pub mod options;
pub mod render;
pub mod symbols;

pub use descriptor::{DescriptorGraph, FileId};
pub use error::{CodegenError, RenderError, Result};
pub use generate::{
    files_with_services, generate, generate_file, generated_file_name, FileFailure,
    GeneratedFile, GenerationFailed, GenerationReport,
};
pub use imports::{collect_imports, Import, ImportSet};
pub use model::{build_file_model, FileModel, MethodModel, ServiceModel};
pub use naming::{canonical_module, module_alias, ModuleIdentity};
pub use options::GeneratorOptions;
pub use render::{PythonRenderer, Renderer};
pub use symbols::{resolve_symbol, Symbol};
