//! Cross-module import aggregation for one generated file.
//!
//! Collection and presentation are separate: [`ImportSet`] deduplicates in
//! whatever order methods are visited, and [`ImportSet::sorted`] produces the
//! ordered list that ends up in the output.

use std::collections::HashMap;

use serde::Serialize;

use crate::descriptor::{DescriptorGraph, FileNode, MessageNode, MethodNode, ServiceNode};
use crate::error::{CodegenError, Result};
use crate::naming::ModuleIdentity;

/// One `import <module> as <alias>` entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Import {
    pub module: String,
    pub alias: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    modules: HashMap<String, String>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-inserting a module is a no-op: its alias is a function of the module.
    pub fn insert(&mut self, identity: ModuleIdentity) {
        self.modules.insert(identity.module, identity.alias);
    }

    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Imports ordered by module path, ascending.
    pub fn sorted(&self) -> Vec<Import> {
        let mut imports: Vec<Import> = self
            .modules
            .iter()
            .map(|(module, alias)| Import {
                module: module.clone(),
                alias: alias.clone(),
            })
            .collect();
        imports.sort_by(|a, b| a.module.cmp(&b.module));
        imports
    }
}

impl Extend<ModuleIdentity> for ImportSet {
    fn extend<T: IntoIterator<Item = ModuleIdentity>>(&mut self, iter: T) {
        for identity in iter {
            self.insert(identity);
        }
    }
}

/// Every package referenced by a method input or output in `file`.
///
/// The file's own package is included whenever one of its messages is
/// referenced; self-imports are not special-cased.
pub fn collect_imports(graph: &DescriptorGraph, file: &FileNode) -> Result<ImportSet> {
    let mut imports = ImportSet::new();
    for service in &file.services {
        for method in &service.methods {
            for type_name in [&method.input_type, &method.output_type] {
                let message = referenced_message(graph, file, service, method, type_name)?;
                imports.insert(ModuleIdentity::of(graph.package_of(message)));
            }
        }
    }
    Ok(imports)
}

/// The message a method input or output names, or `UnresolvedType`.
pub(crate) fn referenced_message<'g>(
    graph: &'g DescriptorGraph,
    file: &FileNode,
    service: &ServiceNode,
    method: &MethodNode,
    type_name: &str,
) -> Result<&'g MessageNode> {
    graph.message(type_name).ok_or_else(|| CodegenError::UnresolvedType {
        file: file.name.clone(),
        service: service.name.clone(),
        method: method.name.clone(),
        type_name: type_name.to_string(),
    })
}
