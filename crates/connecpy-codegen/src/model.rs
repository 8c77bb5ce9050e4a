//! Template-ready model of one generated file.

use serde::Serialize;

use crate::descriptor::{DescriptorGraph, FileId};
use crate::error::Result;
use crate::imports::{collect_imports, referenced_message, Import};
use crate::naming::canonical_module;
use crate::symbols::{resolve_symbol, Symbol};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileModel {
    /// Raw descriptor file name, e.g. `orders/order-service.proto`.
    pub file_name: String,
    /// Module path of the file itself (not aliased).
    pub module_name: String,
    /// Sorted by module path.
    pub imports: Vec<Import>,
    /// Declaration order.
    pub services: Vec<ServiceModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceModel {
    pub name: String,
    pub package: String,
    pub methods: Vec<MethodModel>,
}

impl ServiceModel {
    /// `package.Service`, or just `Service` outside a package.
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodModel {
    pub name: String,
    pub input: Symbol,
    pub output: Symbol,
    pub no_side_effects: bool,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl MethodModel {
    pub fn is_streaming(&self) -> bool {
        self.client_streaming || self.server_streaming
    }
}

impl FileModel {
    /// Every symbol referenced by a method, in declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.services
            .iter()
            .flat_map(|s| &s.methods)
            .flat_map(|m| [&m.input, &m.output])
    }
}

pub fn build_file_model(graph: &DescriptorGraph, file_id: FileId) -> Result<FileModel> {
    let file = graph.file(file_id);
    let mut services = Vec::with_capacity(file.services.len());

    for service in &file.services {
        let mut methods = Vec::with_capacity(service.methods.len());
        for method in &service.methods {
            let resolve = |type_name: &str| {
                referenced_message(graph, file, service, method, type_name)
                    .map(|message| resolve_symbol(graph, message))
            };

            methods.push(MethodModel {
                name: method.name.clone(),
                input: resolve(method.input_type.as_str())?,
                output: resolve(method.output_type.as_str())?,
                // Idempotency levels are not read from method options yet.
                no_side_effects: false,
                client_streaming: method.client_streaming,
                server_streaming: method.server_streaming,
            });
        }
        services.push(ServiceModel {
            name: service.name.clone(),
            package: file.package.clone(),
            methods,
        });
    }

    let imports = collect_imports(graph, file)?;
    let model = FileModel {
        file_name: file.name.clone(),
        module_name: canonical_module(&file.name),
        imports: imports.sorted(),
        services,
    };
    debug_assert!(model.symbols().all(|s| imports.contains(&s.module.module)));
    Ok(model)
}
