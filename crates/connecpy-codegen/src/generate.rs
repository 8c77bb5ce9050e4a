//! Per-file generation and the request-level report.
//!
//! Files are generated independently. A failure in one file is recorded
//! against that file and does not stop the others, but the report as a whole
//! is only successful when every requested file succeeded.

use thiserror::Error;

use crate::descriptor::{DescriptorGraph, FileId};
use crate::error::{CodegenError, Result};
use crate::model::build_file_model;
use crate::options::GeneratorOptions;
use crate::render::Renderer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

#[derive(Debug)]
pub struct FileFailure {
    pub file: String,
    pub error: CodegenError,
}

#[derive(Debug, Default)]
pub struct GenerationReport {
    pub generated: Vec<GeneratedFile>,
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Error)]
#[error("{}", summarize(.failures))]
pub struct GenerationFailed {
    pub failures: Vec<FileFailure>,
}

fn summarize(failures: &[FileFailure]) -> String {
    let lines: Vec<String> = failures
        .iter()
        .map(|f| format!("{}: {}", f.file, f.error))
        .collect();
    format!(
        "failed to generate {} file(s):\n{}",
        failures.len(),
        lines.join("\n")
    )
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// All generated files, or every failure if any file failed.
    pub fn into_result(self) -> std::result::Result<Vec<GeneratedFile>, GenerationFailed> {
        if self.failures.is_empty() {
            Ok(self.generated)
        } else {
            Err(GenerationFailed {
                failures: self.failures,
            })
        }
    }
}

/// `orders/order-service.proto` + `_connecpy.py` → `orders/order-service_connecpy.py`.
pub fn generated_file_name(file_name: &str, suffix: &str) -> String {
    let segment_start = file_name.rfind('/').map_or(0, |i| i + 1);
    let stem = match file_name[segment_start..].rfind('.') {
        Some(dot) => &file_name[..segment_start + dot],
        None => file_name,
    };
    format!("{stem}{suffix}")
}

pub fn generate_file<R: Renderer + ?Sized>(
    graph: &DescriptorGraph,
    file_id: FileId,
    options: &GeneratorOptions,
    renderer: &R,
) -> Result<GeneratedFile> {
    let model = build_file_model(graph, file_id)?;
    let content = renderer
        .render(&model)
        .map_err(|source| CodegenError::Render {
            file: model.file_name.clone(),
            source,
        })?;

    tracing::debug!(
        file = %model.file_name,
        services = model.services.len(),
        imports = model.imports.len(),
        "generated stub"
    );
    Ok(GeneratedFile {
        name: generated_file_name(&model.file_name, &options.suffix),
        content,
    })
}

/// Generate every file in `files`, in the given order.
pub fn generate<R: Renderer + ?Sized>(
    graph: &DescriptorGraph,
    files: &[String],
    options: &GeneratorOptions,
    renderer: &R,
) -> GenerationReport {
    let mut report = GenerationReport::default();
    for name in files {
        let result = graph
            .file_id(name)
            .ok_or_else(|| CodegenError::UnknownFile(name.clone()))
            .and_then(|id| generate_file(graph, id, options, renderer));

        match result {
            Ok(generated) => report.generated.push(generated),
            Err(error) => {
                tracing::warn!(file = %name, error = %error, "stub generation failed");
                report.failures.push(FileFailure {
                    file: name.clone(),
                    error,
                });
            }
        }
    }
    report
}

/// Files that declare at least one service, in input order.
pub fn files_with_services(graph: &DescriptorGraph) -> Vec<String> {
    graph
        .files()
        .filter(|(_, file)| !file.services.is_empty())
        .map(|(_, file)| file.name.clone())
        .collect()
}
