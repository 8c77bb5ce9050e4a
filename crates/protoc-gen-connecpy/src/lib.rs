//! protoc plugin protocol for connecpy stub generation.
//!
//! protoc (or `buf generate`) writes a `CodeGeneratorRequest` to stdin and
//! reads a `CodeGeneratorResponse` from stdout. Generation failures go into
//! `CodeGeneratorResponse.error`, which makes the host print them and exit
//! non-zero; no files are returned alongside an error.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use connecpy_codegen::{generate, DescriptorGraph, GeneratedFile, GeneratorOptions, PythonRenderer};
use prost::Message;
use prost_types::compiler::{code_generator_response, CodeGeneratorRequest, CodeGeneratorResponse};

/// Read one request from `input`, write one response to `output`.
pub fn run_plugin<R: Read, W: Write>(mut input: R, mut output: W) -> Result<()> {
    let mut bytes = Vec::new();
    input
        .read_to_end(&mut bytes)
        .context("failed to read CodeGeneratorRequest")?;
    let request =
        CodeGeneratorRequest::decode(bytes.as_slice()).context("failed to decode CodeGeneratorRequest")?;

    let response = handle_request(request);
    output
        .write_all(&response.encode_to_vec())
        .context("failed to write CodeGeneratorResponse")?;
    output.flush()?;
    Ok(())
}

pub fn handle_request(request: CodeGeneratorRequest) -> CodeGeneratorResponse {
    let mut response = CodeGeneratorResponse {
        supported_features: Some(code_generator_response::Feature::Proto3Optional as u64),
        ..Default::default()
    };

    match generate_files(request) {
        Ok(files) => {
            response.file = files
                .into_iter()
                .map(|f| code_generator_response::File {
                    name: Some(f.name),
                    content: Some(f.content),
                    ..Default::default()
                })
                .collect();
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "connecpy generation failed");
            response.error = Some(format!("{err:#}"));
        }
    }
    response
}

fn generate_files(request: CodeGeneratorRequest) -> Result<Vec<GeneratedFile>> {
    let options = GeneratorOptions::parse(request.parameter.as_deref())?;
    let graph = DescriptorGraph::from_files(request.proto_file)?;
    tracing::info!(
        files = request.file_to_generate.len(),
        "generating connecpy stubs"
    );
    let report = generate(&graph, &request.file_to_generate, &options, &PythonRenderer);
    Ok(report.into_result()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{DescriptorProto, FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto};

    fn request(parameter: Option<&str>, input_type: &str) -> CodeGeneratorRequest {
        CodeGeneratorRequest {
            file_to_generate: vec!["echo/echo.proto".to_string()],
            parameter: parameter.map(str::to_string),
            proto_file: vec![FileDescriptorProto {
                name: Some("echo/echo.proto".to_string()),
                package: Some("echo.v1".to_string()),
                message_type: vec![DescriptorProto {
                    name: Some("Msg".to_string()),
                    ..Default::default()
                }],
                service: vec![ServiceDescriptorProto {
                    name: Some("Echo".to_string()),
                    method: vec![MethodDescriptorProto {
                        name: Some("Say".to_string()),
                        input_type: Some(input_type.to_string()),
                        output_type: Some(".echo.v1.Msg".to_string()),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn successful_request_returns_one_file_per_input() {
        let response = handle_request(request(None, ".echo.v1.Msg"));
        assert!(response.error.is_none());
        assert_eq!(response.file.len(), 1);
        assert_eq!(response.file[0].name(), "echo/echo_connecpy.py");
        assert!(response.file[0].content().contains("import echo.v1 as echo_dot_v1\n"));
        assert_eq!(
            response.supported_features,
            Some(code_generator_response::Feature::Proto3Optional as u64)
        );
    }

    #[test]
    fn failures_are_reported_not_swallowed() {
        let response = handle_request(request(None, ".echo.v1.Nope"));
        assert!(response.file.is_empty());
        let error = response.error.unwrap();
        assert!(error.contains("echo/echo.proto"));
        assert!(error.contains(".echo.v1.Nope"));
    }

    #[test]
    fn bad_parameter_fails_the_request() {
        let response = handle_request(request(Some("bogus=1"), ".echo.v1.Msg"));
        assert!(response.error.unwrap().contains("bogus=1"));
    }

    #[test]
    fn stream_round_trip() {
        let input = request(Some("suffix=_rpc.py"), ".echo.v1.Msg").encode_to_vec();
        let mut output = Vec::new();
        run_plugin(input.as_slice(), &mut output).unwrap();

        let response = CodeGeneratorResponse::decode(output.as_slice()).unwrap();
        assert_eq!(response.file[0].name(), "echo/echo_rpc.py");
    }
}
