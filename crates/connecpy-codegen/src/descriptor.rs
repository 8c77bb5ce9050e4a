//! Descriptor graph: files → services → methods, plus a message index.
//!
//! Every indexed message carries the id of the file that declares it, so a
//! type reference resolves to its owning package without walking parents at
//! generation time.
//!
//! Two input forms are accepted:
//!
//! - binary `google.protobuf.FileDescriptorSet` / plugin request files
//!   (decoded with prost),
//! - Buf's JSON rendering of a descriptor set
//!   (`buf build --as-file-descriptor-set -o descriptor.json`).

use std::collections::HashMap;

use prost::Message as _;
use prost_types::{
    DescriptorProto, FileDescriptorProto, FileDescriptorSet, MethodDescriptorProto,
    ServiceDescriptorProto,
};
use serde::Deserialize;

use crate::error::{CodegenError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(usize);

#[derive(Debug, Clone)]
pub struct FileNode {
    pub name: String,
    pub package: String,
    pub services: Vec<ServiceNode>,
}

#[derive(Debug, Clone)]
pub struct ServiceNode {
    pub name: String,
    pub methods: Vec<MethodNode>,
}

#[derive(Debug, Clone)]
pub struct MethodNode {
    pub name: String,
    /// Fully qualified input type as written by the compiler (`.pkg.Msg`).
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl MethodNode {
    pub fn is_streaming(&self) -> bool {
        self.client_streaming || self.server_streaming
    }
}

#[derive(Debug, Clone)]
pub struct MessageNode {
    /// Name relative to the package; nested messages are `Outer.Inner`.
    pub name: String,
    pub full_name: String,
    /// Back-reference to the declaring file.
    pub file: FileId,
}

#[derive(Debug, Clone, Default)]
pub struct DescriptorGraph {
    files: Vec<FileNode>,
    messages: Vec<MessageNode>,
    file_index: HashMap<String, FileId>,
    message_index: HashMap<String, MessageId>,
}

impl DescriptorGraph {
    pub fn from_files(protos: Vec<FileDescriptorProto>) -> Result<Self> {
        let mut graph = Self::default();

        for proto in protos {
            let name = proto.name().to_string();
            let package = proto.package().to_string();
            let file_id = FileId(graph.files.len());
            if graph.file_index.insert(name.clone(), file_id).is_some() {
                return Err(CodegenError::DuplicateFile(name));
            }

            for message in &proto.message_type {
                graph.index_message(file_id, &package, message, Vec::new());
            }

            let services = proto.service.iter().map(service_node).collect();
            graph.files.push(FileNode {
                name,
                package,
                services,
            });
        }

        tracing::debug!(
            files = graph.files.len(),
            messages = graph.messages.len(),
            "indexed descriptor graph"
        );
        Ok(graph)
    }

    /// Decode a binary `google.protobuf.FileDescriptorSet`.
    pub fn from_descriptor_set_bytes(bytes: &[u8]) -> Result<Self> {
        let set = FileDescriptorSet::decode(bytes)?;
        Self::from_files(set.file)
    }

    /// Parse Buf's JSON rendering of a descriptor set.
    pub fn from_descriptor_set_json(text: &str) -> Result<Self> {
        let set: FileDescriptorSetJson = serde_json::from_str(text)?;
        Self::from_files(set.file.into_iter().map(FileDescriptorProto::from).collect())
    }

    fn index_message(
        &mut self,
        file: FileId,
        package: &str,
        message: &DescriptorProto,
        mut prefix: Vec<String>,
    ) {
        prefix.push(message.name().to_string());
        let name = prefix.join(".");
        let full_name = qualify_type_name(package, &name);
        let id = MessageId(self.messages.len());
        self.messages.push(MessageNode {
            name,
            full_name: full_name.clone(),
            file,
        });
        self.message_index.insert(full_name, id);

        for nested in &message.nested_type {
            self.index_message(file, package, nested, prefix.clone());
        }
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &FileNode)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, file)| (FileId(i), file))
    }

    pub fn file(&self, id: FileId) -> &FileNode {
        &self.files[id.0]
    }

    pub fn file_id(&self, name: &str) -> Option<FileId> {
        self.file_index.get(name).copied()
    }

    /// Look up a message by fully qualified name; the leading dot is optional.
    pub fn message(&self, type_name: &str) -> Option<&MessageNode> {
        let key = type_name.strip_prefix('.').unwrap_or(type_name);
        self.message_index
            .get(key)
            .map(|id| &self.messages[id.0])
    }

    /// Package declared by the file that owns `message`.
    pub fn package_of(&self, message: &MessageNode) -> &str {
        &self.file(message.file).package
    }
}

fn service_node(proto: &ServiceDescriptorProto) -> ServiceNode {
    ServiceNode {
        name: proto.name().to_string(),
        methods: proto.method.iter().map(method_node).collect(),
    }
}

fn method_node(proto: &MethodDescriptorProto) -> MethodNode {
    MethodNode {
        name: proto.name().to_string(),
        input_type: proto.input_type().to_string(),
        output_type: proto.output_type().to_string(),
        client_streaming: proto.client_streaming(),
        server_streaming: proto.server_streaming(),
    }
}

fn qualify_type_name(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

// =============================================================================
// Descriptor JSON (subset)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
struct FileDescriptorSetJson {
    #[serde(default)]
    file: Vec<FileDescriptorProtoJson>,
}

#[derive(Debug, Clone, Deserialize)]
struct FileDescriptorProtoJson {
    name: Option<String>,
    package: Option<String>,
    #[serde(default)]
    dependency: Vec<String>,
    #[serde(default, rename = "messageType")]
    message_type: Vec<DescriptorProtoJson>,
    #[serde(default)]
    service: Vec<ServiceDescriptorProtoJson>,
    syntax: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct DescriptorProtoJson {
    name: Option<String>,
    #[serde(default, rename = "nestedType")]
    nested_type: Vec<DescriptorProtoJson>,
}

#[derive(Debug, Clone, Deserialize)]
struct ServiceDescriptorProtoJson {
    name: Option<String>,
    #[serde(default)]
    method: Vec<MethodDescriptorProtoJson>,
}

#[derive(Debug, Clone, Deserialize)]
struct MethodDescriptorProtoJson {
    name: Option<String>,
    #[serde(rename = "inputType")]
    input_type: Option<String>,
    #[serde(rename = "outputType")]
    output_type: Option<String>,
    #[serde(rename = "clientStreaming")]
    client_streaming: Option<bool>,
    #[serde(rename = "serverStreaming")]
    server_streaming: Option<bool>,
}

impl From<FileDescriptorProtoJson> for FileDescriptorProto {
    fn from(json: FileDescriptorProtoJson) -> Self {
        FileDescriptorProto {
            name: json.name,
            package: json.package,
            dependency: json.dependency,
            message_type: json.message_type.into_iter().map(Into::into).collect(),
            service: json.service.into_iter().map(Into::into).collect(),
            syntax: json.syntax,
            ..Default::default()
        }
    }
}

impl From<DescriptorProtoJson> for DescriptorProto {
    fn from(json: DescriptorProtoJson) -> Self {
        DescriptorProto {
            name: json.name,
            nested_type: json.nested_type.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

impl From<ServiceDescriptorProtoJson> for ServiceDescriptorProto {
    fn from(json: ServiceDescriptorProtoJson) -> Self {
        ServiceDescriptorProto {
            name: json.name,
            method: json.method.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

impl From<MethodDescriptorProtoJson> for MethodDescriptorProto {
    fn from(json: MethodDescriptorProtoJson) -> Self {
        MethodDescriptorProto {
            name: json.name,
            input_type: json.input_type,
            output_type: json.output_type,
            client_streaming: json.client_streaming,
            server_streaming: json.server_streaming,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message as _;

    const DESCRIPTOR_JSON: &str = r#"{
      "file": [
        {
          "name": "common/money.proto",
          "package": "common.v1",
          "messageType": [
            { "name": "Money", "nestedType": [ { "name": "Currency" } ] }
          ]
        },
        {
          "name": "orders/order-service.proto",
          "package": "orders.v1",
          "dependency": ["common/money.proto"],
          "messageType": [ { "name": "Order" } ],
          "service": [
            {
              "name": "Checkout",
              "method": [
                { "name": "Pay", "inputType": ".common.v1.Money", "outputType": ".orders.v1.Order" },
                { "name": "Watch", "inputType": ".orders.v1.Order", "outputType": ".orders.v1.Order", "serverStreaming": true }
              ]
            }
          ]
        }
      ]
    }"#;

    #[test]
    fn json_descriptor_set_indexes_nested_messages_with_owning_file() {
        let graph = DescriptorGraph::from_descriptor_set_json(DESCRIPTOR_JSON).unwrap();

        let currency = graph.message(".common.v1.Money.Currency").unwrap();
        assert_eq!(currency.name, "Money.Currency");
        assert_eq!(graph.file(currency.file).name, "common/money.proto");
        assert_eq!(graph.package_of(currency), "common.v1");

        // Leading dot is optional.
        assert!(graph.message("orders.v1.Order").is_some());
        assert!(graph.message(".orders.v1.Missing").is_none());
    }

    #[test]
    fn services_and_methods_keep_declaration_order() {
        let graph = DescriptorGraph::from_descriptor_set_json(DESCRIPTOR_JSON).unwrap();
        let id = graph.file_id("orders/order-service.proto").unwrap();
        let file = graph.file(id);

        assert_eq!(file.package, "orders.v1");
        let names: Vec<_> = file.services[0]
            .methods
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, ["Pay", "Watch"]);
        assert!(!file.services[0].methods[0].is_streaming());
        assert!(file.services[0].methods[1].is_streaming());
    }

    #[test]
    fn binary_descriptor_set_round_trips_through_prost() {
        let set = FileDescriptorSet {
            file: vec![FileDescriptorProto {
                name: Some("a.proto".to_string()),
                message_type: vec![DescriptorProto {
                    name: Some("Ping".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
        };
        let graph = DescriptorGraph::from_descriptor_set_bytes(&set.encode_to_vec()).unwrap();

        // No package: the message is addressed by its bare name.
        let ping = graph.message(".Ping").unwrap();
        assert_eq!(ping.full_name, "Ping");
        assert_eq!(graph.package_of(ping), "");
    }

    #[test]
    fn duplicate_file_names_are_rejected() {
        let file = FileDescriptorProto {
            name: Some("dup.proto".to_string()),
            ..Default::default()
        };
        let err = DescriptorGraph::from_files(vec![file.clone(), file]).unwrap_err();
        assert!(matches!(err, CodegenError::DuplicateFile(name) if name == "dup.proto"));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = DescriptorGraph::from_descriptor_set_json("{ not json").unwrap_err();
        assert!(matches!(err, CodegenError::DescriptorJson(_)));
    }
}
