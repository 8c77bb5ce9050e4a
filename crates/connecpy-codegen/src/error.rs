//! Error taxonomy for descriptor loading and stub generation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    /// A method refers to a message no loaded file declares.
    #[error("{file}: method {service}.{method} refers to unknown type `{type_name}`")]
    UnresolvedType {
        file: String,
        service: String,
        method: String,
        type_name: String,
    },

    #[error("file `{0}` was requested for generation but is not in the descriptor input")]
    UnknownFile(String),

    #[error("file `{0}` appears more than once in the descriptor input")]
    DuplicateFile(String),

    #[error("invalid plugin parameter `{parameter}`: {message}")]
    InvalidParameter { parameter: String, message: String },

    #[error("failed to decode descriptor set: {0}")]
    DescriptorDecode(#[from] prost::DecodeError),

    #[error("failed to parse descriptor set JSON: {0}")]
    DescriptorJson(#[from] serde_json::Error),

    #[error("{file}: {source}")]
    Render {
        file: String,
        #[source]
        source: RenderError,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{kind} name `{name}` is not a valid identifier")]
    InvalidIdentifier { kind: &'static str, name: String },

    #[error("message `{symbol}` has no package to import it from")]
    UnimportableSymbol { symbol: String },

    #[error("method {service}.{method} is streaming; only unary stubs can be rendered")]
    UnsupportedStreaming { service: String, method: String },

    #[error("formatting failed")]
    Fmt(#[from] std::fmt::Error),
}

pub type Result<T, E = CodegenError> = std::result::Result<T, E>;
