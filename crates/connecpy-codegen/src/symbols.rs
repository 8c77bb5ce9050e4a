//! Message type references → symbols usable in generated code.

use std::fmt;

use serde::Serialize;

use crate::descriptor::{DescriptorGraph, MessageNode};
use crate::naming::ModuleIdentity;

/// `alias.Name`, where `alias` is the import alias of the message's package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Symbol {
    pub module: ModuleIdentity,
    pub name: String,
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module.alias, self.name)
    }
}

/// Resolve against the package of the file that *declares* the message,
/// never the file that refers to it.
pub fn resolve_symbol(graph: &DescriptorGraph, message: &MessageNode) -> Symbol {
    Symbol {
        module: ModuleIdentity::of(graph.package_of(message)),
        name: message.name.clone(),
    }
}
