//! Module identities for generated imports.
//!
//! Mirrors the gRPC Python generator helpers: a file or package identity
//! becomes a dotted module path, and that path is mangled into a flat alias
//! usable as a Python identifier.

use serde::Serialize;

/// Source suffixes stripped from file names, in priority order.
const SOURCE_SUFFIXES: [&str; 2] = [".protodevel", ".proto"];

/// Canonical dotted module path for a raw file or package name.
///
/// `orders/order-service.proto` becomes `orders.order_service`.
pub fn canonical_module(raw: &str) -> String {
    let stem = SOURCE_SUFFIXES
        .iter()
        .find_map(|suffix| raw.strip_suffix(suffix))
        .unwrap_or(raw);
    stem.replace('-', "_").replace('/', ".")
}

/// Alias under which a module is imported in generated code.
///
/// Underscores are doubled *before* dots expand to `_dot_`, so an expanded
/// separator can never be read back as an underscore from the original
/// name. That keeps the mapping injective over canonical module paths.
pub fn module_alias(raw: &str) -> String {
    canonical_module(raw)
        .replace('_', "__")
        .replace('.', "_dot_")
}

/// A module path together with its alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleIdentity {
    pub module: String,
    pub alias: String,
}

impl ModuleIdentity {
    pub fn of(raw: &str) -> Self {
        Self {
            module: canonical_module(raw),
            alias: module_alias(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_proto_suffix_and_normalizes_separators() {
        assert_eq!(
            canonical_module("orders/order-service.proto"),
            "orders.order_service"
        );
        assert_eq!(
            module_alias("orders/order-service.proto"),
            "orders_dot_order__service"
        );
    }

    #[test]
    fn protodevel_wins_over_proto() {
        assert_eq!(canonical_module("legacy/thing.protodevel"), "legacy.thing");
        // `.protodevel` is tried first, so `.proto` is not stripped out of it.
        assert_eq!(canonical_module("a.proto.protodevel"), "a.proto");
    }

    #[test]
    fn unknown_suffix_is_left_alone() {
        assert_eq!(canonical_module("schema/v1.txt"), "schema.v1.txt");
    }

    #[test]
    fn package_names_pass_through() {
        assert_eq!(canonical_module("orders.v1"), "orders.v1");
        assert_eq!(module_alias("orders.v1"), "orders_dot_v1");
        assert_eq!(module_alias(""), "");
    }

    #[test]
    fn underscore_doubling_keeps_dot_and_underscore_apart() {
        // Would collide if dots were expanded first.
        assert_ne!(module_alias("a_dot_b"), module_alias("a.b"));
        assert_eq!(module_alias("a_dot_b"), "a__dot__b");
        assert_eq!(module_alias("a.b"), "a_dot_b");
    }

    #[test]
    fn identity_is_idempotent() {
        assert_eq!(
            ModuleIdentity::of("foo/bar-baz.proto"),
            ModuleIdentity::of("foo/bar-baz.proto")
        );
        assert_eq!(
            ModuleIdentity::of("foo/bar-baz.proto"),
            ModuleIdentity::of("foo/bar_baz")
        );
    }
}
