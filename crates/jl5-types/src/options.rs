use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tunables for the algorithms that run over a [`crate::TypeStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct TypeStoreOptions {
    /// Nesting limit for a single subtyping query. F-bounded types such as
    /// `T extends Comparable<T>` can otherwise expand indefinitely; queries that hit the
    /// limit answer `false`.
    pub max_subtype_depth: usize,
}

impl TypeStoreOptions {
    pub const DEFAULT_MAX_SUBTYPE_DEPTH: usize = 64;
}

impl Default for TypeStoreOptions {
    fn default() -> Self {
        Self {
            max_subtype_depth: Self::DEFAULT_MAX_SUBTYPE_DEPTH,
        }
    }
}
