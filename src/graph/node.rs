/// A package node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNode {
    /// Canonical package name (surrounding quotes stripped).
    pub name: String,
}

/// Edge weight: the source package depends on the target package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependsOn;

/// Canonicalize a raw DOT identifier into a package name.
///
/// Every leading and trailing `"` is trimmed, so `"openssl"`, `""openssl""` and
/// `openssl` all name the same package. Interior quotes are kept.
pub fn canonical_name(raw: &str) -> &str {
    raw.trim_matches('"')
}
