use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all resolver operations.
///
/// These variants abort resolution outright. Non-fatal conditions (a
/// missing transitive POM, an unresolvable range, an unsupported profile
/// activation) never construct this type — they are collected as
/// [`Warning`]s on the resolver context instead and resolution continues
/// best-effort.
#[derive(Debug, Error, Diagnostic)]
pub enum ResolverError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A POM could not be parsed, or is missing a mandatory coordinate
    /// after parent-fill.
    #[error("malformed POM at {path}: {message}")]
    #[diagnostic(help("Check that the POM is well-formed XML and declares groupId/artifactId/version"))]
    MalformedPom { path: String, message: String },

    /// An element appeared outside the whitelisted set for its parent.
    #[error("unexpected element <{tag}> in {path}")]
    UnexpectedElement { path: String, tag: String },

    /// An enumerated field (scope/type/optional) held an unrecognized value.
    #[error("invalid {field} '{value}' in dependency {coordinate} of {path}")]
    InvalidField {
        field: &'static str,
        value: String,
        coordinate: String,
        path: String,
    },

    /// The root POM (or a parent POM not tolerant of `allow_missing`)
    /// could not be found on disk.
    #[error("POM not found: {coordinate} (looked in {searched})")]
    MissingPom { coordinate: String, searched: String },

    /// Catch-all for miscellaneous fatal errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type ResolverResult<T> = miette::Result<T>;

/// A non-fatal condition surfaced during resolution. These never abort
/// resolution; they are accumulated on the resolver context and printed
/// by the CLI as warnings.
#[derive(Debug, Clone, Error)]
pub enum Warning {
    #[error("{coordinate}: transitive dependency not found, subtree pruned")]
    MissingTransitivePom { coordinate: String },

    #[error("{coordinate}: version range '{range}' has no on-disk match, keeping literal range")]
    RangeUnresolvable { coordinate: String, range: String },

    #[error("profile '{profile_id}' in {pom}: unsupported activation ({detail})")]
    UnsupportedProfileActivation {
        profile_id: String,
        pom: String,
        detail: String,
    },

    #[error("{coordinate}: compile dependency on a provided-scope edge was dropped (non-transitive by design)")]
    ProvidedEdgeDropped { coordinate: String },
}
