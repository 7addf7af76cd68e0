//! Include resolution errors.

/// Fatal include failure.
///
/// Unreadable files are not errors; they are skipped and reported as
/// warnings.
#[derive(Debug, thiserror::Error)]
pub enum IncludeError {
    /// Nesting exceeded the depth bound, almost always an include cycle.
    #[error(
        "include depth limit of {depth} exceeded while including {}; check for an include cycle",
        files.join(", ")
    )]
    CyclicInclude {
        /// The configured bound.
        depth: usize,
        /// Paths listed by the directive that hit the bound.
        files: Vec<String>,
    },
}
