//! Diagram rendering for mdweave.
//!
//! Mermaid and `PlantUML` code blocks are rendered by external tools into
//! files named by the hash of their source, then replaced by a reference to
//! the file:
//!
//! - [`RendererKind`]: which tool renders a block, and where its artifacts go
//! - [`DiagramKey`]: content hash plus kind
//! - [`DiagramRenderer`] / [`CommandRenderer`]: the external tool contract
//! - [`DiagramFilter`]: cache lookup, staging, rendering and embedding
//!
//! Rendering happens in a staging directory inside the artifact bucket and
//! the result is renamed into place, so a partially written artifact is
//! never visible under its final name.

mod consts;
mod embed;
mod error;
mod key;
mod kind;
mod processor;
mod renderer;
mod stage;

pub use consts::{DEFAULT_MERMAID_SCALE, DEFAULT_TIMEOUT};
pub use embed::embed;
pub use error::{DiagramError, RenderError};
pub use key::DiagramKey;
pub use kind::{ArtifactFormat, RendererKind};
pub use processor::DiagramFilter;
pub use renderer::{CommandRenderer, DiagramRenderer, RenderRequest};
pub use stage::staged_source;
