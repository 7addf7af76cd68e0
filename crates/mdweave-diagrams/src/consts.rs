//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default `--scale` passed to the flow chart renderer.
pub const DEFAULT_MERMAID_SCALE: u32 = 4;

/// Default per-invocation renderer timeout (120 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// How often a running renderer is polled while a timeout is armed.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(50);
