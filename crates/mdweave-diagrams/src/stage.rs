//! Renderer input preparation.

use std::borrow::Cow;

use crate::kind::RendererKind;

/// Text written to the staged source file for `kind`.
///
/// `PlantUML` sources without an `@start...` line anywhere in them are
/// wrapped in `@startuml`/`@enduml`.
#[must_use]
pub fn staged_source(kind: RendererKind, source: &str) -> Cow<'_, str> {
    match kind {
        RendererKind::Uml if !has_start_marker(source) => {
            Cow::Owned(format!("@startuml\n{source}\n@enduml\n"))
        }
        RendererKind::FlowChart | RendererKind::Uml => Cow::Borrowed(source),
    }
}

fn has_start_marker(source: &str) -> bool {
    source
        .lines()
        .any(|line| line.trim_start().starts_with("@start"))
}
