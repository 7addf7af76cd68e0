//! Renderer kinds and artifact formats.

use mdweave_ast::TargetFormat;

/// Which external tool renders a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKind {
    /// Mermaid flow charts (`mmdc`).
    FlowChart,
    /// `PlantUML` diagrams.
    Uml,
}

impl RendererKind {
    /// All kinds, in chain order.
    pub const ALL: [Self; 2] = [Self::FlowChart, Self::Uml];

    /// Code block tag selecting this kind.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::FlowChart => "mermaid",
            Self::Uml => "plantuml",
        }
    }

    /// Artifact bucket name.
    #[must_use]
    pub fn store_dir(self) -> &'static str {
        match self {
            Self::FlowChart => "mermaid-images",
            Self::Uml => "plantuml-images",
        }
    }

    /// Extension of the staged source file handed to the renderer.
    #[must_use]
    pub fn source_extension(self) -> &'static str {
        match self {
            Self::FlowChart => "mmd",
            Self::Uml => "uml",
        }
    }

    /// Caption used for paper figures.
    #[must_use]
    pub fn caption(self) -> &'static str {
        match self {
            Self::FlowChart => "Mermaid diagram",
            Self::Uml => "PlantUML diagram",
        }
    }

    /// Artifact format for a target: vector for hypertext, raster otherwise.
    #[must_use]
    pub fn artifact_format(self, target: TargetFormat) -> ArtifactFormat {
        match self {
            Self::FlowChart | Self::Uml => ArtifactFormat::for_target(target),
        }
    }
}

/// Output format for rendered diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Svg,
    Png,
}

impl ArtifactFormat {
    /// Default format for a target.
    #[must_use]
    pub fn for_target(target: TargetFormat) -> Self {
        match target {
            TargetFormat::Hypertext => Self::Svg,
            TargetFormat::Paper | TargetFormat::Generic => Self::Png,
        }
    }

    /// Return format as string representation, also used as file extension.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_format_by_target() {
        for kind in RendererKind::ALL {
            assert_eq!(kind.artifact_format(TargetFormat::Hypertext), ArtifactFormat::Svg);
            assert_eq!(kind.artifact_format(TargetFormat::Paper), ArtifactFormat::Png);
            assert_eq!(kind.artifact_format(TargetFormat::Generic), ArtifactFormat::Png);
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(RendererKind::FlowChart.tag(), "mermaid");
        assert_eq!(RendererKind::Uml.store_dir(), "plantuml-images");
        assert_eq!(RendererKind::Uml.source_extension(), "uml");
    }
}
