use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::aspects::types::AspectSet;
use crate::ephemeris::types::PositionSet;

/// Chart types the orchestrator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Natal,
    Synastry,
    Transit,
    Composite,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Natal => "natal",
            ChartKind::Synastry => "synastry",
            ChartKind::Transit => "transit",
            ChartKind::Composite => "composite",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Classic,
    Light,
    Dark,
    DarkHighContrast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    #[default]
    En,
    Fr,
    Pt,
    Es,
    Tr,
    Ru,
    It,
    Cn,
    De,
    Hi,
}

/// Presentation options forwarded to the renderer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub language: Language,
    /// Draw only the wheel, without aspect grid or legends
    pub wheel_only: bool,
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRequest<'a> {
    pub kind: ChartKind,
    /// Primary set first; the second set is the partner or transit
    pub positions: Vec<&'a PositionSet>,
    pub aspects: &'a AspectSet,
    pub options: RenderOptions,
}

/// A rendered chart artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedChart {
    /// MIME type, e.g. `image/svg+xml`
    pub media_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("No chart renderer configured")]
    NotConfigured,
    #[error("Unsupported render option: {message}")]
    UnsupportedOption { message: String },
    #[error("Rendering failed: {message}")]
    Failed { message: String },
}

/// Draws charts from positions and aspects.
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(&self, request: &RenderRequest<'_>) -> Result<RenderedChart, RenderError>;
}
