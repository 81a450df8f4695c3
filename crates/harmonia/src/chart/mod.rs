pub mod orchestrator;
pub mod render;
pub mod result;
pub mod subject;

pub use orchestrator::{ChartOrchestrator, EngineSettings, NOW_SUBJECT};
pub use render::{
    ChartKind, ChartRenderer, Language, RenderError, RenderOptions, RenderRequest, RenderedChart,
    Theme,
};
pub use result::{
    CompositeAspects, NatalAspects, Rendered, ScoreReport, SynastryAspects, TransitAspects,
};
pub use subject::{Place, Subject, TransitMoment};
