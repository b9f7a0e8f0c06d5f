// src/strip/mod.rs
pub mod chart;
pub mod error;
pub mod normalize;
pub mod plot;
pub mod record;
pub mod render;
pub mod run;

pub use chart::{ChartDocument, StripChart};
pub use error::StripError;
pub use normalize::{normalize, NormalizedSeries, SamplePoint};
pub use plot::ChartStyle;
pub use record::{parse_strip, WaveformRecord};
pub use render::{PlottersBackend, RenderBackend, RenderOptions};
pub use run::{RunSummary, StripRun, DEST_DIR, SOURCE_DIR};
