use crate::strip::chart::ChartDocument;
use crate::strip::error::StripError;
use crate::strip::plot::{render_document_png, ChartStyle};

/// Output sizing handed to a render backend: fixed width, height follows the
/// content (one band per waveform).
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    pub window_width: u32,
    pub strip_height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            window_width: 1920,
            strip_height: 100,
        }
    }
}

impl RenderOptions {
    /// Full content height for a document of `strips` stacked bands.
    pub fn content_height(&self, strips: usize) -> u32 {
        self.strip_height * strips as u32
    }
}

/// Capability boundary for turning a chart document into encoded image bytes.
/// Backend failures must surface as errors, never as a blank image.
pub trait RenderBackend {
    fn render(
        &self,
        document: &ChartDocument,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, StripError>;
}

/// Default backend drawing with plotters into an in-memory bitmap.
#[derive(Clone, Debug, Default)]
pub struct PlottersBackend {
    style: ChartStyle,
}

impl PlottersBackend {
    pub fn new(style: ChartStyle) -> Self {
        Self { style }
    }
}

impl RenderBackend for PlottersBackend {
    fn render(
        &self,
        document: &ChartDocument,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, StripError> {
        render_document_png(document, &self.style, options)
    }
}
