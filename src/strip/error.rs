use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripError {
    #[error("sample token {token:?} is not a base-10 integer")]
    BadSample { token: String },
    #[error("waveform has an empty sample list")]
    EmptySeries,
    #[error("strip file contains no waveforms")]
    EmptyStrip,
    #[error("invalid strip JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render chart: {0}")]
    Plot(String),
    #[error("no render completed within {seconds}s; abandoning {outstanding} outstanding strip(s)")]
    RenderTimeout { seconds: u64, outstanding: usize },
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for StripError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        StripError::Plot(format!("{value:?}"))
    }
}

impl From<image::ImageError> for StripError {
    fn from(value: image::ImageError) -> Self {
        StripError::Plot(value.to_string())
    }
}
