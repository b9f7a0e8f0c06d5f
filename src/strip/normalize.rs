use crate::strip::error::StripError;

/// Seconds between consecutive samples (240 Hz recording clock).
pub const SAMPLE_PERIOD: f32 = 1.0 / 240.0;
/// Conversion from raw ADC counts to physical units.
pub const SAMPLE_SCALE: f32 = 0.001 * 2.44;

/// Single scaled point on the time axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    pub x: f32,
    pub y: f32,
}

/// Scaled, time-indexed view of one waveform plus its observed value range.
#[derive(Clone, Debug)]
pub struct NormalizedSeries {
    pub points: Vec<SamplePoint>,
    pub max: f32,
    pub min: f32,
}

impl NormalizedSeries {
    /// Total vertical extent of the series. Max and min accumulate from zero,
    /// so the range always spans both sides of the axis origin.
    pub fn range(&self) -> f32 {
        self.max.abs() + self.min.abs()
    }

    /// Horizontal guide values at thirds of the range, lowest first. The top
    /// guide lands on `max`.
    pub fn guide_values(&self) -> [f32; 3] {
        let step = self.range() / 3.0;
        [
            self.min + step,
            self.min + step * 2.0,
            self.min + step * 3.0,
        ]
    }

    /// Time coordinate of the last sample.
    pub fn duration(&self) -> f32 {
        self.points.last().map(|p| p.x).unwrap_or(0.0)
    }
}

/// Scale raw sample tokens into a time-indexed series.
///
/// Every token must be a base-10 integer (surrounding whitespace tolerated).
/// The first bad token fails the whole series so the caller can skip the
/// strip it came from.
pub fn normalize<'a, I>(tokens: I) -> Result<NormalizedSeries, StripError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut points = Vec::new();
    let mut cursor = 0.0f32;
    let mut max = 0.0f32;
    let mut min = 0.0f32;
    for token in tokens {
        let raw: i32 = token.trim().parse().map_err(|_| StripError::BadSample {
            token: token.to_owned(),
        })?;
        cursor += SAMPLE_PERIOD;
        let value = raw as f32 * SAMPLE_SCALE;
        max = max.max(value);
        min = min.min(value);
        points.push(SamplePoint {
            x: cursor,
            y: value,
        });
    }
    if points.is_empty() {
        return Err(StripError::EmptySeries);
    }
    Ok(NormalizedSeries { points, max, min })
}
