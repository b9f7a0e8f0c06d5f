use crate::strip::error::StripError;
use crate::strip::normalize::{normalize, NormalizedSeries};
use crate::strip::record::WaveformRecord;

/// Headroom multiplier applied to the top of the y-axis only.
pub const Y_HEADROOM: f32 = 1.01;
/// Spacing of the vertical gridlines, in seconds.
pub const X_GRID_INTERVAL: f32 = 0.2;

/// One stacked band of the rendered image: a labeled, normalized waveform.
#[derive(Clone, Debug)]
pub struct StripChart {
    pub label: String,
    pub series: NormalizedSeries,
}

impl StripChart {
    /// Y-axis bounds with 1% headroom above the data, none below.
    pub fn y_bounds(&self) -> (f32, f32) {
        (self.series.min, self.series.max * Y_HEADROOM)
    }
}

/// Structured render payload for one strip file: every waveform it contains,
/// in file order.
#[derive(Clone, Debug)]
pub struct ChartDocument {
    pub strips: Vec<StripChart>,
}

impl ChartDocument {
    /// Normalize each record into a stacked sub-chart. Fails on a strip with
    /// no waveforms or on any unparsable sample token, so the caller can skip
    /// the whole file.
    pub fn from_records(records: &[WaveformRecord]) -> Result<Self, StripError> {
        if records.is_empty() {
            return Err(StripError::EmptyStrip);
        }
        let strips = records
            .iter()
            .map(|record| {
                Ok(StripChart {
                    label: record.label.clone(),
                    series: normalize(record.sample_tokens())?,
                })
            })
            .collect::<Result<Vec<_>, StripError>>()?;
        Ok(Self { strips })
    }

    pub fn len(&self) -> usize {
        self.strips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }
}
