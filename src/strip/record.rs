use serde::Deserialize;

use crate::strip::error::StripError;

/// One labeled waveform channel inside a strip file.
#[derive(Clone, Debug, Deserialize)]
pub struct WaveformRecord {
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "Text")]
    pub raw_samples: String,
}

impl WaveformRecord {
    /// Comma-separated sample tokens, in recording order.
    pub fn sample_tokens(&self) -> impl Iterator<Item = &str> {
        self.raw_samples.split(',')
    }
}

/// Strip files are usually a bare array of waveforms; older session exports
/// wrap the same array in a `WaveformData` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StripPayload {
    Waveforms(Vec<WaveformRecord>),
    Wrapped {
        #[serde(rename = "WaveformData")]
        waveform_data: Vec<WaveformRecord>,
    },
}

pub fn parse_strip(json: &str) -> Result<Vec<WaveformRecord>, StripError> {
    let payload: StripPayload = serde_json::from_str(json)?;
    Ok(match payload {
        StripPayload::Waveforms(waveforms) => waveforms,
        StripPayload::Wrapped { waveform_data } => waveform_data,
    })
}
