use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::coord::Shift;
use plotters::prelude::LineSeries;
use plotters::prelude::*;

use crate::strip::chart::{ChartDocument, StripChart, X_GRID_INTERVAL};
use crate::strip::error::StripError;
use crate::strip::render::RenderOptions;

/// Fixed colors and font sizing shared by every rendered strip.
#[derive(Clone, Debug)]
pub struct ChartStyle {
    pub background: RGBColor,
    pub line: RGBColor,
    pub guide: RGBColor,
    pub label_font_size: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            background: WHITE,
            line: RGBColor(41, 128, 185),
            guide: RGBColor(239, 154, 154),
            label_font_size: 12,
        }
    }
}

/// Draw every waveform of a document as vertically stacked bands and encode
/// the result as PNG. Output width follows the options; height is one band
/// per waveform.
pub fn render_document_png(
    document: &ChartDocument,
    style: &ChartStyle,
    options: &RenderOptions,
) -> Result<Vec<u8>, StripError> {
    if document.is_empty() {
        return Err(StripError::EmptyStrip);
    }
    let width = options.window_width;
    let height = options.content_height(document.len());
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&style.background)?;
        let bands = root.split_evenly((document.len(), 1));
        for (band, strip) in bands.iter().zip(&document.strips) {
            draw_strip(band, strip, style)?;
        }
        root.present()?;
    }
    encode_png(&buffer, width, height)
}

fn draw_strip(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    strip: &StripChart,
    style: &ChartStyle,
) -> Result<(), StripError> {
    let series = &strip.series;
    if series.points.is_empty() {
        return Err(StripError::EmptySeries);
    }
    let (y_min, y_max) = strip.y_bounds();
    // Flat data would collapse the axis; give it a token extent instead.
    let (y_min, y_max) = if (y_max - y_min).abs() < f32::EPSILON {
        (-1.0, 1.0)
    } else {
        (y_min, y_max)
    };
    let x_max = series.duration();
    let mut chart = ChartBuilder::on(area)
        .margin(2)
        .set_label_area_size(LabelAreaPosition::Left, 36)
        .set_label_area_size(LabelAreaPosition::Bottom, 6)
        .build_cartesian_2d(0f32..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .axis_style(&style.guide)
        .set_all_tick_mark_size(0)
        .x_label_formatter(&|_| String::new())
        .y_label_formatter(&|_| String::new())
        .y_desc(strip.label.as_str())
        .axis_desc_style(
            ("sans-serif", style.label_font_size)
                .into_font()
                .color(&BLACK),
        )
        .draw()?;
    // Vertical gridlines on the fixed time interval.
    let mut tick = X_GRID_INTERVAL;
    while tick < x_max {
        chart.draw_series(LineSeries::new([(tick, y_min), (tick, y_max)], &style.guide))?;
        tick += X_GRID_INTERVAL;
    }
    // Horizontal guides at thirds of the observed range.
    for value in series.guide_values() {
        chart.draw_series(LineSeries::new([(0.0, value), (x_max, value)], &style.guide))?;
    }
    let line = style.line;
    chart
        .draw_series(LineSeries::new(
            series.points.iter().map(|p| (p.x, p.y)),
            &line,
        ))?
        .label(strip.label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &line));
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(&style.guide)
        .background_style(&style.background)
        .draw()?;
    Ok(())
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, StripError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| StripError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
