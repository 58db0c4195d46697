use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use plotters::prelude::*;

use crate::daily::DailySeries;
use crate::provinces::hex_color;

/// Family every text element is drawn with; the CJK font is registered
/// under it so axis labels and legends pick it up too.
pub const FONT_FAMILY: &str = "sans-serif";

pub const DAILY_TITLE: &str = "2019-nCoV疫情曲线";

/// Load a TrueType font from disk and register it as [`FONT_FAMILY`].
pub fn register_font(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read font {}", path.display()))?;
    // The registry keeps fonts for the life of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font(FONT_FAMILY, plotters::style::FontStyle::Normal, bytes)
        .map_err(|_| anyhow!("Invalid font {}", path.display()))?;
    tracing::debug!(font = %path.display(), "registered font");
    Ok(())
}

/// Line chart of the four daily counts against the date axis.
pub fn plot_daily(series: &DailySeries, img_path: &Path) -> Result<()> {
    if series.is_empty() {
        bail!("no daily records to plot");
    }
    let min_date = series.dates[0];
    let max_date = series.dates[series.len() - 1];
    let max_y = series.max_count().max(1);
    let max_y = max_y + max_y / 20;

    let root = BitMapBackend::new(img_path, (1000, 800)).into_drawing_area();
    root.fill(&hex_color("#f4f4f4")?)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(DAILY_TITLE, (FONT_FAMILY, 40))
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(min_date..max_date, 0u64..max_y)?;
    chart
        .configure_mesh()
        .light_line_style(&BLACK.mix(0.05))
        .bold_line_style(&BLACK.mix(0.2))
        .x_labels(series.len().min(15))
        .x_label_formatter(&|d| d.format("%m-%d").to_string())
        .x_label_style(
            (FONT_FAMILY, 14)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .draw()?;

    let lines = [
        ("确诊", &series.confirmed, Palette99::pick(0).to_rgba()),
        ("疑似", &series.suspected, Palette99::pick(1).to_rgba()),
        ("死亡", &series.dead, Palette99::pick(2).to_rgba()),
        ("治愈", &series.healed, Palette99::pick(3).to_rgba()),
    ];
    for (label, counts, color) in lines {
        let style = ShapeStyle {
            color,
            filled: true,
            stroke_width: 2,
        };
        chart
            .draw_series(LineSeries::new(
                series.dates.iter().copied().zip(counts.iter().copied()),
                style.clone(),
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style.clone()));
    }
    chart
        .configure_series_labels()
        .label_font((FONT_FAMILY, 18))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()
        .with_context(|| format!("Failed to write {}", img_path.display()))?;
    tracing::info!(path = %img_path.display(), points = series.len(), "wrote daily chart");
    Ok(())
}
