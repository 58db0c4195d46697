use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::prelude::*;

use crate::chart::FONT_FAMILY;
use crate::projection::{self, Projection};
use crate::provinces::{hex_color, plan_map, ColorBucket};
use crate::shapes::{self, LonLatPath, ProvinceShape};

pub const MAP_TITLE: &str = "2019-nCoV疫情地图";
const LABEL_COLOR: &str = "#00FFFF";
const PROVINCE_SHAPEFILE: &str = "china.shp";
const BOUNDARY_SHAPEFILE: &str = "china_nine_dotted_line.shp";

/// Geometry drawn on the distribution map.
pub struct MapLayers {
    pub provinces: Vec<ProvinceShape>,
    /// Drawn as lines only: the dotted boundary plus any extra overlays.
    pub boundaries: Vec<LonLatPath>,
}

impl MapLayers {
    /// Read the province and boundary shapefiles from `dir`, plus any
    /// extra line overlays such as coastlines or country borders.
    pub fn load(dir: &Path, overlays: &[PathBuf]) -> Result<Self> {
        let provinces = shapes::read_provinces(&dir.join(PROVINCE_SHAPEFILE))?;
        let mut boundaries = shapes::read_lines(&dir.join(BOUNDARY_SHAPEFILE))?;
        for path in overlays {
            boundaries.extend(shapes::read_lines(path)?);
        }
        Ok(MapLayers {
            provinces,
            boundaries,
        })
    }
}

fn degree_label(value: f64, positive: char) -> String {
    if value == 0.0 {
        "0°".to_string()
    } else {
        format!("{}°{}", value, positive)
    }
}

/// Shade each province by its confirmed count and write the map image.
pub fn plot_distribution(
    layers: &MapLayers,
    aggregate: &BTreeMap<String, u64>,
    projection: &dyn Projection,
    img_path: &Path,
) -> Result<()> {
    let plan = plan_map(&layers.provinces, aggregate)?;

    let root = BitMapBackend::new(img_path, (1000, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let (map_area, legend_area) = root.split_vertically(720);

    // Keep degrees square: margins plus the caption band.
    let (w, h) = map_area.dim_in_pixel();
    let (x_range, y_range) = projection::fit_aspect(
        projection.bounds(),
        w.saturating_sub(40),
        h.saturating_sub(80),
    );
    let mut chart = ChartBuilder::on(&map_area)
        .margin(20)
        .caption(MAP_TITLE, (FONT_FAMILY, 20))
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;

    let mut fills = Vec::new();
    for &(idx, bucket) in &plan.fills {
        let color = bucket.color()?;
        for ring in &layers.provinces[idx].rings {
            if let Some(points) = projection.project_ring(ring) {
                fills.push(Polygon::new(points, color.filled()));
            }
        }
    }
    chart.draw_series(fills)?;

    chart.draw_series(std::iter::once(PathElement::new(
        projection.outline(),
        BLACK.stroke_width(1),
    )))?;
    chart.draw_series(
        layers
            .provinces
            .iter()
            .flat_map(|s| &s.rings)
            .chain(&layers.boundaries)
            .flat_map(|path| projection.visible_segments(path))
            .map(|seg| PathElement::new(seg, BLACK.stroke_width(1))),
    )?;

    let parallels: Vec<f64> = (0..6).map(|i| projection::LAT_RANGE.0 + 10.0 * i as f64).collect();
    let meridians: Vec<f64> = (0..7).map(|i| projection::LON_RANGE.0 + 10.0 * i as f64).collect();
    let grid_paths = parallels
        .iter()
        .map(|&lat| projection::parallel(lat))
        .chain(meridians.iter().map(|&lon| projection::meridian(lon)));
    chart.draw_series(
        grid_paths
            .flat_map(|path| projection.visible_segments(&path))
            .map(|seg| PathElement::new(seg, BLACK.mix(0.3).stroke_width(1))),
    )?;
    let grid_font = (FONT_FAMILY, 12).into_font().color(&BLACK);
    let grid_labels = parallels
        .iter()
        .filter_map(|&lat| {
            projection
                .project(projection::LON_RANGE.0, lat)
                .map(|p| (degree_label(lat, 'N'), p))
        })
        .chain(meridians.iter().filter_map(|&lon| {
            projection
                .project(lon, projection::LAT_RANGE.0)
                .map(|p| (degree_label(lon, 'E'), p))
        }));
    chart.draw_series(grid_labels.map(|(text, p)| Text::new(text, p, grid_font.clone())))?;

    let label_font = (FONT_FAMILY, 15).into_font().color(&hex_color(LABEL_COLOR)?);
    chart.draw_series(plan.labels.iter().filter_map(|label| {
        projection
            .project(label.lon, label.lat)
            .map(|p| Text::new(label.text.clone(), p, label_font.clone()))
    }))?;

    let legend_font = (FONT_FAMILY, 20).into_font().color(&BLACK);
    let (legend_width, _) = legend_area.dim_in_pixel();
    let entry_width = 180;
    let start = (legend_width as i32 - entry_width * ColorBucket::LEGEND.len() as i32) / 2;
    for (i, bucket) in ColorBucket::LEGEND.iter().enumerate() {
        let x = start + i as i32 * entry_width;
        legend_area.draw(&Rectangle::new(
            [(x, 20), (x + 30, 40)],
            bucket.color()?.filled(),
        ))?;
        legend_area.draw_text(bucket.legend_label(), &legend_font, (x + 40, 20))?;
    }

    root.present()
        .with_context(|| format!("Failed to write {}", img_path.display()))?;
    tracing::info!(
        path = %img_path.display(),
        filled = plan.fills.len(),
        labels = plan.labels.len(),
        "wrote distribution map"
    );
    Ok(())
}
