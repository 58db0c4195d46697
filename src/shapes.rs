use std::path::Path;

use anyhow::{Context, Result};
use shapefile::dbase::{FieldValue, Record};
use shapefile::Shape;

/// A run of (longitude, latitude) points: a polygon ring or a polyline part.
pub type LonLatPath = Vec<(f64, f64)>;

/// A province polygon together with the attributes the map needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceShape {
    pub owner: String,
    pub fcname: String,
    pub rings: Vec<LonLatPath>,
}

fn text_field(record: &Record, name: &str) -> String {
    match record.get(name) {
        Some(FieldValue::Character(Some(s))) => s.trim_matches('\0').trim().to_string(),
        _ => String::new(),
    }
}

fn shape_paths(shape: &Shape) -> Vec<LonLatPath> {
    match shape {
        Shape::Polygon(p) => p
            .rings()
            .iter()
            .map(|r| r.points().iter().map(|pt| (pt.x, pt.y)).collect())
            .collect(),
        Shape::PolygonM(p) => p
            .rings()
            .iter()
            .map(|r| r.points().iter().map(|pt| (pt.x, pt.y)).collect())
            .collect(),
        Shape::PolygonZ(p) => p
            .rings()
            .iter()
            .map(|r| r.points().iter().map(|pt| (pt.x, pt.y)).collect())
            .collect(),
        Shape::Polyline(l) => l
            .parts()
            .iter()
            .map(|part| part.iter().map(|pt| (pt.x, pt.y)).collect())
            .collect(),
        Shape::PolylineM(l) => l
            .parts()
            .iter()
            .map(|part| part.iter().map(|pt| (pt.x, pt.y)).collect())
            .collect(),
        Shape::PolylineZ(l) => l
            .parts()
            .iter()
            .map(|part| part.iter().map(|pt| (pt.x, pt.y)).collect())
            .collect(),
        _ => Vec::new(),
    }
}

/// Read the province polygons and their `OWNER`/`FCNAME` attributes.
pub fn read_provinces(path: &Path) -> Result<Vec<ProvinceShape>> {
    let pairs = shapefile::read(path)
        .with_context(|| format!("Failed to read province shapefile {}", path.display()))?;
    let shapes: Vec<ProvinceShape> = pairs
        .iter()
        .map(|(shape, record)| ProvinceShape {
            owner: text_field(record, "OWNER"),
            fcname: text_field(record, "FCNAME"),
            rings: shape_paths(shape),
        })
        .collect();
    tracing::debug!(shapes = shapes.len(), path = %path.display(), "read province shapes");
    Ok(shapes)
}

/// Read any shapefile as plain boundary lines, ignoring attributes.
pub fn read_lines(path: &Path) -> Result<Vec<LonLatPath>> {
    let shapes = shapefile::read_shapes(path)
        .with_context(|| format!("Failed to read shapefile {}", path.display()))?;
    Ok(shapes.iter().flat_map(shape_paths).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapefile::{Point, Polygon, PolygonRing, Polyline};

    #[test]
    fn polygon_rings_become_paths() {
        let polygon = Polygon::new(PolygonRing::Outer(vec![
            Point::new(100.0, 30.0),
            Point::new(100.0, 31.0),
            Point::new(101.0, 31.0),
            Point::new(100.0, 30.0),
        ]));
        let paths = shape_paths(&Shape::Polygon(polygon));
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].first(), Some(&(100.0, 30.0)));
        assert_eq!(paths[0].len(), 4);
    }

    #[test]
    fn polyline_parts_become_paths() {
        let line = Polyline::with_parts(vec![
            vec![Point::new(110.0, 20.0), Point::new(111.0, 18.0)],
            vec![Point::new(112.0, 15.0), Point::new(113.0, 12.0)],
        ]);
        let paths = shape_paths(&Shape::Polyline(line));
        assert_eq!(paths, vec![
            vec![(110.0, 20.0), (111.0, 18.0)],
            vec![(112.0, 15.0), (113.0, 12.0)],
        ]);
    }

    #[test]
    fn missing_shapefile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_provinces(&dir.path().join("china.shp")).is_err());
        assert!(read_lines(&dir.path().join("china_nine_dotted_line.shp")).is_err());
    }
}
