use std::str::FromStr;

use anyhow::anyhow;

use crate::shapes::LonLatPath;

/// Maps geographic coordinates (degrees) onto the flat map plane.
pub trait Projection {
    /// `None` when the point is not visible on the map.
    fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Extent of the map plane as (x range, y range).
    fn bounds(&self) -> ((f64, f64), (f64, f64));

    /// Outline of the visible map area in plane coordinates.
    fn outline(&self) -> Vec<(f64, f64)>;

    /// Project a whole ring, or nothing if any point is hidden.
    fn project_ring(&self, ring: &[(f64, f64)]) -> Option<Vec<(f64, f64)>> {
        ring.iter().map(|&(lon, lat)| self.project(lon, lat)).collect()
    }

    /// Split a path into its visible stretches.
    fn visible_segments(&self, path: &[(f64, f64)]) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for &(lon, lat) in path {
            match self.project(lon, lat) {
                Some(p) => current.push(p),
                None => {
                    if current.len() > 1 {
                        segments.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
            }
        }
        if current.len() > 1 {
            segments.push(current);
        }
        segments
    }
}

/// View of the unit globe from infinitely far above (`lon0`, `lat0`).
#[derive(Debug, Clone, Copy)]
pub struct Orthographic {
    lon0: f64,
    sin_lat0: f64,
    cos_lat0: f64,
}

impl Orthographic {
    pub fn new(lon0: f64, lat0: f64) -> Self {
        let lat0 = lat0.to_radians();
        Orthographic {
            lon0: lon0.to_radians(),
            sin_lat0: lat0.sin(),
            cos_lat0: lat0.cos(),
        }
    }
}

impl Projection for Orthographic {
    fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (lon, lat) = (lon.to_radians(), lat.to_radians());
        let dlon = lon - self.lon0;
        let cos_c = self.sin_lat0 * lat.sin() + self.cos_lat0 * lat.cos() * dlon.cos();
        if cos_c < 0.0 {
            return None;
        }
        let x = lat.cos() * dlon.sin();
        let y = self.cos_lat0 * lat.sin() - self.sin_lat0 * lat.cos() * dlon.cos();
        Some((x, y))
    }

    fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        ((-1.0, 1.0), (-1.0, 1.0))
    }

    fn outline(&self) -> Vec<(f64, f64)> {
        (0..=360)
            .map(|d| {
                let a = (d as f64).to_radians();
                (a.cos(), a.sin())
            })
            .collect()
    }
}

/// Plain lon/lat grid clipped to a window.
#[derive(Debug, Clone, Copy)]
pub struct Equirectangular {
    lon: (f64, f64),
    lat: (f64, f64),
}

impl Equirectangular {
    pub fn new(lon: (f64, f64), lat: (f64, f64)) -> Self {
        Equirectangular { lon, lat }
    }
}

impl Projection for Equirectangular {
    fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let inside = lon >= self.lon.0 && lon <= self.lon.1 && lat >= self.lat.0 && lat <= self.lat.1;
        inside.then(|| (lon, lat))
    }

    fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        (self.lon, self.lat)
    }

    fn outline(&self) -> Vec<(f64, f64)> {
        vec![
            (self.lon.0, self.lat.0),
            (self.lon.1, self.lat.0),
            (self.lon.1, self.lat.1),
            (self.lon.0, self.lat.1),
            (self.lon.0, self.lat.0),
        ]
    }
}

/// Which projection the map is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    Ortho,
    Cyl,
}

impl FromStr for ProjectionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ortho" => Ok(ProjectionKind::Ortho),
            "cyl" => Ok(ProjectionKind::Cyl),
            _ => Err(anyhow!("unknown projection {:?} (expected ortho or cyl)", s)),
        }
    }
}

pub const CENTER_LON: f64 = 105.0;
pub const CENTER_LAT: f64 = 30.0;
pub const LON_RANGE: (f64, f64) = (70.0, 140.0);
pub const LAT_RANGE: (f64, f64) = (0.0, 60.0);

impl ProjectionKind {
    pub fn build(self) -> Box<dyn Projection> {
        match self {
            ProjectionKind::Ortho => Box::new(Orthographic::new(CENTER_LON, CENTER_LAT)),
            ProjectionKind::Cyl => Box::new(Equirectangular::new(LON_RANGE, LAT_RANGE)),
        }
    }
}

/// A parallel sampled every degree around the globe.
pub fn parallel(lat: f64) -> LonLatPath {
    (-180..=180).map(|lon| (lon as f64, lat)).collect()
}

/// A meridian sampled every degree from pole to pole.
pub fn meridian(lon: f64) -> LonLatPath {
    (-90..=90).map(|lat| (lon, lat as f64)).collect()
}

/// Widen one of the ranges so that a unit in x and a unit in y cover the
/// same number of pixels in a `width` x `height` area.
pub fn fit_aspect(
    (x, y): ((f64, f64), (f64, f64)),
    width: u32,
    height: u32,
) -> ((f64, f64), (f64, f64)) {
    let (xspan, yspan) = (x.1 - x.0, y.1 - y.0);
    let scale = (xspan / width.max(1) as f64).max(yspan / height.max(1) as f64);
    let (xpad, ypad) = (
        (scale * width as f64 - xspan) / 2.0,
        (scale * height as f64 - yspan) / 2.0,
    );
    ((x.0 - xpad, x.1 + xpad), (y.0 - ypad, y.1 + ypad))
}
