// Department boundary layer and the point-in-polygon join.
//
// The join is filtering, not imputing: a station without a usable coordinate
// pair, or whose point falls outside every department polygon (bad data,
// swapped lon/lat, overseas coordinates missing from the layer), is excluded
// from the enriched table. Better to undercount than to geotag wrong.
use crate::errors::PipelineError;
use crate::types::{EnrichedStation, StationRecord};
use geo::{Contains, LineString, MultiPolygon, Point, Polygon};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One department polygon, tagged with its administrative code.
#[derive(Debug, Clone)]
pub struct Department {
    /// Short code, e.g. "75", "2A", "971".
    pub code: String,
    pub name: Option<String>,
    pub boundary: MultiPolygon<f64>,
}

// Minimal GeoJSON surface: the france-geojson department layer is a
// FeatureCollection of Polygon/MultiPolygon features keyed by
// properties.code. Anything else in the file is ignored.
#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: FeatureGeometry,
}

#[derive(Deserialize)]
struct FeatureProperties {
    code: String,
    #[serde(default)]
    nom: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum FeatureGeometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

fn ring_to_line_string(ring: Vec<[f64; 2]>) -> LineString<f64> {
    LineString::from(
        ring.into_iter()
            .map(|[x, y]| (x, y))
            .collect::<Vec<(f64, f64)>>(),
    )
}

fn rings_to_polygon(mut rings: Vec<Vec<[f64; 2]>>) -> Polygon<f64> {
    if rings.is_empty() {
        return Polygon::new(LineString::new(vec![]), vec![]);
    }
    let exterior = ring_to_line_string(rings.remove(0));
    let interiors = rings.into_iter().map(ring_to_line_string).collect();
    Polygon::new(exterior, interiors)
}

impl FeatureGeometry {
    fn into_multi_polygon(self) -> MultiPolygon<f64> {
        match self {
            FeatureGeometry::Polygon { coordinates } => {
                MultiPolygon::new(vec![rings_to_polygon(coordinates)])
            }
            FeatureGeometry::MultiPolygon { coordinates } => {
                MultiPolygon::new(coordinates.into_iter().map(rings_to_polygon).collect())
            }
        }
    }
}

/// Load the department layer from a GeoJSON file.
///
/// Departments come back sorted by code; [`locate`] scans in that order, so
/// even a malformed layer with overlapping polygons resolves a point to a
/// single deterministic department (the lowest code).
pub fn load_departments(path: &Path) -> Result<Vec<Department>, PipelineError> {
    let bytes = fs::read(path).map_err(|e| PipelineError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let collection: FeatureCollection =
        serde_json::from_slice(&bytes).map_err(|e| PipelineError::GeometryParse {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut departments: Vec<Department> = collection
        .features
        .into_iter()
        .map(|f| Department {
            code: f.properties.code,
            name: f.properties.nom,
            boundary: f.geometry.into_multi_polygon(),
        })
        .collect();
    if departments.is_empty() {
        return Err(PipelineError::EmptyPolygonLayer {
            path: path.to_path_buf(),
        });
    }
    departments.sort_by(|a, b| a.code.cmp(&b.code));
    Ok(departments)
}

/// Find the department containing a WGS84 point, if any.
pub fn locate(departments: &[Department], longitude: f64, latitude: f64) -> Option<&str> {
    let point = Point::new(longitude, latitude);
    departments
        .iter()
        .find(|d| d.boundary.contains(&point))
        .map(|d| d.code.as_str())
}

/// Inner spatial join of the prepared records against the department layer.
///
/// A record survives iff it has a complete coordinate pair and its point
/// falls inside a department polygon; everything else is dropped silently.
pub fn enrich(records: &[StationRecord], departments: &[Department]) -> Vec<EnrichedStation> {
    records
        .iter()
        .filter_map(|record| {
            let longitude = record.longitude?;
            let latitude = record.latitude?;
            let department = locate(departments, longitude, latitude)?.to_string();
            Some(EnrichedStation {
                longitude,
                latitude,
                department,
                record: record.clone(),
            })
        })
        .collect()
}
