//! Road data importers, enabled by the `geojson` and `csv` Cargo features.
//!
//! Both importers only produce [`RoadFeature`]s; deciding which ones are
//! eligible and building the graph is left to the caller.
//!
//! # GeoJSON
//!
//! ```ignore
//! let roads = rl_graph::import::features_from_geojson_str(&text)?;
//! ```
//!
//! `LineString` and `MultiLineString` geometries are read; each part of a
//! `MultiLineString` becomes its own feature (sharing one `FeatureId`) so
//! that disjoint parts are never chained together.  Other geometry types are
//! ignored.  The road class comes from the numeric `numero` property: 1–99
//! is a national route, everything else departmental.
//!
//! # CSV
//!
//! One row per vertex:
//!
//! ```csv
//! feature_id,seq,x,y,class
//! 0,0,0.0,0.0,national
//! 0,1,100.0,0.0,national
//! 1,0,100.0,0.0,
//! 1,1,100.0,80.0,
//! ```
//!
//! Rows are grouped by `feature_id` and ordered by `seq`.  `class` is
//! optional (`national` / `departmental`, empty means departmental).

#[cfg(feature = "csv")]
use std::collections::BTreeMap;
#[cfg(feature = "csv")]
use std::io::Read;
#[cfg(feature = "csv")]
use std::path::Path;

use tracing::debug;

use rl_core::{Coord, RoadFeature};
#[cfg(feature = "geojson")]
use rl_core::{FeatureId, RoadClass};

use crate::error::ImportError;

// ── GeoJSON ───────────────────────────────────────────────────────────────────

/// Property holding the route number used for classification.
#[cfg(feature = "geojson")]
pub const ROUTE_NUMBER_PROPERTY: &str = "numero";

/// Parse a GeoJSON document (FeatureCollection, Feature or bare Geometry)
/// into road features.
#[cfg(feature = "geojson")]
pub fn features_from_geojson_str(text: &str) -> Result<Vec<RoadFeature>, ImportError> {
    features_from_geojson_with(text, ROUTE_NUMBER_PROPERTY)
}

/// Like [`features_from_geojson_str`] but reads the route number from
/// `number_property`.
#[cfg(feature = "geojson")]
pub fn features_from_geojson_with(
    text: &str,
    number_property: &str,
) -> Result<Vec<RoadFeature>, ImportError> {
    use geojson::GeoJson;

    let parsed: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| ImportError::Parse(e.to_string()))?;

    let sources: Vec<(Option<geojson::Geometry>, RoadClass)> = match parsed {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .map(|f| {
                let class = route_class(&f, number_property);
                (f.geometry, class)
            })
            .collect(),
        GeoJson::Feature(f) => {
            let class = route_class(&f, number_property);
            vec![(f.geometry, class)]
        }
        GeoJson::Geometry(g) => vec![(Some(g), RoadClass::Departmental)],
    };

    let mut out = Vec::with_capacity(sources.len());
    let mut ignored = 0usize;
    for (i, (geometry, class)) in sources.into_iter().enumerate() {
        let id = FeatureId(i as u32);
        match geometry.map(|g| g.value) {
            Some(geojson::Value::LineString(line)) => {
                out.push(RoadFeature::new(id, class, positions(&line)?));
            }
            Some(geojson::Value::MultiLineString(lines)) => {
                for line in &lines {
                    out.push(RoadFeature::new(id, class, positions(line)?));
                }
            }
            _ => ignored += 1,
        }
    }

    debug!(features = out.len(), ignored, "imported GeoJSON roads");
    Ok(out)
}

#[cfg(feature = "geojson")]
fn route_class(feature: &geojson::Feature, number_property: &str) -> RoadClass {
    let number = feature.property(number_property).and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_f64().map(|f| f as i64))
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
    });
    RoadClass::from_route_number(number)
}

#[cfg(feature = "geojson")]
fn positions(line: &[Vec<f64>]) -> Result<Vec<Coord>, ImportError> {
    line.iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Ok(Coord::new(*x, *y)),
            _ => Err(ImportError::Parse(format!(
                "position needs at least 2 values, got {}",
                p.len()
            ))),
        })
        .collect()
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(feature = "csv")]
#[derive(serde::Deserialize)]
struct VertexRecord {
    feature_id: u32,
    seq:        u32,
    x:          f64,
    y:          f64,
    #[serde(default)]
    class:      Option<String>,
}

/// Load road features from a CSV vertex table on disk.
#[cfg(feature = "csv")]
pub fn features_from_csv(path: &Path) -> Result<Vec<RoadFeature>, ImportError> {
    let file = std::fs::File::open(path)?;
    features_from_csv_reader(file)
}

/// Like [`features_from_csv`] but accepts any `Read` source.
#[cfg(feature = "csv")]
pub fn features_from_csv_reader<R: Read>(reader: R) -> Result<Vec<RoadFeature>, ImportError> {
    use rl_core::{FeatureId, RoadClass};

    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut by_feature: BTreeMap<u32, (RoadClass, Vec<(u32, Coord)>)> = BTreeMap::new();

    for result in csv_reader.deserialize::<VertexRecord>() {
        let row = result.map_err(|e| ImportError::Parse(e.to_string()))?;
        let class = parse_class(row.class.as_deref())?;
        let entry = by_feature.entry(row.feature_id).or_insert((class, Vec::new()));
        if class == RoadClass::National {
            entry.0 = class;
        }
        entry.1.push((row.seq, Coord::new(row.x, row.y)));
    }

    let features: Vec<RoadFeature> = by_feature
        .into_iter()
        .map(|(id, (class, mut vertices))| {
            vertices.sort_by_key(|&(seq, _)| seq);
            RoadFeature::new(
                FeatureId(id),
                class,
                vertices.into_iter().map(|(_, c)| c).collect(),
            )
        })
        .collect();

    debug!(features = features.len(), "imported CSV roads");
    Ok(features)
}

#[cfg(feature = "csv")]
fn parse_class(s: Option<&str>) -> Result<rl_core::RoadClass, ImportError> {
    use rl_core::RoadClass;

    match s.map(str::trim).unwrap_or("") {
        "" | "departmental" => Ok(RoadClass::Departmental),
        "national" => Ok(RoadClass::National),
        other => Err(ImportError::Parse(format!(
            "invalid road class {other:?}: expected \"national\", \"departmental\" or empty"
        ))),
    }
}
