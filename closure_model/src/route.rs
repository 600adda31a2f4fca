use anyhow::Result;
use serde::{Deserialize, Serialize};

use geom::LonLat;

use crate::ValidationError;

/// The shapes a route can arrive in. Everything is longitude first unless noted.
#[derive(Clone, Debug, PartialEq)]
pub enum RouteInput {
    /// One route, as a flat sequence of points
    Flat(Vec<LonLat>),
    /// Several routes, each its own sequence
    Separate(Vec<Vec<LonLat>>),
    /// A GeoJSON LineString or MultiLineString (or a collection of them)
    Geometry(geojson::Geometry),
}

impl RouteInput {
    /// Recognizes the route shape from JSON:
    ///
    /// - `[[lng, lat], ...]`
    /// - `[[[lng, lat], ...], ...]`
    /// - `[{"geometry": [[lng, lat], ...]}, {"coordinates": [[lat, lng], ...]}, ...]`
    /// - a GeoJSON LineString, MultiLineString, Feature or FeatureCollection
    pub fn from_json(value: &serde_json::Value) -> Result<RouteInput> {
        match value {
            serde_json::Value::Array(list) => {
                let first = match list.first() {
                    Some(x) => x,
                    None => return Ok(RouteInput::Flat(Vec::new())),
                };
                if is_position(first) {
                    return Ok(RouteInput::Flat(parse_positions(list, false)?));
                }
                let mut routes = Vec::new();
                for route in list {
                    routes.push(parse_route(route)?);
                }
                Ok(RouteInput::Separate(routes))
            }
            serde_json::Value::Object(_) => {
                let gj: geojson::GeoJson = serde_json::from_value(value.clone())
                    .map_err(|err| unrecognized(format!("not GeoJSON: {}", err)))?;
                Ok(RouteInput::Geometry(gj_to_geometry(gj)?))
            }
            _ => Err(unrecognized("expected a list or a GeoJSON object".to_string())),
        }
    }

    /// Produces one line per route, dropping invalid coordinates. Separate routes are never
    /// joined together.
    pub fn normalize(&self) -> Result<RouteGeometry> {
        let raw_lines: Vec<Vec<LonLat>> = match self {
            RouteInput::Flat(pts) => vec![pts.clone()],
            RouteInput::Separate(routes) => routes.clone(),
            RouteInput::Geometry(geometry) => geometry_lines(&geometry.value)?,
        };

        let mut lines = Vec::new();
        let mut total_valid = 0;
        for (idx, line) in raw_lines.into_iter().enumerate() {
            let before = line.len();
            let valid: Vec<LonLat> = line.into_iter().filter(|pt| pt.is_valid()).collect();
            if valid.len() != before {
                warn!(
                    "Route {} had {} invalid coordinates",
                    idx,
                    before - valid.len()
                );
            }
            total_valid += valid.len();
            if valid.len() < 2 {
                if !valid.is_empty() {
                    warn!("Route {} has only one valid coordinate, skipping it", idx);
                }
                continue;
            }
            lines.push(valid);
        }

        if total_valid < 2 || lines.is_empty() {
            return Err(ValidationError::new(format!(
                "need at least 2 valid coordinates along one route, but only found {}",
                total_valid
            ))
            .into());
        }
        Ok(RouteGeometry { lines })
    }
}

/// Separate routes, each an ordered line of at least 2 valid points.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub lines: Vec<Vec<LonLat>>,
}

impl RouteGeometry {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn num_points(&self) -> usize {
        self.lines.iter().map(|l| l.len()).sum()
    }

    pub fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::MultiLineString(
            self.lines
                .iter()
                .map(|line| {
                    line.iter()
                        .map(|pt| vec![pt.longitude, pt.latitude])
                        .collect()
                })
                .collect(),
        ))
    }
}

fn unrecognized(detail: String) -> anyhow::Error {
    ValidationError::new(format!("unrecognized route shape, {}", detail)).into()
}

fn is_position(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Array(list) => list.iter().all(|x| x.is_number()) && list.len() >= 2,
        _ => false,
    }
}

fn parse_positions(list: &[serde_json::Value], lat_first: bool) -> Result<Vec<LonLat>> {
    let mut pts = Vec::new();
    for value in list {
        if !is_position(value) {
            return Err(unrecognized(format!("{} isn't a coordinate pair", value)));
        }
        let pair = value.as_array().map(|x| x.as_slice()).unwrap_or(&[]);
        let a = pair[0].as_f64().unwrap_or(f64::NAN);
        let b = pair[1].as_f64().unwrap_or(f64::NAN);
        pts.push(if lat_first {
            LonLat::new(b, a)
        } else {
            LonLat::new(a, b)
        });
    }
    Ok(pts)
}

fn parse_route(value: &serde_json::Value) -> Result<Vec<LonLat>> {
    match value {
        serde_json::Value::Array(list) => parse_positions(list, false),
        serde_json::Value::Object(obj) => {
            if let Some(serde_json::Value::Array(list)) = obj.get("geometry") {
                parse_positions(list, false)
            } else if let Some(serde_json::Value::Array(list)) = obj.get("coordinates") {
                // Event files store route coordinates latitude first
                parse_positions(list, true)
            } else {
                Err(unrecognized(
                    "route objects need a geometry or coordinates list".to_string(),
                ))
            }
        }
        _ => Err(unrecognized(format!("{} isn't a route", value))),
    }
}

fn gj_to_geometry(gj: geojson::GeoJson) -> Result<geojson::Geometry> {
    match gj {
        geojson::GeoJson::Geometry(geometry) => Ok(geometry),
        geojson::GeoJson::Feature(feature) => feature
            .geometry
            .ok_or_else(|| unrecognized("feature has no geometry".to_string())),
        geojson::GeoJson::FeatureCollection(collection) => {
            let geometries: Vec<geojson::Geometry> = collection
                .features
                .into_iter()
                .filter_map(|f| f.geometry)
                .collect();
            Ok(geojson::Geometry::new(geojson::Value::GeometryCollection(
                geometries,
            )))
        }
    }
}

fn geometry_lines(value: &geojson::Value) -> Result<Vec<Vec<LonLat>>> {
    let to_line = |line: &Vec<Vec<f64>>| -> Vec<LonLat> {
        line.iter()
            .map(|pos| {
                if pos.len() >= 2 {
                    LonLat::new(pos[0], pos[1])
                } else {
                    LonLat::new(f64::NAN, f64::NAN)
                }
            })
            .collect()
    };
    match value {
        geojson::Value::LineString(line) => Ok(vec![to_line(line)]),
        geojson::Value::MultiLineString(lines) => Ok(lines.iter().map(to_line).collect()),
        geojson::Value::GeometryCollection(geometries) => {
            let mut result = Vec::new();
            for geometry in geometries {
                result.extend(geometry_lines(&geometry.value)?);
            }
            Ok(result)
        }
        _ => Err(unrecognized("only line geometry can be a route".to_string())),
    }
}
