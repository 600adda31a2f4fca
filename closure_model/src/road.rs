use std::fmt;

use anyhow::Result;
use geojson::{Feature, GeoJson};
use serde::{Deserialize, Serialize};

use geom::{LonLat, SpatialIndex};
use plan_util::Tags;

/// Roads are identified by whatever id the input network used, so results can be matched back to
/// the source data.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoadID(pub String);

impl fmt::Display for RoadID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Unclassified,
    Other,
}

impl RoadClass {
    /// Interprets an OSM `highway` value. Anything unrecognized, including link roads, is `Other`.
    pub fn from_highway(value: &str) -> RoadClass {
        match value {
            "motorway" => RoadClass::Motorway,
            "trunk" => RoadClass::Trunk,
            "primary" => RoadClass::Primary,
            "secondary" => RoadClass::Secondary,
            "tertiary" => RoadClass::Tertiary,
            "residential" => RoadClass::Residential,
            "unclassified" => RoadClass::Unclassified,
            _ => RoadClass::Other,
        }
    }

    /// The speed to assume when a road isn't tagged with one, in km/h.
    pub fn default_speed_kmh(self) -> usize {
        match self {
            RoadClass::Motorway => 100,
            RoadClass::Trunk => 90,
            RoadClass::Primary => 70,
            RoadClass::Secondary => 60,
            RoadClass::Tertiary => 50,
            RoadClass::Residential => 40,
            RoadClass::Unclassified => 50,
            RoadClass::Other => 50,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Motorway => "motorway",
            RoadClass::Trunk => "trunk",
            RoadClass::Primary => "primary",
            RoadClass::Secondary => "secondary",
            RoadClass::Tertiary => "tertiary",
            RoadClass::Residential => "residential",
            RoadClass::Unclassified => "unclassified",
            RoadClass::Other => "other",
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// More than this is a tagging mistake.
const MAX_LANES: usize = 16;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadFeature {
    pub id: RoadID,
    pub name: String,
    pub class: RoadClass,
    /// At least 1
    pub lanes: usize,
    /// The posted limit in km/h, if the road is tagged with one
    pub speed_limit_kmh: Option<usize>,
    pub oneway: bool,
    pub geometry: Vec<LonLat>,
    /// All of the original properties
    pub tags: Tags,
}

impl RoadFeature {
    /// Interprets OSM-style tags. Missing or unparseable values get defaults.
    pub fn from_tags(id: RoadID, geometry: Vec<LonLat>, tags: Tags) -> RoadFeature {
        let name = tags
            .get("name")
            .cloned()
            .unwrap_or_else(|| "Unnamed Road".to_string());
        let class = tags
            .get("highway")
            .map(|x| RoadClass::from_highway(x))
            .unwrap_or(RoadClass::Other);
        let lanes = tags
            .get("lanes")
            .and_then(|x| leading_number(x))
            .map(|x| x.round())
            .filter(|x| *x >= 1.0 && *x <= MAX_LANES as f64)
            .map(|x| x as usize)
            .unwrap_or(1);
        let speed_limit_kmh = tags.get("maxspeed").and_then(|x| parse_maxspeed(x));
        let oneway = tags.is_any("oneway", vec!["yes", "true", "1"]);
        RoadFeature {
            id,
            name,
            class,
            lanes,
            speed_limit_kmh,
            oneway,
            geometry,
            tags,
        }
    }

    /// The tagged speed limit, or else a guess from the road class, in km/h.
    pub fn speed_kmh(&self) -> usize {
        self.speed_limit_kmh
            .unwrap_or_else(|| self.class.default_speed_kmh())
    }
}

/// The number at the start of a string, like "2" in "2;3" or "30" in "30 mph".
fn leading_number(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    value[..end].parse::<f64>().ok()
}

/// Plain numbers are km/h; a "mph" suffix gets converted.
fn parse_maxspeed(value: &str) -> Option<usize> {
    let number = leading_number(value)?;
    let kmh = if value.trim_end().ends_with("mph") {
        number * 1.609_344
    } else {
        number
    };
    if kmh <= 0.0 {
        return None;
    }
    Some(kmh.round() as usize)
}

/// Every road considered during closure planning. Read-only once built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadNetwork {
    roads: Vec<RoadFeature>,
}

impl RoadNetwork {
    pub fn new(roads: Vec<RoadFeature>) -> RoadNetwork {
        RoadNetwork { roads }
    }

    /// Parses a GeoJSON FeatureCollection (or single Feature) of LineStrings. MultiLineStrings
    /// become one road per part. Other geometry is skipped.
    pub fn from_geojson(raw: &str) -> Result<RoadNetwork> {
        let gj: GeoJson = raw.parse()?;
        let features: Vec<Feature> = match gj {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => bail!("Road network must be a Feature or FeatureCollection"),
        };

        let mut roads = Vec::new();
        for (idx, feature) in features.into_iter().enumerate() {
            let tags = feature
                .properties
                .as_ref()
                .map(Tags::from_json_properties)
                .unwrap_or_else(Tags::empty);
            let id = tags
                .get("id")
                .cloned()
                .or_else(|| {
                    feature.id.as_ref().map(|id| match id {
                        geojson::feature::Id::String(s) => s.clone(),
                        geojson::feature::Id::Number(n) => n.to_string(),
                    })
                })
                .unwrap_or_else(|| idx.to_string());

            let geometry = match feature.geometry {
                Some(geometry) => geometry,
                None => {
                    warn!("Road {} has no geometry, skipping", id);
                    continue;
                }
            };
            match geometry.value {
                geojson::Value::LineString(line) => {
                    roads.push(RoadFeature::from_tags(
                        RoadID(id),
                        to_lon_lats(&line),
                        tags,
                    ));
                }
                geojson::Value::MultiLineString(lines) => {
                    for (part, line) in lines.iter().enumerate() {
                        roads.push(RoadFeature::from_tags(
                            RoadID(format!("{}-{}", id, part)),
                            to_lon_lats(line),
                            tags.clone(),
                        ));
                    }
                }
                _ => {
                    warn!("Road {} isn't a line, skipping", id);
                }
            }
        }
        info!("Loaded {} roads", roads.len());
        Ok(RoadNetwork { roads })
    }

    pub fn roads(&self) -> &[RoadFeature] {
        &self.roads
    }

    pub fn get(&self, id: &RoadID) -> Option<&RoadFeature> {
        self.roads.iter().find(|r| &r.id == id)
    }

    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    /// Indexes roads by their position in `roads()`.
    pub fn build_index(&self) -> SpatialIndex<usize> {
        let mut index = SpatialIndex::new();
        index.index(
            self.roads
                .iter()
                .enumerate()
                .map(|(idx, r)| (idx, r.geometry.clone())),
        );
        index
    }
}

/// Positions with fewer than 2 numbers are dropped.
fn to_lon_lats(line: &[Vec<f64>]) -> Vec<LonLat> {
    line.iter()
        .filter(|pos| pos.len() >= 2)
        .map(|pos| LonLat::new(pos[0], pos[1]))
        .collect()
}
