use serde::Serialize;

use geom::Distance;

/// The price of any device missing from the catalog.
pub const FALLBACK_UNIT_COST: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignCategory {
    Barrier,
    Channelization,
    AdvanceWarning,
    LaneControl,
    Closure,
    Regulatory,
    LaneDesignation,
    Information,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SignSpec {
    pub code: &'static str,
    pub name: &'static str,
    pub category: SignCategory,
    pub description: &'static str,
    /// Guidance for whoever puts the sign up
    pub placement: &'static str,
    /// The closest an advance warning sign may be to the hazard
    pub min_distance: Option<Distance>,
    /// Per unit, in dollars
    pub cost: f64,
}

const fn spec(
    code: &'static str,
    name: &'static str,
    category: SignCategory,
    description: &'static str,
    placement: &'static str,
    min_distance: Option<Distance>,
    cost: f64,
) -> SignSpec {
    SignSpec {
        code,
        name,
        category,
        description,
        placement,
        min_distance,
        cost,
    }
}

const fn min_dist(meters: f64) -> Option<Distance> {
    Some(Distance::const_meters(meters))
}

/// OTM Book 5 and Book 7 signs and devices used for event closures.
pub static SIGNS: &[SignSpec] = &[
    // Cones and barriers
    spec(
        "TC-51B",
        "Traffic Cones",
        SignCategory::Channelization,
        "Used for channelizing traffic, marking lanes, and guiding vehicles",
        "On road surface, typically 3-5 meters apart",
        None,
        5.0,
    ),
    spec(
        "TC-54",
        "Flexible Drums (Barrels)",
        SignCategory::Channelization,
        "More visible than cones, used for higher-speed areas",
        "On road surface, typically 5-10 meters apart",
        None,
        15.0,
    ),
    spec(
        "TC-53A",
        "Barricades",
        SignCategory::Barrier,
        "Type II or Type III barricades for hard closures",
        "At closure points, blocking access",
        None,
        25.0,
    ),
    // Advance warning
    spec(
        "TC-1",
        "Construction Ahead",
        SignCategory::AdvanceWarning,
        "Warns of upcoming construction/road work",
        "150-300m before work zone (based on speed)",
        min_dist(150.0),
        15.0,
    ),
    spec(
        "TC-2B",
        "Road Work",
        SignCategory::AdvanceWarning,
        "Indicates active road work ahead",
        "100-250m before work zone",
        min_dist(100.0),
        15.0,
    ),
    spec(
        "TC-3R",
        "Right Lane Closed Ahead",
        SignCategory::AdvanceWarning,
        "Warns that right lane will be closed",
        "150-300m before lane closure",
        min_dist(150.0),
        15.0,
    ),
    spec(
        "TC-3L",
        "Left Lane Closed Ahead",
        SignCategory::AdvanceWarning,
        "Warns that left lane will be closed",
        "150-300m before lane closure",
        min_dist(150.0),
        15.0,
    ),
    // Lane closures
    spec(
        "TC-4L",
        "Lane Closure Arrow (Left)",
        SignCategory::LaneControl,
        "Directs traffic to merge left",
        "At lane closure point",
        None,
        20.0,
    ),
    spec(
        "TC-4R",
        "Lane Closure Arrow (Right)",
        SignCategory::LaneControl,
        "Directs traffic to merge right",
        "At lane closure point",
        None,
        20.0,
    ),
    spec(
        "TC-7tA",
        "Road Closed (Tab)",
        SignCategory::Closure,
        "Indicates road is closed ahead",
        "At closure point or advance warning",
        None,
        15.0,
    ),
    spec(
        "TC-7tB",
        "Local Traffic Only (Tab)",
        SignCategory::Closure,
        "Allows local access only",
        "At closure point for partial closures",
        None,
        15.0,
    ),
    // Special information
    spec(
        "TC-67",
        "Street Section Closed (Advance)",
        SignCategory::AdvanceWarning,
        "Warns of street section closure ahead",
        "200-400m before closure",
        min_dist(200.0),
        20.0,
    ),
    spec(
        "PVMS",
        "Portable Variable Message Sign",
        SignCategory::Information,
        "Dynamic message sign for complex situations",
        "At key decision points",
        None,
        100.0,
    ),
    spec(
        "TC-12",
        "Flashing Arrow Boards",
        SignCategory::AdvanceWarning,
        "High-visibility warning with flashing arrows",
        "150-300m before closure (high-speed areas)",
        min_dist(150.0),
        50.0,
    ),
    // Regulatory
    spec(
        "Rb-91",
        "Yield to Oncoming Traffic",
        SignCategory::Regulatory,
        "Requires yielding to oncoming traffic",
        "At intersections with modified traffic flow",
        None,
        15.0,
    ),
    spec(
        "Rb-92",
        "Road Closed",
        SignCategory::Regulatory,
        "Prohibits entry - road is closed",
        "At closure point",
        None,
        15.0,
    ),
    spec(
        "Rb-10",
        "No Straight Through",
        SignCategory::Regulatory,
        "Prohibits straight-through movement",
        "At intersection approach",
        None,
        15.0,
    ),
    spec(
        "Rb-11",
        "No Right Turn",
        SignCategory::Regulatory,
        "Prohibits right turn",
        "At intersection approach",
        None,
        15.0,
    ),
    spec(
        "Rb-12",
        "No Left Turn",
        SignCategory::Regulatory,
        "Prohibits left turn",
        "At intersection approach",
        None,
        15.0,
    ),
    spec(
        "Rb-25R",
        "Keep Right",
        SignCategory::Regulatory,
        "Directs traffic to keep right",
        "Before obstructions or lane closures",
        None,
        15.0,
    ),
    spec(
        "Rb-25L",
        "Keep Left",
        SignCategory::Regulatory,
        "Directs traffic to keep left",
        "Before obstructions or lane closures",
        None,
        15.0,
    ),
    // Turn lane designation
    spec(
        "Rb-41",
        "Left Turn Only",
        SignCategory::LaneDesignation,
        "Lane restricted to left turns only",
        "Above or beside lane, before intersection",
        None,
        20.0,
    ),
    spec(
        "Rb-42",
        "Right Turn Only",
        SignCategory::LaneDesignation,
        "Lane restricted to right turns only",
        "Above or beside lane, before intersection",
        None,
        20.0,
    ),
    spec(
        "Rb-43",
        "Left Turn or Straight",
        SignCategory::LaneDesignation,
        "Lane allows left turn or straight through",
        "Above or beside lane, before intersection",
        None,
        20.0,
    ),
    spec(
        "Rb-44",
        "Right Turn or Straight",
        SignCategory::LaneDesignation,
        "Lane allows right turn or straight through",
        "Above or beside lane, before intersection",
        None,
        20.0,
    ),
    spec(
        "Rb-45",
        "Left or Right Turn Only",
        SignCategory::LaneDesignation,
        "Lane restricted to left or right turns",
        "Above or beside lane, before intersection",
        None,
        20.0,
    ),
    spec(
        "Rb-46",
        "All Movements Permitted",
        SignCategory::LaneDesignation,
        "All movements allowed (left, straight, right)",
        "Above or beside lane, before intersection",
        None,
        20.0,
    ),
    spec(
        "Rb-47",
        "Straight Only",
        SignCategory::LaneDesignation,
        "Lane restricted to straight-through only",
        "Above or beside lane, before intersection",
        None,
        20.0,
    ),
];

pub fn lookup(code: &str) -> Option<&'static SignSpec> {
    SIGNS.iter().find(|s| s.code == code)
}

pub fn unit_cost(code: &str) -> f64 {
    lookup(code).map(|s| s.cost).unwrap_or(FALLBACK_UNIT_COST)
}

/// The catalog name, or something readable made from an unknown code.
pub fn sign_name(code: &str) -> String {
    match lookup(code) {
        Some(s) => s.name.to_string(),
        None => code.replace('_', " "),
    }
}
