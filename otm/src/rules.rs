use serde::Serialize;

use closure_model::{
    Approach, BoundaryType, ClosureContext, Intersection, IntersectionType, RoadClass,
};
use geom::Distance;

use crate::{advance_distance, Standards};

/// When a rule runs. Per-approach stages run for each open approach in turn; the last two run
/// afterwards, over every open approach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Stage {
    AdvanceWarning,
    LaneControl,
    Regulatory,
    TurnLaneDesignation,
    PhysicalBarriers,
    Channelization,
}

impl Stage {
    pub fn per_approach(self) -> bool {
        !matches!(self, Stage::PhysicalBarriers | Stage::Channelization)
    }
}

/// What a rule sees: one open approach, in context.
pub struct Situation<'a> {
    pub approach: &'a Approach,
    pub intersection: &'a Intersection,
    pub context: &'a ClosureContext,
    pub standards: &'a Standards,
}

impl<'a> Situation<'a> {
    fn open_to_closed(&self) -> bool {
        self.context.boundary_type == BoundaryType::OpenToClosed
    }

    fn class_is(&self, classes: &[RoadClass]) -> bool {
        classes.contains(&self.approach.road_class)
    }

    fn multi_lane(&self) -> bool {
        self.approach.lanes > 1
    }

    /// Approaches without a usable speed are treated as 50 km/h.
    fn speed(&self) -> usize {
        if self.approach.speed_kmh == 0 {
            50
        } else {
            self.approach.speed_kmh
        }
    }

    fn at_t_or_four_way(&self) -> bool {
        matches!(
            self.intersection.intersection_type,
            IntersectionType::T | IntersectionType::FourWay
        )
    }

    fn primary_distance(&self) -> Distance {
        advance_distance(self.speed(), self.standards.primary_min_advance)
    }

    fn secondary_distance(&self) -> Distance {
        advance_distance(self.speed(), self.standards.min_advance_distance)
    }
}

/// What a rule produces. The recommender fills in where and when.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub code: &'static str,
    pub quantity: usize,
    pub offset: Distance,
    pub reason: String,
    pub confidence: f64,
}

impl Placement {
    fn new(code: &'static str, offset: Distance, reason: String, confidence: f64) -> Placement {
        Placement {
            code,
            quantity: 1,
            offset,
            reason,
            confidence,
        }
    }

    fn quantity(mut self, quantity: usize) -> Placement {
        self.quantity = quantity;
        self
    }
}

/// One line of the placement logic: if `applies`, then place what `make` says.
pub struct Rule {
    pub name: &'static str,
    pub stage: Stage,
    pub applies: fn(&Situation) -> bool,
    pub make: fn(&Situation) -> Placement,
}

const MAJOR: &[RoadClass] = &[RoadClass::Primary, RoadClass::Secondary, RoadClass::Trunk];
const BARRICADED: &[RoadClass] = &[
    RoadClass::Primary,
    RoadClass::Secondary,
    RoadClass::Trunk,
    RoadClass::Tertiary,
];

const DRUM_SPACING: Distance = Distance::const_meters(10.0);
const CONE_SPACING: Distance = Distance::const_meters(5.0);

/// Every rule, in the order they're evaluated. Order matters: it decides which reason comes first
/// when placements merge.
pub static RULES: &[Rule] = &[
    Rule {
        name: "major closure warning",
        stage: Stage::AdvanceWarning,
        applies: |s| s.open_to_closed() && s.class_is(MAJOR),
        make: |s| {
            Placement::new(
                "TC-67",
                -(s.primary_distance() + Distance::meters(100.0)),
                "Major closure advance warning".to_string(),
                0.95,
            )
        },
    },
    Rule {
        name: "work ahead",
        stage: Stage::AdvanceWarning,
        applies: |_| true,
        make: |s| {
            let code = if s.approach.road_class == RoadClass::Primary {
                "TC-1"
            } else {
                "TC-2B"
            };
            Placement::new(
                code,
                -s.primary_distance(),
                format!("Advance warning for {} km/h traffic", s.speed()),
                0.9,
            )
        },
    },
    Rule {
        name: "lane closed ahead",
        stage: Stage::AdvanceWarning,
        applies: |s| s.multi_lane(),
        make: |s| {
            Placement::new(
                "TC-3R",
                -s.secondary_distance(),
                format!("Lane closure warning for {}-lane road", s.approach.lanes),
                0.85,
            )
        },
    },
    Rule {
        name: "flashing arrow board",
        stage: Stage::AdvanceWarning,
        applies: |s| s.speed() >= s.standards.high_speed_threshold,
        make: |s| {
            Placement::new(
                "TC-12",
                -(s.secondary_distance() + Distance::meters(50.0)),
                "High-speed area requires flashing arrow boards".to_string(),
                0.9,
            )
        },
    },
    Rule {
        name: "merge arrow",
        stage: Stage::LaneControl,
        applies: |s| s.open_to_closed() && s.multi_lane(),
        // One arrow per closed lane, assuming half the lanes close
        make: |s| {
            Placement::new(
                "TC-4R",
                Distance::ZERO,
                "Lane closure arrow to guide traffic".to_string(),
                0.9,
            )
            .quantity(s.approach.lanes.saturating_add(1) / 2)
        },
    },
    Rule {
        name: "road closed",
        stage: Stage::Regulatory,
        applies: |s| s.open_to_closed(),
        make: |_| {
            Placement::new(
                "Rb-92",
                Distance::ZERO,
                "Road closed - regulatory sign".to_string(),
                0.95,
            )
        },
    },
    Rule {
        name: "local traffic only",
        stage: Stage::Regulatory,
        applies: |s| s.context.boundary_type == BoundaryType::PartialClosure,
        make: |_| {
            Placement::new(
                "TC-7tB",
                Distance::ZERO,
                "Local traffic only - partial closure".to_string(),
                0.9,
            )
        },
    },
    Rule {
        name: "no straight through",
        stage: Stage::Regulatory,
        applies: |s| s.at_t_or_four_way() && s.context.blocks_straight,
        make: |_| {
            Placement::new(
                "Rb-10",
                Distance::ZERO,
                "No straight through at intersection".to_string(),
                0.85,
            )
        },
    },
    Rule {
        name: "keep right",
        stage: Stage::Regulatory,
        applies: |s| s.at_t_or_four_way() && s.multi_lane(),
        make: |_| {
            Placement::new(
                "Rb-25R",
                Distance::ZERO,
                "Keep right around closure".to_string(),
                0.8,
            )
        },
    },
    Rule {
        name: "yield to oncoming",
        stage: Stage::Regulatory,
        applies: |s| s.context.creates_one_way,
        make: |_| {
            Placement::new(
                "Rb-91",
                Distance::ZERO,
                "Yield to oncoming traffic".to_string(),
                0.85,
            )
        },
    },
    Rule {
        name: "turn lane designation",
        stage: Stage::TurnLaneDesignation,
        applies: |s| {
            !matches!(
                s.intersection.intersection_type,
                IntersectionType::Straight | IntersectionType::DeadEnd
            ) && movements(s).is_some()
        },
        make: |s| {
            let (code, reason) = movements(s).unwrap_or(("Rb-46", "All movements permitted"));
            Placement::new(
                code,
                -s.standards.turn_sign_offset,
                reason.to_string(),
                0.8,
            )
        },
    },
    Rule {
        name: "barricades",
        stage: Stage::PhysicalBarriers,
        applies: |s| s.open_to_closed() && s.class_is(BARRICADED),
        make: |s| {
            let quantity = match s.intersection.intersection_type {
                IntersectionType::FourWay => 4,
                IntersectionType::T => 3,
                _ => 2,
            };
            Placement::new(
                "TC-53A",
                Distance::ZERO,
                format!("Hard closure barricades on {} road", s.approach.road_class),
                0.95,
            )
            .quantity(quantity)
        },
    },
    Rule {
        name: "channelization",
        stage: Stage::Channelization,
        applies: |s| s.multi_lane(),
        make: |s| {
            let (code, spacing) = if s.speed() >= s.standards.drum_speed_threshold {
                ("TC-54", DRUM_SPACING)
            } else {
                ("TC-51B", CONE_SPACING)
            };
            let along_taper = (s.standards.taper_length / spacing).ceil() as usize;
            Placement::new(
                code,
                Distance::ZERO,
                format!(
                    "Channelization for {}-lane road at {} km/h",
                    s.approach.lanes,
                    s.speed()
                ),
                0.85,
            )
            .quantity(along_taper.saturating_add(s.approach.lanes.saturating_mul(3)))
        },
    },
];

fn movements(s: &Situation) -> Option<(&'static str, &'static str)> {
    // Turns stay open; only the closure itself can take away straight through
    turn_designation(true, !s.context.blocks_straight, true)
}

/// The lane designation sign for whichever movements remain, and why.
pub fn turn_designation(
    left: bool,
    straight: bool,
    right: bool,
) -> Option<(&'static str, &'static str)> {
    match (left, straight, right) {
        (true, false, false) => Some(("Rb-41", "Left turn only lane")),
        (false, false, true) => Some(("Rb-42", "Right turn only lane")),
        (false, true, false) => Some(("Rb-47", "Straight only lane")),
        (true, true, false) => Some(("Rb-43", "Left turn or straight lane")),
        (false, true, true) => Some(("Rb-44", "Right turn or straight lane")),
        (true, false, true) => Some(("Rb-45", "Left or right turn only lane")),
        (true, true, true) => Some(("Rb-46", "All movements permitted")),
        (false, false, false) => None,
    }
}
