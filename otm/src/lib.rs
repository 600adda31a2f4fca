//! Temporary traffic control for road closures, following the Ontario Traffic Manual (Book 5
//! regulatory signs, Book 7 temporary conditions). A fixed list of rules turns each closure
//! scenario into a deduplicated, upstream-first sequence of signs and devices.

#[macro_use]
extern crate log;

mod bom;
mod catalog;
mod device;
mod recommend;
mod rules;

pub use crate::bom::{BillOfMaterials, BomLine, PhaseBom};
pub use crate::catalog::{
    lookup, sign_name, unit_cost, SignCategory, SignSpec, FALLBACK_UNIT_COST, SIGNS,
};
pub use crate::device::{Device, DeviceKey};
pub use crate::recommend::{advance_distance, merge_and_sequence, Recommender, Standards};
pub use crate::rules::{turn_designation, Placement, Rule, Situation, Stage, RULES};
