use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use geom::LonLat;

use crate::{catalog, Device};

/// Devices tagged with this phase are needed in every phase.
const ALL_PHASES: &str = "all";

/// How many of one device a phase needs, and where they go.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BomLine {
    pub code: String,
    pub name: String,
    pub quantity: usize,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub locations: Vec<LonLat>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhaseBom {
    pub phase: String,
    /// Sorted by code
    pub lines: Vec<BomLine>,
}

impl PhaseBom {
    fn new(phase: &str, devices: &[&Device]) -> PhaseBom {
        let mut per_code: BTreeMap<&str, BomLine> = BTreeMap::new();
        for d in devices {
            let line = per_code.entry(&d.code).or_insert_with(|| BomLine {
                code: d.code.clone(),
                name: catalog::sign_name(&d.code),
                quantity: 0,
                unit_cost: d.unit_cost(),
                total_cost: 0.0,
                locations: Vec::new(),
            });
            line.quantity += d.quantity;
            line.total_cost += d.total_cost();
            let pt = d.pt();
            if !line.locations.contains(&pt) {
                line.locations.push(pt);
            }
        }
        PhaseBom {
            phase: phase.to_string(),
            lines: per_code.into_values().collect(),
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.lines.iter().map(|l| l.total_cost).sum()
    }

    /// How the phase appears in reports
    pub fn label(&self) -> &str {
        if self.phase == ALL_PHASES {
            "All Day"
        } else {
            &self.phase
        }
    }
}

/// What has to be ordered for an event, broken down by phase.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BillOfMaterials {
    pub phases: Vec<PhaseBom>,
    /// Every input device counted once, even though devices for all phases are listed under each
    /// phase.
    pub total_cost: f64,
}

impl BillOfMaterials {
    /// Each phase gets its own devices plus those needed in every phase. Those shared devices also
    /// get a group of their own at the end. With no phases given, they're taken from the devices in
    /// the order first seen.
    pub fn from_devices(devices: &[Device], phases: &[String]) -> BillOfMaterials {
        let mut phases: Vec<String> = phases
            .iter()
            .filter(|p| p.as_str() != ALL_PHASES)
            .cloned()
            .collect();
        if phases.is_empty() {
            for d in devices {
                if d.phase != ALL_PHASES && !phases.contains(&d.phase) {
                    phases.push(d.phase.clone());
                }
            }
        }

        let mut result = Vec::new();
        for phase in &phases {
            let matching: Vec<&Device> = devices
                .iter()
                .filter(|d| &d.phase == phase || d.phase == ALL_PHASES)
                .collect();
            result.push(PhaseBom::new(phase, &matching));
        }
        let shared: Vec<&Device> = devices.iter().filter(|d| d.phase == ALL_PHASES).collect();
        if !shared.is_empty() {
            result.push(PhaseBom::new(ALL_PHASES, &shared));
        }

        BillOfMaterials {
            phases: result,
            total_cost: devices.iter().map(|d| d.total_cost()).sum(),
        }
    }

    pub fn write_csv<W: Write>(&self, event: &str, out: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        for phase in &self.phases {
            for line in &phase.lines {
                writer.serialize(CsvRow {
                    event,
                    phase: phase.label(),
                    code: &line.code,
                    name: &line.name,
                    quantity: line.quantity,
                    unit_cost: money(line.unit_cost),
                    total_cost: money(line.total_cost),
                    locations: line
                        .locations
                        .iter()
                        .map(|pt| format!("{:.5},{:.5}", pt.y(), pt.x()))
                        .collect::<Vec<_>>()
                        .join("; "),
                })?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Event")]
    event: &'a str,
    #[serde(rename = "Phase")]
    phase: &'a str,
    #[serde(rename = "Ontario Code")]
    code: &'a str,
    #[serde(rename = "Sign Name")]
    name: &'a str,
    #[serde(rename = "Quantity")]
    quantity: usize,
    #[serde(rename = "Unit Cost")]
    unit_cost: String,
    #[serde(rename = "Total Cost")]
    total_cost: String,
    #[serde(rename = "Locations")]
    locations: String,
}

fn money(x: f64) -> String {
    format!("${:.2}", x)
}

#[cfg(test)]
mod tests {
    use geom::Distance;

    use super::*;

    fn device(code: &str, quantity: usize, phase: &str, lat: f64) -> Device {
        Device {
            code: code.to_string(),
            quantity,
            location: "Road".to_string(),
            offset: Distance::ZERO,
            reason: String::new(),
            confidence: 0.9,
            phase: phase.to_string(),
            lat,
            lng: -79.38,
            cost: 0.0,
        }
    }

    fn devices() -> Vec<Device> {
        vec![
            device("TC-53A", 3, "setup", 43.65),
            device("TC-53A", 2, "race", 43.66),
            device("Rb-92", 1, "all", 43.65),
            device("TC-53A", 1, "setup", 43.65),
        ]
    }

    #[test]
    fn grouped_by_phase() {
        let bom =
            BillOfMaterials::from_devices(&devices(), &["setup".to_string(), "race".to_string()]);
        let phases: Vec<&str> = bom.phases.iter().map(|p| p.phase.as_str()).collect();
        assert_eq!(phases, vec!["setup", "race", "all"]);

        let setup = &bom.phases[0];
        assert_eq!(setup.lines.len(), 2);
        assert_eq!(setup.lines[0].code, "Rb-92");
        let barricades = &setup.lines[1];
        assert_eq!(barricades.quantity, 4);
        assert_eq!(barricades.unit_cost, 25.0);
        assert_eq!(barricades.total_cost, 100.0);
        assert_eq!(barricades.locations.len(), 1);
        assert_eq!(setup.total_cost(), 115.0);

        assert_eq!(bom.phases[1].total_cost(), 65.0);
        assert_eq!(bom.phases[2].label(), "All Day");
        assert_eq!(bom.phases[2].lines.len(), 1);
        assert_eq!(bom.total_cost, 165.0);
    }

    #[test]
    fn phases_from_devices() {
        let bom = BillOfMaterials::from_devices(&devices(), &[]);
        let phases: Vec<&str> = bom.phases.iter().map(|p| p.phase.as_str()).collect();
        assert_eq!(phases, vec!["setup", "race", "all"]);

        let bom = BillOfMaterials::from_devices(&[device("TC-1", 1, "all", 43.65)], &[]);
        assert_eq!(bom.phases.len(), 1);
        assert_eq!(bom.phases[0].phase, "all");

        assert!(BillOfMaterials::from_devices(&[], &[]).phases.is_empty());
    }

    #[test]
    fn csv() {
        let bom = BillOfMaterials::from_devices(&devices(), &["race".to_string()]);
        let mut out = Vec::new();
        bom.write_csv("Marathon", &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Event,Phase,Ontario Code,Sign Name,Quantity,Unit Cost,Total Cost,Locations",
                "Marathon,race,Rb-92,Road Closed,1,$15.00,$15.00,\"43.65000,-79.38000\"",
                "Marathon,race,TC-53A,Barricades,2,$25.00,$50.00,\"43.66000,-79.38000\"",
                "Marathon,All Day,Rb-92,Road Closed,1,$15.00,$15.00,\"43.65000,-79.38000\"",
            ]
        );
    }
}
