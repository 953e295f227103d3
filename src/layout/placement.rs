use std::collections::HashMap;
use std::f32::consts::TAU;

use crate::config::PlacementConfig;
use crate::events::{EventRecord, NodeKind};

use super::diagnostics::{Diagnostic, Diagnostics, UnplacedReason};
use super::rings::{Ring, RingTable};
use super::sectors::{Sector, SectorTable};

const GOLDEN_RATIO: f32 = 1.618_034;
const SPREAD_ARC: f32 = 0.8;
/// Cells larger than this use the golden-ratio radial spread.
const LINEAR_SPREAD_LIMIT: usize = 5;
/// Oscillation amplitude of the golden-ratio spread, in radial steps. Staying below half a step
/// keeps neighbouring radii at least `1 - 2 * amplitude` steps apart.
const SPREAD_AMPLITUDE: f32 = 0.35;

/// The ring band and sector a settled node must stay inside.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub min_radius: f32,
    pub max_radius: f32,
    pub sector: Sector,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub resting_angle: f32,
    pub resting_radius: f32,
    pub cell: Option<Cell>,
}

pub fn place_nodes(
    events: &[EventRecord],
    sectors: &SectorTable,
    rings: &RingTable,
    config: PlacementConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<Placement> {
    let mut groups: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
    for (index, event) in events.iter().enumerate() {
        groups
            .entry((event.category.as_str(), event.period.as_str()))
            .or_default()
            .push(index);
    }

    let mut index_in_group = vec![(0usize, 1usize); events.len()];
    for members in groups.values() {
        for (position, &node) in members.iter().enumerate() {
            index_in_group[node] = (position, members.len());
        }
    }

    events
        .iter()
        .enumerate()
        .map(|(node, event)| {
            let ring = rings.get(&event.category);
            let sector = sectors.get(&event.category, &event.period);
            match (ring, sector) {
                (Some(ring), Some(sector)) => {
                    let (index, size) = index_in_group[node];
                    place_in_cell(event.kind, index, size, ring, sector, config)
                }
                (ring, _) => {
                    let reason = if ring.is_none() {
                        UnplacedReason::MissingRing
                    } else {
                        UnplacedReason::MissingSector
                    };
                    diagnostics.record(Diagnostic::Unplaced { node, reason });
                    Placement {
                        resting_angle: 0.0,
                        resting_radius: ring.map(Ring::midpoint).unwrap_or(0.0),
                        cell: None,
                    }
                }
            }
        })
        .collect()
}

fn place_in_cell(
    kind: NodeKind,
    index: usize,
    size: usize,
    ring: &Ring,
    sector: &Sector,
    config: PlacementConfig,
) -> Placement {
    let (min_radius, max_radius) = ring.inset_band(config.margin);

    Placement {
        resting_angle: resting_angle(sector, index, size),
        resting_radius: resting_radius(kind, index, size, ring, config)
            .clamp(min_radius, max_radius),
        cell: Some(Cell {
            min_radius,
            max_radius,
            sector: sector.clone(),
        }),
    }
}

fn resting_angle(sector: &Sector, index: usize, size: usize) -> f32 {
    if size <= 1 {
        return sector.midpoint();
    }

    let width = sector.width();
    let arc_start = sector.start_angle + width * (1.0 - SPREAD_ARC) * 0.5;
    let fraction = (index as f32 + 0.5) / size as f32;
    super::geometry::normalize_angle(arc_start + width * SPREAD_ARC * fraction)
}

fn resting_radius(
    kind: NodeKind,
    index: usize,
    size: usize,
    ring: &Ring,
    config: PlacementConfig,
) -> f32 {
    match kind {
        NodeKind::Major => ring.outer - config.major_inset,
        NodeKind::TimelineTrigger | NodeKind::CategorySummary => ring.midpoint(),
        NodeKind::Circle if size <= 1 => ring.midpoint(),
        NodeKind::Circle if size > LINEAR_SPREAD_LIMIT => {
            let (low, high) = ring.inset_band(config.margin);
            let step = (high - low) / size as f32;
            let fraction = (index as f32 + 0.5) / size as f32;
            let theta = fraction * TAU * GOLDEN_RATIO;
            low + fraction * (high - low) + theta.sin() * SPREAD_AMPLITUDE * step
        }
        NodeKind::Circle => ring.inner + (index + 1) as f32 * ring.width() / (size + 1) as f32,
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::sectors::partition;

    fn events(specs: &[(&str, &str, &str, NodeKind)]) -> Vec<EventRecord> {
        specs
            .iter()
            .map(|(title, category, period, kind)| EventRecord::new(*title, *category, *period, *kind))
            .collect()
    }

    fn layout(events: &[EventRecord]) -> (Vec<Placement>, Diagnostics) {
        let config = LayoutConfig::default();
        let sectors = partition(events.iter().map(|e| (e.category.as_str(), e.period.as_str())));
        let rings = RingTable::build(&config, events.iter().map(|e| e.category.as_str()));
        let mut diagnostics = Diagnostics::default();
        let placements = place_nodes(events, &sectors, &rings, config.placement, &mut diagnostics);
        (placements, diagnostics)
    }

    #[test]
    fn single_member_cells_sit_at_sector_and_ring_midpoints() {
        let events = events(&[
            ("first", "A", "1a", NodeKind::Circle),
            ("second", "A", "1b", NodeKind::Circle),
            ("third", "B", "1a", NodeKind::Circle),
        ]);
        let (placements, diagnostics) = layout(&events);

        assert!(diagnostics.is_empty());
        assert!((placements[0].resting_angle - FRAC_PI_2).abs() < 1e-5);
        assert!((placements[1].resting_angle - 3.0 * FRAC_PI_2).abs() < 1e-5);
        assert!((placements[0].resting_radius - 100.0).abs() < 1e-5);
        assert!((placements[1].resting_radius - 100.0).abs() < 1e-5);
        assert!((placements[2].resting_angle - PI).abs() < 1e-5);
        assert!((placements[2].resting_radius - 300.0).abs() < 1e-5);
    }

    #[test]
    fn multi_member_angles_span_central_eighty_percent() {
        let events = events(&[
            ("a", "A", "1a", NodeKind::Circle),
            ("b", "A", "1a", NodeKind::Circle),
            ("c", "A", "1b", NodeKind::Circle),
        ]);
        let (placements, _) = layout(&events);

        // Sector [0, PI): arc starts at 0.1 PI and spans 0.8 PI.
        assert!((placements[0].resting_angle - (0.1 * PI + 0.8 * PI * 0.25)).abs() < 1e-5);
        assert!((placements[1].resting_angle - (0.1 * PI + 0.8 * PI * 0.75)).abs() < 1e-5);
    }

    #[test]
    fn small_cells_spread_linearly_across_ring() {
        let events = events(&[
            ("a", "A", "1a", NodeKind::Circle),
            ("b", "A", "1a", NodeKind::Circle),
            ("c", "A", "1a", NodeKind::Circle),
        ]);
        let (placements, _) = layout(&events);

        let radii = placements.iter().map(|p| p.resting_radius).collect::<Vec<_>>();
        assert_eq!(radii, [50.0, 100.0, 150.0]);
    }

    #[test]
    fn kinds_pin_radius() {
        let events = events(&[
            ("major", "A", "1a", NodeKind::Major),
            ("trigger", "A", "1a", NodeKind::TimelineTrigger),
            ("summary", "A", "1a", NodeKind::CategorySummary),
        ]);
        let (placements, _) = layout(&events);

        assert_eq!(placements[0].resting_radius, 175.0);
        assert_eq!(placements[1].resting_radius, 100.0);
        assert_eq!(placements[2].resting_radius, 100.0);
    }

    #[test]
    fn major_inset_is_clamped_by_margin() {
        let events = events(&[("major", "A", "1a", NodeKind::Major)]);
        let mut config = LayoutConfig::default();
        config.placement.major_inset = 5.0;
        let sectors = partition(events.iter().map(|e| (e.category.as_str(), e.period.as_str())));
        let rings = RingTable::build(&config, ["A"]);
        let mut diagnostics = Diagnostics::default();
        let placements =
            place_nodes(&events, &sectors, &rings, config.placement, &mut diagnostics);

        assert_eq!(placements[0].resting_radius, 180.0);
    }

    #[test]
    fn missing_sector_falls_back_with_diagnostic() {
        let events = events(&[
            ("placed", "A", "1a", NodeKind::Circle),
            ("orphan", "A", "9z", NodeKind::Circle),
        ]);
        let config = LayoutConfig::default();
        let sectors = partition([("A", "1a")]);
        let rings = RingTable::build(&config, ["A"]);
        let mut diagnostics = Diagnostics::default();
        let placements =
            place_nodes(&events, &sectors, &rings, config.placement, &mut diagnostics);

        assert!(placements[0].cell.is_some());
        assert_eq!(
            placements[1],
            Placement {
                resting_angle: 0.0,
                resting_radius: 100.0,
                cell: None,
            }
        );
        assert_eq!(
            diagnostics.entries(),
            [Diagnostic::Unplaced {
                node: 1,
                reason: UnplacedReason::MissingSector
            }]
        );
    }
}
