//! Flow-connectivity graph construction on top of the geometry resolver.
//!
//! `resolve_topology` is the one entry point: a pure function from a
//! `WellConfiguration` plus scalar options to a `TopologyResult`. Every stage
//! is warn-and-continue; nothing here performs I/O or keeps state across
//! calls, so identical inputs always produce identical output.

pub mod edges;
pub mod equipment;
pub mod nodes;
pub mod sources;
pub mod transitions;

use std::collections::BTreeMap;

use welltopo_geometry::{build_intervals, GeometryModel};
use welltopo_types::{
    GraphEdge, ResolvedEquipmentEffect, TopologyOptions, TopologyResult, VolumeKind,
    WellConfiguration,
};

pub use equipment::{resolve_boundary_equipment_effects, resolve_equipment_rule, EquipmentRule};
pub use nodes::build_nodes;
pub use sources::resolve_source_channels;

/// Evaluate the full topology pipeline for one configuration.
pub fn resolve_topology(config: &WellConfiguration, options: &TopologyOptions) -> TopologyResult {
    let model = GeometryModel::resolve(config, options);
    let intervals = build_intervals(&model, config);
    let nodes = nodes::build_nodes(&intervals);
    let mut warnings = Vec::new();

    // Equipment effects per internal boundary, keyed by the upper interval.
    // The model's outermost boundaries carry no vertical edge, but rows
    // sitting exactly on them still get their diagnostics.
    let mut boundary_effects: BTreeMap<usize, BTreeMap<VolumeKind, ResolvedEquipmentEffect>> =
        BTreeMap::new();
    if let (Some(first), Some(last)) = (intervals.first(), intervals.last()) {
        let (_, top_warnings) =
            resolve_boundary_equipment_effects(first.top, &config.equipment, &model);
        warnings.extend(top_warnings);
        for pair in intervals.windows(2) {
            let (effects, boundary_warnings) =
                resolve_boundary_equipment_effects(pair[0].bottom, &config.equipment, &model);
            warnings.extend(boundary_warnings);
            boundary_effects.insert(pair[0].index, effects);
        }
        let (_, bottom_warnings) =
            resolve_boundary_equipment_effects(last.bottom, &config.equipment, &model);
        warnings.extend(bottom_warnings);
    }

    let mut all_edges: Vec<GraphEdge> = Vec::new();
    extend_unique(
        &mut all_edges,
        edges::build_vertical_edges(&intervals, &nodes, &boundary_effects),
    );
    extend_unique(
        &mut all_edges,
        edges::build_radial_edges(&config.markers, &intervals, &nodes, &model, &mut warnings),
    );
    extend_unique(
        &mut all_edges,
        edges::build_scenario_radial_edges(&config.sources, &intervals, &nodes, &mut warnings),
    );
    extend_unique(
        &mut all_edges,
        transitions::build_transition_edges(&intervals, &nodes, &boundary_effects, &mut warnings),
    );
    extend_unique(&mut all_edges, edges::build_termination_edges(&nodes));

    let (source_entities, source_policy) = sources::resolve_source_channels(
        &config.sources,
        &config.markers,
        &intervals,
        &nodes,
        &model,
        options,
        &mut warnings,
    );

    tracing::debug!(
        intervals = intervals.len(),
        nodes = nodes.len(),
        edges = all_edges.len(),
        warnings = warnings.len(),
        "Topology evaluation complete"
    );

    TopologyResult {
        intervals,
        connections: model.connections,
        barriers: model.barriers,
        nodes,
        edges: all_edges,
        sources: source_entities,
        source_policy,
        warnings,
    }
}

fn extend_unique(edges: &mut Vec<GraphEdge>, batch: Vec<GraphEdge>) {
    for edge in batch {
        edges::push_unique(edges, edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use welltopo_types::{
        AttachRef, EdgeKind, EdgeState, EquipmentKind, EquipmentRow, FluidRow, MarkerKind,
        MarkerRow, PipeFamily, PipeRow, SourcePolicyMode, SourceRow, WarningCode,
    };

    fn completion_well() -> WellConfiguration {
        WellConfiguration {
            casing: vec![
                PipeRow::casing("c1", 9.625, 0.0, 5000.0),
                PipeRow::open_hole("oh", 12.25, 0.0, 5000.0),
            ],
            tubing: vec![PipeRow::tubing("t1", 4.5, 0.0, 4500.0)],
            ..Default::default()
        }
    }

    fn attached_packer(depth: f64) -> EquipmentRow {
        let mut row = EquipmentRow::new("p1", EquipmentKind::Packer, depth);
        row.attach = Some(AttachRef::to_row(PipeFamily::Tubing, "t1"));
        row
    }

    #[test]
    fn every_stack_is_ordered_without_gaps_or_overlaps() {
        let mut config = completion_well();
        config.fluids.push(FluidRow::new("f1", "brine", 0, 0.0, 3000.0));
        config.plugs.push(welltopo_types::PlugRow::new("pl1", 3500.0, 3700.0));
        let result = resolve_topology(&config, &TopologyOptions::default());
        assert!(!result.intervals.is_empty());
        for interval in &result.intervals {
            for layer in &interval.stack {
                assert!(layer.outer_radius > layer.inner_radius);
            }
            for pair in interval.stack.windows(2) {
                assert!(pair[1].inner_radius >= pair[0].outer_radius - 1e-9);
            }
        }
    }

    #[test]
    fn evaluation_is_idempotent() {
        let mut config = completion_well();
        config.equipment.push(attached_packer(3000.0));
        config
            .markers
            .push(MarkerRow::new("m1", MarkerKind::Perforation, 4800.0, 4900.0));
        let options = TopologyOptions::default();
        let first = resolve_topology(&config, &options);
        let second = resolve_topology(&config, &options);
        assert_eq!(first, second);
    }

    #[test]
    fn swage_and_crossover_survive_into_the_result() {
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("a", 9.625, 0.0, 5000.0),
                PipeRow::casing("b", 7.0, 5000.02, 9000.0),
            ],
            ..Default::default()
        };
        let result = resolve_topology(&config, &TopologyOptions::default());
        assert_eq!(result.connections.len(), 1);
        assert_eq!(
            result.connections[0].kind,
            welltopo_types::ConnectionKind::Swage
        );

        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("a", 9.625, 0.0, 5000.0),
                PipeRow::casing("b", 7.0, 5050.0, 9000.0),
            ],
            ..Default::default()
        };
        let result = resolve_topology(&config, &TopologyOptions::default());
        assert_eq!(
            result.connections[0].kind,
            welltopo_types::ConnectionKind::Crossover
        );
    }

    #[test]
    fn unattached_packer_warns_and_seals_nothing() {
        let mut config = completion_well();
        config
            .equipment
            .push(EquipmentRow::new("p1", EquipmentKind::Packer, 3000.0));
        let result = resolve_topology(&config, &TopologyOptions::default());
        let missing: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.code == WarningCode::EquipmentMissingAttachTarget)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].row_id.as_deref(), Some("p1"));
        // No edge at the packer boundary is blocked by it.
        assert!(result
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Vertical)
            .all(|e| e.cost == 0));
    }

    #[test]
    fn unattached_packer_below_every_pipe_still_warns() {
        // The packer depth becomes the model's last boundary; there is no
        // vertical edge there, but the row diagnostics must survive.
        let mut config = completion_well();
        config
            .equipment
            .push(EquipmentRow::new("p1", EquipmentKind::Packer, 6000.0));
        let result = resolve_topology(&config, &TopologyOptions::default());
        let missing: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.code == WarningCode::EquipmentMissingAttachTarget)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].row_id.as_deref(), Some("p1"));
    }

    #[test]
    fn unattached_packer_at_the_surface_boundary_still_warns() {
        let mut config = completion_well();
        config
            .equipment
            .push(EquipmentRow::new("p1", EquipmentKind::Packer, 0.0));
        let result = resolve_topology(&config, &TopologyOptions::default());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::EquipmentMissingAttachTarget
                && w.row_id.as_deref() == Some("p1")));
    }

    #[test]
    fn blocking_packer_closes_its_annulus_edge() {
        let mut config = completion_well();
        config.equipment.push(attached_packer(3000.0));
        let result = resolve_topology(&config, &TopologyOptions::default());
        let annulus_edge = result
            .edges
            .iter()
            .find(|e| e.from == "i0:annulus_a" && e.to == "i1:annulus_a")
            .unwrap();
        assert_eq!(annulus_edge.state, EdgeState::ClosedFailable);
        assert_eq!(annulus_edge.cost, 1);
        // The tubing bore is untouched by an annular seal.
        let bore_edge = result
            .edges
            .iter()
            .find(|e| e.from == "i0:tubing_inner" && e.to == "i1:tubing_inner")
            .unwrap();
        assert_eq!(bore_edge.state, EdgeState::Open);
        assert_eq!(bore_edge.cost, 0);
    }

    #[test]
    fn open_packer_leaves_the_annulus_edge_open() {
        let mut config = completion_well();
        let mut packer = attached_packer(3000.0);
        packer.actuation = Some("open".to_string());
        config.equipment.push(packer);
        let result = resolve_topology(&config, &TopologyOptions::default());
        let annulus_edge = result
            .edges
            .iter()
            .find(|e| e.from == "i0:annulus_a" && e.to == "i1:annulus_a")
            .unwrap();
        assert_eq!(annulus_edge.state, EdgeState::Open);
        assert_eq!(annulus_edge.cost, 0);
    }

    #[test]
    fn perforation_yields_one_radial_edge_per_interval_and_none_when_inverted() {
        let mut config = completion_well();
        config.tubing.clear();
        config
            .markers
            .push(MarkerRow::new("m1", MarkerKind::Perforation, 2000.0, 2200.0));
        let result = resolve_topology(&config, &TopologyOptions::default());
        let radial: Vec<_> = result
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Radial)
            .collect();
        assert_eq!(radial.len(), 1);
        assert_eq!(radial[0].cost, 0);

        let mut config = completion_well();
        config.tubing.clear();
        config
            .markers
            .push(MarkerRow::new("m1", MarkerKind::Perforation, 2200.0, 2000.0));
        let result = resolve_topology(&config, &TopologyOptions::default());
        assert!(result.edges.iter().all(|e| e.kind != EdgeKind::Radial));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::MarkerInvalidDepthRange));
    }

    #[test]
    fn two_fluids_resolve_two_distinct_layers() {
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("c2", 7.0, 0.0, 9000.0),
                PipeRow::casing("c1", 9.625, 0.0, 5000.0),
                PipeRow::open_hole("oh", 12.25, 0.0, 9000.0),
            ],
            fluids: vec![
                FluidRow::new("fa", "brine", 0, 0.0, 5000.0),
                FluidRow::new("fb", "mud", 1, 0.0, 5000.0),
            ],
            ..Default::default()
        };
        let result = resolve_topology(&config, &TopologyOptions::default());
        let interval = result
            .intervals
            .iter()
            .find(|iv| iv.contains(2500.0))
            .unwrap();
        let fluids: Vec<_> = interval
            .stack
            .iter()
            .filter(|l| l.material == welltopo_types::LayerMaterial::Fluid)
            .collect();
        assert_eq!(fluids.len(), 2);
        assert!(fluids[0].outer_radius <= fluids[1].inner_radius + 1e-9);
    }

    #[test]
    fn explicit_sources_suppress_marker_sourcing() {
        let mut config = completion_well();
        config.tubing.clear();
        config
            .markers
            .push(MarkerRow::new("m1", MarkerKind::Perforation, 2000.0, 2200.0));
        config.sources.push(SourceRow::source(
            "s1",
            welltopo_types::VolumeKind::Bore,
            1000.0,
            3000.0,
        ));
        let result = resolve_topology(&config, &TopologyOptions::default());
        assert_eq!(result.source_policy.mode, SourcePolicyMode::Explicit);
        assert!(result
            .sources
            .iter()
            .all(|s| s.source_type == welltopo_types::SourceChannel::Explicit));
    }

    #[test]
    fn surface_termination_covers_the_shallowest_interval() {
        let result = resolve_topology(&completion_well(), &TopologyOptions::default());
        let terminations: Vec<_> = result
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Termination)
            .collect();
        let shallow_nodes = result
            .nodes
            .iter()
            .filter(|n| n.interval_index == 0)
            .count();
        assert_eq!(terminations.len(), shallow_nodes);
    }

    #[test]
    fn empty_configuration_produces_an_empty_but_complete_result() {
        let result = resolve_topology(&WellConfiguration::default(), &TopologyOptions::default());
        assert!(result.intervals.is_empty());
        assert!(result.nodes.is_empty());
        assert!(result.edges.is_empty());
        assert!(result.sources.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.source_policy.mode, SourcePolicyMode::Derived);
    }
}
