//! Source resolver: where flow can originate in the graph.
//!
//! Four candidate channels are built over the same interval/node set; explicit
//! scenario rows, when any resolve, fully replace the derived channels.

use welltopo_geometry::GeometryModel;
use welltopo_types::{
    GraphNode, Interval, LayerMaterial, LayerRole, MarkerRow, SourceChannel, SourceEntity,
    SourcePolicy, SourcePolicyMode, SourceRow, SourceRowKind, TopologyOptions, ValidationWarning,
    VolumeKind, WarningCode,
};

use crate::edges::resolve_marker_pairs;
use crate::nodes::find_node;

/// Resolve the active source set and the policy record describing it.
pub fn resolve_source_channels(
    sources: &[SourceRow],
    markers: &[MarkerRow],
    intervals: &[Interval],
    nodes: &[GraphNode],
    model: &GeometryModel,
    options: &TopologyOptions,
    warnings: &mut Vec<ValidationWarning>,
) -> (Vec<SourceEntity>, SourcePolicy) {
    let explicit_rows: Vec<&SourceRow> = sources
        .iter()
        .filter(|r| r.subtype == SourceRowKind::Source)
        .collect();

    if !explicit_rows.is_empty() {
        let entities = resolve_explicit(&explicit_rows, intervals, nodes);
        if !entities.is_empty() {
            return (
                entities,
                SourcePolicy {
                    mode: SourcePolicyMode::Explicit,
                    channels: vec![SourceChannel::Explicit],
                },
            );
        }
        warnings.push(ValidationWarning::new(
            WarningCode::SourceRowsUnresolved,
            "scenario source rows are present but none resolve to a node",
        ));
    }

    let mut entities = Vec::new();
    let mut channels = Vec::new();

    let marker_entities = resolve_marker_channel(markers, intervals, nodes, model);
    if !marker_entities.is_empty() {
        channels.push(SourceChannel::Marker);
        entities.extend(marker_entities);
    }

    if options.illustrative_fluid_sources {
        let fluid_entities = resolve_fluid_channel(intervals, nodes);
        if !fluid_entities.is_empty() {
            channels.push(SourceChannel::IllustrativeFluid);
            entities.extend(fluid_entities);
        }
    }

    if options.open_hole_sources {
        let open_hole_entities = resolve_open_hole_channel(intervals, nodes);
        if !open_hole_entities.is_empty() {
            channels.push(SourceChannel::OpenHole);
            entities.extend(open_hole_entities);
        }
    }

    (
        entities,
        SourcePolicy {
            mode: SourcePolicyMode::Derived,
            channels,
        },
    )
}

fn resolve_explicit(
    rows: &[&SourceRow],
    intervals: &[Interval],
    nodes: &[GraphNode],
) -> Vec<SourceEntity> {
    let mut entities = Vec::new();
    for row in rows {
        let (Some(volume), Some(top), Some(bottom)) = (row.volume, row.top, row.bottom) else {
            tracing::debug!(row = %row.row_id, "Source row lacks a volume or depth range");
            continue;
        };
        let node_ids: Vec<String> = intervals
            .iter()
            .filter(|iv| iv.overlaps(top, bottom))
            .filter_map(|iv| find_node(nodes, iv.index, volume))
            .map(|n| n.id.clone())
            .collect();
        if node_ids.is_empty() {
            continue;
        }
        entities.push(SourceEntity {
            source_id: format!("src:{}", row.row_id),
            source_type: SourceChannel::Explicit,
            volume,
            top,
            bottom,
            row_id: Some(row.row_id.clone()),
            node_ids,
        });
    }
    entities
}

/// Marker channel: the outer volume of each marker's radial pair is treated
/// as a flow origin (a perforation exposes the formation side, a leak the
/// annulus side).
fn resolve_marker_channel(
    markers: &[MarkerRow],
    intervals: &[Interval],
    nodes: &[GraphNode],
    model: &GeometryModel,
) -> Vec<SourceEntity> {
    // Pair resolution warnings are the edge builder's to emit.
    let resolution = resolve_marker_pairs(markers, intervals, nodes, model);
    let mut entities = Vec::new();
    for (marker_index, pairs) in &resolution.pairs {
        let marker = &markers[*marker_index];
        let mut volumes: Vec<VolumeKind> = pairs.iter().map(|p| p.outer).collect();
        volumes.sort_by_key(|v| v.radial_order());
        volumes.dedup();
        for volume in volumes {
            let node_ids: Vec<String> = pairs
                .iter()
                .filter(|p| p.outer == volume)
                .filter_map(|p| find_node(nodes, p.interval_index, volume))
                .map(|n| n.id.clone())
                .collect();
            if node_ids.is_empty() {
                continue;
            }
            entities.push(SourceEntity {
                source_id: format!("src:marker:{}:{}", marker.row_id, volume),
                source_type: SourceChannel::Marker,
                volume,
                top: marker.top,
                bottom: marker.bottom,
                row_id: Some(marker.row_id.clone()),
                node_ids,
            });
        }
    }
    entities
}

/// Illustrative-fluid channel: every annulus layer that resolved to an
/// explicit fluid becomes an origin at its interval/volume.
fn resolve_fluid_channel(intervals: &[Interval], nodes: &[GraphNode]) -> Vec<SourceEntity> {
    let mut entities: Vec<SourceEntity> = Vec::new();
    for interval in intervals {
        for layer in &interval.stack {
            if layer.role != LayerRole::Annulus || layer.material != LayerMaterial::Fluid {
                continue;
            }
            let Some(node) = nodes.iter().find(|n| {
                n.interval_index == interval.index
                    && n.volume.is_annulus()
                    && layer.slot.is_some_and(|slot| {
                        n.volume == VolumeKind::annulus_for_slot(slot)
                            || n.volume == VolumeKind::FormationAnnulus
                    })
            }) else {
                continue;
            };
            let source_id = format!("src:{}:{}", layer.source, node.volume);
            match entities.iter_mut().find(|e| e.source_id == source_id) {
                Some(entity) => {
                    entity.top = entity.top.min(interval.top);
                    entity.bottom = entity.bottom.max(interval.bottom);
                    if !entity.node_ids.contains(&node.id) {
                        entity.node_ids.push(node.id.clone());
                    }
                }
                None => entities.push(SourceEntity {
                    source_id,
                    source_type: SourceChannel::IllustrativeFluid,
                    volume: node.volume,
                    top: interval.top,
                    bottom: interval.bottom,
                    row_id: layer.source.strip_prefix("fluid:").map(str::to_string),
                    node_ids: vec![node.id.clone()],
                }),
            }
        }
    }
    entities
}

/// Open-hole channel: intervals in formation contact contribute their
/// formation-annulus node, falling back to the bore node, skipping blocked
/// nodes.
fn resolve_open_hole_channel(intervals: &[Interval], nodes: &[GraphNode]) -> Vec<SourceEntity> {
    let mut entities = Vec::new();
    for interval in intervals.iter().filter(|iv| iv.open_hole) {
        let node = find_node(nodes, interval.index, VolumeKind::FormationAnnulus)
            .or_else(|| find_node(nodes, interval.index, VolumeKind::Bore))
            .filter(|n| !n.blocked);
        let Some(node) = node else { continue };
        entities.push(SourceEntity {
            source_id: format!("src:open_hole:i{}", interval.index),
            source_type: SourceChannel::OpenHole,
            volume: node.volume,
            top: interval.top,
            bottom: interval.bottom,
            row_id: None,
            node_ids: vec![node.id.clone()],
        });
    }
    entities
}
