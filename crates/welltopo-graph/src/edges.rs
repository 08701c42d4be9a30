//! Edge construction: vertical continuity, marker-derived radial paths,
//! scenario breakouts, and surface termination.

use std::collections::BTreeMap;

use welltopo_geometry::{resolve_seal_slot, AttachmentOutcome, GeometryModel};
use welltopo_types::{
    AttachRef, EdgeKind, EdgeReason, EdgeState, GraphEdge, GraphNode, Interval, MarkerKind,
    MarkerRow, PipeFamily, ResolvedEquipmentEffect, SourceRow, SourceRowKind, ValidationWarning,
    VolumeKind, WarningCode, SURFACE_NODE_ID,
};

use crate::nodes::{core_volume, find_node, interval_volumes};

/// Append an edge unless one with the same id already exists.
pub(crate) fn push_unique(edges: &mut Vec<GraphEdge>, edge: GraphEdge) {
    if edges.iter().all(|e| e.id != edge.id) {
        edges.push(edge);
    }
}

/// Blocking outcome for an edge between two nodes, folding in the equipment
/// effect at the boundary when one applies.
pub(crate) fn edge_states_at(
    from: &GraphNode,
    to: &GraphNode,
    effect: Option<&ResolvedEquipmentEffect>,
) -> (bool, u32, EdgeState) {
    let material_blocked = from.blocked || to.blocked;
    let equipment_blocked = effect.is_some_and(|e| e.blocked);
    let blocked = material_blocked || equipment_blocked;
    if blocked {
        let cost = effect.map(|e| e.cost).unwrap_or(0).max(1);
        let state = match effect.map(|e| e.state) {
            Some(EdgeState::FailedClosed) => EdgeState::FailedClosed,
            _ => EdgeState::ClosedFailable,
        };
        (true, cost, state)
    } else {
        let state = match effect.map(|e| e.state) {
            Some(EdgeState::Leaking) => EdgeState::Leaking,
            Some(EdgeState::FailedOpen) => EdgeState::FailedOpen,
            _ => EdgeState::Open,
        };
        (false, 0, state)
    }
}

// ---------------------------------------------------------------------------
// Vertical continuity
// ---------------------------------------------------------------------------

/// One edge per consecutive interval pair and volume kind present in both.
pub fn build_vertical_edges(
    intervals: &[Interval],
    nodes: &[GraphNode],
    boundary_effects: &BTreeMap<usize, BTreeMap<VolumeKind, ResolvedEquipmentEffect>>,
) -> Vec<GraphEdge> {
    let mut edges = Vec::new();
    for pair in intervals.windows(2) {
        let (upper, lower) = (&pair[0], &pair[1]);
        let effects = boundary_effects.get(&upper.index);
        for volume in interval_volumes(nodes, upper.index) {
            let (Some(from), Some(to)) = (
                find_node(nodes, upper.index, volume),
                find_node(nodes, lower.index, volume),
            ) else {
                continue;
            };
            let effect = effects.and_then(|map| map.get(&volume));
            let (_, cost, state) = edge_states_at(from, to, effect);
            push_unique(
                &mut edges,
                GraphEdge {
                    id: GraphEdge::edge_id(EdgeKind::Vertical, &from.id, &to.id),
                    from: from.id.clone(),
                    to: to.id.clone(),
                    kind: EdgeKind::Vertical,
                    cost,
                    state,
                    meta: BTreeMap::new(),
                    reason: EdgeReason::new(
                        "vertical_continuity",
                        format!("{volume} continues across {}", upper.bottom),
                    ),
                },
            );
        }
    }
    edges
}

// ---------------------------------------------------------------------------
// Marker-derived radial edges
// ---------------------------------------------------------------------------

/// One marker's resolved radial pair at one interval.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MarkerPair {
    pub interval_index: usize,
    pub inner: VolumeKind,
    pub outer: VolumeKind,
}

pub(crate) struct MarkerResolution {
    pub pairs: Vec<(usize, Vec<MarkerPair>)>,
    pub warnings: Vec<ValidationWarning>,
}

/// Resolve every visible marker to its per-interval volume pairs. Shared by
/// the radial edge builder and the marker source channel so both agree on
/// which volumes a marker reaches.
pub(crate) fn resolve_marker_pairs(
    markers: &[MarkerRow],
    intervals: &[Interval],
    nodes: &[GraphNode],
    model: &GeometryModel,
) -> MarkerResolution {
    let mut pairs = Vec::new();
    let mut warnings = Vec::new();

    for (index, marker) in markers.iter().enumerate() {
        if !marker.visible {
            continue;
        }
        if !marker.top.is_finite() || !marker.bottom.is_finite() || marker.bottom < marker.top {
            warnings.push(
                ValidationWarning::new(
                    WarningCode::MarkerInvalidDepthRange,
                    format!("marker {} has an inverted or non-finite depth range", marker.row_id),
                )
                .with_row(&marker.row_id)
                .with_fields(&["top", "bottom"]),
            );
            continue;
        }

        let family = marker
            .attach
            .as_ref()
            .and_then(|a| a.family)
            .unwrap_or(PipeFamily::Casing);
        let tubing_leak = family == PipeFamily::Tubing && marker.kind == MarkerKind::Leak;
        if family == PipeFamily::Tubing && marker.kind != MarkerKind::Leak {
            warnings.push(unresolved_host(marker));
            continue;
        }

        let target = marker.attach.as_ref().and_then(|a| a.row_id.as_deref());
        let host = match target {
            Some(id) => {
                match model
                    .pipes
                    .iter()
                    .find(|p| p.family == family && !p.open_hole && p.row_id == id)
                {
                    Some(host) => Some(host),
                    None => {
                        warnings.push(unresolved_host(marker));
                        continue;
                    }
                }
            }
            None => None,
        };

        if tubing_leak {
            if let Some(host) = host {
                if marker.bottom < host.top || marker.top > host.bottom {
                    warnings.push(
                        ValidationWarning::new(
                            WarningCode::MarkerOutsideHostRange,
                            format!(
                                "leak {} does not overlap its host {}",
                                marker.row_id, host.row_id
                            ),
                        )
                        .with_row(&marker.row_id),
                    );
                    continue;
                }
            }
        }

        let mut marker_pairs = Vec::new();
        for interval in intervals {
            let matches = if marker.bottom > marker.top {
                interval.overlaps(marker.top, marker.bottom)
            } else {
                interval.contains(marker.top)
            };
            if !matches {
                continue;
            }
            let volumes = interval_volumes(nodes, interval.index);
            let pair = if tubing_leak {
                fallback_pair(interval, &volumes)
            } else {
                casing_pair(marker, host.map(|h| h.row_id.as_str()), interval, &volumes, model)
            };
            if let Some((inner, outer)) = pair {
                marker_pairs.push(MarkerPair {
                    interval_index: interval.index,
                    inner,
                    outer,
                });
            }
        }
        if marker_pairs.is_empty() {
            warnings.push(
                ValidationWarning::new(
                    WarningCode::MarkerNoMatchingIntervals,
                    format!("marker {} overlaps no modeled interval", marker.row_id),
                )
                .with_row(&marker.row_id),
            );
            continue;
        }
        pairs.push((index, marker_pairs));
    }

    MarkerResolution { pairs, warnings }
}

fn unresolved_host(marker: &MarkerRow) -> ValidationWarning {
    ValidationWarning::new(
        WarningCode::MarkerUnresolvedHost,
        format!("marker {} host reference does not resolve", marker.row_id),
    )
    .with_row(&marker.row_id)
    .with_fields(&["attach"])
}

/// Core volume paired with the innermost annulus of the interval.
fn fallback_pair(interval: &Interval, volumes: &[VolumeKind]) -> Option<(VolumeKind, VolumeKind)> {
    let annulus = volumes.iter().copied().find(|v| v.is_annulus())?;
    Some((core_volume(interval), annulus))
}

/// The volumes immediately inside and outside the host casing wall at this
/// interval. Without an explicit host the innermost active casing stands in.
fn casing_pair(
    marker: &MarkerRow,
    host_id: Option<&str>,
    interval: &Interval,
    volumes: &[VolumeKind],
    model: &GeometryModel,
) -> Option<(VolumeKind, VolumeKind)> {
    let probe = interval.midpoint;
    let host_id = match host_id {
        Some(id) => Some(id.to_string()),
        None => model
            .pipes
            .iter()
            .filter(|p| {
                p.family == PipeFamily::Casing && !p.open_hole && p.active_at(probe)
            })
            .min_by(|a, b| a.od.total_cmp(&b.od))
            .map(|p| p.row_id.clone()),
    };
    let outer = host_id.and_then(|id| {
        let attach = AttachRef::to_row(PipeFamily::Casing, id);
        let depth = probe.clamp(marker.top, marker.bottom.max(marker.top));
        match resolve_seal_slot(Some(&attach), depth, model) {
            AttachmentOutcome::Resolved(seal) => Some(seal.volume),
            _ => None,
        }
    });
    match outer {
        Some(outer) => {
            // The volume one step inward in this interval's radial sequence.
            let position = volumes.iter().position(|v| *v == outer)?;
            let inner = if position == 0 {
                core_volume(interval)
            } else {
                volumes[position - 1]
            };
            Some((inner, outer))
        }
        None => fallback_pair(interval, volumes),
    }
}

/// Radial edges for every visible marker with a valid range.
pub fn build_radial_edges(
    markers: &[MarkerRow],
    intervals: &[Interval],
    nodes: &[GraphNode],
    model: &GeometryModel,
    warnings: &mut Vec<ValidationWarning>,
) -> Vec<GraphEdge> {
    let resolution = resolve_marker_pairs(markers, intervals, nodes, model);
    warnings.extend(resolution.warnings);

    let mut edges = Vec::new();
    for (marker_index, pairs) in &resolution.pairs {
        let marker = &markers[*marker_index];
        let rule_id = match marker.kind {
            MarkerKind::Perforation => "marker_perforation",
            MarkerKind::Leak => "marker_leak",
        };
        for pair in pairs {
            let (Some(outer), Some(inner)) = (
                find_node(nodes, pair.interval_index, pair.outer),
                find_node(nodes, pair.interval_index, pair.inner),
            ) else {
                continue;
            };
            let mut meta = BTreeMap::new();
            meta.insert(
                "marker_row".to_string(),
                serde_json::Value::String(marker.row_id.clone()),
            );
            push_unique(
                &mut edges,
                GraphEdge {
                    id: GraphEdge::edge_id(EdgeKind::Radial, &outer.id, &inner.id),
                    from: outer.id.clone(),
                    to: inner.id.clone(),
                    kind: EdgeKind::Radial,
                    cost: 0,
                    state: EdgeState::Open,
                    meta,
                    reason: EdgeReason::new(
                        rule_id,
                        format!("{} {} opens {} to {}", rule_id, marker.row_id, pair.outer, pair.inner),
                    ),
                },
            );
        }
    }
    edges
}

// ---------------------------------------------------------------------------
// Scenario breakout edges
// ---------------------------------------------------------------------------

/// Zero-cost open edges for explicit breakout rows.
pub fn build_scenario_radial_edges(
    sources: &[SourceRow],
    intervals: &[Interval],
    nodes: &[GraphNode],
    warnings: &mut Vec<ValidationWarning>,
) -> Vec<GraphEdge> {
    let mut edges = Vec::new();
    for row in sources {
        if row.subtype != SourceRowKind::Breakout {
            continue;
        }
        let (Some(from_volume), Some(to_volume)) = (row.volume, row.to_volume) else {
            warnings.push(
                ValidationWarning::new(
                    WarningCode::BreakoutMissingVolumePair,
                    format!("breakout {} is missing a volume pair", row.row_id),
                )
                .with_row(&row.row_id)
                .with_fields(&["volume", "to_volume"]),
            );
            continue;
        };
        if from_volume == to_volume {
            warnings.push(
                ValidationWarning::new(
                    WarningCode::BreakoutUnsupportedVolumePair,
                    format!("breakout {} names the same volume twice", row.row_id),
                )
                .with_row(&row.row_id)
                .with_fields(&["volume", "to_volume"]),
            );
            continue;
        }
        let (Some(top), Some(bottom)) = (row.top, row.bottom) else {
            warnings.push(
                ValidationWarning::new(
                    WarningCode::BreakoutMissingDepthRange,
                    format!("breakout {} is missing its depth range", row.row_id),
                )
                .with_row(&row.row_id)
                .with_fields(&["top", "bottom"]),
            );
            continue;
        };

        let mut resolved_any = false;
        for interval in intervals {
            if !interval.overlaps(top, bottom) {
                continue;
            }
            let (Some(from), Some(to)) = (
                find_node(nodes, interval.index, from_volume),
                find_node(nodes, interval.index, to_volume),
            ) else {
                continue;
            };
            resolved_any = true;
            let mut meta = BTreeMap::new();
            meta.insert(
                "breakout_row".to_string(),
                serde_json::Value::String(row.row_id.clone()),
            );
            push_unique(
                &mut edges,
                GraphEdge {
                    id: GraphEdge::edge_id(EdgeKind::Radial, &from.id, &to.id),
                    from: from.id.clone(),
                    to: to.id.clone(),
                    kind: EdgeKind::Radial,
                    cost: 0,
                    state: EdgeState::Open,
                    meta,
                    reason: EdgeReason::new(
                        "scenario_breakout",
                        format!("breakout {} opens {} to {}", row.row_id, from_volume, to_volume),
                    ),
                },
            );
        }
        if !resolved_any {
            warnings.push(
                ValidationWarning::new(
                    WarningCode::BreakoutNoMatchingIntervals,
                    format!("breakout {} resolves no interval with both volumes", row.row_id),
                )
                .with_row(&row.row_id),
            );
        }
    }
    edges
}

// ---------------------------------------------------------------------------
// Surface termination
// ---------------------------------------------------------------------------

/// Every node of the shallowest interval connects to the synthetic surface
/// sink.
pub fn build_termination_edges(nodes: &[GraphNode]) -> Vec<GraphEdge> {
    let mut edges = Vec::new();
    for node in nodes.iter().filter(|n| n.interval_index == 0) {
        push_unique(
            &mut edges,
            GraphEdge {
                id: GraphEdge::edge_id(EdgeKind::Termination, &node.id, SURFACE_NODE_ID),
                from: node.id.clone(),
                to: SURFACE_NODE_ID.to_string(),
                kind: EdgeKind::Termination,
                cost: 0,
                state: EdgeState::Open,
                meta: BTreeMap::new(),
                reason: EdgeReason::new(
                    "surface_termination",
                    format!("{} reaches surface", node.volume),
                ),
            },
        );
    }
    edges
}
