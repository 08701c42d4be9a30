//! Structural transition resolver.
//!
//! Positional volume letters can change meaning across an interval boundary
//! (a tubing string starts or ends, a casing shoe drops an annulus slot).
//! Vertical continuity edges only connect same-kind volumes, so the shifts
//! here are detected separately: the representable ones become edges, the
//! rest become explicit warnings rather than silent approximations.

use std::collections::BTreeMap;

use welltopo_types::{
    EdgeKind, EdgeReason, GraphEdge, GraphNode, Interval, ResolvedEquipmentEffect,
    ValidationWarning, VolumeKind, WarningCode,
};

use crate::edges::{edge_states_at, push_unique};
use crate::nodes::{find_node, interval_volumes};

/// Detect structural transitions at every internal boundary.
pub fn build_transition_edges(
    intervals: &[Interval],
    nodes: &[GraphNode],
    boundary_effects: &BTreeMap<usize, BTreeMap<VolumeKind, ResolvedEquipmentEffect>>,
    warnings: &mut Vec<ValidationWarning>,
) -> Vec<GraphEdge> {
    let mut edges = Vec::new();
    for pair in intervals.windows(2) {
        let (upper, lower) = (&pair[0], &pair[1]);
        let boundary = upper.bottom;
        let upper_volumes = interval_volumes(nodes, upper.index);
        let lower_volumes = interval_volumes(nodes, lower.index);
        let effects = boundary_effects.get(&upper.index);

        resolve_tubing_transitions(
            upper, lower, &upper_volumes, &lower_volumes, nodes, effects, boundary, &mut edges,
            warnings,
        );
        resolve_annulus_shifts(
            upper, lower, &upper_volumes, &lower_volumes, nodes, effects, boundary, &mut edges,
            warnings,
        );
    }
    edges
}

fn innermost_annulus(volumes: &[VolumeKind]) -> Option<VolumeKind> {
    volumes.iter().copied().find(|v| v.is_annulus())
}

#[allow(clippy::too_many_arguments)]
fn resolve_tubing_transitions(
    upper: &Interval,
    lower: &Interval,
    upper_volumes: &[VolumeKind],
    lower_volumes: &[VolumeKind],
    nodes: &[GraphNode],
    effects: Option<&BTreeMap<VolumeKind, ResolvedEquipmentEffect>>,
    boundary: f64,
    edges: &mut Vec<GraphEdge>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let upper_has_tubing = upper_volumes.contains(&VolumeKind::TubingInner);
    let lower_has_tubing = lower_volumes.contains(&VolumeKind::TubingInner);
    if upper_has_tubing == lower_has_tubing {
        return;
    }
    let (tubing_iv, tubing_volumes, other_iv, other_volumes) = if upper_has_tubing {
        (upper, upper_volumes, lower, lower_volumes)
    } else {
        (lower, lower_volumes, upper, upper_volumes)
    };

    // Tubing-annulus entry/exit: the tubing-side innermost annulus hands over
    // to the other side's innermost annulus when the letters differ (the
    // same-letter case is already covered by vertical continuity).
    if let (Some(tubing_annulus), Some(other_annulus)) = (
        innermost_annulus(tubing_volumes),
        innermost_annulus(other_volumes),
    ) {
        if tubing_annulus != other_annulus {
            push_transition(
                edges,
                nodes,
                (tubing_iv.index, tubing_annulus),
                (other_iv.index, other_annulus),
                effects,
                "tubing_annulus_exchange",
                format!(
                    "tubing string boundary at {boundary}: {tubing_annulus} continues as {other_annulus}"
                ),
            );
        }
    }

    // Tubing-end transfer: the innermost open channel flips between the
    // tubing inner bore and the open wellbore.
    match innermost_annulus(other_volumes) {
        Some(other_annulus) => {
            push_transition(
                edges,
                nodes,
                (tubing_iv.index, VolumeKind::TubingInner),
                (other_iv.index, other_annulus),
                effects,
                "tubing_end_transfer",
                format!("tubing end at {boundary}: inner bore transfers to {other_annulus}"),
            );
        }
        None => {
            warnings.push(
                ValidationWarning::new(
                    WarningCode::TransitionUnresolvedTransfer,
                    format!(
                        "tubing end at {boundary}: no annulus endpoint resolves for the transfer"
                    ),
                )
                .with_depth(boundary),
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_annulus_shifts(
    upper: &Interval,
    lower: &Interval,
    upper_volumes: &[VolumeKind],
    lower_volumes: &[VolumeKind],
    nodes: &[GraphNode],
    effects: Option<&BTreeMap<VolumeKind, ResolvedEquipmentEffect>>,
    boundary: f64,
    edges: &mut Vec<GraphEdge>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let shifts = [
        (upper, upper_volumes, lower, lower_volumes),
        (lower, lower_volumes, upper, upper_volumes),
    ];
    for (side, side_volumes, other, other_volumes) in shifts {
        for &changed in side_volumes {
            if !changed.is_annulus() || other_volumes.contains(&changed) {
                continue;
            }
            // The kind exists on this side only. Pair it with the nearest
            // annulus kind on the other side.
            let candidate = other_volumes
                .iter()
                .copied()
                .filter(|v| v.is_annulus() && *v != changed)
                .min_by_key(|v| v.radial_order().abs_diff(changed.radial_order()));
            let Some(partner) = candidate else {
                warnings.push(not_modeled(changed, None, boundary));
                continue;
            };
            let intervening = has_intervening_kind(changed, partner, side_volumes, other_volumes);
            let promotable = !intervening
                && (changed.radially_adjacent(&partner)
                    || changed == VolumeKind::FormationAnnulus
                    || partner == VolumeKind::FormationAnnulus);
            if promotable {
                push_transition(
                    edges,
                    nodes,
                    (side.index, changed),
                    (other.index, partner),
                    effects,
                    "annulus_shift",
                    format!("annulus shift at {boundary}: {changed} continues as {partner}"),
                );
            } else {
                warnings.push(not_modeled(changed, Some(partner), boundary));
            }
        }
    }
}

fn not_modeled(
    changed: VolumeKind,
    partner: Option<VolumeKind>,
    boundary: f64,
) -> ValidationWarning {
    let message = match partner {
        Some(partner) => format!(
            "structural shift at {boundary}: {changed} to {partner} is not representable"
        ),
        None => format!(
            "structural shift at {boundary}: {changed} ends with no counterpart volume"
        ),
    };
    ValidationWarning::new(WarningCode::TransitionNotModeled, message).with_depth(boundary)
}

/// `true` when a kind strictly between the pair in the canonical radial
/// sequence exists on either side of the boundary.
fn has_intervening_kind(
    a: VolumeKind,
    b: VolumeKind,
    side_volumes: &[VolumeKind],
    other_volumes: &[VolumeKind],
) -> bool {
    let lo = a.radial_order().min(b.radial_order());
    let hi = a.radial_order().max(b.radial_order());
    side_volumes
        .iter()
        .chain(other_volumes.iter())
        .any(|v| v.radial_order() > lo && v.radial_order() < hi)
}

#[allow(clippy::too_many_arguments)]
fn push_transition(
    edges: &mut Vec<GraphEdge>,
    nodes: &[GraphNode],
    from: (usize, VolumeKind),
    to: (usize, VolumeKind),
    effects: Option<&BTreeMap<VolumeKind, ResolvedEquipmentEffect>>,
    rule_id: &str,
    summary: String,
) {
    let (Some(from_node), Some(to_node)) =
        (find_node(nodes, from.0, from.1), find_node(nodes, to.0, to.1))
    else {
        return;
    };
    let effect = effects.and_then(|map| map.get(&from.1).or_else(|| map.get(&to.1)));
    let (_, cost, state) = edge_states_at(from_node, to_node, effect);
    let edge = GraphEdge {
        id: GraphEdge::edge_id(EdgeKind::Vertical, &from_node.id, &to_node.id),
        from: from_node.id.clone(),
        to: to_node.id.clone(),
        kind: EdgeKind::Vertical,
        cost,
        state,
        meta: BTreeMap::new(),
        reason: EdgeReason::new(rule_id, summary),
    };
    push_unique(edges, edge);
}
