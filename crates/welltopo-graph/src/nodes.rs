//! Graph-node construction: one node per (interval, volume kind).

use std::collections::BTreeMap;

use welltopo_types::{
    GraphNode, Interval, LayerMaterial, LayerRole, PipeFamily, VolumeKind,
};

/// Core channel identity for one interval: tubing inner bore when a tubing
/// wall is present, otherwise the open wellbore.
pub fn core_volume(interval: &Interval) -> VolumeKind {
    let has_tubing = interval
        .stack
        .iter()
        .any(|l| l.role == LayerRole::Pipe && l.family == Some(PipeFamily::Tubing));
    if has_tubing {
        VolumeKind::TubingInner
    } else {
        VolumeKind::Bore
    }
}

/// Build the node set across all intervals. A volume is blocked when every
/// layer composing it is a flow-blocking material.
pub fn build_nodes(intervals: &[Interval]) -> Vec<GraphNode> {
    let mut nodes = Vec::new();
    for interval in intervals {
        let mut by_volume: BTreeMap<VolumeKind, (bool, LayerMaterial)> = BTreeMap::new();

        let core_layers: Vec<_> = interval
            .stack
            .iter()
            .filter(|l| matches!(l.role, LayerRole::Core | LayerRole::CoreBoundary))
            .collect();
        if !core_layers.is_empty() {
            let blocked = core_layers.iter().all(|l| l.material.blocks_flow());
            // Innermost layer names the representative material.
            let material = core_layers[0].material;
            by_volume.insert(core_volume(interval), (blocked, material));
        }

        let mut slots: BTreeMap<usize, Vec<&welltopo_types::Layer>> = BTreeMap::new();
        for layer in &interval.stack {
            if layer.role == LayerRole::Annulus {
                if let Some(slot) = layer.slot {
                    slots.entry(slot).or_default().push(layer);
                }
            }
        }
        let outermost_slot = slots.keys().next_back().copied();
        for (slot, layers) in &slots {
            let contact = layers.iter().any(|l| l.open_hole_contact);
            let volume = if Some(*slot) == outermost_slot && contact {
                VolumeKind::FormationAnnulus
            } else {
                VolumeKind::annulus_for_slot(*slot)
            };
            let blocked = layers.iter().all(|l| l.material.blocks_flow());
            let material = layers[0].material;
            // Slots past D collapse onto the same letter; the innermost one
            // wins.
            by_volume.entry(volume).or_insert((blocked, material));
        }

        for (volume, (blocked, material)) in by_volume {
            nodes.push(GraphNode {
                id: GraphNode::node_id(interval.index, volume),
                interval_index: interval.index,
                volume,
                top: interval.top,
                bottom: interval.bottom,
                material,
                blocked,
            });
        }
    }
    nodes
}

/// Lookup helper: the node for (interval, volume), if modeled.
pub fn find_node<'a>(
    nodes: &'a [GraphNode],
    interval_index: usize,
    volume: VolumeKind,
) -> Option<&'a GraphNode> {
    nodes
        .iter()
        .find(|n| n.interval_index == interval_index && n.volume == volume)
}

/// Volume kinds present in one interval, in radial order.
pub fn interval_volumes(nodes: &[GraphNode], interval_index: usize) -> Vec<VolumeKind> {
    let mut volumes: Vec<VolumeKind> = nodes
        .iter()
        .filter(|n| n.interval_index == interval_index)
        .map(|n| n.volume)
        .collect();
    volumes.sort_by_key(|v| v.radial_order());
    volumes
}
