//! Liner-hanger detection.
//!
//! A casing row with no resolved parent connection hangs off the smallest-OD
//! row enclosing it at its top. The relationship is modeled as a liner-packer
//! barrier, valid only when the parent's inner diameter clears the child's OD.

use welltopo_types::tolerance::{PROBE_OFFSET, RADIAL_EPSILON};
use welltopo_types::{Barrier, BarrierKind, Connection, LinerMode, PipeFamily};

use crate::normalize::NormalizedPipe;

/// Minimum distance below the parent's top before an unconnected casing is
/// auto-promoted to a liner without an explicit `liner_mode = yes`.
const HANGER_MATERIAL_OFFSET: f64 = 1.0;

pub fn resolve_hangers(pipes: &[NormalizedPipe], connections: &[Connection]) -> Vec<Barrier> {
    let casings: Vec<&NormalizedPipe> = pipes
        .iter()
        .filter(|p| p.family == PipeFamily::Casing && !p.open_hole)
        .collect();

    let mut barriers = Vec::new();
    for &child in &casings {
        if child.liner_mode == LinerMode::No {
            continue;
        }
        if connections.iter().any(|c| c.child_id == child.row_id) {
            continue;
        }
        let probe = child.top + PROBE_OFFSET;
        let parent = casings
            .iter()
            .filter(|p| {
                p.row_id != child.row_id && p.od > child.od + RADIAL_EPSILON && p.active_at(probe)
            })
            .min_by(|a, b| a.od.total_cmp(&b.od));
        let Some(&parent) = parent else { continue };

        let explicitly_liner = child.liner_mode == LinerMode::Yes;
        let materially_below = child.top > parent.top + HANGER_MATERIAL_OFFSET;
        if !explicitly_liner && !materially_below {
            continue;
        }
        if parent.inner_diameter <= child.od + RADIAL_EPSILON {
            tracing::debug!(
                child = %child.row_id,
                parent = %parent.row_id,
                "Liner candidate does not fit inside its parent"
            );
            continue;
        }
        barriers.push(Barrier {
            kind: BarrierKind::LinerPacker,
            parent_id: parent.row_id.clone(),
            child_id: child.row_id.clone(),
            depth: child.top,
        });
    }
    barriers
}
