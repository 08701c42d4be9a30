//! Parent-child connection resolution between pipe rows of one family.
//!
//! A manual parent (explicit 1-based index) is accepted only when the size
//! and depth constraints hold and no intermediate-OD pipe blocks the path;
//! otherwise the candidate search runs, preferring the smallest depth gap and
//! then the smallest OD.

use welltopo_types::tolerance::{BOUNDARY_TOLERANCE, RADIAL_EPSILON};
use welltopo_types::{Connection, ConnectionKind, PipeFamily, TopologyOptions};

use crate::normalize::NormalizedPipe;

/// Resolve connections for every pipe family in the model.
pub fn resolve_connections(
    pipes: &[NormalizedPipe],
    options: &TopologyOptions,
) -> Vec<Connection> {
    let mut connections = Vec::new();
    for family in [PipeFamily::Casing, PipeFamily::Tubing, PipeFamily::DrillString] {
        let rows: Vec<&NormalizedPipe> = pipes
            .iter()
            .filter(|p| p.family == family && !p.open_hole)
            .collect();
        for &child in &rows {
            if let Some(parent) = find_parent(child, &rows, options) {
                connections.push(make_connection(parent, child));
            }
        }
    }
    connections
}

fn find_parent<'a>(
    child: &NormalizedPipe,
    rows: &[&'a NormalizedPipe],
    options: &TopologyOptions,
) -> Option<&'a NormalizedPipe> {
    if let Some(index) = child.manual_parent.and_then(|i| i.checked_sub(1)) {
        if let Some(&parent) = rows.iter().find(|r| r.source_index == index) {
            if accepts(parent, child, options, rows) {
                return Some(parent);
            }
            tracing::debug!(
                child = %child.row_id,
                parent = %parent.row_id,
                "Manual parent rejected, falling back to search"
            );
        }
    }

    rows.iter()
        .filter(|parent| accepts(parent, child, options, rows))
        .min_by(|a, b| {
            let gap_a = (a.bottom - child.top).abs();
            let gap_b = (b.bottom - child.top).abs();
            gap_a.total_cmp(&gap_b).then(a.od.total_cmp(&b.od))
        })
        .copied()
}

fn accepts(
    parent: &NormalizedPipe,
    child: &NormalizedPipe,
    options: &TopologyOptions,
    rows: &[&NormalizedPipe],
) -> bool {
    parent.row_id != child.row_id
        && parent.od > child.od + RADIAL_EPSILON
        && (parent.bottom - child.top).abs() <= options.crossover_epsilon
        && !path_blocked(parent, child, rows)
}

/// `true` when a pipe of intermediate OD overlaps the span between the
/// parent's bottom and the child's top.
fn path_blocked(parent: &NormalizedPipe, child: &NormalizedPipe, rows: &[&NormalizedPipe]) -> bool {
    let lo = parent.bottom.min(child.top);
    let hi = parent.bottom.max(child.top);
    rows.iter().any(|other| {
        other.row_id != parent.row_id
            && other.row_id != child.row_id
            && other.od > child.od + RADIAL_EPSILON
            && other.od < parent.od - RADIAL_EPSILON
            && other.top < hi
            && other.bottom > lo
    })
}

fn make_connection(parent: &NormalizedPipe, child: &NormalizedPipe) -> Connection {
    let gap = (parent.bottom - child.top).abs();
    let kind = if gap <= BOUNDARY_TOLERANCE {
        ConnectionKind::Swage
    } else {
        ConnectionKind::Crossover
    };
    Connection {
        parent_id: parent.row_id.clone(),
        child_id: child.row_id.clone(),
        kind,
        top: parent.bottom.min(child.top),
        bottom: parent.bottom.max(child.top),
    }
}
