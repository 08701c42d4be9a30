//! Pipe-row normalization.
//!
//! Structurally invalid rows (non-finite or non-positive OD, inverted depth
//! range) are excluded with no warning: they cannot be interpreted as a
//! physical object. Everything else gets its derived fields computed once so
//! downstream code never touches the loose input again.

use welltopo_types::tolerance::{PROBE_OFFSET, RADIAL_EPSILON};
use welltopo_types::{LinerMode, PipeFamily, PipeRow, WellConfiguration};

/// Factor of the pipe-weight relation `weight ~ 2.67 * (OD^2 - ID^2)` for
/// steel tubulars, used to estimate an inner diameter from nominal weight.
const WEIGHT_ID_FACTOR: f64 = 2.67;

/// Safe ID fraction of OD when the estimate would equal or exceed the OD.
const MAX_ID_FRACTION: f64 = 0.97;

/// Nominal ID fraction of OD when neither an override nor a weight is given.
const DEFAULT_ID_FRACTION: f64 = 0.9;

/// Resolved cement interval behind a casing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CementInterval {
    pub top: f64,
    pub bottom: f64,
}

impl CementInterval {
    pub fn covers(&self, depth: f64) -> bool {
        depth >= self.top && depth <= self.bottom
    }
}

/// A pipe row with all derived fields resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPipe {
    pub row_id: String,
    pub family: PipeFamily,
    /// Index of the row within its family table.
    pub source_index: usize,
    pub od: f64,
    pub inner_diameter: f64,
    pub top: f64,
    pub bottom: f64,
    pub open_hole: bool,
    pub cement: Option<CementInterval>,
    /// Outer radius to fall back to when the natural annulus outside this
    /// pipe would collapse.
    pub fallback_annulus_outer_radius: Option<f64>,
    pub hole_size: Option<f64>,
    pub manual_parent: Option<usize>,
    pub liner_mode: LinerMode,
}

impl NormalizedPipe {
    pub fn inner_radius(&self) -> f64 {
        self.inner_diameter / 2.0
    }

    pub fn outer_radius(&self) -> f64 {
        self.od / 2.0
    }

    /// `true` when this row's depth span covers `depth`.
    pub fn active_at(&self, depth: f64) -> bool {
        depth >= self.top && depth <= self.bottom
    }
}

fn row_is_physical(row: &PipeRow) -> bool {
    row.od.is_finite()
        && row.od > 0.0
        && row.top.is_finite()
        && row.bottom.is_finite()
        && row.bottom > row.top
}

fn resolve_inner_diameter(row: &PipeRow) -> f64 {
    if row.open_hole {
        return row.od;
    }
    if let Some(id) = row.inner_diameter {
        if id > 0.0 && id < row.od {
            return id;
        }
    }
    if let Some(weight) = row.weight {
        if weight > 0.0 {
            let estimate = (row.od * row.od - weight / WEIGHT_ID_FACTOR).sqrt();
            if estimate.is_finite() && estimate > 0.0 && estimate < row.od {
                return estimate;
            }
            return row.od * MAX_ID_FRACTION;
        }
    }
    row.od * DEFAULT_ID_FRACTION
}

fn resolve_cement(row: &PipeRow) -> Option<CementInterval> {
    let toc = row.cement_top.filter(|t| t.is_finite())?;
    let boc = row
        .cement_bottom
        .filter(|b| b.is_finite())
        .unwrap_or(row.bottom);
    if boc > toc {
        Some(CementInterval { top: toc, bottom: boc })
    } else {
        None
    }
}

/// Normalize every pipe row across the three family tables. Row order within
/// a family is preserved; invalid rows are dropped.
pub fn normalize_pipe_rows(config: &WellConfiguration) -> Vec<NormalizedPipe> {
    let mut pipes = Vec::new();
    let tables: [(&[PipeRow], PipeFamily); 3] = [
        (&config.casing, PipeFamily::Casing),
        (&config.tubing, PipeFamily::Tubing),
        (&config.drill_string, PipeFamily::DrillString),
    ];
    for (rows, family) in tables {
        for (index, row) in rows.iter().enumerate() {
            if !row_is_physical(row) {
                tracing::debug!(row = %row.row_id, "Dropping structurally invalid pipe row");
                continue;
            }
            let cement = if family == PipeFamily::Casing && !row.open_hole {
                resolve_cement(row)
            } else {
                None
            };
            pipes.push(NormalizedPipe {
                row_id: row.row_id.clone(),
                family,
                source_index: index,
                od: row.od,
                inner_diameter: resolve_inner_diameter(row),
                top: row.top,
                bottom: row.bottom,
                open_hole: row.open_hole,
                cement,
                fallback_annulus_outer_radius: None,
                hole_size: row.hole_size.filter(|h| h.is_finite() && *h > 0.0),
                manual_parent: row.manual_parent,
                liner_mode: row.liner_mode,
            });
        }
    }

    // Second pass: the fallback annulus outer radius needs the full pipe set.
    let snapshot = pipes.clone();
    for pipe in &mut pipes {
        pipe.fallback_annulus_outer_radius = resolve_fallback_outer(pipe, &snapshot);
    }
    pipes
}

/// Explicit oversized hole size when given, else the open-hole or inner
/// radius of the next larger pipe active just inside this row's top.
fn resolve_fallback_outer(pipe: &NormalizedPipe, all: &[NormalizedPipe]) -> Option<f64> {
    if let Some(hole) = pipe.hole_size {
        if hole > pipe.od + RADIAL_EPSILON {
            return Some(hole / 2.0);
        }
    }
    let probe = pipe.top + PROBE_OFFSET;
    all.iter()
        .filter(|other| {
            other.row_id != pipe.row_id
                && other.od > pipe.od + RADIAL_EPSILON
                && other.active_at(probe)
        })
        .min_by(|a, b| a.od.total_cmp(&b.od))
        .map(|outer| {
            if outer.open_hole {
                outer.outer_radius()
            } else {
                outer.inner_radius()
            }
        })
}
