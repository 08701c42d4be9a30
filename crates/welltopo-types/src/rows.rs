//! Input row records and the configuration ingestion surface.
//!
//! Rows arrive from spreadsheet-like editors as loosely-typed records with
//! optional and overloaded fields. Each row kind is a plain struct with
//! explicit `Option` fields, decoded once at the boundary; the resolvers never
//! probe loose maps. Seal overrides on equipment rows stay as
//! `serde_json::Value` on purpose: the rule engine owns the warn-and-ignore
//! policy for invalid values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::volumes::{
    EquipmentKind, LinerMode, MarkerKind, OperationPhase, PipeFamily, SourceRowKind, VolumeKind,
};

// ---------------------------------------------------------------------------
// Attach references
// ---------------------------------------------------------------------------

/// Reference from a point record (equipment, marker, plug) to its host pipe.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttachRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<PipeFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
}

impl AttachRef {
    pub fn to_row(family: PipeFamily, row_id: impl Into<String>) -> Self {
        Self {
            family: Some(family),
            row_id: Some(row_id.into()),
        }
    }

    /// `true` when the reference names nothing at all.
    pub fn is_empty(&self) -> bool {
        self.row_id.is_none()
    }
}

// ---------------------------------------------------------------------------
// Pipe rows
// ---------------------------------------------------------------------------

/// One ordered string segment (casing, tubing, or drill string), or an
/// open-hole section when `open_hole` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeRow {
    pub row_id: String,
    pub family: PipeFamily,
    /// Outer diameter. For open-hole rows this is the hole diameter.
    pub od: f64,
    pub top: f64,
    pub bottom: f64,
    /// Explicit inner-diameter override; estimated from weight when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_diameter: Option<f64>,
    /// Nominal weight per length, used for the ID estimate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub open_hole: bool,
    /// Top of cement behind this casing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cement_top: Option<f64>,
    /// Bottom of cement; defaults to the row bottom when a valid top is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cement_bottom: Option<f64>,
    /// Oversized drilled-hole diameter around this casing, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole_size: Option<f64>,
    /// Explicit 1-based index of the parent row within the same family table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_parent: Option<usize>,
    #[serde(default)]
    pub liner_mode: LinerMode,
}

impl PipeRow {
    pub fn new(row_id: impl Into<String>, family: PipeFamily, od: f64, top: f64, bottom: f64) -> Self {
        Self {
            row_id: row_id.into(),
            family,
            od,
            top,
            bottom,
            inner_diameter: None,
            weight: None,
            open_hole: false,
            cement_top: None,
            cement_bottom: None,
            hole_size: None,
            manual_parent: None,
            liner_mode: LinerMode::Auto,
        }
    }

    pub fn casing(row_id: impl Into<String>, od: f64, top: f64, bottom: f64) -> Self {
        Self::new(row_id, PipeFamily::Casing, od, top, bottom)
    }

    pub fn tubing(row_id: impl Into<String>, od: f64, top: f64, bottom: f64) -> Self {
        Self::new(row_id, PipeFamily::Tubing, od, top, bottom)
    }

    pub fn open_hole(row_id: impl Into<String>, diameter: f64, top: f64, bottom: f64) -> Self {
        let mut row = Self::new(row_id, PipeFamily::Casing, diameter, top, bottom);
        row.open_hole = true;
        row
    }
}

// ---------------------------------------------------------------------------
// Equipment rows
// ---------------------------------------------------------------------------

/// A point (depth) record for a piece of mechanical equipment.
///
/// The three override fields are loosely typed by design: the rule engine
/// validates them and warns on anything it cannot interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRow {
    pub row_id: String,
    pub kind: EquipmentKind,
    pub depth: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach: Option<AttachRef>,
    /// Legacy aggregate override: seal all annulus volumes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annular_seal: Option<serde_json::Value>,
    /// Legacy aggregate override: seal the bore volumes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bore_seal: Option<serde_json::Value>,
    /// Per-volume seal overrides keyed by volume name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub seal_overrides: BTreeMap<String, serde_json::Value>,
    /// Free-text actuation state (static/open/closed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actuation: Option<String>,
    /// Free-text integrity status (intact/failed_open/failed_closed/leaking).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
}

impl EquipmentRow {
    pub fn new(row_id: impl Into<String>, kind: EquipmentKind, depth: f64) -> Self {
        Self {
            row_id: row_id.into(),
            kind,
            depth,
            attach: None,
            annular_seal: None,
            bore_seal: None,
            seal_overrides: BTreeMap::new(),
            actuation: None,
            integrity: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Marker, fluid, plug, and scenario rows
// ---------------------------------------------------------------------------

/// A perforation or leak marker over a depth range. A zero-length range is a
/// point event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRow {
    pub row_id: String,
    pub kind: MarkerKind,
    pub top: f64,
    pub bottom: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach: Option<AttachRef>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

impl MarkerRow {
    pub fn new(row_id: impl Into<String>, kind: MarkerKind, top: f64, bottom: f64) -> Self {
        Self {
            row_id: row_id.into(),
            kind,
            top,
            bottom,
            attach: None,
            visible: true,
        }
    }
}

/// An annulus fluid assignment over a depth range, targeting a slot index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidRow {
    pub row_id: String,
    pub label: String,
    /// Annulus slot index the fluid is assigned to (0 = innermost).
    pub slot: usize,
    pub top: f64,
    pub bottom: f64,
    /// Manual outer diameter clamp for the fluid band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_od: Option<f64>,
}

impl FluidRow {
    pub fn new(
        row_id: impl Into<String>,
        label: impl Into<String>,
        slot: usize,
        top: f64,
        bottom: f64,
    ) -> Self {
        Self {
            row_id: row_id.into(),
            label: label.into(),
            slot,
            top,
            bottom,
            manual_od: None,
        }
    }
}

/// A cement (or mechanical) plug set across a depth range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlugRow {
    pub row_id: String,
    pub top: f64,
    pub bottom: f64,
    /// Explicit plug width (diameter); halved for the applied radius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach: Option<AttachRef>,
}

impl PlugRow {
    pub fn new(row_id: impl Into<String>, top: f64, bottom: f64) -> Self {
        Self {
            row_id: row_id.into(),
            top,
            bottom,
            manual_width: None,
            attach: None,
        }
    }
}

/// An explicit topology-source row: either a flow origin (`Source`) or a
/// cross-volume breakout (`Breakout`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub row_id: String,
    pub subtype: SourceRowKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeKind>,
    /// Target volume for breakout rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_volume: Option<VolumeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
}

impl SourceRow {
    pub fn source(row_id: impl Into<String>, volume: VolumeKind, top: f64, bottom: f64) -> Self {
        Self {
            row_id: row_id.into(),
            subtype: SourceRowKind::Source,
            volume: Some(volume),
            to_volume: None,
            top: Some(top),
            bottom: Some(bottom),
        }
    }

    pub fn breakout(
        row_id: impl Into<String>,
        from: VolumeKind,
        to: VolumeKind,
        top: f64,
        bottom: f64,
    ) -> Self {
        Self {
            row_id: row_id.into(),
            subtype: SourceRowKind::Breakout,
            volume: Some(from),
            to_volume: Some(to),
            top: Some(top),
            bottom: Some(bottom),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// The full input to one evaluation: every row table, by kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WellConfiguration {
    #[serde(default)]
    pub casing: Vec<PipeRow>,
    #[serde(default)]
    pub tubing: Vec<PipeRow>,
    #[serde(default)]
    pub drill_string: Vec<PipeRow>,
    #[serde(default)]
    pub equipment: Vec<EquipmentRow>,
    #[serde(default)]
    pub markers: Vec<MarkerRow>,
    #[serde(default)]
    pub fluids: Vec<FluidRow>,
    #[serde(default)]
    pub plugs: Vec<PlugRow>,
    #[serde(default)]
    pub sources: Vec<SourceRow>,
}

impl WellConfiguration {
    /// Decode a configuration from a JSON document. This is the only
    /// fallible entry point; everything downstream is warn-and-continue.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// All pipe rows across the three family tables, in table order.
    pub fn pipe_rows(&self) -> impl Iterator<Item = &PipeRow> {
        self.casing
            .iter()
            .chain(self.tubing.iter())
            .chain(self.drill_string.iter())
    }
}

/// Scalar evaluation options. Passed by reference down the pipeline; there is
/// no global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyOptions {
    #[serde(default)]
    pub phase: OperationPhase,
    /// Maximum depth gap for a parent-child pipe connection search.
    pub crossover_epsilon: f64,
    /// Opt-in: resolved annulus fluids become flow origins.
    #[serde(default)]
    pub illustrative_fluid_sources: bool,
    /// Opt-in: open-hole intervals contribute default flow origins.
    #[serde(default)]
    pub open_hole_sources: bool,
}

impl Default for TopologyOptions {
    fn default() -> Self {
        Self {
            phase: OperationPhase::Production,
            crossover_epsilon: 100.0,
            illustrative_fluid_sources: false,
            open_hole_sources: false,
        }
    }
}
