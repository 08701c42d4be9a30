//! Derived value types: layers, intervals, graph nodes/edges, sources, and
//! the assembled `TopologyResult`.
//!
//! Everything here is rebuilt from scratch on every evaluation. Identity
//! across recomputations exists only through the stable `row_id` strings
//! threaded in from the input rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::volumes::{EdgeKind, EdgeState, EquipmentKind, LayerMaterial, PipeFamily, VolumeKind};

/// Node id of the synthetic surface sink every termination edge points at.
pub const SURFACE_NODE_ID: &str = "surface";

// ---------------------------------------------------------------------------
// Connections and barriers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    /// Boundary-tolerance-matched tight join.
    Swage,
    /// Gapped join within the crossover search window.
    Crossover,
}

/// Directed parent-to-child relationship between two pipe rows of the same
/// family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub parent_id: String,
    pub child_id: String,
    pub kind: ConnectionKind,
    pub top: f64,
    pub bottom: f64,
}

impl Connection {
    pub fn midpoint(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierKind {
    LinerPacker,
}

/// A liner-packer relationship between an unconnected child casing and its
/// radial parent at the child's top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barrier {
    pub kind: BarrierKind,
    pub parent_id: String,
    pub child_id: String,
    pub depth: f64,
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerRole {
    Core,
    Pipe,
    Annulus,
    CoreBoundary,
    Void,
}

/// One radial band in a depth's material stack.
///
/// Invariant: `outer_radius > inner_radius` for every retained layer, and a
/// stack's layers are sorted with no gaps or overlaps after overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub role: LayerRole,
    pub material: LayerMaterial,
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Provenance: which row or rule produced this band.
    pub source: String,
    /// Annulus slot index (0 = innermost) for annulus layers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
    /// Pipe family for pipe-wall layers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<PipeFamily>,
    #[serde(default)]
    pub perforated: bool,
    #[serde(default)]
    pub open_hole_contact: bool,
}

impl Layer {
    pub fn thickness(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }
}

// ---------------------------------------------------------------------------
// Intervals and boundary reasons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryReasonKind {
    ModelStart,
    ModelEnd,
    PipeStart,
    PipeEnd,
    CementStart,
    CementEnd,
    FluidStart,
    FluidEnd,
    PlugStart,
    PlugEnd,
    MarkerPoint,
    MarkerStart,
    MarkerEnd,
    ConnectionTransition,
    BarrierTransition,
    EquipmentTransition,
    /// Generic fallback when no recorded event matches the boundary depth.
    Depth,
}

/// Why a transition exists at one interval edge. Reasons are never deduplicated
/// across differing kind/label/source-index combinations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryReason {
    pub kind: BoundaryReasonKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
}

impl BoundaryReason {
    pub fn new(kind: BoundaryReasonKind) -> Self {
        Self {
            kind,
            label: None,
            row_id: None,
            source_index: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_row(mut self, row_id: impl Into<String>) -> Self {
        self.row_id = Some(row_id.into());
        self
    }

    pub fn with_source_index(mut self, index: usize) -> Self {
        self.source_index = Some(index);
        self
    }
}

/// A depth span `[top, bottom)` with its material stack and the reasons a
/// transition exists at each edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub index: usize,
    pub top: f64,
    pub bottom: f64,
    pub midpoint: f64,
    pub stack: Vec<Layer>,
    pub top_reasons: Vec<BoundaryReason>,
    pub bottom_reasons: Vec<BoundaryReason>,
    /// `true` when the stack touches open hole at this depth.
    #[serde(default)]
    pub open_hole: bool,
}

impl Interval {
    /// `true` when `[top, bottom]` of this interval overlaps `[range_top,
    /// range_bottom]`.
    pub fn overlaps(&self, range_top: f64, range_bottom: f64) -> bool {
        self.top < range_bottom && self.bottom > range_top
    }

    pub fn contains(&self, depth: f64) -> bool {
        depth >= self.top && depth < self.bottom
    }
}

// ---------------------------------------------------------------------------
// Graph nodes and edges
// ---------------------------------------------------------------------------

/// One (interval, volume) node of the connectivity graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub interval_index: usize,
    pub volume: VolumeKind,
    pub top: f64,
    pub bottom: f64,
    pub material: LayerMaterial,
    /// Material-level block: the volume is packed off by cement or a plug.
    pub blocked: bool,
}

impl GraphNode {
    /// Deterministic node id for an (interval, volume) pair.
    pub fn node_id(interval_index: usize, volume: VolumeKind) -> String {
        format!("i{}:{}", interval_index, volume.as_str())
    }
}

/// Machine-readable explanation attached to every edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeReason {
    pub rule_id: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl EdgeReason {
    pub fn new(rule_id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            summary: summary.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub cost: u32,
    pub state: EdgeState,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub meta: BTreeMap<String, serde_json::Value>,
    pub reason: EdgeReason,
}

impl GraphEdge {
    /// Deterministic edge id. Evaluations must be idempotent, so ids derive
    /// from the endpoints and kind rather than from a random source.
    pub fn edge_id(kind: EdgeKind, from: &str, to: &str) -> String {
        let kind = match kind {
            EdgeKind::Vertical => "v",
            EdgeKind::Radial => "r",
            EdgeKind::Termination => "t",
        };
        format!("{kind}:{from}->{to}")
    }
}

// ---------------------------------------------------------------------------
// Equipment effects
// ---------------------------------------------------------------------------

/// One equipment row's contribution to a boundary effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectContributor {
    pub row_id: String,
    pub kind: EquipmentKind,
    pub state: EdgeState,
    pub cost: u32,
}

/// Aggregated per-volume seal state at one boundary depth, computed from all
/// equipment rows active there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEquipmentEffect {
    pub volume: VolumeKind,
    pub blocked: bool,
    pub cost: u32,
    pub state: EdgeState,
    pub contributors: Vec<EffectContributor>,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceChannel {
    Marker,
    IllustrativeFluid,
    OpenHole,
    Explicit,
}

/// A named flow origin resolved against the node set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntity {
    pub source_id: String,
    pub source_type: SourceChannel,
    pub volume: VolumeKind,
    pub top: f64,
    pub bottom: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    pub node_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePolicyMode {
    /// Explicit scenario rows resolved; derived channels are suppressed.
    Explicit,
    /// Union of markers plus the opted-in derived channels.
    Derived,
}

/// Which sourcing mode was active for this run, and which channels
/// contributed entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePolicy {
    pub mode: SourcePolicyMode,
    pub channels: Vec<SourceChannel>,
}

// ---------------------------------------------------------------------------
// TopologyResult
// ---------------------------------------------------------------------------

/// The complete output of one evaluation. Every field is always populated,
/// possibly empty; no computation path terminates early on bad input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyResult {
    pub intervals: Vec<Interval>,
    pub connections: Vec<Connection>,
    pub barriers: Vec<Barrier>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub sources: Vec<SourceEntity>,
    pub source_policy: SourcePolicy,
    pub warnings: Vec<crate::warnings::ValidationWarning>,
}
