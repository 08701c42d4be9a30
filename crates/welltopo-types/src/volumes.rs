//! Closed enums for volume kinds, materials, families, and state machines.
//!
//! The source data uses free-text identifiers for most of these; each enum
//! here owns the normalization from loose text to a closed variant so every
//! consumption site can match exhaustively.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// VolumeKind
// ---------------------------------------------------------------------------

/// A named fluid-bearing region of the well.
///
/// Annulus letters are positional per depth: slot 0 (the innermost annulus at
/// that depth) is A, slot 1 is B, and so on. The outermost annulus in contact
/// with open hole is the formation annulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeKind {
    Bore,
    TubingInner,
    AnnulusA,
    AnnulusB,
    AnnulusC,
    AnnulusD,
    FormationAnnulus,
}

impl VolumeKind {
    /// Stable snake_case identifier, matching the serde wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeKind::Bore => "bore",
            VolumeKind::TubingInner => "tubing_inner",
            VolumeKind::AnnulusA => "annulus_a",
            VolumeKind::AnnulusB => "annulus_b",
            VolumeKind::AnnulusC => "annulus_c",
            VolumeKind::AnnulusD => "annulus_d",
            VolumeKind::FormationAnnulus => "formation_annulus",
        }
    }

    /// Parse a loose volume key from equipment overrides or scenario rows.
    /// Accepts the snake_case names plus single-letter annulus shorthand.
    pub fn parse_key(key: &str) -> Option<VolumeKind> {
        match key.trim().to_lowercase().as_str() {
            "bore" => Some(VolumeKind::Bore),
            "tubing_inner" | "tubing" => Some(VolumeKind::TubingInner),
            "annulus_a" | "a" => Some(VolumeKind::AnnulusA),
            "annulus_b" | "b" => Some(VolumeKind::AnnulusB),
            "annulus_c" | "c" => Some(VolumeKind::AnnulusC),
            "annulus_d" | "d" => Some(VolumeKind::AnnulusD),
            "formation_annulus" | "formation" => Some(VolumeKind::FormationAnnulus),
            _ => None,
        }
    }

    /// Position in the canonical inner-to-outer radial sequence.
    pub fn radial_order(&self) -> usize {
        match self {
            VolumeKind::TubingInner => 0,
            VolumeKind::Bore => 1,
            VolumeKind::AnnulusA => 2,
            VolumeKind::AnnulusB => 3,
            VolumeKind::AnnulusC => 4,
            VolumeKind::AnnulusD => 5,
            VolumeKind::FormationAnnulus => 6,
        }
    }

    /// `true` for the annulus-family kinds (A..D and formation).
    pub fn is_annulus(&self) -> bool {
        matches!(
            self,
            VolumeKind::AnnulusA
                | VolumeKind::AnnulusB
                | VolumeKind::AnnulusC
                | VolumeKind::AnnulusD
                | VolumeKind::FormationAnnulus
        )
    }

    /// `true` when `self` and `other` sit next to each other in the canonical
    /// radial sequence.
    pub fn radially_adjacent(&self, other: &VolumeKind) -> bool {
        self.radial_order().abs_diff(other.radial_order()) == 1
    }

    /// Annulus volume for a positional slot index. Slots beyond D are clamped
    /// to D; the caller promotes open-hole-contact slots to
    /// [`VolumeKind::FormationAnnulus`] separately.
    pub fn annulus_for_slot(slot: usize) -> VolumeKind {
        match slot {
            0 => VolumeKind::AnnulusA,
            1 => VolumeKind::AnnulusB,
            2 => VolumeKind::AnnulusC,
            _ => VolumeKind::AnnulusD,
        }
    }
}

impl std::fmt::Display for VolumeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Materials and families
// ---------------------------------------------------------------------------

/// Material of one radial band in a depth's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerMaterial {
    Wellbore,
    Steel,
    Cement,
    Fluid,
    Mud,
    Plug,
    Void,
    Unresolved,
}

impl LayerMaterial {
    /// `true` for materials that block vertical flow through a volume.
    pub fn blocks_flow(&self) -> bool {
        matches!(self, LayerMaterial::Cement | LayerMaterial::Plug)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipeFamily {
    Casing,
    Tubing,
    DrillString,
}

// ---------------------------------------------------------------------------
// Marker / liner / source-row kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Perforation,
    Leak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinerMode {
    #[default]
    Auto,
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRowKind {
    Source,
    Breakout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationPhase {
    #[default]
    Production,
    Drilling,
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// Closed set of supported equipment types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Packer,
    BridgePlug,
    SafetyValve,
    GasLiftMandrel,
    SlidingSleeve,
}

impl EquipmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentKind::Packer => "packer",
            EquipmentKind::BridgePlug => "bridge_plug",
            EquipmentKind::SafetyValve => "safety_valve",
            EquipmentKind::GasLiftMandrel => "gas_lift_mandrel",
            EquipmentKind::SlidingSleeve => "sliding_sleeve",
        }
    }
}

/// Actuation state of an equipment row, normalized from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuationState {
    #[default]
    Static,
    Open,
    Closed,
}

impl ActuationState {
    /// Normalize free text. Returns `None` for unrecognized non-empty text
    /// (the caller warns and falls back to the type default).
    pub fn normalize(text: &str) -> Option<ActuationState> {
        match text.trim().to_lowercase().as_str() {
            "static" => Some(ActuationState::Static),
            "open" => Some(ActuationState::Open),
            "closed" => Some(ActuationState::Closed),
            _ => None,
        }
    }
}

/// Integrity status of an equipment row, normalized from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityStatus {
    #[default]
    Intact,
    FailedOpen,
    FailedClosed,
    Leaking,
}

impl IntegrityStatus {
    /// Normalize free text. Returns `None` for unrecognized non-empty text.
    pub fn normalize(text: &str) -> Option<IntegrityStatus> {
        match text.trim().to_lowercase().as_str() {
            "intact" => Some(IntegrityStatus::Intact),
            "failed_open" => Some(IntegrityStatus::FailedOpen),
            "failed_closed" => Some(IntegrityStatus::FailedClosed),
            "leaking" => Some(IntegrityStatus::Leaking),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Vertical,
    Radial,
    Termination,
}

/// Terminal-per-evaluation state of a graph edge. Edges are recomputed, never
/// mutated in place; "transitions" only occur across recomputations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeState {
    Open,
    ClosedFailable,
    FailedOpen,
    Leaking,
    FailedClosed,
}
