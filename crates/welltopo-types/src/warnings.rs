//! Closed warning catalog.
//!
//! Every diagnostic the resolver can emit is one of the codes below. The code
//! string — not the message text — is the stable contract downstream tooling
//! matches on, so codes are never renamed and payload shape is fixed per code.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Codes and categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCategory {
    Equipment,
    Marker,
    Source,
    Policy,
}

/// Closed enumeration of diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    // equipment
    EquipmentInvalidOverrideValue,
    EquipmentUnknownSealVolume,
    EquipmentUnknownActuationState,
    EquipmentUnknownIntegrityStatus,
    EquipmentStateConflict,
    EquipmentMissingAttachTarget,
    EquipmentUnresolvedAttachTarget,
    EquipmentAttachDepthOutOfRange,
    EquipmentNoSealBehavior,
    // marker
    MarkerInvalidDepthRange,
    MarkerUnresolvedHost,
    MarkerOutsideHostRange,
    MarkerNoMatchingIntervals,
    // source
    SourceRowsUnresolved,
    BreakoutMissingVolumePair,
    BreakoutUnsupportedVolumePair,
    BreakoutMissingDepthRange,
    BreakoutNoMatchingIntervals,
    // policy
    TransitionUnresolvedTransfer,
    TransitionNotModeled,
}

impl WarningCode {
    /// Stable snake_case code string, matching the serde wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::EquipmentInvalidOverrideValue => "equipment_invalid_override_value",
            WarningCode::EquipmentUnknownSealVolume => "equipment_unknown_seal_volume",
            WarningCode::EquipmentUnknownActuationState => "equipment_unknown_actuation_state",
            WarningCode::EquipmentUnknownIntegrityStatus => "equipment_unknown_integrity_status",
            WarningCode::EquipmentStateConflict => "equipment_state_conflict",
            WarningCode::EquipmentMissingAttachTarget => "equipment_missing_attach_target",
            WarningCode::EquipmentUnresolvedAttachTarget => "equipment_unresolved_attach_target",
            WarningCode::EquipmentAttachDepthOutOfRange => "equipment_attach_depth_out_of_range",
            WarningCode::EquipmentNoSealBehavior => "equipment_no_seal_behavior",
            WarningCode::MarkerInvalidDepthRange => "marker_invalid_depth_range",
            WarningCode::MarkerUnresolvedHost => "marker_unresolved_host",
            WarningCode::MarkerOutsideHostRange => "marker_outside_host_range",
            WarningCode::MarkerNoMatchingIntervals => "marker_no_matching_intervals",
            WarningCode::SourceRowsUnresolved => "source_rows_unresolved",
            WarningCode::BreakoutMissingVolumePair => "breakout_missing_volume_pair",
            WarningCode::BreakoutUnsupportedVolumePair => "breakout_unsupported_volume_pair",
            WarningCode::BreakoutMissingDepthRange => "breakout_missing_depth_range",
            WarningCode::BreakoutNoMatchingIntervals => "breakout_no_matching_intervals",
            WarningCode::TransitionUnresolvedTransfer => "transition_unresolved_transfer",
            WarningCode::TransitionNotModeled => "transition_not_modeled",
        }
    }

    pub fn category(&self) -> WarningCategory {
        match self {
            WarningCode::EquipmentInvalidOverrideValue
            | WarningCode::EquipmentUnknownSealVolume
            | WarningCode::EquipmentUnknownActuationState
            | WarningCode::EquipmentUnknownIntegrityStatus
            | WarningCode::EquipmentStateConflict
            | WarningCode::EquipmentMissingAttachTarget
            | WarningCode::EquipmentUnresolvedAttachTarget
            | WarningCode::EquipmentAttachDepthOutOfRange
            | WarningCode::EquipmentNoSealBehavior => WarningCategory::Equipment,
            WarningCode::MarkerInvalidDepthRange
            | WarningCode::MarkerUnresolvedHost
            | WarningCode::MarkerOutsideHostRange
            | WarningCode::MarkerNoMatchingIntervals => WarningCategory::Marker,
            WarningCode::SourceRowsUnresolved
            | WarningCode::BreakoutMissingVolumePair
            | WarningCode::BreakoutUnsupportedVolumePair
            | WarningCode::BreakoutMissingDepthRange
            | WarningCode::BreakoutNoMatchingIntervals => WarningCategory::Source,
            WarningCode::TransitionUnresolvedTransfer | WarningCode::TransitionNotModeled => {
                WarningCategory::Policy
            }
        }
    }

    /// Human remediation text for the code. Advisory only; downstream tooling
    /// keys on the code string, not on this text.
    pub fn recommendation(&self) -> &'static str {
        match self {
            WarningCode::EquipmentInvalidOverrideValue => {
                "Use a boolean for seal overrides, or remove the override to keep the type default"
            }
            WarningCode::EquipmentUnknownSealVolume => {
                "Key seal overrides by a known volume name (bore, tubing_inner, annulus_a..d, formation_annulus)"
            }
            WarningCode::EquipmentUnknownActuationState => {
                "Use one of: static, open, closed"
            }
            WarningCode::EquipmentUnknownIntegrityStatus => {
                "Use one of: intact, failed_open, failed_closed, leaking"
            }
            WarningCode::EquipmentStateConflict => {
                "Actuation and integrity disagree; integrity wins. Clear one of the two fields"
            }
            WarningCode::EquipmentMissingAttachTarget => {
                "Set an attach target so the equipment can resolve its seal slot"
            }
            WarningCode::EquipmentUnresolvedAttachTarget => {
                "Point the attach target at an existing pipe row"
            }
            WarningCode::EquipmentAttachDepthOutOfRange => {
                "Move the equipment depth inside its host pipe's range, or re-target it"
            }
            WarningCode::EquipmentNoSealBehavior => {
                "This row seals no volume at its boundary; set a seal override or remove the row"
            }
            WarningCode::MarkerInvalidDepthRange => {
                "Marker bottom must not be above its top; fix the depth range"
            }
            WarningCode::MarkerUnresolvedHost => {
                "Point the marker at an existing casing (or tubing, for leaks) row"
            }
            WarningCode::MarkerOutsideHostRange => {
                "Move the marker range so it overlaps its host pipe's range"
            }
            WarningCode::MarkerNoMatchingIntervals => {
                "The marker range overlaps no modeled interval; check its depths"
            }
            WarningCode::SourceRowsUnresolved => {
                "Scenario source rows exist but none resolve to a node; check volume keys and depths"
            }
            WarningCode::BreakoutMissingVolumePair => {
                "A breakout row needs both a from-volume and a to-volume"
            }
            WarningCode::BreakoutUnsupportedVolumePair => {
                "Breakout volumes must name two distinct volume kinds"
            }
            WarningCode::BreakoutMissingDepthRange => {
                "A breakout row needs a top and bottom depth"
            }
            WarningCode::BreakoutNoMatchingIntervals => {
                "No interval resolves both breakout volumes over the given range"
            }
            WarningCode::TransitionUnresolvedTransfer => {
                "The tubing-end transfer endpoint could not be resolved; no edge was created"
            }
            WarningCode::TransitionNotModeled => {
                "This structural shift is not representable in the graph model yet; inspect the boundary manually"
            }
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ValidationWarning
// ---------------------------------------------------------------------------

/// One diagnostic emitted by the resolver. `category` and `recommendation`
/// are derived from the code at construction so consumers get a self-contained
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub level: String,
    pub code: WarningCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fields: Vec<String>,
    pub category: WarningCategory,
    pub recommendation: String,
}

impl ValidationWarning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            level: "warning".to_string(),
            code,
            message: message.into(),
            row_id: None,
            depth: None,
            fields: Vec::new(),
            category: code.category(),
            recommendation: code.recommendation().to_string(),
        }
    }

    pub fn with_row(mut self, row_id: impl Into<String>) -> Self {
        self.row_id = Some(row_id.into());
        self
    }

    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }
}
