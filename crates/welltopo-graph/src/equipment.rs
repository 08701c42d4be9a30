//! Equipment rule engine.
//!
//! Each equipment type carries defaults (per-volume seal map, actuation,
//! integrity); a row's effective rule is defaults overridden in order by the
//! legacy aggregate booleans, the type-specific seal-context hook, per-volume
//! overrides, and the normalized actuation/integrity text. Anything the engine
//! cannot interpret warns and falls back; it never aborts the evaluation.

use std::collections::BTreeMap;

use welltopo_geometry::{resolve_seal_slot, AttachmentOutcome, GeometryModel};
use welltopo_types::tolerance::{BOUNDARY_TOLERANCE, DEPTH_EPSILON};
use welltopo_types::{
    ActuationState, EdgeState, EffectContributor, EquipmentKind, EquipmentRow, IntegrityStatus,
    ResolvedEquipmentEffect, ValidationWarning, VolumeKind, WarningCode,
};

const ALL_ANNULI: [VolumeKind; 5] = [
    VolumeKind::AnnulusA,
    VolumeKind::AnnulusB,
    VolumeKind::AnnulusC,
    VolumeKind::AnnulusD,
    VolumeKind::FormationAnnulus,
];

/// Effective rule for one equipment row after all overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentRule {
    pub row_id: String,
    pub kind: EquipmentKind,
    /// Which volumes this row has a seal path on.
    pub seal_map: BTreeMap<VolumeKind, bool>,
    pub actuation: ActuationState,
    pub integrity: IntegrityStatus,
    /// An attachment failure already warned; suppress the no-seal warning.
    exempt_from_no_seal: bool,
}

/// Blocking outcome for one volume under one rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SealState {
    pub blocked: bool,
    pub cost: u32,
    pub state: EdgeState,
}

fn type_defaults(kind: EquipmentKind) -> (Vec<VolumeKind>, ActuationState, IntegrityStatus) {
    match kind {
        // A packer's annular seal volume comes from the attachment hook, not
        // from a static default.
        EquipmentKind::Packer => (vec![], ActuationState::Static, IntegrityStatus::Intact),
        EquipmentKind::BridgePlug => (
            vec![VolumeKind::Bore],
            ActuationState::Static,
            IntegrityStatus::Intact,
        ),
        EquipmentKind::SafetyValve => (
            vec![VolumeKind::TubingInner],
            ActuationState::Open,
            IntegrityStatus::Intact,
        ),
        EquipmentKind::GasLiftMandrel => (
            vec![VolumeKind::AnnulusA],
            ActuationState::Static,
            IntegrityStatus::Intact,
        ),
        EquipmentKind::SlidingSleeve => (
            vec![VolumeKind::TubingInner],
            ActuationState::Closed,
            IntegrityStatus::Intact,
        ),
    }
}

fn as_bool(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(b) => Some(*b),
        _ => None,
    }
}

/// Resolve one row's effective rule. Warnings carry the row id; the caller
/// tags the boundary depth.
pub fn resolve_equipment_rule(
    row: &EquipmentRow,
    model: &GeometryModel,
) -> (EquipmentRule, Vec<ValidationWarning>) {
    let mut warnings = Vec::new();
    let (default_volumes, default_actuation, default_integrity) = type_defaults(row.kind);
    let mut seal_map: BTreeMap<VolumeKind, bool> =
        default_volumes.into_iter().map(|v| (v, true)).collect();
    let mut exempt_from_no_seal = false;

    // Legacy aggregate overrides.
    if let Some(value) = &row.annular_seal {
        match as_bool(value) {
            Some(sealing) => {
                for volume in ALL_ANNULI {
                    seal_map.insert(volume, sealing);
                }
            }
            None => warnings.push(
                ValidationWarning::new(
                    WarningCode::EquipmentInvalidOverrideValue,
                    format!("{} {}: annular_seal is not a boolean", row.kind.as_str(), row.row_id),
                )
                .with_row(&row.row_id)
                .with_fields(&["annular_seal"]),
            ),
        }
    }
    if let Some(value) = &row.bore_seal {
        match as_bool(value) {
            Some(sealing) => {
                seal_map.insert(VolumeKind::Bore, sealing);
                seal_map.insert(VolumeKind::TubingInner, sealing);
            }
            None => warnings.push(
                ValidationWarning::new(
                    WarningCode::EquipmentInvalidOverrideValue,
                    format!("{} {}: bore_seal is not a boolean", row.kind.as_str(), row.row_id),
                )
                .with_row(&row.row_id)
                .with_fields(&["bore_seal"]),
            ),
        }
    }

    // Type-specific seal-context hook: a packer seals the annulus slot its
    // attachment resolves to.
    if row.kind == EquipmentKind::Packer {
        match resolve_seal_slot(row.attach.as_ref(), row.depth, model) {
            AttachmentOutcome::Resolved(seal) => {
                seal_map.insert(seal.volume, true);
            }
            AttachmentOutcome::MissingTarget => {
                exempt_from_no_seal = true;
                warnings.push(
                    ValidationWarning::new(
                        WarningCode::EquipmentMissingAttachTarget,
                        format!("packer {} has no attach target", row.row_id),
                    )
                    .with_row(&row.row_id)
                    .with_fields(&["attach"]),
                );
            }
            AttachmentOutcome::UnresolvedTarget => {
                exempt_from_no_seal = true;
                warnings.push(
                    ValidationWarning::new(
                        WarningCode::EquipmentUnresolvedAttachTarget,
                        format!("packer {} attach target does not resolve to a pipe row", row.row_id),
                    )
                    .with_row(&row.row_id)
                    .with_fields(&["attach"]),
                );
            }
            AttachmentOutcome::DepthOutOfRange => {
                exempt_from_no_seal = true;
                warnings.push(
                    ValidationWarning::new(
                        WarningCode::EquipmentAttachDepthOutOfRange,
                        format!("packer {} sits outside its host pipe's depth range", row.row_id),
                    )
                    .with_row(&row.row_id)
                    .with_fields(&["attach", "depth"]),
                );
            }
        }
    }

    // Per-volume overrides.
    for (key, value) in &row.seal_overrides {
        let Some(volume) = VolumeKind::parse_key(key) else {
            warnings.push(
                ValidationWarning::new(
                    WarningCode::EquipmentUnknownSealVolume,
                    format!("{} {}: unknown seal volume key '{key}'", row.kind.as_str(), row.row_id),
                )
                .with_row(&row.row_id)
                .with_fields(&["seal_overrides"]),
            );
            continue;
        };
        match as_bool(value) {
            Some(sealing) => {
                seal_map.insert(volume, sealing);
            }
            None => warnings.push(
                ValidationWarning::new(
                    WarningCode::EquipmentInvalidOverrideValue,
                    format!(
                        "{} {}: seal override for '{key}' is not a boolean",
                        row.kind.as_str(),
                        row.row_id
                    ),
                )
                .with_row(&row.row_id)
                .with_fields(&["seal_overrides"]),
            ),
        }
    }

    // Actuation / integrity normalization.
    let actuation = match &row.actuation {
        Some(text) if !text.trim().is_empty() => match ActuationState::normalize(text) {
            Some(state) => state,
            None => {
                warnings.push(
                    ValidationWarning::new(
                        WarningCode::EquipmentUnknownActuationState,
                        format!("{} {}: unrecognized actuation '{text}'", row.kind.as_str(), row.row_id),
                    )
                    .with_row(&row.row_id)
                    .with_fields(&["actuation"]),
                );
                default_actuation
            }
        },
        _ => default_actuation,
    };
    let integrity = match &row.integrity {
        Some(text) if !text.trim().is_empty() => match IntegrityStatus::normalize(text) {
            Some(state) => state,
            None => {
                warnings.push(
                    ValidationWarning::new(
                        WarningCode::EquipmentUnknownIntegrityStatus,
                        format!("{} {}: unrecognized integrity '{text}'", row.kind.as_str(), row.row_id),
                    )
                    .with_row(&row.row_id)
                    .with_fields(&["integrity"]),
                );
                default_integrity
            }
        },
        _ => default_integrity,
    };

    // Conflict detection: integrity wins, but the disagreement is surfaced.
    let conflict = matches!(
        (actuation, integrity),
        (ActuationState::Closed, IntegrityStatus::FailedOpen)
            | (ActuationState::Closed, IntegrityStatus::Leaking)
            | (ActuationState::Open, IntegrityStatus::FailedClosed)
    );
    if conflict {
        warnings.push(
            ValidationWarning::new(
                WarningCode::EquipmentStateConflict,
                format!(
                    "{} {}: actuation {:?} conflicts with integrity {:?}",
                    row.kind.as_str(),
                    row.row_id,
                    actuation,
                    integrity
                ),
            )
            .with_row(&row.row_id)
            .with_fields(&["actuation", "integrity"]),
        );
    }

    let rule = EquipmentRule {
        row_id: row.row_id.clone(),
        kind: row.kind,
        seal_map,
        actuation,
        integrity,
        exempt_from_no_seal,
    };

    if !rule.seals_anything() && !rule.exempt_from_no_seal {
        warnings.push(
            ValidationWarning::new(
                WarningCode::EquipmentNoSealBehavior,
                format!("{} {} seals no volume at its boundary", row.kind.as_str(), row.row_id),
            )
            .with_row(&row.row_id),
        );
    }

    (rule, warnings)
}

impl EquipmentRule {
    pub fn seals_anything(&self) -> bool {
        self.seal_map.values().any(|sealing| *sealing)
    }

    pub fn has_seal_path(&self, volume: VolumeKind) -> bool {
        self.seal_map.get(&volume).copied().unwrap_or(false)
    }

    /// Blocking outcome for one volume given this rule's states.
    pub fn seal_state(&self, volume: VolumeKind) -> SealState {
        if !self.has_seal_path(volume) {
            return SealState {
                blocked: false,
                cost: 0,
                state: EdgeState::Open,
            };
        }
        match self.integrity {
            IntegrityStatus::FailedOpen => SealState {
                blocked: false,
                cost: 0,
                state: EdgeState::FailedOpen,
            },
            IntegrityStatus::Leaking => SealState {
                blocked: false,
                cost: 0,
                state: EdgeState::Leaking,
            },
            IntegrityStatus::FailedClosed => SealState {
                blocked: true,
                cost: 1,
                state: EdgeState::FailedClosed,
            },
            IntegrityStatus::Intact => match self.actuation {
                ActuationState::Open => SealState {
                    blocked: false,
                    cost: 0,
                    state: EdgeState::Open,
                },
                ActuationState::Static | ActuationState::Closed => SealState {
                    blocked: true,
                    cost: 1,
                    state: EdgeState::ClosedFailable,
                },
            },
        }
    }
}

/// Aggregated per-volume equipment effects at one boundary depth.
///
/// Rows whose point depth sits within the boundary tolerance contribute;
/// row-level warnings are emitted only at the row's own exact boundary, so a
/// row matched by several nearby boundaries still warns exactly once.
pub fn resolve_boundary_equipment_effects(
    depth: f64,
    rows: &[EquipmentRow],
    model: &GeometryModel,
) -> (BTreeMap<VolumeKind, ResolvedEquipmentEffect>, Vec<ValidationWarning>) {
    let mut effects: BTreeMap<VolumeKind, ResolvedEquipmentEffect> = BTreeMap::new();
    let mut warnings = Vec::new();

    for row in rows {
        if !row.depth.is_finite() || (row.depth - depth).abs() > BOUNDARY_TOLERANCE {
            continue;
        }
        let (rule, row_warnings) = resolve_equipment_rule(row, model);
        if (row.depth - depth).abs() <= DEPTH_EPSILON {
            warnings.extend(
                row_warnings
                    .into_iter()
                    .map(|w| w.with_depth(depth)),
            );
        }
        for (&volume, &sealing) in &rule.seal_map {
            if !sealing {
                continue;
            }
            let seal = rule.seal_state(volume);
            let contributor = EffectContributor {
                row_id: rule.row_id.clone(),
                kind: rule.kind,
                state: seal.state,
                cost: seal.cost,
            };
            let effect = effects.entry(volume).or_insert_with(|| ResolvedEquipmentEffect {
                volume,
                blocked: false,
                cost: 0,
                state: EdgeState::Open,
                contributors: Vec::new(),
            });
            effect.blocked |= seal.blocked;
            effect.cost = effect.cost.max(seal.cost);
            effect.state = merge_states(effect.blocked, effect.state, seal.state);
            effect.contributors.push(contributor);
        }
    }

    (effects, warnings)
}

/// Pick the aggregate state: among blocking contributors `failed_closed`
/// dominates `closed_failable`; among open ones `leaking` dominates
/// `failed_open` dominates `open`.
fn merge_states(blocked: bool, current: EdgeState, incoming: EdgeState) -> EdgeState {
    fn rank(state: EdgeState) -> u8 {
        match state {
            EdgeState::Open => 0,
            EdgeState::FailedOpen => 1,
            EdgeState::Leaking => 2,
            EdgeState::ClosedFailable => 3,
            EdgeState::FailedClosed => 4,
        }
    }
    if blocked {
        let candidates = [current, incoming];
        candidates
            .into_iter()
            .filter(|s| matches!(s, EdgeState::ClosedFailable | EdgeState::FailedClosed))
            .max_by_key(|s| rank(*s))
            .unwrap_or(EdgeState::ClosedFailable)
    } else if rank(incoming) > rank(current) {
        incoming
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use welltopo_types::{AttachRef, PipeFamily, PipeRow, TopologyOptions, WellConfiguration};

    fn cased_model() -> GeometryModel {
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("c1", 9.625, 0.0, 5000.0),
                PipeRow::open_hole("oh", 12.25, 0.0, 5000.0),
            ],
            tubing: vec![PipeRow::tubing("t1", 4.5, 0.0, 4500.0)],
            ..Default::default()
        };
        GeometryModel::resolve(&config, &TopologyOptions::default())
    }

    fn attached_packer(row_id: &str, depth: f64) -> EquipmentRow {
        let mut row = EquipmentRow::new(row_id, EquipmentKind::Packer, depth);
        row.attach = Some(AttachRef::to_row(PipeFamily::Tubing, "t1"));
        row
    }

    fn codes(warnings: &[ValidationWarning]) -> Vec<WarningCode> {
        warnings.iter().map(|w| w.code).collect()
    }

    #[test]
    fn attached_packer_seals_its_resolved_annulus() {
        let model = cased_model();
        let (rule, warnings) = resolve_equipment_rule(&attached_packer("p1", 4000.0), &model);
        assert!(warnings.is_empty());
        assert!(rule.has_seal_path(VolumeKind::AnnulusA));
        assert!(!rule.has_seal_path(VolumeKind::Bore));
        let seal = rule.seal_state(VolumeKind::AnnulusA);
        assert!(seal.blocked);
        assert_eq!(seal.cost, 1);
        assert_eq!(seal.state, EdgeState::ClosedFailable);
    }

    #[test]
    fn packer_without_attach_warns_once_and_skips_no_seal_warning() {
        let model = cased_model();
        let row = EquipmentRow::new("p1", EquipmentKind::Packer, 4000.0);
        let (rule, warnings) = resolve_equipment_rule(&row, &model);
        assert_eq!(codes(&warnings), vec![WarningCode::EquipmentMissingAttachTarget]);
        assert!(!rule.seals_anything());
    }

    #[test]
    fn packer_with_ghost_attach_warns_unresolved() {
        let model = cased_model();
        let mut row = EquipmentRow::new("p1", EquipmentKind::Packer, 4000.0);
        row.attach = Some(AttachRef::to_row(PipeFamily::Casing, "ghost"));
        let (_, warnings) = resolve_equipment_rule(&row, &model);
        assert_eq!(codes(&warnings), vec![WarningCode::EquipmentUnresolvedAttachTarget]);
    }

    #[test]
    fn packer_below_its_host_warns_depth_out_of_range() {
        let model = cased_model();
        let row = attached_packer("p1", 4800.0);
        let (_, warnings) = resolve_equipment_rule(&row, &model);
        assert_eq!(codes(&warnings), vec![WarningCode::EquipmentAttachDepthOutOfRange]);
    }

    #[test]
    fn safety_valve_defaults_open_on_tubing() {
        let model = cased_model();
        let row = EquipmentRow::new("sv1", EquipmentKind::SafetyValve, 500.0);
        let (rule, warnings) = resolve_equipment_rule(&row, &model);
        assert!(warnings.is_empty());
        let seal = rule.seal_state(VolumeKind::TubingInner);
        assert!(!seal.blocked);
        assert_eq!(seal.state, EdgeState::Open);
    }

    #[test]
    fn sliding_sleeve_defaults_closed() {
        let model = cased_model();
        let row = EquipmentRow::new("ss1", EquipmentKind::SlidingSleeve, 3000.0);
        let (rule, _) = resolve_equipment_rule(&row, &model);
        let seal = rule.seal_state(VolumeKind::TubingInner);
        assert!(seal.blocked);
        assert_eq!(seal.state, EdgeState::ClosedFailable);
    }

    #[test]
    fn non_boolean_override_warns_and_is_ignored() {
        let model = cased_model();
        let mut row = EquipmentRow::new("bp1", EquipmentKind::BridgePlug, 3000.0);
        row.bore_seal = Some(serde_json::json!("definitely"));
        let (rule, warnings) = resolve_equipment_rule(&row, &model);
        assert_eq!(codes(&warnings), vec![WarningCode::EquipmentInvalidOverrideValue]);
        // The default bore seal survives.
        assert!(rule.has_seal_path(VolumeKind::Bore));
    }

    #[test]
    fn per_volume_override_extends_and_clears_seals() {
        let model = cased_model();
        let mut row = attached_packer("p1", 4000.0);
        row.seal_overrides
            .insert("bore".to_string(), serde_json::json!(true));
        row.seal_overrides
            .insert("a".to_string(), serde_json::json!(false));
        let (rule, warnings) = resolve_equipment_rule(&row, &model);
        assert!(warnings.is_empty());
        assert!(rule.has_seal_path(VolumeKind::Bore));
        assert!(!rule.has_seal_path(VolumeKind::AnnulusA));
    }

    #[test]
    fn unknown_override_key_warns() {
        let model = cased_model();
        let mut row = EquipmentRow::new("bp1", EquipmentKind::BridgePlug, 3000.0);
        row.seal_overrides
            .insert("annulus_z".to_string(), serde_json::json!(true));
        let (_, warnings) = resolve_equipment_rule(&row, &model);
        assert_eq!(codes(&warnings), vec![WarningCode::EquipmentUnknownSealVolume]);
    }

    #[test]
    fn unrecognized_actuation_warns_and_keeps_default() {
        let model = cased_model();
        let mut row = EquipmentRow::new("ss1", EquipmentKind::SlidingSleeve, 3000.0);
        row.actuation = Some("ajar".to_string());
        let (rule, warnings) = resolve_equipment_rule(&row, &model);
        assert_eq!(codes(&warnings), vec![WarningCode::EquipmentUnknownActuationState]);
        assert_eq!(rule.actuation, ActuationState::Closed);
    }

    #[test]
    fn integrity_wins_over_conflicting_actuation() {
        let model = cased_model();
        let mut row = EquipmentRow::new("ss1", EquipmentKind::SlidingSleeve, 3000.0);
        row.actuation = Some("closed".to_string());
        row.integrity = Some("failed_open".to_string());
        let (rule, warnings) = resolve_equipment_rule(&row, &model);
        assert_eq!(codes(&warnings), vec![WarningCode::EquipmentStateConflict]);
        let seal = rule.seal_state(VolumeKind::TubingInner);
        assert!(!seal.blocked);
        assert_eq!(seal.state, EdgeState::FailedOpen);
    }

    #[test]
    fn failed_closed_blocks_even_when_open() {
        let model = cased_model();
        let mut row = EquipmentRow::new("sv1", EquipmentKind::SafetyValve, 500.0);
        row.integrity = Some("failed_closed".to_string());
        let (rule, warnings) = resolve_equipment_rule(&row, &model);
        assert_eq!(codes(&warnings), vec![WarningCode::EquipmentStateConflict]);
        let seal = rule.seal_state(VolumeKind::TubingInner);
        assert!(seal.blocked);
        assert_eq!(seal.state, EdgeState::FailedClosed);
    }

    #[test]
    fn boundary_effects_aggregate_across_rows() {
        let model = cased_model();
        let mut bridge = EquipmentRow::new("bp1", EquipmentKind::BridgePlug, 4000.0);
        bridge.seal_overrides
            .insert("a".to_string(), serde_json::json!(true));
        let mut leaky = attached_packer("p2", 4000.05);
        leaky.integrity = Some("leaking".to_string());
        let rows = vec![bridge, leaky];
        let (effects, warnings) = resolve_boundary_equipment_effects(4000.0, &rows, &model);
        assert!(warnings.is_empty());

        let bore = &effects[&VolumeKind::Bore];
        assert!(bore.blocked);
        assert_eq!(bore.cost, 1);
        assert_eq!(bore.state, EdgeState::ClosedFailable);

        // Bridge plug blocks the annulus; the leaking packer contributes an
        // open path but the block wins.
        let annulus = &effects[&VolumeKind::AnnulusA];
        assert!(annulus.blocked);
        assert_eq!(annulus.contributors.len(), 2);
        assert_eq!(annulus.state, EdgeState::ClosedFailable);
    }

    #[test]
    fn rows_outside_the_tolerance_do_not_contribute() {
        let model = cased_model();
        let rows = vec![attached_packer("p1", 4000.0)];
        let (effects, _) = resolve_boundary_equipment_effects(4001.0, &rows, &model);
        assert!(effects.is_empty());
    }

    #[test]
    fn row_warnings_are_tagged_with_their_own_boundary_only() {
        let model = cased_model();
        let rows = vec![EquipmentRow::new("p1", EquipmentKind::Packer, 4000.0)];
        let (_, at_row) = resolve_boundary_equipment_effects(4000.0, &rows, &model);
        assert_eq!(codes(&at_row), vec![WarningCode::EquipmentMissingAttachTarget]);
        assert_eq!(at_row[0].depth, Some(4000.0));
        let (_, nearby) = resolve_boundary_equipment_effects(4000.05, &rows, &model);
        assert!(nearby.is_empty());
    }
}
