//! Attach-reference resolution for annular seals.
//!
//! Equipment that seals an annulus names its host pipe through an attach
//! reference. Resolution distinguishes three failure shapes (missing target,
//! unresolvable target, depth outside the host's range) so the rule engine
//! can warn with the right code instead of guessing.

use welltopo_types::tolerance::DEPTH_EPSILON;
use welltopo_types::{AttachRef, PipeFamily, VolumeKind};

use crate::stack::{active_steel_pipes, annulus_slots_at};
use crate::GeometryModel;

/// The annulus slot an attached seal acts on.
#[derive(Debug, Clone, PartialEq)]
pub struct SealSlot {
    pub volume: VolumeKind,
    pub slot: usize,
    pub inner_diameter: f64,
    pub outer_diameter: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentOutcome {
    Resolved(SealSlot),
    /// No attach reference, or one naming nothing.
    MissingTarget,
    /// The reference names a row that does not exist (or has no slot).
    UnresolvedTarget,
    /// The host exists but does not span the equipment depth.
    DepthOutOfRange,
}

/// Resolve the annulus slot outside the referenced host pipe at `depth`.
pub fn resolve_seal_slot(
    attach: Option<&AttachRef>,
    depth: f64,
    model: &GeometryModel,
) -> AttachmentOutcome {
    let Some(attach) = attach else {
        return AttachmentOutcome::MissingTarget;
    };
    if attach.is_empty() {
        return AttachmentOutcome::MissingTarget;
    }
    let family = attach.family.unwrap_or(PipeFamily::Casing);
    let target = attach.row_id.as_deref().unwrap_or_default();
    let Some(host) = model
        .pipes
        .iter()
        .find(|p| p.family == family && !p.open_hole && p.row_id == target)
    else {
        return AttachmentOutcome::UnresolvedTarget;
    };
    if depth < host.top - DEPTH_EPSILON || depth > host.bottom + DEPTH_EPSILON {
        return AttachmentOutcome::DepthOutOfRange;
    }

    let slots = annulus_slots_at(model, depth);
    let by_id = slots.iter().find(|s| s.inner_row_id == host.row_id);
    let slot = match by_id {
        Some(slot) => slot,
        None => {
            // Positional fallback: the host's rank among active steel pipes.
            let position = active_steel_pipes(&model.pipes, depth)
                .iter()
                .position(|p| p.row_id == host.row_id);
            let found = position.and_then(|pos| slots.iter().find(|s| s.inner_position == pos));
            match found {
                Some(slot) => slot,
                None => return AttachmentOutcome::UnresolvedTarget,
            }
        }
    };

    let outermost = slot.index + 1 == slots.len();
    let volume = if outermost && slot.open_hole_contact {
        VolumeKind::FormationAnnulus
    } else {
        VolumeKind::annulus_for_slot(slot.index)
    };
    AttachmentOutcome::Resolved(SealSlot {
        volume,
        slot: slot.index,
        inner_diameter: slot.inner_radius * 2.0,
        outer_diameter: slot.outer_radius * 2.0,
    })
}
