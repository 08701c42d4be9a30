//! Per-depth radial material stacks.
//!
//! `stack_at_depth` builds the skeleton (bore, pipe walls, annuli), resolves
//! each annulus slot's material (fluid over cement over a mud default), and
//! finally trims the innermost layers with the applied-plug overlay.

use welltopo_types::tolerance::{within_range, DEPTH_EPSILON, RADIAL_EPSILON};
use welltopo_types::{
    Layer, LayerMaterial, LayerRole, MarkerKind, MarkerRow, PipeFamily, WellConfiguration,
};

use crate::normalize::NormalizedPipe;
use crate::{GeometryModel, AMBIENT_HOLE_DIAMETER};

/// Radial thickness of the synthetic void band marking open-hole contact when
/// no pipe is active at a depth.
const VOID_BAND: f64 = 0.5;

// ---------------------------------------------------------------------------
// Shared slot geometry
// ---------------------------------------------------------------------------

/// One annulus slot at a given depth: the gap outside `inner_row_id` up to the
/// next pipe's inner wall or the hole boundary.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SlotGeom {
    pub index: usize,
    pub inner_row_id: String,
    /// Position of the inner pipe among the active steel pipes (OD order).
    pub inner_position: usize,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub open_hole_contact: bool,
}

/// Active non-open-hole pipes at `depth`, innermost (smallest OD) first.
pub(crate) fn active_steel_pipes<'a>(
    pipes: &'a [NormalizedPipe],
    depth: f64,
) -> Vec<&'a NormalizedPipe> {
    let mut active: Vec<&NormalizedPipe> = pipes
        .iter()
        .filter(|p| !p.open_hole && p.active_at(depth))
        .collect();
    active.sort_by(|a, b| a.od.total_cmp(&b.od));
    active
}

/// Hole boundary at `depth`: the widest active open-hole row, or the ambient
/// hole. The second value is `true` only when an explicit open-hole row
/// bounds the depth; the ambient fallback is a drawing convenience, not
/// formation contact.
pub(crate) fn hole_radius_at(pipes: &[NormalizedPipe], depth: f64) -> (f64, bool) {
    let widest = pipes
        .iter()
        .filter(|p| p.open_hole && p.active_at(depth))
        .max_by(|a, b| a.od.total_cmp(&b.od));
    match widest {
        Some(hole) => (hole.outer_radius(), true),
        None => (AMBIENT_HOLE_DIAMETER / 2.0, false),
    }
}

/// Annulus slot list at `depth`, built from the same active-pipe/open-hole
/// logic the stack uses. Collapsed slots fall back to the inner pipe's
/// fallback outer radius and are skipped entirely when that fails too.
pub(crate) fn annulus_slots_at(model: &GeometryModel, depth: f64) -> Vec<SlotGeom> {
    let steel = active_steel_pipes(&model.pipes, depth);
    let (hole_radius, hole_contact) = hole_radius_at(&model.pipes, depth);
    let mut slots = Vec::new();
    let mut index = 0;
    for (position, pipe) in steel.iter().enumerate() {
        let inner = pipe.outer_radius();
        let (mut outer, mut contact) = match steel.get(position + 1) {
            Some(next) => (next.inner_radius(), false),
            None => (hole_radius, hole_contact),
        };
        if outer <= inner + RADIAL_EPSILON {
            match pipe.fallback_annulus_outer_radius {
                Some(fallback) if fallback > inner + RADIAL_EPSILON => {
                    outer = fallback;
                    contact = hole_contact && position + 1 == steel.len();
                }
                _ => {
                    tracing::debug!(row = %pipe.row_id, depth, "Collapsed annulus slot skipped");
                    continue;
                }
            }
        }
        slots.push(SlotGeom {
            index,
            inner_row_id: pipe.row_id.clone(),
            inner_position: position,
            inner_radius: inner,
            outer_radius: outer,
            open_hole_contact: contact,
        });
        index += 1;
    }
    slots
}

// ---------------------------------------------------------------------------
// Stack construction
// ---------------------------------------------------------------------------

/// Build the radially-ordered material stack at `depth`.
pub fn stack_at_depth(depth: f64, model: &GeometryModel, config: &WellConfiguration) -> Vec<Layer> {
    let steel = active_steel_pipes(&model.pipes, depth);
    let (hole_radius, hole_contact) = hole_radius_at(&model.pipes, depth);
    let mut layers: Vec<Layer> = Vec::new();

    if steel.is_empty() {
        layers.push(Layer {
            role: LayerRole::Core,
            material: LayerMaterial::Wellbore,
            inner_radius: 0.0,
            outer_radius: hole_radius,
            source: "bore".to_string(),
            slot: None,
            family: None,
            perforated: false,
            open_hole_contact: hole_contact,
        });
        layers.push(Layer {
            role: LayerRole::CoreBoundary,
            material: LayerMaterial::Void,
            inner_radius: hole_radius,
            outer_radius: hole_radius + VOID_BAND,
            source: "open_hole_boundary".to_string(),
            slot: None,
            family: None,
            perforated: false,
            open_hole_contact: hole_contact,
        });
    } else {
        layers.push(Layer {
            role: LayerRole::Core,
            material: LayerMaterial::Wellbore,
            inner_radius: 0.0,
            outer_radius: steel[0].inner_radius(),
            source: "bore".to_string(),
            slot: None,
            family: None,
            perforated: false,
            open_hole_contact: false,
        });
        for pipe in &steel {
            layers.push(Layer {
                role: LayerRole::Pipe,
                material: LayerMaterial::Steel,
                inner_radius: pipe.inner_radius(),
                outer_radius: pipe.outer_radius(),
                source: format!("pipe:{}", pipe.row_id),
                slot: None,
                family: Some(pipe.family),
                perforated: pipe_perforated_at(pipe, depth, &steel, &config.markers),
                open_hole_contact: false,
            });
        }
        for slot in annulus_slots_at(model, depth) {
            layers.extend(resolve_slot_material(&slot, depth, model, config));
        }
    }

    apply_plug_overlay(layers, depth, model, config)
}

/// `true` when any visible perforation marker on this casing covers `depth`.
/// Markers without an attach reference apply to the innermost active casing.
fn pipe_perforated_at(
    pipe: &NormalizedPipe,
    depth: f64,
    steel: &[&NormalizedPipe],
    markers: &[MarkerRow],
) -> bool {
    if pipe.family != PipeFamily::Casing {
        return false;
    }
    let innermost_casing = steel
        .iter()
        .find(|p| p.family == PipeFamily::Casing)
        .map(|p| p.row_id.as_str());
    markers.iter().any(|m| {
        m.kind == MarkerKind::Perforation
            && m.visible
            && m.bottom >= m.top
            && within_range(depth, m.top, m.bottom, DEPTH_EPSILON)
            && match m.attach.as_ref().and_then(|a| a.row_id.as_deref()) {
                Some(target) => target == pipe.row_id,
                None => innermost_casing == Some(pipe.row_id.as_str()),
            }
    })
}

/// Resolve the material filling one annulus slot: an active fluid row wins
/// over cement, which wins over the mud default. A manual-OD fluid clamp can
/// split the slot into a fluid band plus a mud remainder.
fn resolve_slot_material(
    slot: &SlotGeom,
    depth: f64,
    model: &GeometryModel,
    config: &WellConfiguration,
) -> Vec<Layer> {
    let base = Layer {
        role: LayerRole::Annulus,
        material: LayerMaterial::Mud,
        inner_radius: slot.inner_radius,
        outer_radius: slot.outer_radius,
        source: String::new(),
        slot: Some(slot.index),
        family: None,
        perforated: false,
        open_hole_contact: slot.open_hole_contact,
    };

    // Last fluid row in table order wins; a documented tie-break downstream
    // tests rely on.
    let fluid = config
        .fluids
        .iter()
        .filter(|f| {
            f.slot == slot.index
                && f.top.is_finite()
                && f.bottom.is_finite()
                && f.bottom > f.top
                && depth >= f.top
                && depth < f.bottom
        })
        .last();
    if let Some(fluid) = fluid {
        let mut outer = slot.outer_radius;
        if let Some(manual) = fluid.manual_od {
            let clamped = (manual / 2.0).clamp(slot.inner_radius, slot.outer_radius);
            if clamped > slot.inner_radius + RADIAL_EPSILON {
                outer = clamped;
            }
        }
        let mut out = vec![Layer {
            material: LayerMaterial::Fluid,
            outer_radius: outer,
            source: format!("fluid:{}", fluid.row_id),
            open_hole_contact: slot.open_hole_contact
                && outer >= slot.outer_radius - RADIAL_EPSILON,
            ..base.clone()
        }];
        if outer < slot.outer_radius - RADIAL_EPSILON {
            out.push(Layer {
                inner_radius: outer,
                source: "mud:default".to_string(),
                ..base
            });
        }
        return out;
    }

    let inner_pipe = model.pipe(&slot.inner_row_id);
    if let Some(pipe) = inner_pipe {
        if let Some(cement) = &pipe.cement {
            if cement.covers(depth) {
                return vec![Layer {
                    material: LayerMaterial::Cement,
                    source: format!("cement:{}", pipe.row_id),
                    ..base
                }];
            }
        }
    }

    // Inherited cement: a deeper, currently-inactive casing whose cement
    // column rises above its hanger into this slot's radial span.
    let inherited = model.pipes.iter().find(|c| {
        c.family == PipeFamily::Casing
            && !c.open_hole
            && !c.active_at(depth)
            && c.top > depth
            && c.cement.as_ref().is_some_and(|cem| cem.covers(depth))
            && c.outer_radius() > slot.inner_radius + RADIAL_EPSILON
            && c.outer_radius() <= slot.outer_radius + RADIAL_EPSILON
    });
    if let Some(casing) = inherited {
        return vec![Layer {
            material: LayerMaterial::Cement,
            source: format!("cement_inherited:{}", casing.row_id),
            ..base
        }];
    }

    vec![Layer {
        source: "mud:default".to_string(),
        ..base
    }]
}

// ---------------------------------------------------------------------------
// Plug overlay
// ---------------------------------------------------------------------------

/// Resolved radius for one plug row at `depth`: explicit manual width, else
/// the attach-target casing's inner/open-hole radius, else the innermost
/// active pipe's inner radius.
fn plug_radius_at(
    plug: &welltopo_types::PlugRow,
    depth: f64,
    model: &GeometryModel,
) -> Option<f64> {
    if let Some(width) = plug.manual_width {
        if width.is_finite() && width > 0.0 {
            return Some(width / 2.0);
        }
    }
    if let Some(target) = plug.attach.as_ref().and_then(|a| a.row_id.as_deref()) {
        if let Some(host) = model.pipe(target) {
            let radius = if host.open_hole {
                host.outer_radius()
            } else {
                host.inner_radius()
            };
            return Some(radius);
        }
    }
    let steel = active_steel_pipes(&model.pipes, depth);
    match steel.first() {
        Some(innermost) => Some(innermost.inner_radius()),
        None => Some(hole_radius_at(&model.pipes, depth).0),
    }
}

/// Trim the stack with the winning applied plug: non-steel layers fully
/// inside the plug radius are dropped, partially-inside layers are
/// re-inner-bounded, and steel walls are preserved unclipped. The plug itself
/// fills the non-steel span from the axis out to its radius.
fn apply_plug_overlay(
    layers: Vec<Layer>,
    depth: f64,
    model: &GeometryModel,
    config: &WellConfiguration,
) -> Vec<Layer> {
    let winner = config
        .plugs
        .iter()
        .filter(|p| {
            p.top.is_finite() && p.bottom.is_finite() && p.bottom > p.top && depth >= p.top
                && depth < p.bottom
        })
        .filter_map(|p| plug_radius_at(p, depth, model).map(|r| (p, r)))
        .max_by(|(_, ra), (_, rb)| ra.total_cmp(rb));
    let Some((plug, radius)) = winner else {
        return sorted(layers);
    };

    let mut kept: Vec<Layer> = Vec::new();
    let mut steel_spans: Vec<(f64, f64)> = Vec::new();
    for layer in layers {
        if layer.material == LayerMaterial::Steel {
            if layer.inner_radius < radius {
                steel_spans.push((layer.inner_radius, layer.outer_radius));
            }
            kept.push(layer);
            continue;
        }
        if layer.outer_radius <= radius + RADIAL_EPSILON {
            continue;
        }
        if layer.inner_radius < radius {
            let mut trimmed = layer;
            trimmed.inner_radius = radius;
            kept.push(trimmed);
        } else {
            kept.push(layer);
        }
    }

    // The plug occupies everything inside its radius except steel walls.
    steel_spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    let source = format!("plug:{}", plug.row_id);
    let mut cursor = 0.0;
    for (span_in, span_out) in steel_spans {
        if span_in > cursor + RADIAL_EPSILON {
            kept.push(plug_layer(cursor, span_in.min(radius), &source));
        }
        cursor = cursor.max(span_out);
        if cursor >= radius {
            break;
        }
    }
    if cursor < radius - RADIAL_EPSILON {
        kept.push(plug_layer(cursor, radius, &source));
    }
    sorted(kept)
}

fn plug_layer(inner: f64, outer: f64, source: &str) -> Layer {
    Layer {
        role: LayerRole::Core,
        material: LayerMaterial::Plug,
        inner_radius: inner,
        outer_radius: outer,
        source: source.to_string(),
        slot: None,
        family: None,
        perforated: false,
        open_hole_contact: false,
    }
}

fn sorted(mut layers: Vec<Layer>) -> Vec<Layer> {
    layers.retain(|l| l.outer_radius > l.inner_radius + RADIAL_EPSILON);
    layers.sort_by(|a, b| {
        a.inner_radius
            .total_cmp(&b.inner_radius)
            .then(a.outer_radius.total_cmp(&b.outer_radius))
    });
    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use welltopo_types::{AttachRef, FluidRow, PipeRow, PlugRow, TopologyOptions};

    fn model_for(config: &WellConfiguration) -> GeometryModel {
        GeometryModel::resolve(config, &TopologyOptions::default())
    }

    fn assert_contiguous(stack: &[Layer]) {
        for layer in stack {
            assert!(
                layer.outer_radius > layer.inner_radius,
                "degenerate layer: {layer:?}"
            );
        }
        for pair in stack.windows(2) {
            assert!(
                pair[1].inner_radius >= pair[0].outer_radius - 1e-9,
                "overlapping layers: {pair:?}"
            );
        }
    }

    #[test]
    fn bare_hole_stack_is_bore_plus_void_boundary() {
        let config = WellConfiguration {
            casing: vec![PipeRow::open_hole("oh", 12.25, 0.0, 5000.0)],
            ..Default::default()
        };
        let model = model_for(&config);
        let stack = stack_at_depth(2500.0, &model, &config);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack[0].role, LayerRole::Core);
        assert_eq!(stack[0].outer_radius, 12.25 / 2.0);
        assert!(stack[0].open_hole_contact);
        assert_eq!(stack[1].role, LayerRole::CoreBoundary);
        assert_eq!(stack[1].material, LayerMaterial::Void);
        assert_contiguous(&stack);
    }

    #[test]
    fn single_casing_stack_has_bore_wall_and_formation_annulus() {
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("c1", 9.625, 0.0, 5000.0),
                PipeRow::open_hole("oh", 12.25, 0.0, 5000.0),
            ],
            ..Default::default()
        };
        let model = model_for(&config);
        let stack = stack_at_depth(2500.0, &model, &config);
        let roles: Vec<_> = stack.iter().map(|l| l.role).collect();
        assert_eq!(
            roles,
            vec![LayerRole::Core, LayerRole::Pipe, LayerRole::Annulus]
        );
        assert_eq!(stack[2].slot, Some(0));
        assert!(stack[2].open_hole_contact);
        assert_eq!(stack[2].material, LayerMaterial::Mud);
        assert_contiguous(&stack);
    }

    #[test]
    fn stack_is_idempotent() {
        let mut casing = PipeRow::casing("c1", 9.625, 0.0, 5000.0);
        casing.cement_top = Some(2000.0);
        let config = WellConfiguration {
            casing: vec![casing, PipeRow::open_hole("oh", 12.25, 0.0, 5000.0)],
            fluids: vec![FluidRow::new("f1", "brine", 0, 0.0, 1500.0)],
            plugs: vec![PlugRow::new("pl1", 1000.0, 1200.0)],
            ..Default::default()
        };
        let model = model_for(&config);
        let first = stack_at_depth(1100.0, &model, &config);
        let second = stack_at_depth(1100.0, &model, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn cement_coverage_resolves_cement_material() {
        let mut casing = PipeRow::casing("c1", 9.625, 0.0, 5000.0);
        casing.cement_top = Some(3000.0);
        let config = WellConfiguration {
            casing: vec![casing, PipeRow::open_hole("oh", 12.25, 0.0, 5000.0)],
            ..Default::default()
        };
        let model = model_for(&config);
        let stack = stack_at_depth(4000.0, &model, &config);
        let annulus = stack.iter().find(|l| l.slot == Some(0)).unwrap();
        assert_eq!(annulus.material, LayerMaterial::Cement);
        assert_eq!(annulus.source, "cement:c1");
    }

    #[test]
    fn fluid_wins_over_cement() {
        let mut casing = PipeRow::casing("c1", 9.625, 0.0, 5000.0);
        casing.cement_top = Some(0.0);
        let config = WellConfiguration {
            casing: vec![casing, PipeRow::open_hole("oh", 12.25, 0.0, 5000.0)],
            fluids: vec![FluidRow::new("f1", "brine", 0, 0.0, 5000.0)],
            ..Default::default()
        };
        let model = model_for(&config);
        let stack = stack_at_depth(2500.0, &model, &config);
        let annulus = stack.iter().find(|l| l.slot == Some(0)).unwrap();
        assert_eq!(annulus.material, LayerMaterial::Fluid);
        assert_eq!(annulus.source, "fluid:f1");
    }

    #[test]
    fn last_fluid_row_in_table_order_wins() {
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("c1", 9.625, 0.0, 5000.0),
                PipeRow::open_hole("oh", 12.25, 0.0, 5000.0),
            ],
            fluids: vec![
                FluidRow::new("f1", "brine", 0, 0.0, 5000.0),
                FluidRow::new("f2", "diesel", 0, 0.0, 5000.0),
            ],
            ..Default::default()
        };
        let model = model_for(&config);
        let stack = stack_at_depth(2500.0, &model, &config);
        let annulus = stack.iter().find(|l| l.slot == Some(0)).unwrap();
        assert_eq!(annulus.source, "fluid:f2");
    }

    #[test]
    fn two_fluids_in_distinct_slots_resolve_distinct_layers() {
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("c2", 7.0, 0.0, 9000.0),
                PipeRow::casing("c1", 9.625, 0.0, 5000.0),
                PipeRow::open_hole("oh", 12.25, 0.0, 5000.0),
            ],
            fluids: vec![
                FluidRow::new("fa", "brine", 0, 0.0, 5000.0),
                FluidRow::new("fb", "mud", 1, 0.0, 5000.0),
            ],
            ..Default::default()
        };
        let model = model_for(&config);
        let stack = stack_at_depth(2500.0, &model, &config);
        let fluids: Vec<_> = stack
            .iter()
            .filter(|l| l.material == LayerMaterial::Fluid)
            .collect();
        assert_eq!(fluids.len(), 2);
        assert_eq!(fluids[0].slot, Some(0));
        assert_eq!(fluids[1].slot, Some(1));
        assert!(fluids[0].outer_radius <= fluids[1].inner_radius + 1e-9);
        assert_contiguous(&stack);
    }

    #[test]
    fn manual_od_clamp_splits_slot_into_fluid_and_mud() {
        let mut fluid = FluidRow::new("f1", "brine", 0, 0.0, 5000.0);
        fluid.manual_od = Some(10.5);
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("c1", 9.625, 0.0, 5000.0),
                PipeRow::open_hole("oh", 12.25, 0.0, 5000.0),
            ],
            fluids: vec![fluid],
            ..Default::default()
        };
        let model = model_for(&config);
        let stack = stack_at_depth(2500.0, &model, &config);
        let slot_layers: Vec<_> = stack.iter().filter(|l| l.slot == Some(0)).collect();
        assert_eq!(slot_layers.len(), 2);
        assert_eq!(slot_layers[0].material, LayerMaterial::Fluid);
        assert_eq!(slot_layers[0].outer_radius, 5.25);
        assert_eq!(slot_layers[1].material, LayerMaterial::Mud);
        assert_contiguous(&stack);
    }

    #[test]
    fn inherited_cement_rises_above_a_liner_hanger() {
        // The liner is inactive at 4000 but its cement column tops out at
        // 3500; the tubing-to-parent annulus radially contains the liner
        // wall, so it inherits the cement there.
        let mut liner = PipeRow::casing("liner", 7.0, 5500.0, 9000.0);
        liner.cement_top = Some(3500.0);
        liner.cement_bottom = Some(9000.0);
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("parent", 9.625, 0.0, 6000.0),
                liner,
                PipeRow::open_hole("oh", 12.25, 0.0, 9000.0),
            ],
            tubing: vec![PipeRow::tubing("t1", 4.5, 0.0, 5300.0)],
            ..Default::default()
        };
        let model = model_for(&config);
        let stack = stack_at_depth(4000.0, &model, &config);
        let annulus = stack.iter().find(|l| l.slot == Some(0)).unwrap();
        assert_eq!(annulus.material, LayerMaterial::Cement);
        assert_eq!(annulus.source, "cement_inherited:liner");

        // Above the cement top the same slot falls back to mud.
        let stack = stack_at_depth(3000.0, &model, &config);
        let annulus = stack.iter().find(|l| l.slot == Some(0)).unwrap();
        assert_eq!(annulus.material, LayerMaterial::Mud);
    }

    #[test]
    fn plug_overlay_trims_bore_and_preserves_steel() {
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("c1", 9.625, 0.0, 5000.0),
                PipeRow::open_hole("oh", 12.25, 0.0, 5000.0),
            ],
            plugs: vec![PlugRow::new("pl1", 1000.0, 1200.0)],
            ..Default::default()
        };
        let model = model_for(&config);
        let stack = stack_at_depth(1100.0, &model, &config);
        assert_eq!(stack[0].material, LayerMaterial::Plug);
        assert_eq!(stack[0].source, "plug:pl1");
        // Plug fills the bore up to the casing's inner radius.
        let c1_inner = model.pipe("c1").unwrap().inner_radius();
        assert!((stack[0].outer_radius - c1_inner).abs() < 1e-9);
        assert!(stack.iter().any(|l| l.material == LayerMaterial::Steel));
        assert!(!stack.iter().any(|l| l.material == LayerMaterial::Wellbore));
        assert_contiguous(&stack);
    }

    #[test]
    fn widest_plug_wins_and_straddles_steel() {
        let mut wide = PlugRow::new("wide", 1000.0, 1200.0);
        wide.attach = Some(AttachRef::to_row(PipeFamily::Casing, "c1"));
        let narrow = PlugRow::new("narrow", 1000.0, 1200.0);
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("c1", 9.625, 0.0, 5000.0),
                PipeRow::open_hole("oh", 12.25, 0.0, 5000.0),
            ],
            tubing: vec![PipeRow::tubing("t1", 4.5, 0.0, 4500.0)],
            plugs: vec![narrow, wide],
            ..Default::default()
        };
        let model = model_for(&config);
        let stack = stack_at_depth(1100.0, &model, &config);
        // The wide plug reaches the casing inner radius; the tubing wall
        // inside it stays unclipped, and the plug splits around it.
        let plug_layers: Vec<_> = stack
            .iter()
            .filter(|l| l.material == LayerMaterial::Plug)
            .collect();
        assert_eq!(plug_layers.len(), 2);
        assert!(stack
            .iter()
            .any(|l| l.material == LayerMaterial::Steel && l.family == Some(PipeFamily::Tubing)));
        assert_contiguous(&stack);
    }

    #[test]
    fn perforation_marker_flags_the_host_wall() {
        let mut marker = MarkerRow::new("m1", MarkerKind::Perforation, 2000.0, 2200.0);
        marker.attach = Some(AttachRef::to_row(PipeFamily::Casing, "c1"));
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("c1", 9.625, 0.0, 5000.0),
                PipeRow::open_hole("oh", 12.25, 0.0, 5000.0),
            ],
            markers: vec![marker],
            ..Default::default()
        };
        let model = model_for(&config);
        let stack = stack_at_depth(2100.0, &model, &config);
        let wall = stack.iter().find(|l| l.role == LayerRole::Pipe).unwrap();
        assert!(wall.perforated);
        let stack = stack_at_depth(2500.0, &model, &config);
        let wall = stack.iter().find(|l| l.role == LayerRole::Pipe).unwrap();
        assert!(!wall.perforated);
    }
}
