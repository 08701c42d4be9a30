//! Critical depths and interval construction.
//!
//! Every row boundary becomes a depth event. The sorted, deduped event depths
//! split the well into contiguous intervals; each interval edge then re-probes
//! the full event list so it can carry every reason a transition exists there,
//! never just the first one found.

use welltopo_types::tolerance::{approx_eq, DEPTH_EPSILON};
use welltopo_types::{
    BoundaryReason, BoundaryReasonKind, Interval, MarkerKind, WellConfiguration,
};

use crate::stack::stack_at_depth;
use crate::GeometryModel;

struct DepthEvent {
    depth: f64,
    reason: BoundaryReason,
}

impl DepthEvent {
    fn new(depth: f64, reason: BoundaryReason) -> Self {
        Self { depth, reason }
    }
}

fn collect_events(model: &GeometryModel, config: &WellConfiguration) -> Vec<DepthEvent> {
    let mut events = Vec::new();

    for pipe in &model.pipes {
        let label = if pipe.open_hole { "open_hole" } else { "pipe" };
        events.push(DepthEvent::new(
            pipe.top,
            BoundaryReason::new(BoundaryReasonKind::PipeStart)
                .with_label(label)
                .with_row(&pipe.row_id),
        ));
        events.push(DepthEvent::new(
            pipe.bottom,
            BoundaryReason::new(BoundaryReasonKind::PipeEnd)
                .with_label(label)
                .with_row(&pipe.row_id),
        ));
        if let Some(cement) = &pipe.cement {
            events.push(DepthEvent::new(
                cement.top,
                BoundaryReason::new(BoundaryReasonKind::CementStart).with_row(&pipe.row_id),
            ));
            events.push(DepthEvent::new(
                cement.bottom,
                BoundaryReason::new(BoundaryReasonKind::CementEnd).with_row(&pipe.row_id),
            ));
        }
    }

    for (index, fluid) in config.fluids.iter().enumerate() {
        if !fluid.top.is_finite() || !fluid.bottom.is_finite() || fluid.bottom <= fluid.top {
            continue;
        }
        events.push(DepthEvent::new(
            fluid.top,
            BoundaryReason::new(BoundaryReasonKind::FluidStart)
                .with_label(&fluid.label)
                .with_row(&fluid.row_id)
                .with_source_index(index),
        ));
        events.push(DepthEvent::new(
            fluid.bottom,
            BoundaryReason::new(BoundaryReasonKind::FluidEnd)
                .with_label(&fluid.label)
                .with_row(&fluid.row_id)
                .with_source_index(index),
        ));
    }

    for plug in &config.plugs {
        if !plug.top.is_finite() || !plug.bottom.is_finite() || plug.bottom <= plug.top {
            continue;
        }
        events.push(DepthEvent::new(
            plug.top,
            BoundaryReason::new(BoundaryReasonKind::PlugStart).with_row(&plug.row_id),
        ));
        events.push(DepthEvent::new(
            plug.bottom,
            BoundaryReason::new(BoundaryReasonKind::PlugEnd).with_row(&plug.row_id),
        ));
    }

    for equipment in &config.equipment {
        if equipment.depth.is_finite() {
            events.push(DepthEvent::new(
                equipment.depth,
                BoundaryReason::new(BoundaryReasonKind::EquipmentTransition)
                    .with_label(equipment.kind.as_str())
                    .with_row(&equipment.row_id),
            ));
        }
    }

    for connection in &model.connections {
        events.push(DepthEvent::new(
            connection.midpoint(),
            BoundaryReason::new(BoundaryReasonKind::ConnectionTransition)
                .with_row(&connection.child_id),
        ));
    }

    for barrier in &model.barriers {
        events.push(DepthEvent::new(
            barrier.depth,
            BoundaryReason::new(BoundaryReasonKind::BarrierTransition).with_row(&barrier.child_id),
        ));
    }

    for marker in &config.markers {
        if !marker.visible || !marker.top.is_finite() || !marker.bottom.is_finite() {
            continue;
        }
        let label = match marker.kind {
            MarkerKind::Perforation => "perforation",
            MarkerKind::Leak => "leak",
        };
        if (marker.bottom - marker.top).abs() <= DEPTH_EPSILON {
            events.push(DepthEvent::new(
                marker.top,
                BoundaryReason::new(BoundaryReasonKind::MarkerPoint)
                    .with_label(label)
                    .with_row(&marker.row_id),
            ));
        } else if marker.bottom > marker.top {
            events.push(DepthEvent::new(
                marker.top,
                BoundaryReason::new(BoundaryReasonKind::MarkerStart)
                    .with_label(label)
                    .with_row(&marker.row_id),
            ));
            events.push(DepthEvent::new(
                marker.bottom,
                BoundaryReason::new(BoundaryReasonKind::MarkerEnd)
                    .with_label(label)
                    .with_row(&marker.row_id),
            ));
        }
        // Inverted marker ranges contribute nothing here; the edge builder
        // warns about them.
    }

    events
}

/// Every reason recorded at (approximately) this depth, in event order.
fn reasons_at(events: &[DepthEvent], depth: f64) -> Vec<BoundaryReason> {
    events
        .iter()
        .filter(|e| approx_eq(e.depth, depth, DEPTH_EPSILON))
        .map(|e| e.reason.clone())
        .collect()
}

/// Split the model into contiguous depth intervals with midpoint stacks and
/// boundary reasons on both edges.
pub fn build_intervals(model: &GeometryModel, config: &WellConfiguration) -> Vec<Interval> {
    let events = collect_events(model, config);

    let mut depths: Vec<f64> = events.iter().map(|e| e.depth).collect();
    depths.sort_by(f64::total_cmp);
    depths.dedup_by(|a, b| approx_eq(*a, *b, DEPTH_EPSILON));
    if depths.len() < 2 {
        return Vec::new();
    }

    let mut intervals = Vec::with_capacity(depths.len() - 1);
    for (index, pair) in depths.windows(2).enumerate() {
        let (top, bottom) = (pair[0], pair[1]);
        let midpoint = (top + bottom) / 2.0;
        let stack = stack_at_depth(midpoint, model, config);
        let open_hole = stack.iter().any(|l| l.open_hole_contact);

        let mut top_reasons = reasons_at(&events, top);
        if top_reasons.is_empty() {
            top_reasons.push(BoundaryReason::new(BoundaryReasonKind::Depth));
        }
        if index == 0 {
            top_reasons.insert(0, BoundaryReason::new(BoundaryReasonKind::ModelStart));
        }

        let mut bottom_reasons = reasons_at(&events, bottom);
        if bottom_reasons.is_empty() {
            bottom_reasons.push(BoundaryReason::new(BoundaryReasonKind::Depth));
        }
        if index == depths.len() - 2 {
            bottom_reasons.push(BoundaryReason::new(BoundaryReasonKind::ModelEnd));
        }

        intervals.push(Interval {
            index,
            top,
            bottom,
            midpoint,
            stack,
            top_reasons,
            bottom_reasons,
            open_hole,
        });
    }
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use welltopo_types::{
        EquipmentKind, EquipmentRow, FluidRow, MarkerRow, PipeRow, TopologyOptions,
    };

    fn build(config: &WellConfiguration) -> Vec<Interval> {
        let model = GeometryModel::resolve(config, &TopologyOptions::default());
        build_intervals(&model, config)
    }

    fn reasons(list: &[BoundaryReason]) -> Vec<BoundaryReasonKind> {
        list.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn empty_configuration_yields_no_intervals() {
        assert!(build(&WellConfiguration::default()).is_empty());
    }

    #[test]
    fn single_pipe_yields_one_interval_with_model_tags() {
        let config = WellConfiguration {
            casing: vec![PipeRow::casing("c1", 9.625, 0.0, 5000.0)],
            ..Default::default()
        };
        let intervals = build(&config);
        assert_eq!(intervals.len(), 1);
        let iv = &intervals[0];
        assert_eq!(iv.top, 0.0);
        assert_eq!(iv.bottom, 5000.0);
        assert_eq!(iv.midpoint, 2500.0);
        assert_eq!(
            reasons(&iv.top_reasons),
            vec![BoundaryReasonKind::ModelStart, BoundaryReasonKind::PipeStart]
        );
        assert_eq!(
            reasons(&iv.bottom_reasons),
            vec![BoundaryReasonKind::PipeEnd, BoundaryReasonKind::ModelEnd]
        );
        assert!(!iv.stack.is_empty());
    }

    #[test]
    fn intervals_are_contiguous_and_indexed() {
        let mut c1 = PipeRow::casing("c1", 9.625, 0.0, 5000.0);
        c1.cement_top = Some(3000.0);
        let config = WellConfiguration {
            casing: vec![c1, PipeRow::casing("c2", 7.0, 5000.02, 9000.0)],
            ..Default::default()
        };
        let intervals = build(&config);
        assert!(intervals.len() >= 3);
        for (i, iv) in intervals.iter().enumerate() {
            assert_eq!(iv.index, i);
            assert!(iv.bottom > iv.top);
        }
        for pair in intervals.windows(2) {
            assert_eq!(pair[0].bottom, pair[1].top);
        }
    }

    #[test]
    fn coincident_boundaries_keep_all_reasons() {
        // Casing end and fluid end land on the same depth; both reasons must
        // survive on the shared edge.
        let config = WellConfiguration {
            casing: vec![PipeRow::casing("c1", 9.625, 0.0, 5000.0)],
            fluids: vec![FluidRow::new("f1", "brine", 0, 1000.0, 5000.0)],
            ..Default::default()
        };
        let intervals = build(&config);
        let last = intervals.last().unwrap();
        let kinds = reasons(&last.bottom_reasons);
        assert!(kinds.contains(&BoundaryReasonKind::PipeEnd));
        assert!(kinds.contains(&BoundaryReasonKind::FluidEnd));
        assert!(kinds.contains(&BoundaryReasonKind::ModelEnd));
    }

    #[test]
    fn zero_length_marker_is_a_point_event() {
        let config = WellConfiguration {
            casing: vec![PipeRow::casing("c1", 9.625, 0.0, 5000.0)],
            markers: vec![MarkerRow::new("m1", MarkerKind::Leak, 2500.0, 2500.0)],
            ..Default::default()
        };
        let intervals = build(&config);
        assert_eq!(intervals.len(), 2);
        assert_eq!(
            reasons(&intervals[0].bottom_reasons),
            vec![BoundaryReasonKind::MarkerPoint]
        );
    }

    #[test]
    fn invisible_markers_do_not_split_intervals() {
        let mut marker = MarkerRow::new("m1", MarkerKind::Perforation, 2000.0, 2200.0);
        marker.visible = false;
        let config = WellConfiguration {
            casing: vec![PipeRow::casing("c1", 9.625, 0.0, 5000.0)],
            markers: vec![marker],
            ..Default::default()
        };
        assert_eq!(build(&config).len(), 1);
    }

    #[test]
    fn equipment_point_splits_intervals() {
        let config = WellConfiguration {
            casing: vec![PipeRow::casing("c1", 9.625, 0.0, 5000.0)],
            equipment: vec![EquipmentRow::new("p1", EquipmentKind::Packer, 4800.0)],
            ..Default::default()
        };
        let intervals = build(&config);
        assert_eq!(intervals.len(), 2);
        let reason = &intervals[0].bottom_reasons[0];
        assert_eq!(reason.kind, BoundaryReasonKind::EquipmentTransition);
        assert_eq!(reason.label.as_deref(), Some("packer"));
        assert_eq!(reason.row_id.as_deref(), Some("p1"));
    }

    #[test]
    fn connection_midpoint_splits_intervals() {
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("a", 9.625, 0.0, 5000.0),
                PipeRow::casing("b", 7.0, 5050.0, 9000.0),
            ],
            ..Default::default()
        };
        let intervals = build(&config);
        let crossover_edge = intervals
            .iter()
            .find(|iv| {
                iv.bottom_reasons
                    .iter()
                    .any(|r| r.kind == BoundaryReasonKind::ConnectionTransition)
            })
            .unwrap();
        assert!((crossover_edge.bottom - 5025.0).abs() < 1e-9);
    }

    #[test]
    fn open_hole_flag_follows_the_stack() {
        let config = WellConfiguration {
            casing: vec![
                PipeRow::casing("c1", 9.625, 0.0, 5000.0),
                PipeRow::open_hole("oh", 8.5, 5000.0, 7000.0),
            ],
            ..Default::default()
        };
        let intervals = build(&config);
        let cased = intervals.iter().find(|iv| iv.contains(2500.0)).unwrap();
        let open = intervals.iter().find(|iv| iv.contains(6000.0)).unwrap();
        assert!(!cased.open_hole);
        assert!(open.open_hole);
    }
}
