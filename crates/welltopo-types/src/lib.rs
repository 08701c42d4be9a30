//! Shared types for the welltopo wellbore-topology resolver.
//!
//! This crate provides the foundational types used across the other welltopo
//! crates:
//! - input row records (`PipeRow`, `EquipmentRow`, `MarkerRow`, ...) and the
//!   `WellConfiguration` ingestion surface
//! - closed enums for volume kinds, materials, and equipment/edge states
//! - the `WarningCode` catalog and `ValidationWarning` payload
//! - graph value types (`Interval`, `GraphNode`, `GraphEdge`, ...)
//! - `TopologyError` — unified error taxonomy
//! - tolerance utilities shared by every depth/radius comparison

pub mod error;
pub mod graph;
pub mod rows;
pub mod tolerance;
pub mod volumes;
pub mod warnings;

pub use error::{Result, TopologyError};
pub use graph::{
    Barrier, BarrierKind, BoundaryReason, BoundaryReasonKind, Connection, ConnectionKind,
    EdgeReason, EffectContributor, GraphEdge, GraphNode, Interval, Layer, LayerRole,
    ResolvedEquipmentEffect, SourceChannel, SourceEntity, SourcePolicy, SourcePolicyMode,
    TopologyResult, SURFACE_NODE_ID,
};
pub use rows::{
    AttachRef, EquipmentRow, FluidRow, MarkerRow, PipeRow, PlugRow, SourceRow, TopologyOptions,
    WellConfiguration,
};
pub use volumes::{
    ActuationState, EdgeKind, EdgeState, EquipmentKind, IntegrityStatus, LayerMaterial, LinerMode,
    MarkerKind, OperationPhase, PipeFamily, SourceRowKind, VolumeKind,
};
pub use warnings::{ValidationWarning, WarningCategory, WarningCode};
