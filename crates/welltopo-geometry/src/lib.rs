//! Geometry resolver: raw pipe/cement/fluid/plug rows to connections,
//! hangers, critical-depth intervals, and per-depth radial material stacks.
//!
//! This crate is independent of the equipment rule engine. It turns the
//! loosely-typed row tables into a `GeometryModel` and answers two questions:
//! what does the well look like radially at any depth, and where do the
//! depth-wise transitions sit.

pub mod attachment;
pub mod connections;
pub mod hangers;
pub mod intervals;
pub mod normalize;
pub mod stack;

pub use attachment::{resolve_seal_slot, AttachmentOutcome, SealSlot};
pub use connections::resolve_connections;
pub use hangers::resolve_hangers;
pub use intervals::build_intervals;
pub use normalize::{normalize_pipe_rows, CementInterval, NormalizedPipe};
pub use stack::stack_at_depth;

use welltopo_types::{Barrier, Connection, TopologyOptions, WellConfiguration};

/// Ambient hole diameter assumed when no pipe and no open-hole row covers a
/// depth.
pub const AMBIENT_HOLE_DIAMETER: f64 = 36.0;

/// The resolved structural model: normalized pipes plus their mechanical
/// relationships. Input rows that cannot be interpreted as a physical object
/// are silently absent.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryModel {
    pub pipes: Vec<NormalizedPipe>,
    pub connections: Vec<Connection>,
    pub barriers: Vec<Barrier>,
}

impl GeometryModel {
    pub fn resolve(config: &WellConfiguration, options: &TopologyOptions) -> Self {
        let pipes = normalize_pipe_rows(config);
        let connections = resolve_connections(&pipes, options);
        let barriers = resolve_hangers(&pipes, &connections);
        Self {
            pipes,
            connections,
            barriers,
        }
    }

    /// Pipe lookup by stable row id.
    pub fn pipe(&self, row_id: &str) -> Option<&NormalizedPipe> {
        self.pipes.iter().find(|p| p.row_id == row_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use welltopo_types::PipeRow;

    #[test]
    fn resolve_builds_model_from_configuration() {
        let mut config = WellConfiguration::default();
        config.casing.push(PipeRow::casing("c1", 9.625, 0.0, 5000.0));
        config.casing.push(PipeRow::casing("c2", 7.0, 5000.02, 9000.0));
        let model = GeometryModel::resolve(&config, &TopologyOptions::default());
        assert_eq!(model.pipes.len(), 2);
        assert_eq!(model.connections.len(), 1);
        assert!(model.pipe("c1").is_some());
        assert!(model.pipe("missing").is_none());
    }
}
