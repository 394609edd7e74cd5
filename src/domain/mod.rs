// Domain layer: the pure pricing core and its ports. No I/O here beyond the
// trait definitions the adapters implement.

pub mod advisor;
pub mod engine;
pub mod freight;
pub mod model;
pub mod money;
pub mod ports;
pub mod report;
