// Domain layer: reading models and the storage port. No I/O here.

pub mod model;
pub mod ports;
