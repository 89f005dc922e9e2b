// Domain layer: shared value types and the ports plugins are written against.

pub mod model;
pub mod ports;
