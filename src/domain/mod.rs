// Domain layer: render models and ports (interfaces).

pub mod model;
pub mod ports;
