// Domain layer: quote model and the ports the store talks through.

pub mod model;
pub mod ports;
