// Domain layer: request/response models and the lookup port.

pub mod model;
pub mod ports;
