// Domain layer: upload models, service DTOs and the ports the rest of the crate implements.

pub mod model;
pub mod ports;
pub mod sentiment;
