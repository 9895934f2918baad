// Domain layer: request/response types, categorical domains and ports.

pub mod categories;
pub mod model;
pub mod ports;
