// Domain layer: geographic reference models, query filters and ports (interfaces).
// Adapters implement the ports; the core only talks to the traits.

pub mod dto;
pub mod model;
pub mod ports;
pub mod query;
