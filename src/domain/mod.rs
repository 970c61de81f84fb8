//! Domain layer: records, value objects and the ports the pipeline talks to.

pub mod entities;
pub mod ports;
pub mod value_objects;
