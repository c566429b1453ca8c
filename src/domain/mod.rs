// Domain layer: records and the ports the harvesting core is written against.

pub mod model;
pub mod ports;
