pub mod attribute;
pub mod builder;
pub mod edge;
pub mod error;
pub mod extraction;
pub mod graph;
pub mod node;
pub mod ports;
pub mod propagation;
pub mod refiner;
pub mod updater;
