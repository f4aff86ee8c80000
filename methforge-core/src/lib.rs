pub mod config;
pub mod costing;
pub mod economics;
pub mod error;
pub mod export;
pub mod heat;
pub mod model;
pub mod network;
pub mod physics;
pub mod plant;
pub mod selection;
pub mod solve;
pub mod units;
