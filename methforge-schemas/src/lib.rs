pub mod component;
pub mod equipment;
pub mod fan;
pub mod file_formats;
pub mod parameters;
pub mod sorbent;
pub mod tables;
pub mod technology;
