pub mod interface;
pub mod launcher;
pub mod memory;
pub mod model;
pub mod status;
