pub mod aggregate;
pub mod collect;
pub mod open;
pub mod reconcile;
