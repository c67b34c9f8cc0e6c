//! Role gate and route policy table.
//!
//! Compiles access configuration into a lookup table that the gate
//! middleware consults on every protected request.

pub mod gate;
pub mod table;

pub use gate::RoleGate;
pub use table::{PolicyDecision, PolicyTable, PROTECTED_ROUTES};
