//! Domain models used by the client state engine.

pub mod pet;
pub mod session;
