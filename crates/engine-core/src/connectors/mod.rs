//! Collaborators the chunk orchestrator drives. Dialect specific SQL, network
//! mechanics and credentials all live behind these traits.

pub mod source;
pub mod target;
pub mod transport;
