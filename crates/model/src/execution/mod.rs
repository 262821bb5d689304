pub mod chunk;
pub mod errors;
pub mod partition;
pub mod staging;
