//! Shared pieces of the candleplay binaries.

pub mod logger;
