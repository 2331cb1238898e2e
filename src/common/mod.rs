//! Common, shared types.

pub mod error;
pub mod layers;
pub mod random;
pub mod schedule;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
