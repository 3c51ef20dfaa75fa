//! genz command implementations.

pub mod family;
pub mod monitor;
pub mod send;
