/*
 * Responsibility
 * - v1 public surface: routes(), the route policy table, and the path prefix
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{PREFIX, policy, routes};
