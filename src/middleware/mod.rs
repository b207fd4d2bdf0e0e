/*
 * Responsibility
 * - Middleware entry points applied in app.rs
 * - auth: per-request authentication + route authorization
 * - http: transport concerns (request id, tracing, limits, timeout)
 */
pub mod auth;
pub mod http;
