//! HTTP API for placehub-qa
//!
//! REST handlers plus the realtime WebSocket endpoint. Routing lives in
//! `crate::build_router`.

pub mod handlers;
pub mod live;
