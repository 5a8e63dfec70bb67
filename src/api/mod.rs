//! HTTP API - one route per studio action

pub mod handlers;
pub mod routes;
