//! Sheetbridge API Server module
//!
//! HTTP front end for the merge and convert operations.
//! Run with `sheetbridge-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server};
