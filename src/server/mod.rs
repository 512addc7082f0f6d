//! HTTP compute worker: answers compute-endpoint calls with the local
//! dispatcher.

pub mod handler;
pub mod response_format;
pub mod worker_server;
