//! Route reachability checks
//!
//! - `readiness`: polls a status query until an object exposes an address
//! - `probe`: runs HTTP probes concurrently under one shared deadline
//! - `cluster`: Route and router Service collaborators backed by kube
//! - `scenario`: resolves routes, then probes them as one batch

pub mod cancel;
pub mod clock;
pub mod cluster;
pub mod config;
pub mod probe;
pub mod readiness;
pub mod scenario;
