//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache cleanup: removes expired cache entries at configured intervals
//! - Session sweep: removes expired sessions at configured intervals

mod cleanup;
mod session_sweep;

pub use cleanup::spawn_cache_cleanup_task;
pub use session_sweep::spawn_session_sweep_task;
