//! The `cascade_core` crate sweeps two two-term recurrences over a grid of
//! `(r, b)` coefficients and records their trajectories for frame-by-frame plotting.
//!
//! Key components:
//! - **Sweep**: `SweepEngine` (stabilization, then recording through a sliding `Window`).
//! - **Worker**: `spawn_sweep` runs an engine on a thread with progress and cancellation.
//! - **View**: `SweepResult` exposes the current frame's slices and axis limits.
//! - **Divergence**: non-finite values are zeroed and the affected steps land in an `ErrorLog`.

pub mod config;
pub mod divergence;
pub mod error;
pub mod grid;
pub mod history;
pub mod map;
pub mod orbit;
pub mod presets;
pub mod progress;
pub mod solvers;
pub mod sweep;
pub mod traits;
pub mod view;
pub mod window;
pub mod worker;
