//! Reusable observers and plotting for cellsim.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across the cellsim solvers and [`Simulation`].
//!
//! # Modules
//!
//! - [`traits`]: Capability traits for cross-solver observers
//!   ([`HasTime`], [`HasResidual`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`Limit`]: stops after a number of steps or at a time
//! - [`ProgressLog`]: logs steps through the `log` facade
//!
//! # Features
//!
//! - `plot`: Enables [`quick_plot`] for viewing a solution via egui.
//!   This feature adds dependencies on `eframe` and `egui_plot`.
//!
//! [`Observer`]: cellsim_core::Observer
//! [`Simulation`]: cellsim_symbolic::Simulation
//! [`HasTime`]: traits::HasTime
//! [`HasResidual`]: traits::HasResidual
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod limit;
mod logging;

pub use limit::Limit;
pub use logging::ProgressLog;

#[cfg(feature = "plot")]
mod plot;

#[cfg(feature = "plot")]
pub use plot::{PlotError, Series, ShowConfig, quick_plot, series};
