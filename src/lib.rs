//! Maintenance schedule derivation and persistence.
//!
//! A [`models::MachineRecord`] goes through [`generator::generate`] to become a
//! dated task list with an advisory message. [`planner::MaintenancePlanner`]
//! holds the current schedule, saves and loads schedules through a
//! [`store::Store`], and exports them as JSON or PDF.

pub mod advisory;
pub mod checklist;
pub mod codec;
pub mod config;
pub mod draft;
pub mod error;
pub mod export;
pub mod generator;
pub mod input;
pub mod machines;
pub mod models;
pub mod planner;
pub mod repository;
pub mod session;
pub mod store;
