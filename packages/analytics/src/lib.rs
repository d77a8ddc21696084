#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derived metrics for the Sinaloa homicide report.
//!
//! Every function here is pure: it takes parsed [`CrimeRecord`] rows (or the
//! JSON shapes from `sinaloa_report_source_models`) and returns result types
//! from `sinaloa_report_analytics_models`. A missing or non-numeric cell
//! counts as zero, and a percent change against zero is reported as 0%.
//!
//! [`CrimeRecord`]: sinaloa_report_source_models::CrimeRecord

pub mod age;
pub mod annual;
pub mod choropleth;
pub mod markers;
pub mod metrics;
pub mod monthly;
pub mod ranking;
pub mod regional;
pub mod spillover;
pub mod war;

pub use metrics::{percent_change, rate_per_100k, round_to};
