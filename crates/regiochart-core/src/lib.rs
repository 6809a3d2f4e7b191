#![forbid(unsafe_code)]

//! Data side of the regional report chart engine.
//!
//! This crate turns a loosely typed chart request (categories plus bar and line series, usually
//! lifted straight out of a precomputed report JSON) into a rectangular, finite-valued
//! [`NormalizedChart`], and computes the value [`Domain`] the chart has to cover.
//!
//! Layout and SVG geometry live in `regiochart-render`.

pub mod config;
pub mod domain;
pub mod error;
pub mod model;
pub mod normalize;

pub use domain::{Domain, StackTotals, compute_domain, stack_totals};
pub use error::{Error, Result};
pub use model::{
    ChartConfig, ChartRequest, NormalizedChart, RawSeries, Series, SeriesKind, ValueKind,
};
pub use normalize::{coerce_value, normalize, normalize_categories, scalar_label};
