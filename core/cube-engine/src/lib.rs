//! FILENAME: core/cube-engine/src/lib.rs
//! Data-cube subsystem for the insight dashboard.
//!
//! This crate holds the full record set in memory and derives every view the
//! dashboard shows from one filtered subset. It depends on `engine` for the
//! record model (RawRecord, NormalizedRecord, Dimension).
//!
//! Layers:
//! - `definition`: Serializable configuration (what the user SELECTED)
//! - `filter`: Predicate evaluation (WHICH records survive)
//! - `aggregate`: Chart projections and KPIs (WHAT we summarize)
//! - `pagination`: The visible table window
//! - `options`: Dropdown values from the full dataset
//! - `view`: Renderable output for the frontend (WHAT we display)
//! - `cube`: The session object tying the layers together

pub mod definition;
pub mod filter;
pub mod aggregate;
pub mod pagination;
pub mod options;
pub mod view;
pub mod cube;

pub use definition::*;
pub use filter::{apply, FilterPlan, ValueCounts};
pub use aggregate::{aggregate, intensity_of, likelihood_label, AggregateBundle, AggregateView, Kpis};
pub use pagination::{paginate, PageWindow};
pub use options::{derive_options, DimensionOptions};
pub use view::{ChartBundle, ChartDataset, ChartView, TableRow};
pub use cube::{Cube, CubeSnapshot, LoadTicket};
