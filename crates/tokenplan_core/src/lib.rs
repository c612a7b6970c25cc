//! Tokenplan core: descriptors, model selection, scaling and duration estimates.
//!
//! Everything here is pure; file and network access live in `tokenplan_engine`.
mod accounting;
mod descriptor;
mod duration;
mod estimate;
mod scale;
mod selection;

pub use accounting::{AccountingResult, ModelTally};
pub use descriptor::{BudgetConfig, DatasetDescriptor, MethodProfile, ModelDescriptor};
pub use duration::format_duration;
pub use estimate::{DurationEstimate, DurationEstimator, EstimateError};
pub use scale::{format_size, parse_size, scale, ScaleError, SizeParseError};
pub use selection::{plan_loads, SelectionError, SelectionPlan};
