#![allow(clippy::implicit_hasher)]
#![allow(unknown_lints)]

#[macro_use]
mod logging;

pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod interpolate;
pub mod manchette;
pub mod models;
pub mod occupancy;
pub mod occurrence;
pub mod paths;
pub mod render;
pub mod scale;
pub mod snapshot;
pub mod time;

pub use config::ChartConfig;
pub use error::{ChartError, Result};
pub use interaction::InteractionController;
pub use scale::ChartView;
