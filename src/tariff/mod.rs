//! Octopus Energy tariff integration
//!
//! `client` speaks to the public REST API, `source` layers the per-day file
//! cache on top of any [`PriceFetcher`].

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub mod client;
pub mod source;
pub mod types;

pub use client::TariffClient;
pub use source::{DayPrices, GasReading, PriceOrigin, TariffSource};
pub use types::{GasPrice, PricePoint, PriceSeries, Slot};

/// Anything that can produce unit rates for a local day
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Half-hourly electricity rates whose local start date is `date`
    async fn fetch_unit_rates(&self, date: NaiveDate) -> Result<PriceSeries>;

    /// Gas unit rates for `today` and the following day
    async fn fetch_gas(&self, today: NaiveDate) -> Result<GasPrice>;
}
