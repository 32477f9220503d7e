use crate::cache::PriceCache;
use crate::logging::{StructuredLogger, get_logger};
use crate::tariff::PriceFetcher;
use crate::tariff::types::{GasPrice, PriceSeries};
use chrono::{Days, NaiveDate};
use std::fmt;

/// Where a day's prices came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceOrigin {
    Cache,
    Network,
    /// Generated locally for testing
    Mock,
    /// Fetch failed; the series is empty
    Unavailable { reason: String },
}

impl PriceOrigin {
    pub const fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable { .. })
    }
}

impl fmt::Display for PriceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => f.write_str("cache"),
            Self::Network => f.write_str("network"),
            Self::Mock => f.write_str("mock"),
            Self::Unavailable { reason } => write!(f, "unavailable ({})", reason),
        }
    }
}

/// Unit rates for one local day plus their provenance
#[derive(Debug, Clone)]
pub struct DayPrices {
    pub date: NaiveDate,
    pub series: PriceSeries,
    pub origin: PriceOrigin,
}

impl DayPrices {
    pub fn unavailable(date: NaiveDate, reason: impl Into<String>) -> Self {
        Self {
            date,
            series: PriceSeries::empty(),
            origin: PriceOrigin::Unavailable {
                reason: reason.into(),
            },
        }
    }
}

/// Gas prices plus provenance (gas is never cached)
#[derive(Debug, Clone)]
pub struct GasReading {
    pub price: GasPrice,
    pub origin: PriceOrigin,
}

/// Cache-first price source
pub struct TariffSource<F> {
    fetcher: F,
    cache: PriceCache,
    logger: StructuredLogger,
}

impl<F: PriceFetcher> TariffSource<F> {
    pub fn new(fetcher: F, cache: PriceCache) -> Self {
        Self {
            fetcher,
            cache,
            logger: get_logger("tariff_source"),
        }
    }

    pub const fn cache(&self) -> &PriceCache {
        &self.cache
    }

    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Cached prices for `date` if present, otherwise fetch and cache a non-empty result
    pub async fn fetch_or_load(&self, date: NaiveDate) -> DayPrices {
        let logger = self.logger.for_date(date);

        match self.cache.load(date) {
            Ok(Some(series)) => {
                return DayPrices {
                    date,
                    series,
                    origin: PriceOrigin::Cache,
                };
            }
            Ok(None) => {}
            Err(e) => logger.warn(&format!("Ignoring unreadable cache: {}", e)),
        }

        match self.fetcher.fetch_unit_rates(date).await {
            Ok(series) => {
                if series.is_empty() {
                    logger.info("No prices published yet");
                } else if let Err(e) = self.cache.store(date, &series) {
                    logger.warn(&format!("Failed to write cache: {}", e));
                }
                DayPrices {
                    date,
                    series,
                    origin: PriceOrigin::Network,
                }
            }
            Err(e) => {
                logger.error(&format!("Failed to fetch prices: {}", e));
                DayPrices::unavailable(date, e.to_string())
            }
        }
    }

    /// Evict stale cache files, then resolve today and tomorrow
    pub async fn load_days(&self, today: NaiveDate) -> (DayPrices, DayPrices) {
        if let Err(e) = self.cache.evict_before(today) {
            self.logger
                .warn(&format!("Cache eviction failed: {}", e));
        }
        let today_prices = self.fetch_or_load(today).await;
        let tomorrow_prices = self.fetch_or_load(today + Days::new(1)).await;
        (today_prices, tomorrow_prices)
    }

    /// Gas prices for today and tomorrow; failures yield absent values
    pub async fn fetch_gas(&self, today: NaiveDate) -> GasReading {
        match self.fetcher.fetch_gas(today).await {
            Ok(price) => GasReading {
                price,
                origin: PriceOrigin::Network,
            },
            Err(e) => {
                self.logger
                    .for_date(today)
                    .error(&format!("Failed to fetch gas prices: {}", e));
                GasReading {
                    price: GasPrice::default(),
                    origin: PriceOrigin::Unavailable {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }
}
