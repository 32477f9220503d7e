use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Europe::London;
use octodash::cache::PriceCache;
use octodash::error::{OctodashError, Result};
use octodash::tariff::{
    GasPrice, PriceFetcher, PriceOrigin, PricePoint, PriceSeries, Slot, TariffSource,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves canned series per date and counts calls
#[derive(Default)]
struct FakeFetcher {
    days: HashMap<NaiveDate, PriceSeries>,
    failing: Vec<NaiveDate>,
    gas: Option<GasPrice>,
    calls: AtomicUsize,
    requested: Mutex<Vec<NaiveDate>>,
}

#[async_trait]
impl PriceFetcher for FakeFetcher {
    async fn fetch_unit_rates(&self, date: NaiveDate) -> Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(date);
        if self.failing.contains(&date) {
            return Err(OctodashError::network("connection reset"));
        }
        Ok(self.days.get(&date).cloned().unwrap_or_default())
    }

    async fn fetch_gas(&self, _today: NaiveDate) -> Result<GasPrice> {
        self.gas
            .ok_or_else(|| OctodashError::api("gas tariff not found"))
    }
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn series(date: NaiveDate, n: u32) -> PriceSeries {
    PriceSeries::from_points(
        (0..n)
            .map(|i| {
                PricePoint::local(date, Slot::new(i / 2, (i % 2) * 30), 10.0 + i as f64, &London)
                    .unwrap()
            })
            .collect(),
    )
}

#[tokio::test]
async fn miss_fetches_and_populates_cache() {
    let tmp = tempfile::tempdir().unwrap();
    let mut fake = FakeFetcher::default();
    fake.days.insert(date(15), series(date(15), 48));
    let source = TariffSource::new(fake, PriceCache::in_dir(tmp.path(), "price-data-"));

    let first = source.fetch_or_load(date(15)).await;
    assert_eq!(first.origin, PriceOrigin::Network);
    assert_eq!(first.series.len(), 48);
    assert!(source.cache().path_for(date(15)).exists());

    let second = source.fetch_or_load(date(15)).await;
    assert_eq!(second.origin, PriceOrigin::Cache);
    assert_eq!(second.series, first.series);
    assert_eq!(source.fetcher().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_result_is_not_cached() {
    let tmp = tempfile::tempdir().unwrap();
    let source = TariffSource::new(
        FakeFetcher::default(),
        PriceCache::in_dir(tmp.path(), "price-data-"),
    );

    let day = source.fetch_or_load(date(16)).await;
    assert!(day.series.is_empty());
    assert_eq!(day.origin, PriceOrigin::Network);
    assert!(!source.cache().path_for(date(16)).exists());

    // Still a miss next time, so the fetcher is asked again
    source.fetch_or_load(date(16)).await;
    assert_eq!(source.fetcher().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn fetch_failure_yields_unavailable_and_no_file() {
    let tmp = tempfile::tempdir().unwrap();
    let fake = FakeFetcher {
        failing: vec![date(15)],
        ..Default::default()
    };
    let source = TariffSource::new(fake, PriceCache::in_dir(tmp.path(), "price-data-"));

    let day = source.fetch_or_load(date(15)).await;
    assert!(day.series.is_empty());
    assert!(!day.origin.is_available());
    assert!(!source.cache().path_for(date(15)).exists());
}

#[tokio::test]
async fn corrupt_cache_falls_back_to_network() {
    let tmp = tempfile::tempdir().unwrap();
    let mut fake = FakeFetcher::default();
    fake.days.insert(date(15), series(date(15), 4));
    let cache = PriceCache::in_dir(tmp.path(), "price-data-");
    std::fs::write(cache.path_for(date(15)), b"[{\"hour\": 1}").unwrap();
    let source = TariffSource::new(fake, cache);

    let day = source.fetch_or_load(date(15)).await;
    assert_eq!(day.origin, PriceOrigin::Network);
    assert_eq!(day.series.len(), 4);

    // The bad file was replaced
    let reloaded = source.cache().load(date(15)).unwrap().unwrap();
    assert_eq!(reloaded.len(), 4);
}

#[tokio::test]
async fn load_days_evicts_then_fetches_today_and_tomorrow() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = PriceCache::in_dir(tmp.path(), "price-data-");
    cache.store(date(13), &series(date(13), 2)).unwrap();
    cache.store(date(15), &series(date(15), 48)).unwrap();

    let mut fake = FakeFetcher::default();
    fake.days.insert(date(16), series(date(16), 46));
    let source = TariffSource::new(fake, cache);

    let (today, tomorrow) = source.load_days(date(15)).await;
    assert_eq!(today.origin, PriceOrigin::Cache);
    assert_eq!(today.series.len(), 48);
    assert_eq!(tomorrow.origin, PriceOrigin::Network);
    assert_eq!(tomorrow.date, date(16));
    assert_eq!(tomorrow.series.len(), 46);

    assert!(!source.cache().path_for(date(13)).exists());
    assert_eq!(*source.fetcher().requested.lock().unwrap(), vec![date(16)]);
}

#[tokio::test]
async fn gas_failure_gives_absent_prices() {
    let tmp = tempfile::tempdir().unwrap();
    let source = TariffSource::new(
        FakeFetcher::default(),
        PriceCache::in_dir(tmp.path(), "price-data-"),
    );
    let gas = source.fetch_gas(date(15)).await;
    assert_eq!(gas.price, GasPrice::default());
    assert!(!gas.origin.is_available());

    let fake = FakeFetcher {
        gas: Some(GasPrice {
            today: Some(6.2),
            tomorrow: None,
        }),
        ..Default::default()
    };
    let source = TariffSource::new(fake, PriceCache::in_dir(tmp.path(), "price-data-"));
    let gas = source.fetch_gas(date(15)).await;
    assert_eq!(gas.price.today, Some(6.2));
    assert_eq!(gas.origin, PriceOrigin::Network);
}
