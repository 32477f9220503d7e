use crate::config::TariffConfig;
use crate::error::{OctodashError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::tariff::PriceFetcher;
use crate::tariff::types::{GasPrice, PricePoint, PriceSeries};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;

/// One page of the `standard-unit-rates` listing
#[derive(Debug, Clone, Deserialize)]
pub struct RatesPage {
    #[serde(default)]
    pub results: Vec<RateRecord>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateRecord {
    pub valid_from: DateTime<Utc>,
    pub value_inc_vat: f64,
}

/// HTTP client for the Octopus Energy public tariff API
pub struct TariffClient {
    http: reqwest::Client,
    config: TariffConfig,
    tz: Tz,
    logger: StructuredLogger,
}

impl TariffClient {
    pub fn new(config: &TariffConfig, tz: Tz) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
            tz,
            logger: get_logger("tariff"),
        })
    }

    pub fn unit_rates_url(&self) -> String {
        rates_url(
            &self.config.api_base_url,
            &self.config.agile_product,
            "electricity-tariffs",
            "E",
            &self.config.region,
        )
    }

    pub fn gas_rates_url(&self) -> String {
        rates_url(
            &self.config.api_base_url,
            &self.config.gas_product,
            "gas-tariffs",
            "G",
            &self.config.region,
        )
    }

    /// Fetch every rate valid in `[from, to)`, following `next` links up to `max_pages`
    async fn fetch_rates(
        &self,
        url: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RateRecord>> {
        let first = format!(
            "{}?period_from={}&period_to={}",
            url,
            from.format("%Y-%m-%dT%H:%M:%SZ"),
            to.format("%Y-%m-%dT%H:%M:%SZ")
        );
        let mut records = Vec::new();
        let mut next = Some(first);
        let mut pages = 0u32;

        while let Some(page_url) = next.take() {
            if pages >= self.config.max_pages.max(1) {
                self.logger.warn(&format!(
                    "Stopping pagination after {} pages for {}",
                    pages, url
                ));
                break;
            }
            let page = self.get_page_with_retry(&page_url).await?;
            pages += 1;
            records.extend(page.results);
            next = page.next.filter(|n| !n.is_empty());
        }
        Ok(records)
    }

    async fn get_page_with_retry(&self, url: &str) -> Result<RatesPage> {
        let attempts = self.config.max_retries.max(1);
        let delay = Duration::from_millis(self.config.retry_delay_ms);
        let mut attempt = 1;
        loop {
            match self.get_page(url).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && attempt < attempts => {
                    self.logger.warn(&format!(
                        "Tariff request failed (attempt {}/{}): {}",
                        attempt, attempts, e
                    ));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_page(&self, url: &str) -> Result<RatesPage> {
        self.logger.debug(&format!("GET {}", url));
        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("octodash/", env!("CARGO_PKG_VERSION")))
            .send()
            .await?;

        let status = resp.status();
        if status.is_server_error() {
            return Err(OctodashError::network(format!(
                "Tariff API returned {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(OctodashError::api(format!(
                "Tariff API returned {}",
                status
            )));
        }
        let body = resp.text().await?;
        parse_rates_page(&body)
    }
}

#[async_trait]
impl PriceFetcher for TariffClient {
    async fn fetch_unit_rates(&self, date: NaiveDate) -> Result<PriceSeries> {
        let (from, to) = local_day_bounds(date, &self.tz);
        let records = self.fetch_rates(&self.unit_rates_url(), from, to).await?;
        let series = series_for_date(&records, date, &self.tz);
        self.logger.debug(&format!(
            "Fetched {} unit rates for {} ({} usable)",
            records.len(),
            date,
            series.len()
        ));
        Ok(series)
    }

    async fn fetch_gas(&self, today: NaiveDate) -> Result<GasPrice> {
        let (from, _) = local_day_bounds(today, &self.tz);
        let (_, to) = local_day_bounds(today + Days::new(1), &self.tz);
        let records = self.fetch_rates(&self.gas_rates_url(), from, to).await?;
        Ok(gas_for_days(&records, today, &self.tz))
    }
}

fn rates_url(base: &str, product: &str, kind: &str, fuel: &str, region: &str) -> String {
    format!(
        "{}/products/{product}/{kind}/{fuel}-1R-{product}-{region}/standard-unit-rates/",
        base.trim_end_matches('/')
    )
}

/// Local midnight of `date`, falling back to the naive time read as UTC if it does not exist
fn local_midnight(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// UTC instants of local midnight at the start and end of `date`
pub fn local_day_bounds(date: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        local_midnight(date, tz),
        local_midnight(date + Days::new(1), tz),
    )
}

pub fn parse_rates_page(body: &str) -> Result<RatesPage> {
    serde_json::from_str(body)
        .map_err(|e| OctodashError::api(format!("Malformed unit-rates response: {}", e)))
}

/// Localise records and keep those starting on `date` at a half-hour boundary,
/// deduplicated per slot
pub fn series_for_date(records: &[RateRecord], date: NaiveDate, tz: &Tz) -> PriceSeries {
    let mut sorted: Vec<&RateRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.valid_from);
    let points = sorted
        .into_iter()
        .map(|r| PricePoint::at(r.valid_from, r.value_inc_vat, tz))
        .filter(|p| p.date == date && p.is_on_grid())
        .collect();
    PriceSeries::from_points(points)
}

/// Earliest gas rate starting on each of `today` and the following day
pub fn gas_for_days(records: &[RateRecord], today: NaiveDate, tz: &Tz) -> GasPrice {
    let tomorrow = today + Days::new(1);
    let mut sorted: Vec<&RateRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.valid_from);
    let on = |date: NaiveDate| {
        sorted
            .iter()
            .find(|r| r.valid_from.with_timezone(tz).date_naive() == date)
            .map(|r| r.value_inc_vat)
    };
    GasPrice {
        today: on(today),
        tomorrow: on(tomorrow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::London;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(rfc3339: &str, value: f64) -> RateRecord {
        RateRecord {
            valid_from: DateTime::parse_from_rfc3339(rfc3339)
                .unwrap()
                .with_timezone(&Utc),
            value_inc_vat: value,
        }
    }

    #[test]
    fn builds_product_urls() {
        let client = TariffClient::new(&TariffConfig::default(), London).unwrap();
        assert_eq!(
            client.unit_rates_url(),
            "https://api.octopus.energy/v1/products/AGILE-24-10-01/electricity-tariffs/E-1R-AGILE-24-10-01-C/standard-unit-rates/"
        );
        assert_eq!(
            client.gas_rates_url(),
            "https://api.octopus.energy/v1/products/SILVER-25-09-02/gas-tariffs/G-1R-SILVER-25-09-02-C/standard-unit-rates/"
        );
    }

    #[test]
    fn day_bounds_follow_local_midnight() {
        let (from, to) = local_day_bounds(date(2025, 7, 1), &London);
        assert_eq!(from, Utc.with_ymd_and_hms(2025, 6, 30, 23, 0, 0).unwrap());
        assert_eq!(to, Utc.with_ymd_and_hms(2025, 7, 1, 23, 0, 0).unwrap());

        // Spring-forward day is 23 hours long
        let (from, to) = local_day_bounds(date(2025, 3, 30), &London);
        assert_eq!((to - from).num_hours(), 23);
    }

    #[test]
    fn parses_api_page() {
        let body = r#"{
            "count": 2,
            "next": null,
            "previous": null,
            "results": [
                {"value_exc_vat": 20.0, "value_inc_vat": 21.0, "valid_from": "2025-01-15T00:30:00Z", "valid_to": "2025-01-15T01:00:00Z", "payment_method": null},
                {"value_exc_vat": 19.0, "value_inc_vat": 19.95, "valid_from": "2025-01-15T00:00:00Z", "valid_to": "2025-01-15T00:30:00Z", "payment_method": null}
            ]
        }"#;
        let page = parse_rates_page(body).unwrap();
        assert_eq!(page.results.len(), 2);
        assert!(page.next.is_none());

        let series = series_for_date(&page.results, date(2025, 1, 15), &London);
        let prices: Vec<f64> = series.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![19.95, 21.0]);
    }

    #[test]
    fn malformed_page_is_api_error() {
        let err = parse_rates_page("<html>").unwrap_err();
        assert!(matches!(err, OctodashError::Api { .. }));
    }

    #[test]
    fn drops_points_from_other_days() {
        let records = vec![
            record("2025-07-01T22:30:00Z", 30.0), // 23:30 local, July 1st
            record("2025-07-01T23:00:00Z", 5.0),  // 00:00 local, July 2nd
        ];
        let series = series_for_date(&records, date(2025, 7, 1), &London);
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].price, 30.0);
    }

    #[test]
    fn drops_points_off_the_half_hour_grid() {
        let records = vec![
            record("2025-01-15T00:00:00Z", 10.0),
            record("2025-01-15T00:15:00Z", 99.0),
            record("2025-01-15T00:30:00Z", 11.0),
        ];
        let day = date(2025, 1, 15);
        let series = series_for_date(&records, day, &London);
        let minutes: Vec<u32> = series.iter().map(|p| p.minute).collect();
        assert_eq!(minutes, vec![0, 30]);
        assert!(series.is_well_formed_for(day));

        // What is fetched must survive a trip through the cache
        let bytes = serde_json::to_vec(&series).unwrap();
        assert_eq!(crate::cache::parse_cache_document(&bytes, day).unwrap(), series);
    }

    #[test]
    fn autumn_repeat_keeps_first_occurrence() {
        // 01:00 local occurs at 00:00Z (BST) and again at 01:00Z (GMT)
        let records = vec![
            record("2025-10-26T01:00:00Z", 2.0),
            record("2025-10-26T00:00:00Z", 1.0),
        ];
        let series = series_for_date(&records, date(2025, 10, 26), &London);
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].price, 1.0);
    }

    #[test]
    fn splits_gas_by_local_day() {
        let records = vec![
            record("2025-01-16T00:00:00Z", 6.5),
            record("2025-01-15T00:00:00Z", 6.1),
        ];
        let gas = gas_for_days(&records, date(2025, 1, 15), &London);
        assert_eq!(gas.today, Some(6.1));
        assert_eq!(gas.tomorrow, Some(6.5));

        let gas = gas_for_days(&records[..1], date(2025, 1, 15), &London);
        assert_eq!(gas.today, None);
        assert_eq!(gas.tomorrow, Some(6.5));
    }

    #[test]
    fn same_day_gas_keeps_earliest_rate() {
        // Pages arrive newest first; a mid-day change must not replace the day's opening rate
        let records = vec![
            record("2025-01-15T12:00:00Z", 7.2),
            record("2025-01-15T00:00:00Z", 6.1),
        ];
        let gas = gas_for_days(&records, date(2025, 1, 15), &London);
        assert_eq!(gas.today, Some(6.1));
        assert_eq!(gas.tomorrow, None);
    }
}
