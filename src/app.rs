//! Dashboard driver
//!
//! Owns the price source, renderer and sink. Each cycle refetches prices when
//! they are due (every `fetch_interval_secs`, or immediately after the local
//! date changes), then renders a frame for the current time. `run` repeats
//! cycles until Ctrl-C; `run_once` performs a single forced cycle.

use crate::cache::PriceCache;
use crate::config::Config;
use crate::error::Result;
use crate::homeassistant::HomeAssistantClient;
use crate::logging::{StructuredLogger, get_logger};
use crate::mock;
use crate::reconcile::reconcile;
use crate::render::{DashboardRenderer, DashboardView, Frame};
use crate::sink::DisplaySink;
use crate::tariff::{
    DayPrices, GasReading, PriceFetcher, PriceOrigin, PriceSeries, Slot, TariffSource,
};
use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use std::time::Duration;

/// What one cycle did
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub fetched: bool,
    pub today_points: usize,
    pub tomorrow_points: usize,
    pub today_origin: PriceOrigin,
    pub tomorrow_origin: PriceOrigin,
    pub gas_origin: PriceOrigin,
    pub alert: bool,
}

struct PriceState {
    today: DayPrices,
    tomorrow: DayPrices,
    gas: GasReading,
    alert: bool,
    message: Option<String>,
    fetched_at: Option<DateTime<Tz>>,
}

impl PriceState {
    fn empty(now: DateTime<Tz>) -> Self {
        let today = now.date_naive();
        let unfetched = PriceOrigin::Unavailable {
            reason: "not fetched".to_string(),
        };
        Self {
            today: DayPrices::unavailable(today, "not fetched"),
            tomorrow: DayPrices::unavailable(today + Days::new(1), "not fetched"),
            gas: GasReading {
                price: Default::default(),
                origin: unfetched,
            },
            alert: false,
            message: None,
            fetched_at: None,
        }
    }
}

/// Generated data for one tomorrow, kept until the date moves on
struct MockDay {
    date: NaiveDate,
    series: Option<PriceSeries>,
    gas_tomorrow: Option<f64>,
}

/// The refresh/render loop
pub struct Dashboard<F> {
    config: Config,
    tz: Tz,
    source: TariffSource<F>,
    renderer: DashboardRenderer,
    sink: Box<dyn DisplaySink>,
    home_assistant: Option<HomeAssistantClient>,
    mock_rng: Option<StdRng>,
    mock_day: Option<MockDay>,
    state: Option<PriceState>,
    logger: StructuredLogger,
}

impl<F: PriceFetcher> Dashboard<F> {
    pub fn new(config: Config, fetcher: F, sink: Box<dyn DisplaySink>) -> Result<Self> {
        let tz = config.tz()?;
        let home_assistant = config
            .home_assistant
            .as_ref()
            .map(HomeAssistantClient::new)
            .transpose()?;
        Ok(Self {
            tz,
            source: TariffSource::new(fetcher, PriceCache::new(&config.cache)),
            renderer: DashboardRenderer::from_config(&config),
            sink,
            home_assistant,
            mock_rng: None,
            mock_day: None,
            state: None,
            logger: get_logger("app"),
            config,
        })
    }

    /// Fill in missing tomorrow prices with generated ones
    pub fn with_mock_tomorrow(mut self, rng: StdRng) -> Self {
        self.mock_rng = Some(rng);
        self
    }

    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    fn fetch_due(&self, now: DateTime<Tz>) -> bool {
        let Some(last) = self.state.as_ref().and_then(|s| s.fetched_at) else {
            return true;
        };
        let interval = chrono::Duration::seconds(
            i64::try_from(self.config.schedule.fetch_interval_secs).unwrap_or(i64::MAX),
        );
        last.date_naive() != now.date_naive() || now - last >= interval
    }

    /// Reload prices, gas and Home Assistant state for `now`'s local date
    pub async fn refresh(&mut self, now: DateTime<Tz>) {
        let today = now.date_naive();
        let (today_prices, mut tomorrow_prices) = self.source.load_days(today).await;
        let mut gas = self.source.fetch_gas(today).await;

        if let Some(rng) = self.mock_rng.as_mut() {
            let date = tomorrow_prices.date;
            let mut mock_day = match self.mock_day.take() {
                Some(day) if day.date == date => day,
                _ => MockDay {
                    date,
                    series: None,
                    gas_tomorrow: None,
                },
            };
            if tomorrow_prices.series.is_empty() {
                let series = mock_day
                    .series
                    .get_or_insert_with(|| mock::mock_tomorrow_series(date, &self.tz, &mut *rng));
                tomorrow_prices.series = series.clone();
                tomorrow_prices.origin = PriceOrigin::Mock;
                self.logger.info("Using mock prices for tomorrow");
            }
            if gas.price.tomorrow.is_none() {
                if mock_day.gas_tomorrow.is_none() {
                    mock_day.gas_tomorrow = mock::fill_tomorrow_gas(gas.price, rng).tomorrow;
                }
                gas.price.tomorrow = mock_day.gas_tomorrow;
            }
            self.mock_day = Some(mock_day);
        }

        let (alert, message) = match &self.home_assistant {
            Some(ha) => (ha.should_alert().await, ha.message_of_the_day().await),
            None => (false, None),
        };

        self.logger.for_date(today).info(&format!(
            "Prices today: {} ({}), tomorrow: {} ({}), gas: {}",
            today_prices.series.len(),
            today_prices.origin,
            tomorrow_prices.series.len(),
            tomorrow_prices.origin,
            gas.origin
        ));

        self.state = Some(PriceState {
            today: today_prices,
            tomorrow: tomorrow_prices,
            gas,
            alert,
            message,
            fetched_at: Some(now),
        });
    }

    /// Today's and tomorrow's prices from the last refresh
    pub fn day_prices(&self) -> Option<(&DayPrices, &DayPrices)> {
        self.state.as_ref().map(|s| (&s.today, &s.tomorrow))
    }

    /// Render the current state for `now`
    pub fn render(&self, now: DateTime<Tz>) -> Frame {
        let placeholder;
        let state = match &self.state {
            Some(state) => state,
            None => {
                placeholder = PriceState::empty(now);
                &placeholder
            }
        };
        let prices = reconcile(
            &state.today.series,
            &state.tomorrow.series,
            Slot::containing(&now),
            self.config.reconcile.trim_policy,
        );
        let view = DashboardView {
            now: now.naive_local(),
            prices,
            gas: state.gas.price,
            alert: state.alert,
            message: state.message.as_deref(),
        };
        self.renderer.render(&view)
    }

    /// Render and push a frame to the sink
    pub fn redraw(&mut self, now: DateTime<Tz>) -> Result<()> {
        let frame = self.render(now);
        self.sink.show(&frame)
    }

    /// Refresh if due, then redraw
    pub async fn cycle(&mut self, now: DateTime<Tz>) -> Result<CycleReport> {
        let fetched = self.fetch_due(now);
        if fetched {
            self.refresh(now).await;
        }
        self.redraw(now)?;
        Ok(self.report(fetched))
    }

    fn report(&self, fetched: bool) -> CycleReport {
        let unfetched = || PriceOrigin::Unavailable {
            reason: "not fetched".to_string(),
        };
        match &self.state {
            Some(s) => CycleReport {
                fetched,
                today_points: s.today.series.len(),
                tomorrow_points: s.tomorrow.series.len(),
                today_origin: s.today.origin.clone(),
                tomorrow_origin: s.tomorrow.origin.clone(),
                gas_origin: s.gas.origin.clone(),
                alert: s.alert,
            },
            None => CycleReport {
                fetched,
                today_points: 0,
                tomorrow_points: 0,
                today_origin: unfetched(),
                tomorrow_origin: unfetched(),
                gas_origin: unfetched(),
                alert: false,
            },
        }
    }

    /// Fetch once and render a single frame
    pub async fn run_once(&mut self) -> Result<CycleReport> {
        let now = self.now();
        self.refresh(now).await;
        self.redraw(now)?;
        Ok(self.report(true))
    }

    /// Run cycles until Ctrl-C
    pub async fn run(&mut self) -> Result<()> {
        self.logger.info(&format!(
            "Starting dashboard loop (sink: {}, fetch every {}s, redraw every {}s)",
            self.sink.name(),
            self.config.schedule.fetch_interval_secs,
            self.config.schedule.redraw_interval_secs
        ));
        let redraw = Duration::from_secs(self.config.schedule.redraw_interval_secs);
        let backoff = Duration::from_secs(self.config.schedule.error_backoff_secs);

        loop {
            let pause = match self.cycle(self.now()).await {
                Ok(report) => {
                    if report.fetched {
                        self.logger.debug(&format!("Cycle complete: {:?}", report));
                    }
                    redraw
                }
                Err(e) => {
                    self.logger.error(&format!("Cycle failed: {}", e));
                    backoff
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = tokio::signal::ctrl_c() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
            }
        }
        Ok(())
    }
}
