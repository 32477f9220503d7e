//! Price series reconciliation
//!
//! Combines today's and tomorrow's series into the window the chart shows and
//! computes the headline statistics. Everything here is pure; the window
//! borrows from the input series.

use crate::tariff::types::{PricePoint, PriceSeries, Slot};
use serde::{Deserialize, Serialize};

/// Number of today's slots kept in view once tomorrow is known
pub const TODAY_SLOTS_WITH_TOMORROW: usize = 24;

/// How much of today to keep in the window once tomorrow's prices are known
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimPolicy {
    /// The last 24 slots of today
    #[default]
    TrailingSlots,
    /// Today's slots from 12:00 onwards
    FromNoon,
}

/// Borrowed view over the today and tomorrow parts of the chart window
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayWindow<'a> {
    today: &'a [PricePoint],
    tomorrow: &'a [PricePoint],
}

impl<'a> DisplayWindow<'a> {
    pub const fn new(today: &'a [PricePoint], tomorrow: &'a [PricePoint]) -> Self {
        Self { today, tomorrow }
    }

    pub const fn len(&self) -> usize {
        self.today.len() + self.tomorrow.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the first tomorrow point, if the window contains any
    pub const fn tomorrow_start(&self) -> Option<usize> {
        if self.tomorrow.is_empty() {
            None
        } else {
            Some(self.today.len())
        }
    }

    pub const fn today_part(&self) -> &'a [PricePoint] {
        self.today
    }

    pub const fn tomorrow_part(&self) -> &'a [PricePoint] {
        self.tomorrow
    }

    pub fn iter(self) -> impl Iterator<Item = &'a PricePoint> {
        self.today.iter().chain(self.tomorrow.iter())
    }

    pub fn get(&self, index: usize) -> Option<&'a PricePoint> {
        self.today
            .get(index)
            .or_else(|| self.tomorrow.get(index.checked_sub(self.today.len())?))
    }
}

/// Reconciled view of today and tomorrow
#[derive(Debug, Clone)]
pub struct Reconciled<'a> {
    pub all_today: &'a PriceSeries,
    pub display_window: DisplayWindow<'a>,
    pub current_slot: Slot,
    /// Today's point for the current slot
    pub current: Option<&'a PricePoint>,
    /// Minimum of today's prices, 0 if today is empty
    pub min_price: f64,
    /// Maximum of today's prices, 0 if today is empty
    pub max_price: f64,
    /// Maximum of tomorrow's prices, if tomorrow is known
    pub tomorrow_max: Option<f64>,
}

impl Reconciled<'_> {
    pub fn current_price(&self) -> Option<f64> {
        self.current.map(|p| p.price)
    }

    pub const fn has_tomorrow(&self) -> bool {
        self.tomorrow_max.is_some()
    }
}

/// Build the display window and statistics for `current_slot`.
///
/// With tomorrow empty the window is all of today. With tomorrow present and
/// at least 24 points today, today is trimmed per `policy` and tomorrow is
/// appended. With tomorrow present but fewer than 24 points today, the window
/// is tomorrow alone.
pub fn reconcile<'a>(
    today: &'a PriceSeries,
    tomorrow: &'a PriceSeries,
    current_slot: Slot,
    policy: TrimPolicy,
) -> Reconciled<'a> {
    let display_window = if tomorrow.is_empty() {
        DisplayWindow::new(today.points(), &[])
    } else if today.len() >= TODAY_SLOTS_WITH_TOMORROW {
        DisplayWindow::new(trim_today(today.points(), policy), tomorrow.points())
    } else {
        DisplayWindow::new(&[], tomorrow.points())
    };

    Reconciled {
        all_today: today,
        display_window,
        current_slot,
        current: today.find_slot(current_slot),
        min_price: today.min_price().unwrap_or(0.0),
        max_price: today.max_price().unwrap_or(0.0),
        tomorrow_max: tomorrow.max_price(),
    }
}

fn trim_today(points: &[PricePoint], policy: TrimPolicy) -> &[PricePoint] {
    match policy {
        TrimPolicy::TrailingSlots => &points[points.len() - TODAY_SLOTS_WITH_TOMORROW..],
        TrimPolicy::FromNoon => {
            let start = points.partition_point(|p| p.hour < 12);
            &points[start..]
        }
    }
}
