//! Synthetic tomorrow prices for testing the chart before the real ones are
//! published (normally around 16:00).

use crate::tariff::types::{GasPrice, PricePoint, PriceSeries, Slot};
use chrono::NaiveDate;
use chrono_tz::Tz;
use rand::Rng;

/// Lowest mock unit rate
pub const MOCK_FLOOR: f64 = 1.0;

/// 48 plausible half-hourly prices for `date`: an evening peak and a cheap
/// small-hours trough around a base of 15p.
pub fn mock_tomorrow_series<R: Rng>(date: NaiveDate, tz: &Tz, rng: &mut R) -> PriceSeries {
    let points = (0..48u32)
        .filter_map(|i| {
            let slot = Slot::new(i / 2, (i % 2) * 30);
            let mut price: f64 = 15.0 + rng.gen_range(-5.0_f64..10.0);
            if (16..=18).contains(&slot.hour) {
                price += rng.gen_range(10.0_f64..20.0);
            } else if (2..=4).contains(&slot.hour) {
                price -= rng.gen_range(8.0_f64..12.0);
            }
            let price = (price.max(MOCK_FLOOR) * 100.0).round() / 100.0;
            PricePoint::local(date, slot, price, tz)
        })
        .collect();
    PriceSeries::from_points(points)
}

/// Mock tomorrow's gas price as today's plus a small change
pub fn fill_tomorrow_gas<R: Rng>(gas: GasPrice, rng: &mut R) -> GasPrice {
    match (gas.today, gas.tomorrow) {
        (Some(today), None) => GasPrice {
            today: Some(today),
            tomorrow: Some((today + rng.gen_range(-0.5_f64..0.8)).max(0.0)),
        },
        _ => gas,
    }
}
