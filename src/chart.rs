//! Chart layout engine
//!
//! Maps a display window onto pixel geometry: one bar per half-hour slot,
//! horizontal gridlines every 10p, a tinted tomorrow region and a dashed
//! marker on the current slot. Pure computation; the renderer only paints
//! what this module returns.

use crate::config::ChartRegionConfig;
use crate::reconcile::DisplayWindow;
use crate::tariff::types::Slot;

/// Gap in pixels taken from each bar's right edge
pub const BAR_GAP: i32 = 2;
/// Price step between gridlines, in pence
pub const GRID_STEP: i32 = 10;
/// Hours between x-axis labels
pub const HOUR_LABEL_EVERY: u32 = 4;
const DASH_PERIOD: i32 = 6;
const DASH_LENGTH: i32 = 3;

/// Pixel rectangle the bars occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartRegion {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub height: i32,
}

impl ChartRegion {
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }
}

impl From<ChartRegionConfig> for ChartRegion {
    fn from(c: ChartRegionConfig) -> Self {
        Self {
            left: c.left,
            right: c.right,
            top: c.top,
            height: c.height,
        }
    }
}

/// One bar; `right` is inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    pub price: f64,
    pub slot: Slot,
    pub tomorrow: bool,
}

impl Bar {
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gridline {
    /// Price level in pence
    pub value: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourLabel {
    pub hour: u32,
    pub x: i32,
    pub y: i32,
}

/// Shaded area behind tomorrow's bars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TomorrowRegion {
    pub x: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    pub label_x: i32,
    pub label_y: i32,
}

/// Dashed vertical line through the middle of the current bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentMarker {
    pub x: i32,
    /// `(y_start, y_end)` of each dash
    pub dashes: Vec<(i32, i32)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartLayout {
    pub chart_min: f64,
    pub chart_max: f64,
    pub bar_width: i32,
    pub bars: Vec<Bar>,
    pub gridlines: Vec<Gridline>,
    pub tomorrow: Option<TomorrowRegion>,
    pub current_marker: Option<CurrentMarker>,
    pub hour_labels: Vec<HourLabel>,
}

impl ChartLayout {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Lay out `window` inside `region`, marking `current_slot` among today's bars
pub fn layout(window: &DisplayWindow<'_>, current_slot: Slot, region: ChartRegion) -> ChartLayout {
    if window.is_empty() {
        return ChartLayout::default();
    }

    let count = window.len();
    let prices: Vec<f64> = window.iter().map(|p| p.price).collect();
    let chart_min = prices.iter().copied().fold(0.0_f64, f64::min);
    let chart_max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if chart_max == chart_min {
        1.0
    } else {
        chart_max - chart_min
    };
    let scale = |value: f64| -> i32 {
        let h = ((value - chart_min) / range * f64::from(region.height)).round() as i32;
        h.clamp(0, region.height)
    };

    let bar_width = (region.width() / i32::try_from(count).unwrap_or(i32::MAX)).max(1);
    let bottom = region.bottom();
    let tomorrow_start = window.tomorrow_start();
    let is_tomorrow = |i: usize| tomorrow_start.is_some_and(|t| i >= t);

    let bars: Vec<Bar> = window
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let x = region.left + i as i32 * bar_width;
            Bar {
                x,
                right: (x + bar_width - BAR_GAP).max(x),
                top: bottom - scale(p.price),
                bottom,
                price: p.price,
                slot: p.slot(),
                tomorrow: is_tomorrow(i),
            }
        })
        .collect();

    let gridlines = gridlines(chart_min, chart_max, |v| bottom - scale(v));

    let tomorrow = tomorrow_start.map(|t| {
        let x = region.left + t as i32 * bar_width;
        TomorrowRegion {
            x,
            right: region.right,
            top: region.top,
            bottom,
            label_x: x + 3,
            label_y: region.top + 5,
        }
    });

    let current_marker = bars
        .iter()
        .find(|b| !b.tomorrow && b.slot == current_slot)
        .map(|b| {
            let x = b.x + bar_width / 2;
            let dashes = (region.top..bottom)
                .step_by(DASH_PERIOD as usize)
                .map(|y| (y, (y + DASH_LENGTH).min(bottom)))
                .collect();
            CurrentMarker { x, dashes }
        });

    let hour_labels = bars
        .iter()
        .filter(|b| b.slot.is_top_of_hour() && b.slot.hour % HOUR_LABEL_EVERY == 0)
        .map(|b| HourLabel {
            hour: b.slot.hour,
            x: b.x + bar_width / 2 - if b.slot.hour < 10 { 3 } else { 5 },
            y: bottom + 2,
        })
        .collect();

    ChartLayout {
        chart_min,
        chart_max,
        bar_width,
        bars,
        gridlines,
        tomorrow,
        current_marker,
        hour_labels,
    }
}

/// Multiples of 10p within `[min, max]`
fn gridlines(min: f64, max: f64, y_of: impl Fn(f64) -> i32) -> Vec<Gridline> {
    let step = f64::from(GRID_STEP);
    let first = (min / step).floor() as i32;
    let last = (max / step).ceil() as i32;
    (first..=last)
        .map(|k| k * GRID_STEP)
        .filter(|&v| (min..=max).contains(&f64::from(v)))
        .map(|value| Gridline {
            value,
            y: y_of(f64::from(value)),
        })
        .collect()
}
