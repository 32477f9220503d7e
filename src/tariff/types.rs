use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize, Serializer};

/// A half-hour slot identified by its local start time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub hour: u32,
    pub minute: u32,
}

impl Slot {
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// The slot containing a wall-clock time (minutes floored to 0 or 30)
    pub fn containing<T: Timelike>(time: &T) -> Self {
        Self {
            hour: time.hour(),
            minute: (time.minute() / 30) * 30,
        }
    }

    pub const fn is_top_of_hour(&self) -> bool {
        self.minute == 0
    }
}

/// One half-hourly unit rate, stored exactly as written to the cache file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub hour: u32,
    pub minute: u32,
    /// Pence per kWh, VAT inclusive
    pub price: f64,
    /// Slot start with the local offset in effect at that instant
    #[serde(serialize_with = "serialize_offset_timestamp")]
    pub timestamp: DateTime<FixedOffset>,
    /// Local calendar date of the slot start
    pub date: NaiveDate,
}

impl PricePoint {
    /// Build a point from a UTC slot start, localised to `tz`
    pub fn at(valid_from: DateTime<Utc>, price: f64, tz: &Tz) -> Self {
        let local = valid_from.with_timezone(tz);
        Self {
            hour: local.hour(),
            minute: local.minute(),
            price,
            timestamp: local.fixed_offset(),
            date: local.date_naive(),
        }
    }

    /// Build a point for a local wall-clock slot; `None` if that time does not exist
    pub fn local(date: NaiveDate, slot: Slot, price: f64, tz: &Tz) -> Option<Self> {
        let naive = date.and_hms_opt(slot.hour, slot.minute, 0)?;
        let local = tz.from_local_datetime(&naive).earliest()?;
        Some(Self {
            hour: slot.hour,
            minute: slot.minute,
            price,
            timestamp: local.fixed_offset(),
            date,
        })
    }

    pub const fn slot(&self) -> Slot {
        Slot::new(self.hour, self.minute)
    }

    /// Starts on a half-hour boundary of a real wall-clock hour
    pub const fn is_on_grid(&self) -> bool {
        self.hour <= 23 && (self.minute == 0 || self.minute == 30)
    }
}

/// RFC 3339 with an explicit numeric offset (`+00:00`, never `Z`)
fn serialize_offset_timestamp<S: Serializer>(
    timestamp: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Prices for one local day, sorted by slot with at most one point per slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries(Vec<PricePoint>);

impl PriceSeries {
    /// Sort by (date, hour, minute) and keep the first point seen for each slot.
    ///
    /// The autumn clock change repeats 01:00-01:30 local time; only the first
    /// occurrence survives.
    pub fn from_points(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| (p.date, p.hour, p.minute));
        points.dedup_by_key(|p| (p.date, p.hour, p.minute));
        Self(points)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.0
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.0.iter()
    }

    /// The point covering `slot`, if present
    pub fn find_slot(&self, slot: Slot) -> Option<&PricePoint> {
        self.0.iter().find(|p| p.slot() == slot)
    }

    pub fn min_price(&self) -> Option<f64> {
        self.0.iter().map(|p| p.price).reduce(f64::min)
    }

    pub fn max_price(&self) -> Option<f64> {
        self.0.iter().map(|p| p.price).reduce(f64::max)
    }

    /// True if every point belongs to `date`, sits on the half-hour grid, and
    /// no slot appears twice in sorted order
    pub fn is_well_formed_for(&self, date: NaiveDate) -> bool {
        self.0.iter().all(|p| p.date == date && p.is_on_grid())
            && self
                .0
                .windows(2)
                .all(|w| (w[0].hour, w[0].minute) < (w[1].hour, w[1].minute))
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Daily gas unit rates in pence per kWh
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GasPrice {
    pub today: Option<f64>,
    pub tomorrow: Option<f64>,
}
