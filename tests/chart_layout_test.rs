use chrono::NaiveDate;
use chrono_tz::Europe::London;
use octodash::chart::{ChartRegion, layout};
use octodash::reconcile::{DisplayWindow, TrimPolicy, reconcile};
use octodash::tariff::{PricePoint, PriceSeries, Slot};

const REGION: ChartRegion = ChartRegion {
    left: 30,
    right: 315,
    top: 90,
    height: 130,
};

fn day(date: NaiveDate, prices: &[f64]) -> PriceSeries {
    PriceSeries::from_points(
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let i = i as u32;
                PricePoint::local(date, Slot::new(i / 2, (i % 2) * 30), p, &London).unwrap()
            })
            .collect(),
    )
}

fn d(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, n).unwrap()
}

#[test]
fn bars_stay_inside_region() {
    let s = day(d(15), &[-4.0, 0.0, 12.3, 55.0, 21.7, 9.9]);
    let l = layout(&DisplayWindow::new(s.points(), &[]), Slot::new(0, 0), REGION);
    for bar in &l.bars {
        assert!(bar.x >= REGION.left);
        assert!(bar.right < REGION.right);
        assert!(bar.top >= REGION.top);
        assert_eq!(bar.bottom, REGION.bottom());
        assert!(bar.height() >= 0 && bar.height() <= REGION.height);
    }
}

#[test]
fn taller_bars_for_higher_prices() {
    let s = day(d(15), &[3.0, 9.0, 27.0, 14.0]);
    let l = layout(&DisplayWindow::new(s.points(), &[]), Slot::new(0, 0), REGION);
    let h: Vec<i32> = l.bars.iter().map(|b| b.height()).collect();
    assert!(h[0] < h[1] && h[1] < h[3] && h[3] < h[2]);
    assert_eq!(h[2], REGION.height);
}

#[test]
fn negative_prices_extend_range_below_zero() {
    let s = day(d(15), &[-5.0, 15.0]);
    let l = layout(&DisplayWindow::new(s.points(), &[]), Slot::new(0, 0), REGION);
    assert_eq!(l.chart_min, -5.0);
    assert_eq!(l.bars[0].height(), 0);
    assert_eq!(l.bars[1].height(), 130);
    let values: Vec<i32> = l.gridlines.iter().map(|g| g.value).collect();
    assert_eq!(values, vec![0, 10]);
    // Zero line sits a quarter of the way up
    let zero = l.gridlines[0];
    assert_eq!(zero.y, REGION.bottom() - 33);
}

#[test]
fn constant_series_has_uniform_heights() {
    for price in [0.0, 7.5, -2.0] {
        let s = day(d(15), &[price; 12]);
        let l = layout(&DisplayWindow::new(s.points(), &[]), Slot::new(0, 0), REGION);
        let first = l.bars[0].height();
        assert!(l.bars.iter().all(|b| b.height() == first));
    }
}

#[test]
fn single_point_is_one_full_width_bar() {
    let s = day(d(15), &[12.0]);
    let l = layout(&DisplayWindow::new(s.points(), &[]), Slot::new(0, 0), REGION);
    assert_eq!(l.bars.len(), 1);
    assert_eq!(l.bar_width, REGION.width());
    assert_eq!(l.bars[0].right, REGION.left + REGION.width() - 2);
}

#[test]
fn tomorrow_region_and_marker_placement() {
    let today = day(d(15), &[10.0; 48]);
    let tomorrow = day(d(16), &[20.0; 48]);
    let r = reconcile(&today, &tomorrow, Slot::new(14, 30), TrimPolicy::TrailingSlots);
    let l = layout(&r.display_window, r.current_slot, REGION);

    assert_eq!(l.bars.len(), 72);
    assert_eq!(l.bar_width, 285 / 72);
    let region = l.tomorrow.unwrap();
    assert_eq!(region.x, REGION.left + 24 * l.bar_width);
    assert_eq!(region.right, REGION.right);
    assert_eq!((region.label_x, region.label_y), (region.x + 3, REGION.top + 5));
    assert!(l.bars[..24].iter().all(|b| !b.tomorrow));
    assert!(l.bars[24..].iter().all(|b| b.tomorrow));

    // 14:30 is the 6th slot of the trimmed today part (12:00 onwards)
    let marker = l.current_marker.unwrap();
    assert_eq!(marker.x, l.bars[5].x + l.bar_width / 2);
}

#[test]
fn marker_never_lands_on_tomorrow() {
    let today = day(d(15), &[10.0; 4]);
    let tomorrow = day(d(16), &[20.0; 48]);
    let r = reconcile(&today, &tomorrow, Slot::new(1, 0), TrimPolicy::TrailingSlots);
    // Short today: window is tomorrow only, so there is no bar to mark
    let l = layout(&r.display_window, r.current_slot, REGION);
    assert!(l.current_marker.is_none());
}

#[test]
fn hour_labels_follow_bars() {
    let today = day(d(15), &[10.0; 48]);
    let tomorrow = day(d(16), &[20.0; 48]);
    let r = reconcile(&today, &tomorrow, Slot::new(0, 0), TrimPolicy::TrailingSlots);
    let l = layout(&r.display_window, r.current_slot, REGION);
    let hours: Vec<u32> = l.hour_labels.iter().map(|h| h.hour).collect();
    assert_eq!(hours, vec![12, 16, 20, 0, 4, 8, 12, 16, 20]);
    assert!(l.hour_labels.iter().all(|h| h.y == REGION.bottom() + 2));
}

#[test]
fn gridlines_stay_within_range() {
    let s = day(d(15), &[3.0, 26.0, 44.0]);
    let l = layout(&DisplayWindow::new(s.points(), &[]), Slot::new(0, 0), REGION);
    let values: Vec<i32> = l.gridlines.iter().map(|g| g.value).collect();
    assert_eq!(values, vec![0, 10, 20, 30, 40]);
    assert!(
        l.gridlines
            .iter()
            .all(|g| g.y >= REGION.top && g.y <= REGION.bottom())
    );
}
