#![no_main]
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };
    let Some(date) = NaiveDate::from_ymd_opt(2025, 3, 30) else {
        return;
    };
    if let Ok(page) = octodash::tariff::client::parse_rates_page(body) {
        let series =
            octodash::tariff::client::series_for_date(&page.results, date, &chrono_tz::Europe::London);
        assert!(series.is_well_formed_for(date));
    }
});
