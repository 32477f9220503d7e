#![no_main]
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some(date) = NaiveDate::from_ymd_opt(2025, 10, 26) else {
        return;
    };
    // Anything accepted must be sorted, unique and belong to the requested day
    if let Ok(series) = octodash::cache::parse_cache_document(data, date) {
        assert!(series.is_well_formed_for(date));
    }
});
