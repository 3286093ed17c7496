#![no_main]
use libfuzzer_sys::fuzz_target;
use sfnt_read::{scan_file, CancelToken, ScanOptions, SliceSource, Validation};

fuzz_target!(|data: &[u8]| {
    let cancel = CancelToken::new();
    // a tiny buffer exercises the streaming checksum's refills
    let options = ScanOptions::default()
        .with_validation(Validation::Relaxed)
        .with_checksum_buffer_size(8);
    if let Ok(report) = scan_file(SliceSource::new(data), &options, &cancel) {
        let _ = report.severity();
        let _ = report.error_count() + report.warning_count();
        for font in &report.fonts {
            if let Some(Ok(vendor)) = &font.vendor {
                let _ = vendor.vendor_text().to_string();
            }
            if let Some(Ok(dates)) = &font.dates {
                let _ = dates.date().and_then(|date| date.to_naive());
            }
        }
    }
});
