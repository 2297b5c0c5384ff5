#![no_main]

use libfuzzer_sys::fuzz_target;
use newsrank::{extractor::sanitize, fetcher::feed::parse_feed};

fuzz_target!(|data: &[u8]| {
    // parsing and sanitizing must never panic, whatever the feed body
    if let Ok(feed) = parse_feed("https://example.com/feed", data) {
        for item in feed.items {
            let _ = sanitize(&item.title);
            let _ = sanitize(&item.description);
        }
    }
});
