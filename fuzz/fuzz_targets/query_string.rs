//! Fuzz target for query-string extraction.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_query_string
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sieve_query::{Filter, FilterConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(query) = std::str::from_utf8(data) else {
        return;
    };

    let config = FilterConfig::new().with_soft_delete(true).with_max_limit(1000);
    if let Ok(filter) = Filter::from_query(query, &config) {
        // Extraction rejects negative pagination, so only compile errors remain.
        if let Err(err) = filter.to_sql() {
            assert!(err.is_fatal());
        }
    }
});
