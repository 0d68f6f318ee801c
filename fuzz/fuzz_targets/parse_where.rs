//! Fuzz target for the JSON filter parser and compiler.
//!
//! Parsing arbitrary bytes must never panic, and any filter that compiles
//! must have exactly one parameter per placeholder.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_parse_where
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sieve_query::{Filter, parse_where};

fuzz_target!(|data: &[u8]| {
    let Ok(where_clause) = parse_where(data) else {
        return;
    };

    let filter = Filter::from_where(where_clause);
    if let Ok((sql, params)) = filter.to_sql() {
        // Field names pass through verbatim and may add extra '?'.
        assert!(sql.matches('?').count() >= params.len());
        assert_eq!(filter.to_sql().ok(), Some((sql, params)));
    }
});
