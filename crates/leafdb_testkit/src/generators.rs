//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random keys, values, and entry
//! batches that maintain the keyspace layer's invariants.

use proptest::prelude::*;

/// Strategy for generating valid keyspace names.
pub fn keyspace_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,31}").expect("Invalid regex")
}

/// Strategy for generating entry keys (non-empty arbitrary bytes).
pub fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..64)
}

/// Strategy for generating entry values (arbitrary bytes, possibly empty).
pub fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

/// Strategy for generating a batch of entries with distinct keys.
pub fn entry_batch_strategy(max: usize) -> impl Strategy<Value = Vec<(Vec<u8>, Vec<u8>)>> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 1..max)
        .prop_map(|entries| entries.into_iter().collect())
}
