#![no_main]

use hypercache::ds::FrequencyBuckets;
use libfuzzer_sys::fuzz_target;

// Arbitrary sequences of insert, touch, remove, pop_min and clear, with the
// bucket invariants validated after every step.
fuzz_target!(|data: &[u8]| {
    let mut buckets: FrequencyBuckets<u8> = FrequencyBuckets::new();

    for chunk in data.chunks_exact(2) {
        let key = chunk[1];
        match chunk[0] % 6 {
            0 => {
                buckets.insert(key);
            },
            1 => {
                buckets.touch(&key);
            },
            2 => {
                buckets.remove(&key);
            },
            3 => {
                buckets.pop_min();
            },
            4 => {
                if let Some((min_key, freq)) = buckets.peek_min() {
                    assert_eq!(buckets.frequency(min_key), Some(freq));
                    assert_eq!(buckets.least_frequency(), Some(freq));
                }
            },
            _ => buckets.clear(),
        }

        buckets.debug_validate_invariants();
        if buckets.is_empty() {
            assert_eq!(buckets.least_frequency(), None);
            assert!(buckets.peek_min().is_none());
        }
    }
});
