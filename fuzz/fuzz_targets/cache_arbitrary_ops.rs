#![no_main]

use hypercache::builder::{CacheBuilder, CachePolicy};
use hypercache::clock::ManualClock;
use libfuzzer_sys::fuzz_target;

// Drives a small cache through arbitrary put/get/remove/evict/tick sequences
// under both policies and checks the entry map against the policy index.
fuzz_target!(|data: &[u8]| {
    let Some((&header, ops)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(header % 8) + 1;
    let policy = if header & 0x80 == 0 {
        CachePolicy::Lfu
    } else {
        CachePolicy::Hyperbolic {
            sample_size: usize::from((header >> 3) % 8) + 1,
        }
    };

    let clock = ManualClock::new();
    let Ok(mut cache) = CacheBuilder::new(capacity)
        .with_clock(clock.clone())
        .min_age(2)
        .build::<u8, u8>(policy)
    else {
        return;
    };

    for chunk in ops.chunks_exact(2) {
        let key = chunk[1] % 32;
        match chunk[0] % 5 {
            0 => {
                cache.put(key, chunk[0]).unwrap();
                assert_eq!(cache.peek(&key), Some(&chunk[0]));
            },
            1 => {
                cache.get(&key).unwrap();
            },
            2 => {
                cache.remove(&key).unwrap();
            },
            3 => {
                cache.evict().unwrap();
            },
            _ => clock.advance(u64::from(chunk[1] % 4)),
        }

        assert!(cache.len() <= capacity);
        cache.check_invariants().unwrap();
    }
});
