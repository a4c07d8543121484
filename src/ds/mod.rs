pub mod frequency_buckets;
pub mod sample_set;
pub mod slot_arena;

pub use frequency_buckets::FrequencyBuckets;
pub use sample_set::SampleSet;
pub use slot_arena::{SlotArena, SlotId};
