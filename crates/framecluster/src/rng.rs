use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

// pi * 100_000
pub const DEFAULT_SEED: u64 = 314159;

pub type FrameRng = Xoshiro256PlusPlus;

pub fn new() -> FrameRng {
    with_seed(DEFAULT_SEED)
}

pub fn with_seed(seed: u64) -> FrameRng {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}
