use rand::rngs::ThreadRng;
use rand::Rng;

/// Where the randomness comes from.
///
/// Everything the generators draw goes through `below`, so tests can swap in
/// a fixed sequence and check where things land.
pub trait RandomSource {
    /// Uniform draw from `[0, upper)`. `upper` must be non-zero.
    fn below(&mut self, upper: usize) -> usize;
}

/// Thread-local CSPRNG from `rand`, seeded from the operating system.
#[derive(Debug, Clone, Default)]
pub struct SecureRandom {
    rng: ThreadRng,
}

impl SecureRandom {
    pub fn new() -> Self {
        SecureRandom { rng: rand::rng() }
    }
}

impl RandomSource for SecureRandom {
    fn below(&mut self, upper: usize) -> usize {
        // rejection sampling inside random_range, no modulo bias
        self.rng.random_range(0..upper)
    }
}

/// Uniform pick from a non-empty slice.
pub(crate) fn pick<T: Copy, R: RandomSource + ?Sized>(rng: &mut R, items: &[T]) -> T {
    items[rng.below(items.len())]
}

/// Replays a fixed list of draws, wrapping around at the end.
#[cfg(test)]
pub(crate) struct ScriptedRandom {
    draws: Vec<usize>,
    pos: usize,
}

#[cfg(test)]
impl ScriptedRandom {
    pub(crate) fn new(draws: &[usize]) -> Self {
        assert!(!draws.is_empty(), "need at least one draw");
        ScriptedRandom { draws: draws.to_vec(), pos: 0 }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn below(&mut self, upper: usize) -> usize {
        let draw = self.draws[self.pos % self.draws.len()];
        self.pos += 1;
        assert!(draw < upper, "scripted draw {draw} out of range for {upper}");
        draw
    }
}
