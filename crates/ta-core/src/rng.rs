//! Seeded RNG for generated instances.
//!
//! Evaluation itself never draws random numbers.  Randomness only enters
//! through generated demand and randomized fixtures, and every generator is
//! seeded explicitly, so one seed always yields one instance.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Golden-ratio constant used to spread instance offsets over the seed space.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Independent generator for the `index`-th instance of a batch.  The
    /// parent is not advanced, so instances can be regenerated one at a time.
    pub fn instance(seed: u64, index: u64) -> Self {
        SimRng::new(seed ^ index.wrapping_mul(MIXING_CONSTANT))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Uniform element of `items`; `None` if empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.0)
    }

    /// Two distinct uniform elements, or `None` with fewer than two items.
    pub fn choose_pair<T: Copy>(&mut self, items: &[T]) -> Option<(T, T)> {
        if items.len() < 2 {
            return None;
        }
        let a = self.0.gen_range(0..items.len());
        let mut b = self.0.gen_range(0..items.len() - 1);
        if b >= a {
            b += 1;
        }
        Some((items[a], items[b]))
    }
}
