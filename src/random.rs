//! Random integer source used by topology distortion.
//!
//! Distortion only needs one primitive: a uniformly distributed integer in
//! a half-open range. [`RandomSource`] captures that, and is implemented for
//! [`fastrand::Rng`] so a seeded generator gives reproducible spheres:
//!
//! ```
//! use icosphere::random::RandomSource;
//!
//! let mut a = fastrand::Rng::with_seed(7);
//! let mut b = fastrand::Rng::with_seed(7);
//! assert_eq!(a.integer_exclusive(0, 100), b.integer_exclusive(0, 100));
//! ```

/// A source of uniformly distributed integers.
pub trait RandomSource {
    /// A uniformly distributed integer in `[min, max)`.
    ///
    /// Callers guarantee `min < max`.
    fn integer_exclusive(&mut self, min: usize, max: usize) -> usize;
}

impl RandomSource for fastrand::Rng {
    #[inline]
    fn integer_exclusive(&mut self, min: usize, max: usize) -> usize {
        self.usize(min..max)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    #[inline]
    fn integer_exclusive(&mut self, min: usize, max: usize) -> usize {
        (**self).integer_exclusive(min, max)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    #[inline]
    fn integer_exclusive(&mut self, min: usize, max: usize) -> usize {
        (**self).integer_exclusive(min, max)
    }
}
