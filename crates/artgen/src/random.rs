use std::collections::VecDeque;

use rand::prelude::*;

/// Source of the uniform draws that drive expression generation.
///
/// The generator only ever asks for two kinds of draws: an index picked
/// uniformly from `0..n`, and a float in `[0, 1)` for literal constants.
pub trait RandomSource {
    /// Returns an index uniformly distributed in `0..n`. `n` is never zero.
    fn pick(&mut self, n: usize) -> usize;
    /// Returns a value uniformly distributed in `[0, 1)`.
    fn unit(&mut self) -> f32;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn pick(&mut self, n: usize) -> usize {
        (**self).pick(n)
    }

    fn unit(&mut self) -> f32 {
        (**self).unit()
    }
}

/// Pseudo-random source backed by a seeded `StdRng`.
///
/// Two sources built from the same seed yield the same draw sequence.
#[derive(Debug, Clone)]
pub struct SeededSource {
    seed: u64,
    rng: StdRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededSource {
    fn pick(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }

    fn unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}

/// A single pre-recorded draw for [`ScriptedSource`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Draw {
    Pick(usize),
    Unit(f32),
}

/// Replays a fixed sequence of draws.
///
/// Used to pin the generator to an exact expression. Running out of draws, or
/// asking for a different kind of draw than the next one scripted, is a bug in
/// the caller and panics.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: VecDeque<Draw>,
}

impl ScriptedSource {
    pub fn new(draws: impl IntoIterator<Item = Draw>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    /// Convenience constructor for scripts made only of index picks.
    pub fn picks(picks: impl IntoIterator<Item = usize>) -> Self {
        Self::new(picks.into_iter().map(Draw::Pick))
    }

    pub fn push(&mut self, draw: Draw) {
        self.draws.push_back(draw);
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }

    fn next(&mut self) -> Draw {
        self.draws
            .pop_front()
            .expect("scripted random source exhausted")
    }
}

impl RandomSource for ScriptedSource {
    fn pick(&mut self, n: usize) -> usize {
        match self.next() {
            Draw::Pick(index) => {
                assert!(index < n, "scripted pick {index} out of range 0..{n}");
                index
            }
            other => panic!("expected a pick draw, script had {other:?}"),
        }
    }

    fn unit(&mut self) -> f32 {
        match self.next() {
            Draw::Unit(value) => {
                assert!(
                    (0.0..1.0).contains(&value),
                    "scripted unit draw {value} outside [0, 1)"
                );
                value
            }
            other => panic!("expected a unit draw, script had {other:?}"),
        }
    }
}
