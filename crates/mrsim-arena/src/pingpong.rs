//! Double-buffered ping-pong arena.
//!
//! [`PingPongArena`] holds two isochromat buffers that alternate between
//! "published" (the state at the start of the current sample) and
//! "staging" (the state being advanced). The lifecycle per sample is:
//!
//! 1. `begin_step()`: seed staging from published, hand out staging
//! 2. Propagators update the staging slice in place, in pipeline order
//! 3. `publish()`: swap roles, bump the generation
//!
//! A failed step is discarded with `abandon()`; the published buffer is
//! never touched until `publish()`.

use mrsim_core::Magnetization;

use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// Double-buffered isochromat storage with ping-pong swap.
///
/// # Buffer layout
///
/// ```text
/// buffer_a: Vec<Magnetization>  ←── staging (even generations) / published (odd)
/// buffer_b: Vec<Magnetization>  ←── published (even generations) / staging (odd)
/// ```
pub struct PingPongArena {
    buffer_a: Vec<Magnetization>,
    buffer_b: Vec<Magnetization>,
    /// Which buffer is currently staging (false = A staging, true = B staging).
    b_is_staging: bool,
    /// Incremented on every publish.
    generation: u64,
    step_in_progress: bool,
}

impl PingPongArena {
    /// Create an arena of `config.cell_count` isochromats, all at `initial`.
    pub fn new(config: &ArenaConfig, initial: Magnetization) -> Result<Self, ArenaError> {
        if config.cell_count == 0 {
            return Err(ArenaError::EmptyArena);
        }
        Ok(Self {
            buffer_a: vec![initial; config.cell_count],
            buffer_b: vec![initial; config.cell_count],
            b_is_staging: false,
            generation: 0,
            step_in_progress: false,
        })
    }

    /// Number of isochromats.
    pub fn cell_count(&self) -> usize {
        self.buffer_a.len()
    }

    /// Number of completed publishes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The most recently published state.
    pub fn published(&self) -> &[Magnetization] {
        if self.b_is_staging {
            &self.buffer_a
        } else {
            &self.buffer_b
        }
    }

    /// Open a step: copy the published state into staging and borrow it.
    ///
    /// The slice must be dropped before [`publish()`](Self::publish).
    pub fn begin_step(&mut self) -> Result<&mut [Magnetization], ArenaError> {
        if self.step_in_progress {
            return Err(ArenaError::StepInProgress);
        }
        self.step_in_progress = true;
        let (staging, published) = if self.b_is_staging {
            (&mut self.buffer_b, &self.buffer_a)
        } else {
            (&mut self.buffer_a, &self.buffer_b)
        };
        staging.copy_from_slice(published);
        Ok(staging.as_mut_slice())
    }

    /// Close the step: staging becomes published.
    pub fn publish(&mut self) -> Result<(), ArenaError> {
        if !self.step_in_progress {
            return Err(ArenaError::NoStepInProgress);
        }
        self.step_in_progress = false;
        self.b_is_staging = !self.b_is_staging;
        self.generation += 1;
        Ok(())
    }

    /// Discard the open step, leaving the published state unchanged.
    pub fn abandon(&mut self) {
        self.step_in_progress = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena(n: usize) -> PingPongArena {
        PingPongArena::new(&ArenaConfig::new(n, 1), Magnetization::EQUILIBRIUM).unwrap()
    }

    #[test]
    fn staging_is_seeded_from_published() {
        let mut a = arena(3);
        let staging = a.begin_step().unwrap();
        assert_eq!(staging, &[Magnetization::EQUILIBRIUM; 3]);
        staging[1].x = 0.5;
        assert_eq!(a.published()[1].x, 0.0);
        a.publish().unwrap();
        assert_eq!(a.published()[1].x, 0.5);
        assert_eq!(a.generation(), 1);
    }

    #[test]
    fn writes_carry_across_publishes() {
        let mut a = arena(2);
        for i in 0..5 {
            let staging = a.begin_step().unwrap();
            assert_eq!(staging[0].x, i as f64);
            staging[0].x += 1.0;
            a.publish().unwrap();
        }
        assert_eq!(a.published()[0].x, 5.0);
        assert_eq!(a.published()[1], Magnetization::EQUILIBRIUM);
    }

    #[test]
    fn abandon_discards_staged_writes() {
        let mut a = arena(2);
        let staging = a.begin_step().unwrap();
        staging[0].z = -1.0;
        a.abandon();
        assert_eq!(a.published()[0], Magnetization::EQUILIBRIUM);
        assert_eq!(a.generation(), 0);
        assert!(a.begin_step().is_ok());
    }

    #[test]
    fn lifecycle_misuse_is_reported() {
        let mut a = arena(1);
        assert_eq!(a.publish(), Err(ArenaError::NoStepInProgress));
        let _ = a.begin_step().unwrap();
        assert!(matches!(a.begin_step(), Err(ArenaError::StepInProgress)));
    }

    #[test]
    fn empty_arena_is_rejected() {
        let err = PingPongArena::new(&ArenaConfig::new(0, 1), Magnetization::EQUILIBRIUM);
        assert!(matches!(err, Err(ArenaError::EmptyArena)));
    }
}
