//! Move selection policies. None of them try to play well.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::MovePolicyKind;

/// Picks one index out of `count` legal moves. `count` is never zero.
pub trait MovePolicy: Send {
    fn pick(&mut self, count: usize) -> usize;
}

pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl MovePolicy for RandomPolicy {
    fn pick(&mut self, count: usize) -> usize {
        self.rng.gen_range(0..count)
    }
}

pub struct FirstLegalPolicy;

impl MovePolicy for FirstLegalPolicy {
    fn pick(&mut self, _count: usize) -> usize {
        0
    }
}

/// Build the policy for one game. Seeded play derives a distinct stream per
/// board and game so restarted games do not replay the previous one.
pub fn build_policy(
    kind: MovePolicyKind,
    seed: Option<u64>,
    board: u32,
    game: u32,
) -> Box<dyn MovePolicy> {
    match (kind, seed) {
        (MovePolicyKind::FirstLegal, _) => Box::new(FirstLegalPolicy),
        (MovePolicyKind::Random, Some(seed)) => {
            let stream = (u64::from(board) << 32) | u64::from(game);
            Box::new(RandomPolicy::seeded(seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
        }
        (MovePolicyKind::Random, None) => Box::new(RandomPolicy::from_entropy()),
    }
}
