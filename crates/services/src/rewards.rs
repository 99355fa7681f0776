use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//
// ─── REWARD TYPES ──────────────────────────────────────────────────────────────
//

/// Scarcity tier of a reward. Rarer tiers carry a lower draw weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rarity {
    Common,
    Rare,
    Legendary,
}

impl Rarity {
    /// Relative draw weight within the locked pool.
    #[must_use]
    pub fn weight(self) -> u32 {
        match self {
            Self::Common => 5,
            Self::Rare => 2,
            Self::Legendary => 1,
        }
    }
}

/// A collectible handed out after finishing a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
}

/// Result of a draw: the reward, and whether it was already owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unlock {
    pub reward: Reward,
    pub was_already_unlocked: bool,
}

/// The fixed catalog rewards are drawn from.
#[derive(Debug, Clone, Default)]
pub struct RewardCollection {
    rewards: Vec<Reward>,
}

impl RewardCollection {
    #[must_use]
    pub fn new(rewards: Vec<Reward>) -> Self {
        Self { rewards }
    }

    #[must_use]
    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Draws a reward, preferring ones the caller has not unlocked yet.
    ///
    /// Locked rewards are drawn by rarity weight. Once everything is
    /// owned the draw falls back to a uniform pick over the whole
    /// catalog, flagged as already unlocked. An empty catalog yields
    /// `None`.
    #[must_use]
    pub fn unlock_random(&self, already_unlocked: &HashSet<String>) -> Option<Unlock> {
        self.draw(already_unlocked, &mut rand::rng())
    }

    /// Deterministic variant of [`RewardCollection::unlock_random`].
    #[must_use]
    pub fn unlock_random_seeded(&self, already_unlocked: &HashSet<String>, seed: u64) -> Option<Unlock> {
        self.draw(already_unlocked, &mut StdRng::seed_from_u64(seed))
    }

    fn draw<R: Rng>(&self, already_unlocked: &HashSet<String>, rng: &mut R) -> Option<Unlock> {
        if self.rewards.is_empty() {
            return None;
        }

        let locked: Vec<&Reward> = self
            .rewards
            .iter()
            .filter(|r| !already_unlocked.contains(&r.id))
            .collect();

        if locked.is_empty() {
            let index = rng.random_range(0..self.rewards.len());
            return Some(Unlock {
                reward: self.rewards[index].clone(),
                was_already_unlocked: true,
            });
        }

        let total: u32 = locked.iter().map(|r| r.rarity.weight()).sum();
        let mut roll = rng.random_range(0..total);
        for reward in &locked {
            let weight = reward.rarity.weight();
            if roll < weight {
                return Some(Unlock {
                    reward: (*reward).clone(),
                    was_already_unlocked: false,
                });
            }
            roll -= weight;
        }

        // Unreachable: the roll is below the summed weights.
        None
    }
}
