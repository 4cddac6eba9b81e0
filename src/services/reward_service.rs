use std::collections::HashSet;

use rand::Rng;

use crate::state::game::{RewardBlock, RewardKind};

/// Fewest rewards generated per round.
const MIN_REWARDS: usize = 10;
/// Upper bound (exclusive) on rewards per round.
const MAX_REWARDS: usize = 16;

/// Generate the hidden reward set for one round.
///
/// Picks a count uniformly from `[MIN_REWARDS, MAX_REWARDS)`, then draws
/// distinct block ids uniformly from `[1, grid_size]` (resampling on
/// collision), a kind uniformly over the five kinds, and a value uniformly
/// from the kind's range. Returned in generation order.
pub fn generate(grid_size: u32) -> Vec<RewardBlock> {
    let mut rng = rand::rng();
    let count = rng.random_range(MIN_REWARDS..MAX_REWARDS);

    let mut used = HashSet::new();
    let mut rewards = Vec::with_capacity(count);

    for _ in 0..count {
        let block_id = loop {
            let candidate = rng.random_range(1..=grid_size);
            if used.insert(candidate) {
                break candidate;
            }
        };

        let kind = RewardKind::ALL[rng.random_range(0..RewardKind::ALL.len())];
        let value = rng.random_range(kind.value_range());

        rewards.push(RewardBlock {
            block_id,
            kind,
            value,
        });
    }

    rewards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_count_stays_in_bounds() {
        for _ in 0..50 {
            let rewards = generate(100);
            assert!(rewards.len() >= MIN_REWARDS);
            assert!(rewards.len() < MAX_REWARDS);
        }
    }

    #[test]
    fn block_ids_are_unique_and_in_range() {
        for _ in 0..50 {
            let rewards = generate(100);
            let ids: HashSet<u32> = rewards.iter().map(|r| r.block_id).collect();
            assert_eq!(ids.len(), rewards.len());
            assert!(ids.iter().all(|id| (1..=100).contains(id)));
        }
    }

    #[test]
    fn values_come_from_the_kind_specific_range() {
        for _ in 0..50 {
            for reward in generate(100) {
                assert!(
                    reward.kind.value_range().contains(&reward.value),
                    "{:?} value {} outside range",
                    reward.kind,
                    reward.value
                );
            }
        }
    }

    #[test]
    fn small_grids_are_supported() {
        // A grid barely larger than the reward count still terminates.
        let rewards = generate(16);
        let ids: HashSet<u32> = rewards.iter().map(|r| r.block_id).collect();
        assert_eq!(ids.len(), rewards.len());
        assert!(ids.iter().all(|id| (1..=16).contains(id)));
    }
}
