//! Seasonal challenges: time-boxed objectives fed by the player's own actions.

use chrono::{DateTime, Duration, Utc};
use contracts::{ChallengeStatus, ChallengeType, Player, Resource, ResourceBundle, SeasonalChallenge};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::balance::GameBalance;
use crate::economy;
use crate::orders::random_id;

const CHALLENGE_TYPES: [ChallengeType; 5] = [
    ChallengeType::Harvest,
    ChallengeType::Plant,
    ChallengeType::Bake,
    ChallengeType::Earn,
    ChallengeType::Expand,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressOutcome {
    /// Challenge was not active; nothing changed.
    Ignored,
    Progressed { current: u32, target: u32 },
    Completed { rewards: ResourceBundle },
}

struct Blueprint {
    title: &'static str,
    target: u32,
    description: String,
    rewards: ResourceBundle,
}

fn blueprint(challenge_type: ChallengeType, difficulty: u8) -> Blueprint {
    let d = u32::from(difficulty);
    match challenge_type {
        ChallengeType::Harvest => {
            let target = 3 * d;
            Blueprint {
                title: "Harvest Festival",
                target,
                description: format!("Harvest {target} crops"),
                rewards: ResourceBundle::default()
                    .with(Resource::Coins, 40 * d)
                    .with(Resource::Seeds, 2 * d),
            }
        }
        ChallengeType::Plant => {
            let target = 4 * d;
            Blueprint {
                title: "Green Thumb",
                target,
                description: format!("Plant {target} seeds"),
                rewards: ResourceBundle::default()
                    .with(Resource::Coins, 30 * d)
                    .with(Resource::Fertilizer, d),
            }
        }
        ChallengeType::Bake => {
            let target = d;
            Blueprint {
                title: "Pie Season",
                target,
                description: format!("Bake {target} pies"),
                rewards: ResourceBundle::default()
                    .with(Resource::Coins, 60 * d)
                    .with(Resource::Pumpkins, d),
            }
        }
        ChallengeType::Earn => {
            let target = 100 * d;
            Blueprint {
                title: "Market Day",
                target,
                description: format!("Earn {target} coins from sales and orders"),
                rewards: ResourceBundle::default()
                    .with(Resource::Coins, 25 * d)
                    .with(Resource::Tools, d.div_ceil(2)),
            }
        }
        ChallengeType::Expand => {
            let target = 1 + d / 3;
            Blueprint {
                title: "Growing Ambitions",
                target,
                description: format!("Expand your farm or kitchen {target} times"),
                rewards: ResourceBundle::default().with(Resource::Coins, 75 * d),
            }
        }
    }
}

fn is_unlocked(challenge_type: ChallengeType, player: &Player) -> bool {
    match challenge_type {
        ChallengeType::Bake => player.kitchen_unlocked,
        _ => true,
    }
}

/// A fresh batch of distinct challenge types. Callers clear old active
/// entries before storing these.
pub fn generate_challenges<R: Rng + ?Sized>(
    player: &Player,
    now: DateTime<Utc>,
    rng: &mut R,
    balance: &GameBalance,
) -> Vec<SeasonalChallenge> {
    let expires_at = now + Duration::hours(balance.challenge_lifetime_hours);

    CHALLENGE_TYPES
        .choose_multiple(rng, balance.challenges_per_batch)
        .copied()
        .collect::<Vec<_>>()
        .into_iter()
        .map(|challenge_type| {
            let difficulty = rng.gen_range(1..=5_u8);
            let plan = blueprint(challenge_type, difficulty);
            let status = if is_unlocked(challenge_type, player) {
                ChallengeStatus::Active
            } else {
                ChallengeStatus::Locked
            };
            SeasonalChallenge {
                player_id: player.id.clone(),
                challenge_id: random_id(rng),
                challenge_type,
                title: plan.title.to_string(),
                description: plan.description,
                target_value: plan.target,
                current_progress: 0,
                rewards: plan.rewards,
                status,
                difficulty,
                expires_at,
                completed_at: None,
            }
        })
        .collect()
}

/// Active past its deadline becomes failed.
pub fn expire_if_due(challenge: &mut SeasonalChallenge, now: DateTime<Utc>) -> bool {
    if challenge.status == ChallengeStatus::Active && challenge.expires_at < now {
        challenge.status = ChallengeStatus::Failed;
        return true;
    }
    false
}

/// Locked becomes active once the player meets its gate.
pub fn promote_if_unlocked(challenge: &mut SeasonalChallenge, player: &Player) -> bool {
    if challenge.status == ChallengeStatus::Locked && is_unlocked(challenge.challenge_type, player) {
        challenge.status = ChallengeStatus::Active;
        return true;
    }
    false
}

/// Adds `delta` to an active challenge. Completion flips the status and
/// credits rewards in the same step, so rewards are paid exactly once.
pub fn update_challenge_progress(
    player: &mut Player,
    challenge: &mut SeasonalChallenge,
    delta: u32,
    now: DateTime<Utc>,
) -> ProgressOutcome {
    expire_if_due(challenge, now);
    if challenge.status != ChallengeStatus::Active || delta == 0 {
        return ProgressOutcome::Ignored;
    }

    challenge.current_progress = challenge.current_progress.saturating_add(delta);
    if challenge.current_progress < challenge.target_value {
        return ProgressOutcome::Progressed {
            current: challenge.current_progress,
            target: challenge.target_value,
        };
    }

    challenge.status = ChallengeStatus::Completed;
    challenge.completed_at = Some(now);
    economy::credit(player, &challenge.rewards);
    tracing::info!(
        player_id = %player.id,
        challenge_id = %challenge.challenge_id,
        challenge_type = ?challenge.challenge_type,
        "challenge completed"
    );

    ProgressOutcome::Completed {
        rewards: challenge.rewards.clone(),
    }
}

/// Feeds an action into every active challenge of the matching type and
/// returns the ids of challenges that completed.
pub fn record_activity<'a>(
    player: &mut Player,
    challenges: impl IntoIterator<Item = &'a mut SeasonalChallenge>,
    challenge_type: ChallengeType,
    amount: u32,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut completed = Vec::new();
    for challenge in challenges {
        if challenge.challenge_type != challenge_type {
            continue;
        }
        if let ProgressOutcome::Completed { .. } =
            update_challenge_progress(player, challenge, amount, now)
        {
            completed.push(challenge.challenge_id.clone());
        }
    }
    completed
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::testkit::{epoch, player};

    fn harvest_challenge(target: u32) -> SeasonalChallenge {
        SeasonalChallenge {
            player_id: "p1".to_string(),
            challenge_id: "c1".to_string(),
            challenge_type: ChallengeType::Harvest,
            title: "Harvest Festival".to_string(),
            description: format!("Harvest {target} crops"),
            target_value: target,
            current_progress: 0,
            rewards: ResourceBundle::default()
                .with(Resource::Coins, 40)
                .with(Resource::Seeds, 2),
            status: ChallengeStatus::Active,
            difficulty: 1,
            expires_at: epoch() + Duration::hours(72),
            completed_at: None,
        }
    }

    #[test]
    fn batch_has_distinct_types_and_locks_bake_without_kitchen() {
        let balance = GameBalance::default();
        let p = player();

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let batch = generate_challenges(&p, epoch(), &mut rng, &balance);
            assert_eq!(batch.len(), 3);

            let types = batch.iter().map(|c| c.challenge_type).collect::<HashSet<_>>();
            assert_eq!(types.len(), 3);

            for challenge in &batch {
                assert!((1..=5).contains(&challenge.difficulty));
                assert!(challenge.target_value > 0);
                assert_eq!(challenge.current_progress, 0);
                let expected = if challenge.challenge_type == ChallengeType::Bake {
                    ChallengeStatus::Locked
                } else {
                    ChallengeStatus::Active
                };
                assert_eq!(challenge.status, expected);
            }
        }
    }

    #[test]
    fn completion_pays_exactly_once() {
        let mut p = player();
        let mut challenge = harvest_challenge(3);

        assert_eq!(
            update_challenge_progress(&mut p, &mut challenge, 2, epoch()),
            ProgressOutcome::Progressed { current: 2, target: 3 }
        );
        assert_eq!(p.coins, 0);

        assert!(matches!(
            update_challenge_progress(&mut p, &mut challenge, 5, epoch()),
            ProgressOutcome::Completed { .. }
        ));
        assert_eq!(challenge.status, ChallengeStatus::Completed);
        assert_eq!(challenge.completed_at, Some(epoch()));
        assert_eq!(p.coins, 40);
        assert_eq!(p.seeds, 2);

        assert_eq!(
            update_challenge_progress(&mut p, &mut challenge, 1, epoch()),
            ProgressOutcome::Ignored
        );
        assert_eq!(challenge.current_progress, 7);
        assert_eq!(p.coins, 40);
    }

    #[test]
    fn expired_challenge_fails_and_ignores_progress() {
        let mut p = player();
        let mut challenge = harvest_challenge(1);
        let late = challenge.expires_at + Duration::seconds(1);

        assert_eq!(
            update_challenge_progress(&mut p, &mut challenge, 1, late),
            ProgressOutcome::Ignored
        );
        assert_eq!(challenge.status, ChallengeStatus::Failed);
        assert_eq!(p.coins, 0);
    }

    #[test]
    fn locked_challenge_promotes_with_kitchen() {
        let mut p = player();
        let mut challenge = harvest_challenge(1);
        challenge.challenge_type = ChallengeType::Bake;
        challenge.status = ChallengeStatus::Locked;

        assert!(!promote_if_unlocked(&mut challenge, &p));
        assert_eq!(
            update_challenge_progress(&mut p, &mut challenge, 1, epoch()),
            ProgressOutcome::Ignored
        );

        p.kitchen_unlocked = true;
        assert!(promote_if_unlocked(&mut challenge, &p));
        assert_eq!(challenge.status, ChallengeStatus::Active);
    }

    #[test]
    fn record_activity_only_touches_matching_type() {
        let mut p = player();
        let mut harvest = harvest_challenge(1);
        let mut plant = harvest_challenge(1);
        plant.challenge_id = "c2".to_string();
        plant.challenge_type = ChallengeType::Plant;

        let mut all = vec![harvest.clone(), plant.clone()];
        let completed = record_activity(&mut p, all.iter_mut(), ChallengeType::Harvest, 1, epoch());
        assert_eq!(completed, vec!["c1".to_string()]);
        assert_eq!(all[1].current_progress, 0);

        harvest.status = ChallengeStatus::Completed;
        plant.status = ChallengeStatus::Failed;
        let mut finished = vec![harvest, plant];
        assert!(record_activity(&mut p, finished.iter_mut(), ChallengeType::Plant, 3, epoch())
            .is_empty());
    }
}
