//! Crop lifecycle: empty -> seedling -> growing -> mature -> empty.

use chrono::{DateTime, Utc};
use contracts::{CropType, Player, Plot, PlotState, Resource};

use crate::balance::GameBalance;
use crate::error::GameError;
use crate::progression::{self, LevelChange};

pub fn plant(
    player: &mut Player,
    plot: &mut Plot,
    crop: CropType,
    now: DateTime<Utc>,
    balance: &GameBalance,
) -> Result<LevelChange, GameError> {
    let seed = crop.seed();
    let available = player.count(seed);
    if available == 0 {
        return Err(GameError::InsufficientInventory {
            resource: seed,
            required: 1,
            available,
        });
    }
    if plot.state != PlotState::Empty {
        return Err(GameError::PlotNotEmpty);
    }

    *player.counter_mut(seed) -= 1;
    plot.state = PlotState::Seedling;
    plot.crop_type = Some(crop);
    plot.planted_at = Some(now);
    plot.fertilized = false;

    Ok(progression::add_experience(player, balance.xp.plant, balance))
}

pub fn fertilize(player: &mut Player, plot: &mut Plot) -> Result<(), GameError> {
    if !matches!(plot.state, PlotState::Seedling | PlotState::Growing) {
        return Err(GameError::InvalidPlotState);
    }
    if plot.fertilized {
        return Err(GameError::AlreadyFertilized);
    }
    if player.fertilizer == 0 {
        return Err(GameError::InsufficientInventory {
            resource: Resource::Fertilizer,
            required: 1,
            available: 0,
        });
    }

    player.fertilizer -= 1;
    plot.fertilized = true;
    Ok(())
}

/// Returns the crop that came out of the ground.
pub fn harvest(
    player: &mut Player,
    plot: &mut Plot,
    balance: &GameBalance,
) -> Result<(CropType, LevelChange), GameError> {
    if plot.state != PlotState::Mature {
        return Err(GameError::PlotNotMature);
    }

    // A mature plot always carries its crop; older rows without one were pumpkins.
    let crop = plot.crop_type.unwrap_or(CropType::Pumpkin);
    let produce = player.counter_mut(crop.produce());
    *produce = produce.saturating_add(1);

    plot.state = PlotState::Empty;
    plot.crop_type = None;
    plot.planted_at = None;
    plot.fertilized = false;

    let change = progression::add_experience(player, balance.xp.harvest, balance);
    Ok((crop, change))
}

/// Stage implied by the time since planting.
pub fn growth_stage(
    crop: CropType,
    planted_at: DateTime<Utc>,
    fertilized: bool,
    now: DateTime<Utc>,
    balance: &GameBalance,
) -> PlotState {
    let minutes_elapsed = (now - planted_at).num_minutes().max(0);
    let effective_minutes = if fertilized {
        minutes_elapsed.saturating_mul(2)
    } else {
        minutes_elapsed
    };
    let growth_time = balance.growth_minutes(crop);

    if effective_minutes >= growth_time {
        PlotState::Mature
    } else if effective_minutes.saturating_mul(2) >= growth_time {
        PlotState::Growing
    } else {
        PlotState::Seedling
    }
}

/// Advances the plot to the stage its elapsed time implies. Never moves it back.
/// Returns whether the state changed.
pub fn recompute_growth(plot: &mut Plot, now: DateTime<Utc>, balance: &GameBalance) -> bool {
    if matches!(plot.state, PlotState::Empty | PlotState::Mature) {
        return false;
    }
    let Some(planted_at) = plot.planted_at else {
        return false;
    };
    let crop = plot.crop_type.unwrap_or(CropType::Pumpkin);

    let next = growth_stage(crop, planted_at, plot.fertilized, now, balance).max(plot.state);
    if next == plot.state {
        return false;
    }
    plot.state = next;
    true
}

/// Minutes until the plot matures, as the client's tooltip shows it.
pub fn minutes_until_mature(plot: &Plot, now: DateTime<Utc>, balance: &GameBalance) -> Option<i64> {
    let planted_at = plot.planted_at?;
    let crop = plot.crop_type?;
    let minutes_elapsed = (now - planted_at).num_minutes().max(0);
    let effective = if plot.fertilized {
        minutes_elapsed.saturating_mul(2)
    } else {
        minutes_elapsed
    };
    Some((balance.growth_minutes(crop) - effective).max(0))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::testkit::{epoch, player};

    fn planted(crop: CropType) -> Plot {
        let mut plot = Plot::empty("p1", 0, 0);
        plot.state = PlotState::Seedling;
        plot.crop_type = Some(crop);
        plot.planted_at = Some(epoch());
        plot
    }

    #[test]
    fn plant_consumes_matching_seed() {
        let balance = GameBalance::default();
        let mut p = player();
        p.seeds = 3;
        p.apple_seeds = 1;
        let mut plot = Plot::empty("p1", 0, 0);

        plant(&mut p, &mut plot, CropType::Apple, epoch(), &balance).expect("plant apple");
        assert_eq!(p.apple_seeds, 0);
        assert_eq!(p.seeds, 3);
        assert_eq!(plot.state, PlotState::Seedling);
        assert_eq!(plot.crop_type, Some(CropType::Apple));
        assert_eq!(plot.planted_at, Some(epoch()));
        assert_eq!(p.experience, 5);
    }

    #[test]
    fn plant_checks_seeds_before_plot_state() {
        let balance = GameBalance::default();
        let mut p = player();
        let mut plot = planted(CropType::Pumpkin);

        let err = plant(&mut p, &mut plot, CropType::Pumpkin, epoch(), &balance)
            .expect_err("no seeds");
        assert!(matches!(
            err,
            GameError::InsufficientInventory { resource: Resource::Seeds, .. }
        ));

        p.seeds = 2;
        let err = plant(&mut p, &mut plot, CropType::Pumpkin, epoch(), &balance)
            .expect_err("occupied");
        assert_eq!(err, GameError::PlotNotEmpty);
        assert_eq!(p.seeds, 2);
        assert_eq!(p.experience, 0);
    }

    #[test]
    fn fertilize_rules() {
        let mut p = player();
        let mut empty = Plot::empty("p1", 0, 0);
        assert_eq!(fertilize(&mut p, &mut empty), Err(GameError::InvalidPlotState));

        let mut plot = planted(CropType::Pumpkin);
        assert!(matches!(
            fertilize(&mut p, &mut plot),
            Err(GameError::InsufficientInventory { resource: Resource::Fertilizer, .. })
        ));

        p.fertilizer = 2;
        fertilize(&mut p, &mut plot).expect("fertilize");
        assert!(plot.fertilized);
        assert_eq!(p.fertilizer, 1);
        assert_eq!(fertilize(&mut p, &mut plot), Err(GameError::AlreadyFertilized));
        assert_eq!(p.fertilizer, 1);

        plot.state = PlotState::Mature;
        plot.fertilized = false;
        assert_eq!(fertilize(&mut p, &mut plot), Err(GameError::InvalidPlotState));
    }

    #[test]
    fn fertilizer_doubles_growth_rate() {
        let balance = GameBalance::default();
        let at_30 = epoch() + Duration::minutes(30);

        let mut fertilized = planted(CropType::Pumpkin);
        fertilized.fertilized = true;
        recompute_growth(&mut fertilized, at_30, &balance);
        assert_eq!(fertilized.state, PlotState::Mature);

        let mut plain = planted(CropType::Pumpkin);
        recompute_growth(&mut plain, at_30, &balance);
        assert_eq!(plain.state, PlotState::Growing);
    }

    #[test]
    fn apple_matures_in_fifteen_minutes() {
        let balance = GameBalance::default();
        let mut plot = planted(CropType::Apple);

        recompute_growth(&mut plot, epoch() + Duration::minutes(7), &balance);
        assert_eq!(plot.state, PlotState::Seedling);
        recompute_growth(&mut plot, epoch() + Duration::minutes(8), &balance);
        assert_eq!(plot.state, PlotState::Growing);
        recompute_growth(&mut plot, epoch() + Duration::minutes(14), &balance);
        assert_eq!(plot.state, PlotState::Growing);
        assert!(recompute_growth(&mut plot, epoch() + Duration::minutes(15), &balance));
        assert_eq!(plot.state, PlotState::Mature);
    }

    #[test]
    fn growth_never_regresses() {
        let balance = GameBalance::default();
        let mut plot = planted(CropType::Pumpkin);
        plot.state = PlotState::Growing;

        // A clock that went backwards must not undo progress.
        assert!(!recompute_growth(&mut plot, epoch() - Duration::minutes(10), &balance));
        assert_eq!(plot.state, PlotState::Growing);
    }

    #[test]
    fn recompute_ignores_empty_and_mature() {
        let balance = GameBalance::default();
        let mut empty = Plot::empty("p1", 1, 1);
        assert!(!recompute_growth(&mut empty, epoch() + Duration::days(3), &balance));
        assert_eq!(empty.state, PlotState::Empty);

        let mut orphan = Plot::empty("p1", 1, 2);
        orphan.state = PlotState::Seedling;
        assert!(!recompute_growth(&mut orphan, epoch() + Duration::days(3), &balance));
        assert_eq!(orphan.state, PlotState::Seedling);
    }

    #[test]
    fn harvest_resets_plot_and_grants_crop() {
        let balance = GameBalance::default();
        let mut p = player();
        let mut plot = planted(CropType::Apple);
        plot.fertilized = true;

        assert_eq!(
            harvest(&mut p, &mut plot, &balance).map(|(crop, _)| crop),
            Err(GameError::PlotNotMature)
        );

        plot.state = PlotState::Mature;
        let (crop, _) = harvest(&mut p, &mut plot, &balance).expect("harvest");
        assert_eq!(crop, CropType::Apple);
        assert_eq!(p.apples, 1);
        assert_eq!(p.pumpkins, 0);
        assert_eq!(p.experience, 10);
        assert_eq!(plot, Plot::empty("p1", 0, 0));
    }

    #[test]
    fn minutes_until_mature_counts_down() {
        let balance = GameBalance::default();
        let plot = planted(CropType::Pumpkin);
        assert_eq!(
            minutes_until_mature(&plot, epoch() + Duration::minutes(20), &balance),
            Some(40)
        );
        assert_eq!(
            minutes_until_mature(&plot, epoch() + Duration::minutes(90), &balance),
            Some(0)
        );
        assert_eq!(minutes_until_mature(&Plot::empty("p1", 0, 0), epoch(), &balance), None);
    }
}
