//! Score, experience and level bookkeeping.

const FIRST_THRESHOLD: u32 = 100;
const LEVEL_BONUS: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Progress {
    pub(crate) score: u32,
    pub(crate) level: u32,
    pub(crate) experience: u32,
    pub(crate) threshold: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            experience: 0,
            threshold: FIRST_THRESHOLD,
        }
    }
}

impl Progress {
    /// Adds score scaled by `multiplier` and unscaled experience.
    pub(crate) fn award(&mut self, score: u32, experience: u32, multiplier: u32) {
        self.score = self
            .score
            .saturating_add(score.saturating_mul(multiplier.max(1)));
        self.experience = self.experience.saturating_add(experience);
    }

    /// Sets experience to exactly the current threshold.
    pub(crate) fn fill_experience(&mut self) {
        self.experience = self.threshold;
    }

    pub(crate) fn level_up_due(&self) -> bool {
        self.experience >= self.threshold
    }

    /// Consumes one threshold of experience and raises the level.
    ///
    /// Overflow carries into the next level. Returns the level reached.
    pub(crate) fn level_up(&mut self) -> u32 {
        self.experience -= self.threshold.min(self.experience);
        self.level += 1;
        self.threshold = self.threshold.saturating_mul(3) / 2;
        self.score = self
            .score
            .saturating_add(LEVEL_BONUS.saturating_mul(self.level));
        self.level
    }
}

/// Experience granted by a dice roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DiceExperience {
    Add(u32),
    FillToThreshold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DiceReward {
    pub(crate) score: u32,
    pub(crate) experience: DiceExperience,
    pub(crate) achievement: &'static str,
}

/// Tiered reward for a twenty-sided die. Score never decreases as the roll grows.
pub(crate) fn dice_reward(roll: u8) -> DiceReward {
    let value = u32::from(roll);
    let (score, experience, achievement) = match roll {
        20 => (300, DiceExperience::FillToThreshold, "Critical success!"),
        16..=19 => (value * 5, DiceExperience::Add(value * 2), "Great success!"),
        11..=15 => (value * 3, DiceExperience::Add(value), "Success!"),
        6..=10 => (value * 2, DiceExperience::Add(value / 2), "Small success"),
        2..=5 => (value, DiceExperience::Add(0), "Failure"),
        _ => (1, DiceExperience::Add(0), "Critical failure..."),
    };
    DiceReward {
        score,
        experience,
        achievement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_grows_geometrically_and_overflow_carries() {
        let mut progress = Progress::default();
        progress.award(10, 130, 1);
        assert!(progress.level_up_due());
        assert_eq!(progress.level_up(), 2);
        assert_eq!(progress.experience, 30);
        assert_eq!(progress.threshold, 150);
        assert_eq!(progress.score, 110);
        assert!(!progress.level_up_due());
    }

    #[test]
    fn multiplier_scales_score_only() {
        let mut progress = Progress::default();
        progress.award(50, 20, 2);
        assert_eq!(progress.score, 100);
        assert_eq!(progress.experience, 20);
    }

    #[test]
    fn natural_twenty_fills_experience() {
        let reward = dice_reward(20);
        assert_eq!(reward.score, 300);
        assert_eq!(reward.experience, DiceExperience::FillToThreshold);
        assert_eq!(reward.achievement, "Critical success!");

        let mut progress = Progress::default();
        progress.award(0, 40, 1);
        progress.fill_experience();
        assert_eq!(progress.experience, progress.threshold);
        assert!(progress.level_up_due());
    }

    #[test]
    fn natural_twenty_drops_surplus_experience() {
        let mut progress = Progress::default();
        progress.award(0, 260, 1);
        assert_eq!(progress.level_up(), 2);
        assert_eq!(progress.experience, 160);
        assert!(progress.experience > progress.threshold);

        progress.fill_experience();
        assert_eq!(progress.experience, 150);
    }

    #[test]
    fn every_tier_has_its_own_announcement() {
        let tiers: Vec<&str> = [1, 3, 8, 12, 17, 20]
            .into_iter()
            .map(|roll| dice_reward(roll).achievement)
            .collect();
        let mut unique = tiers.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), tiers.len());

        let mid = dice_reward(12);
        assert_eq!(mid.score, 36);
        assert_eq!(mid.experience, DiceExperience::Add(12));
        assert_eq!(mid.achievement, "Success!");
    }

    #[test]
    fn dice_score_is_monotonic_in_the_roll() {
        let scores: Vec<u32> = (1..=20).map(|roll| dice_reward(roll).score).collect();
        assert!(scores.windows(2).all(|pair| pair[0] <= pair[1]), "{scores:?}");
        assert_eq!(dice_reward(1).achievement, "Critical failure...");
        assert_eq!(dice_reward(5).score, 5);
        assert_eq!(dice_reward(10).score, 20);
        assert_eq!(dice_reward(15).score, 45);
        assert_eq!(dice_reward(16).score, 80);
    }
}
