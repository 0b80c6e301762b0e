use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::delay::Delay;
use crate::game::Card;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[serde(tag = "type")]
pub enum AiError {
    #[error("cannot select a card from an empty hand")]
    EmptyHand,
    #[error("invalid AI configuration: {reason}")]
    InvalidConfig { reason: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    pub min_play_delay: u32,
    pub max_play_delay: u32,
    pub suboptimal_move_chance: f64,
}

impl AiConfig {
    pub fn validate(&self) -> Result<(), AiError> {
        if self.min_play_delay > self.max_play_delay {
            return Err(AiError::InvalidConfig {
                reason: format!(
                    "min_play_delay ({}) exceeds max_play_delay ({})",
                    self.min_play_delay, self.max_play_delay
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.suboptimal_move_chance) {
            return Err(AiError::InvalidConfig {
                reason: format!(
                    "suboptimal_move_chance {} is outside [0, 1]",
                    self.suboptimal_move_chance
                ),
            });
        }
        Ok(())
    }

    pub fn with_delay(mut self, min: u32, max: u32) -> Self {
        self.min_play_delay = min;
        self.max_play_delay = max;
        self
    }

    pub fn with_suboptimal_chance(mut self, chance: f64) -> Self {
        self.suboptimal_move_chance = chance;
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            min_play_delay: 1000,
            max_play_delay: 2000,
            suboptimal_move_chance: 0.3,
        }
    }
}

/// 简单难度的对手：大多数时候打出攻击力最高的牌，偶尔随机出牌。
#[derive(Debug, Clone)]
pub struct EasyAi<R = SmallRng> {
    config: AiConfig,
    rng: R,
}

impl EasyAi<SmallRng> {
    pub fn new(config: AiConfig) -> Result<Self, AiError> {
        Self::with_rng(config, SmallRng::from_entropy())
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Result<Self, AiError> {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> EasyAi<R> {
    pub fn with_rng(config: AiConfig, rng: R) -> Result<Self, AiError> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    /// Returns a copy; mutating it does not affect the AI.
    pub fn config(&self) -> AiConfig {
        self.config
    }

    pub fn set_config(&mut self, config: AiConfig) -> Result<(), AiError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn select_card(&mut self, hand: &[Card]) -> Result<usize, AiError> {
        if hand.is_empty() {
            return Err(AiError::EmptyHand);
        }

        if self.rng.gen::<f64>() < self.config.suboptimal_move_chance {
            let index = self.rng.gen_range(0..hand.len());
            log::debug!("ai picked suboptimal card #{index}");
            return Ok(index);
        }

        Ok(strongest_card(hand))
    }

    pub fn play_delay(&mut self) -> u32 {
        self.rng
            .gen_range(self.config.min_play_delay..=self.config.max_play_delay)
    }

    /// 预先决定延迟与出牌，随机数消耗顺序与 `execute_turn` 一致。
    pub fn plan_turn(&mut self, hand: &[Card]) -> (u32, Result<usize, AiError>) {
        let millis = self.play_delay();
        (millis, self.select_card(hand))
    }

    /// 等待“思考”延迟后选出要打的牌；延迟总会完整执行。
    pub async fn execute_turn<D: Delay>(
        &mut self,
        hand: &[Card],
        delay: &D,
    ) -> Result<usize, AiError> {
        let (millis, choice) = self.plan_turn(hand);
        log::debug!("ai thinking for {millis}ms");
        delay.sleep(millis).await;
        choice
    }
}

/// 第一张最高攻击力的牌。
fn strongest_card(hand: &[Card]) -> usize {
    let mut best = 0;
    for (index, card) in hand.iter().enumerate().skip(1) {
        if card.attack() > hand[best].attack() {
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{CardStats, CardType, Rarity};
    use std::cell::RefCell;
    use std::future::{ready, Ready};

    #[derive(Default)]
    struct RecordingDelay {
        requested: RefCell<Vec<u32>>,
    }

    impl Delay for RecordingDelay {
        type Sleep = Ready<()>;

        fn sleep(&self, millis: u32) -> Self::Sleep {
            self.requested.borrow_mut().push(millis);
            ready(())
        }
    }

    fn hand(attacks: &[u32]) -> Vec<Card> {
        attacks
            .iter()
            .enumerate()
            .map(|(n, attack)| {
                Card::new(
                    format!("h{n}"),
                    "Hand card",
                    CardType::Attack,
                    Rarity::Common,
                    CardStats {
                        attack: *attack,
                        defense: 0,
                        speed: 0,
                    },
                )
            })
            .collect()
    }

    fn greedy() -> EasyAi {
        EasyAi::with_seed(AiConfig::default().with_suboptimal_chance(0.0), 5).expect("config")
    }

    #[test]
    fn empty_hand_is_an_error() {
        let mut ai = greedy();
        assert_eq!(ai.select_card(&[]), Err(AiError::EmptyHand));
    }

    #[test]
    fn greedy_ai_picks_highest_attack() {
        let mut ai = greedy();
        let cards = hand(&[3, 9, 4, 7]);
        for _ in 0..50 {
            assert_eq!(ai.select_card(&cards), Ok(1));
        }
    }

    #[test]
    fn ties_go_to_first_occurrence() {
        let mut ai = greedy();
        assert_eq!(ai.select_card(&hand(&[2, 8, 8, 1])), Ok(1));
        assert_eq!(ai.select_card(&hand(&[5, 5, 5])), Ok(0));
    }

    #[test]
    fn always_suboptimal_spreads_over_every_index() {
        let config = AiConfig::default().with_suboptimal_chance(1.0);
        let mut ai = EasyAi::with_seed(config, 99).expect("config");
        let cards = hand(&[1, 50, 2, 3, 4]);
        let mut counts = [0usize; 5];
        for _ in 0..5000 {
            counts[ai.select_card(&cards).expect("non-empty")] += 1;
        }
        for count in counts {
            assert!((800..1200).contains(&count), "counts: {counts:?}");
        }
    }

    #[test]
    fn fixed_delay_when_bounds_match() {
        let config = AiConfig::default().with_delay(750, 750);
        let mut ai = EasyAi::with_seed(config, 1).expect("config");
        for _ in 0..20 {
            assert_eq!(ai.play_delay(), 750);
        }
    }

    #[test]
    fn delay_stays_within_bounds() {
        let mut ai = EasyAi::with_seed(AiConfig::default(), 2).expect("config");
        for _ in 0..500 {
            let delay = ai.play_delay();
            assert!((1000..=2000).contains(&delay));
        }
    }

    #[test]
    fn config_is_copied_on_read() {
        let mut ai = greedy();
        let mut snapshot = ai.config();
        snapshot.min_play_delay = 1;
        assert_eq!(ai.config().min_play_delay, 1000);

        ai.set_config(AiConfig::default().with_delay(10, 20))
            .expect("valid config");
        assert_eq!(snapshot.max_play_delay, 2000);
        assert_eq!(ai.config().max_play_delay, 20);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(EasyAi::with_seed(AiConfig::default().with_delay(5, 1), 0).is_err());
        assert!(EasyAi::with_seed(AiConfig::default().with_suboptimal_chance(1.5), 0).is_err());
        let mut ai = greedy();
        assert!(ai.set_config(AiConfig::default().with_suboptimal_chance(-0.1)).is_err());
        assert_eq!(ai.config().suboptimal_move_chance, 0.0);
    }

    #[test]
    fn execute_turn_waits_then_selects() {
        let config = AiConfig::default()
            .with_delay(300, 300)
            .with_suboptimal_chance(0.0);
        let mut ai = EasyAi::with_seed(config, 3).expect("config");
        let delay = RecordingDelay::default();
        let cards = hand(&[1, 2, 30]);

        let choice = futures::executor::block_on(ai.execute_turn(&cards, &delay));

        assert_eq!(choice, Ok(2));
        assert_eq!(*delay.requested.borrow(), vec![300]);
    }

    #[test]
    fn execute_turn_on_empty_hand_still_waits() {
        let mut ai = greedy();
        let delay = RecordingDelay::default();
        let choice = futures::executor::block_on(ai.execute_turn(&[], &delay));
        assert_eq!(choice, Err(AiError::EmptyHand));
        assert_eq!(delay.requested.borrow().len(), 1);
    }

    #[test]
    fn planned_turn_matches_executed_turn() {
        let cards = hand(&[4, 11, 6, 2, 9]);
        let mut planner = EasyAi::with_seed(AiConfig::default(), 42).expect("config");
        let mut runner = EasyAi::with_seed(AiConfig::default(), 42).expect("config");
        let delay = RecordingDelay::default();

        for _ in 0..20 {
            let (millis, planned) = planner.plan_turn(&cards);
            let executed = futures::executor::block_on(runner.execute_turn(&cards, &delay));
            assert_eq!(planned, executed);
            assert_eq!(delay.requested.borrow().last(), Some(&millis));
        }
    }
}
