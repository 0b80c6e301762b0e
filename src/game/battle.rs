use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;

use super::cards::{Card, CardDatabase};
use super::combat::{CombatContext, CombatEvent, CombatMachine, CombatSignal, CombatState};
use super::deck::{create_deck, DeckError};
use super::hand::HandManager;
use crate::ai::{AiConfig, AiError, Delay, EasyAi};
use crate::config::{ConfigError, GameConfig};

#[derive(Debug, Clone, Serialize, PartialEq, thiserror::Error)]
#[serde(tag = "type", content = "error")]
pub enum BattleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Ai(#[from] AiError),
}

/// 对外展示的对局快照。
#[derive(Debug, Clone, Serialize)]
pub struct BattleView<'a> {
    pub state: CombatState,
    pub context: &'a CombatContext,
    pub hand: &'a [Card],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<usize>,
    pub deck_remaining: usize,
    pub opponent_hand_size: usize,
    pub opponent_deck_remaining: usize,
}

/// 一场完整的对局：战斗状态机、双方手牌与 AI 对手。
#[derive(Debug)]
pub struct Battle {
    machine: CombatMachine,
    player: HandManager,
    opponent: HandManager,
    ai: EasyAi,
}

fn make_rng(seed: Option<u64>, stream: u64) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(stream)),
        None => SmallRng::from_entropy(),
    }
}

impl Battle {
    pub fn new(database: &CardDatabase, config: &GameConfig) -> Result<Self, BattleError> {
        config.validate()?;
        let mut deck_rng = make_rng(config.seed, 0);
        let player_deck = create_deck(database, config.deck_size, &mut deck_rng)?;
        let opponent_deck = create_deck(database, config.deck_size, &mut deck_rng)?;

        let mut player = HandManager::new(player_deck, make_rng(config.seed, 1));
        let mut opponent = HandManager::new(opponent_deck, make_rng(config.seed, 2));
        player.deal(config.initial_hand_size);
        opponent.deal(config.initial_hand_size);

        let ai = EasyAi::with_rng(config.ai, make_rng(config.seed, 3))?;

        Ok(Self {
            machine: CombatMachine::with_starting_hp(config.starting_hp),
            player,
            opponent,
            ai,
        })
    }

    pub fn state(&self) -> CombatState {
        self.machine.state()
    }

    pub fn context(&self) -> &CombatContext {
        self.machine.context()
    }

    pub fn player_hand(&self) -> &HandManager {
        &self.player
    }

    pub fn opponent_hand(&self) -> &HandManager {
        &self.opponent
    }

    pub fn ai_config(&self) -> AiConfig {
        self.ai.config()
    }

    pub fn set_ai_config(&mut self, config: AiConfig) -> Result<(), AiError> {
        self.ai.set_config(config)
    }

    pub fn view(&self) -> BattleView<'_> {
        BattleView {
            state: self.machine.state(),
            context: self.machine.context(),
            hand: self.player.hand(),
            selected_index: self.player.selected_index(),
            deck_remaining: self.player.deck().len(),
            opponent_hand_size: self.opponent.len(),
            opponent_deck_remaining: self.opponent.deck().len(),
        }
    }

    pub fn start(&mut self) -> Vec<CombatSignal> {
        self.machine.send(CombatEvent::StartCombat)
    }

    pub fn select_card(&mut self, index: Option<usize>) {
        self.player.select_card(index);
    }

    /// 只在玩家回合生效；否则手牌保持不变。
    pub fn play_card(&mut self, index: usize) -> Vec<CombatSignal> {
        if self.machine.state() != CombatState::PlayerTurn {
            log::warn!("play_card({index}) outside the player's turn");
            return Vec::new();
        }
        match self.player.play_card(index) {
            Some(card) => self.machine.send(CombatEvent::PlayCard { card }),
            None => Vec::new(),
        }
    }

    /// 手牌打空后让过回合；手里还有牌时不允许。
    pub fn pass_turn(&mut self) -> Vec<CombatSignal> {
        if self.machine.state() != CombatState::PlayerTurn || !self.player.is_empty() {
            log::warn!("pass_turn rejected in {:?}", self.machine.state());
            return Vec::new();
        }
        log::info!("player passes its turn");
        self.machine.send(CombatEvent::PassTurn)
    }

    fn cards_exhausted(&self) -> bool {
        [&self.player, &self.opponent]
            .iter()
            .all(|side| side.is_empty() && side.deck().is_empty())
    }

    pub fn animation_complete(&mut self) -> Vec<CombatSignal> {
        self.machine.send(CombatEvent::AnimationComplete)
    }

    /// Applies the AI's choice. `None` (or a stale index) means the AI passes.
    pub fn complete_ai_turn(&mut self, index: Option<usize>) -> Vec<CombatSignal> {
        if self.machine.state() != CombatState::AiTurn {
            return Vec::new();
        }
        let card = index.and_then(|index| self.opponent.play_card(index));
        if card.is_none() {
            log::warn!("opponent passes its turn");
        }
        let mut signals = self.machine.send(CombatEvent::AiActionComplete { card });
        if self.machine.state() == CombatState::PlayerTurn && self.cards_exhausted() {
            signals.extend(self.machine.send(CombatEvent::CardsExhausted));
        }
        signals
    }

    /// 用对局自带的（可设种子的）AI 预先决定延迟和出牌下标；
    /// 下标为 `None` 表示 AI 让过。浏览器端在计时结束后交给 `complete_ai_turn`。
    pub fn plan_ai_turn(&mut self) -> Option<(u32, Option<usize>)> {
        if self.machine.state() != CombatState::AiTurn {
            return None;
        }
        let (millis, choice) = self.ai.plan_turn(self.opponent.hand());
        let choice = match choice {
            Ok(index) => Some(index),
            Err(err) => {
                log::warn!("ai could not act: {err}");
                None
            }
        };
        Some((millis, choice))
    }

    /// 让 AI 在延迟后出牌，并推进到下一回合或结束。
    pub async fn run_ai_turn<D: Delay>(&mut self, delay: &D) -> Vec<CombatSignal> {
        if self.machine.state() != CombatState::AiTurn {
            return Vec::new();
        }
        let hand = self.opponent.hand().to_vec();
        let choice = match self.ai.execute_turn(&hand, delay).await {
            Ok(index) => Some(index),
            Err(err) => {
                log::warn!("ai could not act: {err}");
                None
            }
        };
        self.complete_ai_turn(choice)
    }

    pub fn snapshot(&self) -> CombatContext {
        self.machine.context().clone()
    }

    /// 恢复会话中保存的战斗上下文；手牌与牌堆保持当前对局的状态。
    pub fn restore(&mut self, context: CombatContext) {
        self.machine = CombatMachine::restore(context, self.machine.starting_hp());
    }
}
