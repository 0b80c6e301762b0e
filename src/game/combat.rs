use serde::{Deserialize, Serialize};

use super::cards::Card;

pub const STARTING_HP: i32 = 100;

/// 战斗流程的状态。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombatState {
    Idle,
    PlayerTurn,
    CardPlay,
    Resolve,
    AiTurn,
    CheckWin,
    End,
}

impl CombatState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CombatState::End)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombatEvent {
    StartCombat,
    PlayCard {
        card: Card,
    },
    /// 玩家无牌可出时让过本回合。
    PassTurn,
    AnimationComplete,
    DamageApplied,
    AiActionComplete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        card: Option<Card>,
    },
    CheckComplete,
    /// 双方手牌与牌堆都已耗尽，按剩余 HP 结束战斗。
    CardsExhausted,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Turn {
    #[default]
    Player,
    Opponent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Player,
    Opponent,
    Draw,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Battlefield {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_card: Option<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_card: Option<Card>,
}

/// 战斗上下文，由状态机独占；可序列化以便会话内保存。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombatContext {
    pub player_hp: i32,
    pub opponent_hp: i32,
    pub current_turn: Turn,
    #[serde(default)]
    pub selected_card: Option<Card>,
    #[serde(default)]
    pub battlefield: Battlefield,
    #[serde(default)]
    pub winner: Option<Winner>,
}

impl Default for CombatContext {
    fn default() -> Self {
        Self::with_hp(STARTING_HP)
    }
}

impl CombatContext {
    pub fn with_hp(hp: i32) -> Self {
        Self {
            player_hp: hp,
            opponent_hp: hp,
            current_turn: Turn::Player,
            selected_card: None,
            battlefield: Battlefield::default(),
            winner: None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Never fails: unreadable input yields the initial context.
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|err| {
            log::warn!("discarding unreadable combat context: {err}");
            Self::default()
        })
    }

    fn is_pristine(&self, starting_hp: i32) -> bool {
        *self == Self::with_hp(starting_hp)
    }

    /// Both at zero is a draw.
    pub fn evaluate_winner(&self) -> Option<Winner> {
        match (self.player_hp <= 0, self.opponent_hp <= 0) {
            (true, true) => Some(Winner::Draw),
            (true, false) => Some(Winner::Opponent),
            (false, true) => Some(Winner::Player),
            (false, false) => None,
        }
    }

    /// Higher remaining HP wins; equal HP is a draw.
    pub fn winner_by_health(&self) -> Winner {
        match self.player_hp.cmp(&self.opponent_hp) {
            std::cmp::Ordering::Greater => Winner::Player,
            std::cmp::Ordering::Less => Winner::Opponent,
            std::cmp::Ordering::Equal => Winner::Draw,
        }
    }
}

/// 状态迁移产生的副作用。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    ResetHealth,
    RecordSelection,
    ClearSelection,
    ApplyPlayerCard,
    ApplyOpponentCard,
    PassTurnTo(Turn),
    RequestAiTurn,
    EvaluateWinner,
    DecideByHealth,
}

/// 外部可观察的状态机输出。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum CombatSignal {
    Transitioned { from: CombatState, to: CombatState },
    AiTurnRequested,
    CombatEnded { winner: Winner },
}

const RESET: &[Action] = &[Action::ResetHealth];
const SELECT: &[Action] = &[Action::RecordSelection];
const PASS: &[Action] = &[Action::ClearSelection];
const DECIDE: &[Action] = &[Action::DecideByHealth];
const HAND_TO_OPPONENT: &[Action] = &[Action::PassTurnTo(Turn::Opponent)];
const OPPONENT_STRIKES: &[Action] = &[Action::ApplyOpponentCard, Action::PassTurnTo(Turn::Player)];
const NOTHING: &[Action] = &[];

/// (state, event) → (target, actions). `None` means the event is ignored.
fn transition(
    state: CombatState,
    event: &CombatEvent,
    context: &CombatContext,
) -> Option<(CombatState, &'static [Action])> {
    use CombatEvent as E;
    use CombatState as S;

    match (state, event) {
        (S::Idle, E::StartCombat) => Some((S::PlayerTurn, RESET)),
        (S::PlayerTurn, E::PlayCard { .. }) => Some((S::CardPlay, SELECT)),
        (S::PlayerTurn, E::PassTurn) => Some((S::Resolve, PASS)),
        (S::PlayerTurn, E::CardsExhausted) => Some((S::End, DECIDE)),
        (S::CardPlay, E::AnimationComplete) => Some((S::Resolve, NOTHING)),
        (S::Resolve, E::DamageApplied) => Some((S::AiTurn, HAND_TO_OPPONENT)),
        (S::AiTurn, E::AiActionComplete { .. }) => Some((S::CheckWin, OPPONENT_STRIKES)),
        (S::CheckWin, E::CheckComplete) => match context.winner {
            Some(_) => Some((S::End, NOTHING)),
            None => Some((S::PlayerTurn, NOTHING)),
        },
        _ => None,
    }
}

fn entry_actions(state: CombatState) -> &'static [Action] {
    const RESOLVE: &[Action] = &[Action::ApplyPlayerCard];
    const AI_TURN: &[Action] = &[Action::RequestAiTurn];
    const CHECK_WIN: &[Action] = &[Action::EvaluateWinner];

    match state {
        CombatState::Resolve => RESOLVE,
        CombatState::AiTurn => AI_TURN,
        CombatState::CheckWin => CHECK_WIN,
        _ => NOTHING,
    }
}

/// States that advance on their own once their entry actions have run.
fn automatic_event(state: CombatState) -> Option<CombatEvent> {
    match state {
        CombatState::Resolve => Some(CombatEvent::DamageApplied),
        CombatState::CheckWin => Some(CombatEvent::CheckComplete),
        _ => None,
    }
}

fn apply_damage(hp: i32, card: &Card) -> i32 {
    let attack = i32::try_from(card.attack()).unwrap_or(i32::MAX);
    hp.saturating_sub(attack).max(0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatMachine {
    state: CombatState,
    context: CombatContext,
    starting_hp: i32,
}

impl Default for CombatMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatMachine {
    pub fn new() -> Self {
        Self::with_starting_hp(STARTING_HP)
    }

    pub fn with_starting_hp(starting_hp: i32) -> Self {
        Self {
            state: CombatState::Idle,
            context: CombatContext::with_hp(starting_hp),
            starting_hp,
        }
    }

    pub fn from_context(context: CombatContext) -> Self {
        Self::restore(context, STARTING_HP)
    }

    /// 从保存的上下文恢复状态机，推断出合适的恢复状态。
    /// `starting_hp` is what both sides get back on `StartCombat`.
    pub fn restore(context: CombatContext, starting_hp: i32) -> Self {
        let state = if context.winner.is_some() {
            CombatState::End
        } else if context.is_pristine(starting_hp) {
            CombatState::Idle
        } else if context.current_turn == Turn::Opponent {
            CombatState::AiTurn
        } else if context.selected_card.is_some() {
            CombatState::CardPlay
        } else {
            CombatState::PlayerTurn
        };
        Self {
            state,
            context,
            starting_hp,
        }
    }

    pub fn starting_hp(&self) -> i32 {
        self.starting_hp
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn context(&self) -> &CombatContext {
        &self.context
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn can_accept(&self, event: &CombatEvent) -> bool {
        transition(self.state, event, &self.context).is_some()
    }

    /// 处理一个事件；不合法的事件被忽略并返回空列表。
    pub fn send(&mut self, event: CombatEvent) -> Vec<CombatSignal> {
        let mut signals = Vec::new();
        let mut next = Some(event);

        while let Some(event) = next.take() {
            let Some((target, actions)) = transition(self.state, &event, &self.context) else {
                log::warn!("combat ignored {:?} in {:?}", event, self.state);
                break;
            };

            let from = self.state;
            for action in actions {
                self.run(*action, &event, &mut signals);
            }
            self.state = target;
            log::debug!("combat {:?} -> {:?}", from, target);
            signals.push(CombatSignal::Transitioned { from, to: target });

            for action in entry_actions(target) {
                self.run(*action, &event, &mut signals);
            }

            if target.is_terminal() {
                if let Some(winner) = self.context.winner {
                    log::info!("combat finished, winner: {:?}", winner);
                    signals.push(CombatSignal::CombatEnded { winner });
                }
            }

            next = automatic_event(target);
        }

        signals
    }

    fn run(&mut self, action: Action, event: &CombatEvent, signals: &mut Vec<CombatSignal>) {
        let context = &mut self.context;
        match action {
            Action::ResetHealth => {
                *context = CombatContext::with_hp(self.starting_hp);
                log::info!("combat started");
            }
            Action::RecordSelection => {
                if let CombatEvent::PlayCard { card } = event {
                    context.selected_card = Some(card.clone());
                }
            }
            Action::ClearSelection => {
                context.selected_card = None;
                context.battlefield.player_card = None;
            }
            Action::ApplyPlayerCard => {
                if let Some(card) = context.selected_card.take() {
                    context.opponent_hp = apply_damage(context.opponent_hp, &card);
                    context.battlefield.player_card = Some(card);
                }
            }
            Action::ApplyOpponentCard => {
                if let CombatEvent::AiActionComplete { card: Some(card) } = event {
                    context.player_hp = apply_damage(context.player_hp, card);
                    context.battlefield.opponent_card = Some(card.clone());
                }
            }
            Action::PassTurnTo(turn) => context.current_turn = turn,
            Action::RequestAiTurn => signals.push(CombatSignal::AiTurnRequested),
            Action::EvaluateWinner => context.winner = context.evaluate_winner(),
            Action::DecideByHealth => {
                let winner = context.evaluate_winner().unwrap_or(context.winner_by_health());
                log::info!("cards exhausted, deciding by health");
                context.winner = Some(winner);
            }
        }
    }
}
