//! 对局核心逻辑（卡牌目录、牌堆、手牌、战斗状态机）。

pub mod battle;
pub mod cards;
pub mod combat;
pub mod deck;
pub mod hand;

pub use battle::{Battle, BattleError, BattleView};
pub use cards::{
    load_card_database, Card, CardDatabase, CardDatabaseError, CardId, CardStats, CardType, Rarity,
};
pub use combat::{
    Battlefield, CombatContext, CombatEvent, CombatMachine, CombatSignal, CombatState, Turn,
    Winner, STARTING_HP,
};
pub use deck::{create_deck, shuffle_deck, Deck, DeckError, DEFAULT_DECK_SIZE};
pub use hand::{HandManager, MAX_HAND_SIZE, MIN_HAND_SIZE};
