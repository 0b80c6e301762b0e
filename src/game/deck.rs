use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cards::{Card, CardDatabase};

pub const DEFAULT_DECK_SIZE: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum DeckError {
    #[error("cannot build a deck from an empty card database")]
    EmptyDatabase,
}

/// 可供抽取的牌堆，允许重复的卡牌 id。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// 从剩余牌中随机取出一张。
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Card> {
        if self.cards.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.cards.len());
        Some(self.cards.remove(index))
    }
}

/// 从数据库有放回地抽样 `size` 张牌，再洗牌。
pub fn create_deck<R: Rng + ?Sized>(
    database: &CardDatabase,
    size: usize,
    rng: &mut R,
) -> Result<Deck, DeckError> {
    if database.is_empty() {
        return Err(DeckError::EmptyDatabase);
    }

    let sampled: Vec<Card> = (0..size)
        .filter_map(|_| database.cards.choose(rng).cloned())
        .collect();

    Ok(Deck::new(shuffle_deck(&sampled, rng)))
}

/// Fisher-Yates shuffle into a fresh vector; the input is left untouched.
pub fn shuffle_deck<R: Rng + ?Sized>(deck: &[Card], rng: &mut R) -> Vec<Card> {
    let mut shuffled = deck.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cards::{CardStats, CardType, Rarity};
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn card(id: &str, attack: u32) -> Card {
        Card::new(
            id,
            id.to_uppercase(),
            CardType::Attack,
            Rarity::Common,
            CardStats {
                attack,
                defense: 0,
                speed: 0,
            },
        )
    }

    fn sorted_ids(cards: &[Card]) -> Vec<String> {
        let mut ids: Vec<String> = cards.iter().map(|card| card.id.clone()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn create_deck_has_requested_size_and_known_cards() {
        let database = CardDatabase::new("t", vec![card("a", 1), card("b", 2), card("c", 3)]);
        let mut rng = SmallRng::seed_from_u64(7);
        let deck = create_deck(&database, DEFAULT_DECK_SIZE, &mut rng).expect("deck");
        assert_eq!(deck.len(), DEFAULT_DECK_SIZE);
        assert!(deck
            .cards()
            .iter()
            .all(|card| database.get(&card.id).is_some()));
    }

    #[test]
    fn create_deck_samples_with_replacement() {
        let database = CardDatabase::new("t", vec![card("only", 5)]);
        let mut rng = SmallRng::seed_from_u64(1);
        let deck = create_deck(&database, 4, &mut rng).expect("deck");
        assert_eq!(sorted_ids(deck.cards()), vec!["only"; 4]);
    }

    #[test]
    fn create_deck_fails_on_empty_database() {
        let database = CardDatabase::new("t", Vec::new());
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            create_deck(&database, 20, &mut rng),
            Err(DeckError::EmptyDatabase)
        );
    }

    #[test]
    fn draw_removes_cards_until_empty() {
        let mut deck = Deck::new(vec![card("a", 1), card("b", 2)]);
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(deck.draw(&mut rng).is_some());
        assert!(deck.draw(&mut rng).is_some());
        assert!(deck.draw(&mut rng).is_none());
        assert!(deck.is_empty());
    }

    proptest! {
        #[test]
        fn shuffle_preserves_multiset_and_input(
            ids in proptest::collection::vec("[a-e]", 0..30),
            seed in any::<u64>(),
        ) {
            let input: Vec<Card> = ids.iter().map(|id| card(id, 1)).collect();
            let before = input.clone();
            let mut rng = SmallRng::seed_from_u64(seed);
            let shuffled = shuffle_deck(&input, &mut rng);

            prop_assert_eq!(&input, &before);
            prop_assert_eq!(sorted_ids(&shuffled), sorted_ids(&input));
        }
    }
}
