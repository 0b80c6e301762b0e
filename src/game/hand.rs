use rand::rngs::SmallRng;
use rand::Rng;

use super::cards::Card;
use super::deck::Deck;

pub const MIN_HAND_SIZE: usize = 3;
pub const MAX_HAND_SIZE: usize = 5;

/// 玩家手牌：只通过选择、出牌、抽牌三种操作改变。
#[derive(Debug, Clone)]
pub struct HandManager<R = SmallRng> {
    deck: Deck,
    hand: Vec<Card>,
    selected: Option<usize>,
    rng: R,
}

impl<R: Rng> HandManager<R> {
    pub fn new(deck: Deck, rng: R) -> Self {
        Self {
            deck,
            hand: Vec::with_capacity(MAX_HAND_SIZE),
            selected: None,
            rng,
        }
    }

    /// 发起始手牌，最多补到 `count` 张（不超过手牌上限）。
    pub fn deal(&mut self, count: usize) -> usize {
        let target = count.min(MAX_HAND_SIZE);
        let mut dealt = 0;
        while self.hand.len() < target && self.draw_card() {
            dealt += 1;
        }
        dealt
    }

    /// Hand full or deck empty makes this a no-op.
    pub fn draw_card(&mut self) -> bool {
        if self.hand.len() >= MAX_HAND_SIZE {
            return false;
        }
        match self.deck.draw(&mut self.rng) {
            Some(card) => {
                log::debug!("drew `{}` ({} left in deck)", card.id, self.deck.len());
                self.hand.push(card);
                true
            }
            None => false,
        }
    }

    /// 打出指定位置的牌并尝试补一张；无效下标什么也不做。
    pub fn play_card(&mut self, index: usize) -> Option<Card> {
        if index >= self.hand.len() {
            return None;
        }
        let card = self.hand.remove(index);
        self.selected = None;
        self.draw_card();
        log::debug!("played `{}`, hand now {}", card.id, self.hand.len());
        Some(card)
    }

    /// 再次选择同一张牌会取消选择；越界下标被记录但不会解析出卡牌。
    pub fn select_card(&mut self, index: Option<usize>) {
        self.selected = match index {
            Some(index) if self.selected == Some(index) => None,
            other => other,
        };
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.selected.and_then(|index| self.hand.get(index))
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn len(&self) -> usize {
        self.hand.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hand.is_empty()
    }
}
