use std::collections::HashSet;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

const BUNDLED_CATALOG: &str = include_str!("../../data/cards.json");

static BUNDLED_DATABASE: OnceCell<CardDatabase> = OnceCell::new();

/// 卡牌唯一标识。
pub type CardId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Attack,
    Defense,
    Speed,
    Special,
}

impl CardType {
    pub const ALL: [CardType; 4] = [
        CardType::Attack,
        CardType::Defense,
        CardType::Speed,
        CardType::Special,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Attack => "attack",
            CardType::Defense => "defense",
            CardType::Speed => "speed",
            CardType::Special => "special",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rarity| rarity.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CardStats {
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

/// 对战中使用的卡牌，加载后不可变，以 `id` 作为身份。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub rarity: Rarity,
    pub stats: CardStats,
    #[serde(default)]
    pub artwork: String,
}

impl Card {
    pub fn new(
        id: impl Into<CardId>,
        name: impl Into<String>,
        card_type: CardType,
        rarity: Rarity,
        stats: CardStats,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            card_type,
            rarity,
            stats,
            artwork: String::new(),
        }
    }

    pub fn attack(&self) -> u32 {
        self.stats.attack
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum CardDatabaseError {
    #[error("card database is not valid JSON: {message}")]
    Parse { message: String },
    #[error("card database is missing field `{field}`")]
    MissingDatabaseField { field: String },
    #[error("card database contains no cards")]
    Empty,
    #[error("card #{index} is missing field `{field}`")]
    MissingField { index: usize, field: String },
    #[error("card `{card_id}` has unknown type `{value}`")]
    InvalidType { card_id: CardId, value: String },
    #[error("card `{card_id}` has unknown rarity `{value}`")]
    InvalidRarity { card_id: CardId, value: String },
    #[error("card `{card_id}` has negative `{stat}` stat ({value})")]
    NegativeStat {
        card_id: CardId,
        stat: String,
        value: i64,
    },
    #[error("card id `{card_id}` appears more than once")]
    DuplicateId { card_id: CardId },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardDatabase {
    pub version: String,
    pub cards: Vec<Card>,
}

impl CardDatabase {
    /// 解析并校验一份卡牌目录，任何结构问题都直接返回错误。
    pub fn from_json(json: &str) -> Result<Self, CardDatabaseError> {
        let raw: RawDatabase = serde_json::from_str(json).map_err(|err| {
            CardDatabaseError::Parse {
                message: err.to_string(),
            }
        })?;

        let version = raw
            .version
            .ok_or_else(|| CardDatabaseError::MissingDatabaseField {
                field: "version".into(),
            })?;
        let entries = raw
            .cards
            .ok_or_else(|| CardDatabaseError::MissingDatabaseField {
                field: "cards".into(),
            })?;

        let mut seen = HashSet::new();
        let mut cards = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let card = entry.validate(index)?;
            if !seen.insert(card.id.clone()) {
                return Err(CardDatabaseError::DuplicateId { card_id: card.id });
            }
            cards.push(card);
        }

        Ok(Self { version, cards })
    }

    pub fn new(version: impl Into<String>, cards: Vec<Card>) -> Self {
        Self {
            version: version.into(),
            cards,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }
}

/// 返回随包发布的卡牌目录，首次调用时校验并缓存。
pub fn load_card_database() -> Result<&'static CardDatabase, CardDatabaseError> {
    BUNDLED_DATABASE.get_or_try_init(|| -> Result<CardDatabase, CardDatabaseError> {
        let database = CardDatabase::from_json(BUNDLED_CATALOG)?;
        if database.is_empty() {
            return Err(CardDatabaseError::Empty);
        }
        log::info!(
            "card database v{} loaded ({} cards)",
            database.version,
            database.len()
        );
        Ok(database)
    })
}

#[derive(Deserialize)]
struct RawDatabase {
    version: Option<String>,
    cards: Option<Vec<RawCard>>,
}

#[derive(Deserialize)]
struct RawCard {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    card_type: Option<String>,
    rarity: Option<String>,
    stats: Option<RawStats>,
    artwork: Option<String>,
}

#[derive(Deserialize)]
struct RawStats {
    attack: Option<i64>,
    defense: Option<i64>,
    speed: Option<i64>,
}

fn require<T>(value: Option<T>, index: usize, field: &str) -> Result<T, CardDatabaseError> {
    value.ok_or_else(|| CardDatabaseError::MissingField {
        index,
        field: field.into(),
    })
}

fn non_negative(card_id: &str, stat: &str, value: i64) -> Result<u32, CardDatabaseError> {
    u32::try_from(value).map_err(|_| CardDatabaseError::NegativeStat {
        card_id: card_id.into(),
        stat: stat.into(),
        value,
    })
}

impl RawCard {
    fn validate(self, index: usize) -> Result<Card, CardDatabaseError> {
        let id = require(self.id, index, "id")?;
        let name = require(self.name, index, "name")?;
        let type_value = require(self.card_type, index, "type")?;
        let rarity_value = require(self.rarity, index, "rarity")?;
        let stats = require(self.stats, index, "stats")?;
        let artwork = require(self.artwork, index, "artwork")?;

        let card_type =
            CardType::parse(&type_value).ok_or_else(|| CardDatabaseError::InvalidType {
                card_id: id.clone(),
                value: type_value.clone(),
            })?;
        let rarity =
            Rarity::parse(&rarity_value).ok_or_else(|| CardDatabaseError::InvalidRarity {
                card_id: id.clone(),
                value: rarity_value.clone(),
            })?;

        let attack = require(stats.attack, index, "stats.attack")?;
        let defense = require(stats.defense, index, "stats.defense")?;
        let speed = require(stats.speed, index, "stats.speed")?;

        let stats = CardStats {
            attack: non_negative(&id, "attack", attack)?,
            defense: non_negative(&id, "defense", defense)?,
            speed: non_negative(&id, "speed", speed)?,
        };

        Ok(Card {
            id,
            name,
            card_type,
            rarity,
            stats,
            artwork,
        })
    }
}
