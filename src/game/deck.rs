use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::types::DevelopmentCard;

const DISTRIBUTION: [(DevelopmentCard, usize); 5] = [
    (DevelopmentCard::Knight, 14),
    (DevelopmentCard::YearOfPlenty, 2),
    (DevelopmentCard::RoadBuilding, 2),
    (DevelopmentCard::Monopoly, 2),
    (DevelopmentCard::VictoryPoint, 5),
];

/// Face-down development-card pile; cards are drawn from the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevelopmentDeck {
    cards: Vec<DevelopmentCard>,
}

impl DevelopmentDeck {
    pub fn standard(rng: &mut impl rand::Rng) -> Self {
        let mut cards = Vec::with_capacity(25);
        for (card, count) in DISTRIBUTION {
            cards.extend(std::iter::repeat(card).take(count));
        }
        cards.shuffle(rng);
        Self { cards }
    }

    /// A deck in the given order; the last card is drawn first.
    pub fn from_cards(cards: Vec<DevelopmentCard>) -> Self {
        Self { cards }
    }

    pub fn draw(&mut self) -> Option<DevelopmentCard> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn count(&self, card: DevelopmentCard) -> usize {
        self.cards.iter().filter(|c| **c == card).count()
    }
}
