//! The dealer's table that decides a rebirth token award. Pure deck
//! and hand logic; the ceremony in the parent module owns the stakes.

use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub fn all() -> [Suit; 4] {
        [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades]
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub fn all() -> [Rank; 13] {
        [
            Rank::Two,
            Rank::Three,
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            Rank::Eight,
            Rank::Nine,
            Rank::Ten,
            Rank::Jack,
            Rank::Queen,
            Rank::King,
            Rank::Ace,
        ]
    }

    /// Face value, counting aces high; soft reduction happens in
    /// [`hand_value`].
    pub fn value(&self) -> u32 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

/// Best hand total, demoting aces from 11 to 1 while the hand busts.
pub fn hand_value(hand: &[Card]) -> u32 {
    let mut value: u32 = hand.iter().map(|c| c.rank.value()).sum();
    let mut aces = hand.iter().filter(|c| c.rank == Rank::Ace).count();
    while value > 21 && aces > 0 {
        value -= 10;
        aces -= 1;
    }
    value
}

fn fresh_deck(rng: &mut impl Rng) -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for suit in Suit::all() {
        for rank in Rank::all() {
            deck.push(Card { rank, suit });
        }
    }
    deck.shuffle(rng);
    deck
}

/// How the hand resolved. Full tokens on any player win, half on
/// everything else, pushes included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlackjackResult {
    Blackjack,
    PlayerWin,
    DealerBust,
    PlayerBust,
    DealerWin,
    Push,
}

impl BlackjackResult {
    pub fn full_tokens(&self) -> bool {
        matches!(
            self,
            BlackjackResult::Blackjack | BlackjackResult::PlayerWin | BlackjackResult::DealerBust
        )
    }

    pub fn message(&self) -> &'static str {
        match self {
            BlackjackResult::Blackjack => "Blackjack! You receive the full amount of tokens!",
            BlackjackResult::PlayerWin => "You win! You receive the full amount of tokens!",
            BlackjackResult::DealerBust => {
                "Dealer busted! You receive the full amount of tokens!"
            }
            BlackjackResult::PlayerBust => "You busted! You receive half the tokens.",
            BlackjackResult::DealerWin => "Dealer wins. You receive half the tokens.",
            BlackjackResult::Push => "It's a push! You receive half the tokens.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BlackjackGame {
    deck: Vec<Card>,
    pub player: Vec<Card>,
    pub dealer: Vec<Card>,
    over: bool,
}

impl BlackjackGame {
    /// Shuffle and deal the opening hands. A dealt 21 should be sent
    /// straight to [`stand`].
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut deck = fresh_deck(rng);
        let player = vec![deck.pop().unwrap_or(ACE_FALLBACK), deck.pop().unwrap_or(ACE_FALLBACK)];
        let dealer = vec![deck.pop().unwrap_or(ACE_FALLBACK), deck.pop().unwrap_or(ACE_FALLBACK)];
        BlackjackGame {
            deck,
            player,
            dealer,
            over: false,
        }
    }

    pub fn player_value(&self) -> u32 {
        hand_value(&self.player)
    }

    pub fn dealer_value(&self) -> u32 {
        hand_value(&self.dealer)
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// The player must act unless dealt 21 or already resolved.
    pub fn awaiting_player(&self) -> bool {
        !self.over && self.player_value() < 21
    }

    fn draw(&mut self, rng: &mut impl Rng) -> Card {
        if self.deck.is_empty() {
            // 52 cards cannot run out in one hand, but a fresh shoe
            // keeps the table honest.
            self.deck = fresh_deck(rng);
        }
        self.deck.pop().unwrap_or(ACE_FALLBACK)
    }

    /// Take a card. Returns the result if the hand ends here.
    pub fn hit(&mut self, rng: &mut impl Rng) -> Option<BlackjackResult> {
        if self.over {
            return None;
        }
        let card = self.draw(rng);
        self.player.push(card);
        if self.player_value() > 21 {
            self.over = true;
            Some(BlackjackResult::PlayerBust)
        } else {
            None
        }
    }

    /// Stand: the dealer draws to 17, then the hands are compared.
    pub fn stand(&mut self, rng: &mut impl Rng) -> Option<BlackjackResult> {
        if self.over {
            return None;
        }
        self.over = true;

        while self.dealer_value() < 17 {
            let card = self.draw(rng);
            self.dealer.push(card);
        }

        let player = self.player_value();
        let dealer = self.dealer_value();
        let result = if dealer > 21 {
            BlackjackResult::DealerBust
        } else if player == 21 && self.player.len() == 2 {
            BlackjackResult::Blackjack
        } else if player > dealer {
            BlackjackResult::PlayerWin
        } else if dealer > player {
            BlackjackResult::DealerWin
        } else {
            BlackjackResult::Push
        };
        Some(result)
    }
}

const ACE_FALLBACK: Card = Card {
    rank: Rank::Ace,
    suit: Suit::Spades,
};
