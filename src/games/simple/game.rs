//! Simple game implementation.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::actions::{ActionDefinition, ActionRegistry, Selection};
use crate::core::{ActionError, Args, ElementId, PlayerId, PlayerMap, Value};
use crate::flow::{ActionStepNode, EachPlayerNode, FlowDefinition, LoopNode, PhaseNode};
use crate::host::Host;

/// Action names for the simple game.
pub mod actions {
    /// Draw a card from your deck.
    pub const DRAW: &str = "draw";
    /// Play a card from hand to damage an opponent.
    pub const PLAY: &str = "play";
    /// End your turn.
    pub const PASS: &str = "pass";
}

/// Simple game state.
#[derive(Clone)]
pub struct SimpleGame {
    registry: Arc<ActionRegistry<SimpleGame>>,
    life: PlayerMap<i64>,
    decks: PlayerMap<Vec<ElementId>>,
    hands: PlayerMap<Vec<ElementId>>,
    discards: PlayerMap<Vec<ElementId>>,
    /// Card power, indexed by element id.
    power: Vec<i64>,
    current: PlayerId,
}

/// Builder for creating a SimpleGame.
pub struct SimpleGameBuilder {
    player_count: usize,
    starting_life: i64,
    cards_per_player: usize,
    starting_hand_size: usize,
}

impl Default for SimpleGameBuilder {
    fn default() -> Self {
        Self {
            player_count: 2,
            starting_life: 20,
            cards_per_player: 10,
            starting_hand_size: 3,
        }
    }
}

impl SimpleGameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player_count(mut self, count: usize) -> Self {
        assert!((2..=8).contains(&count), "Player count must be 2-8");
        self.player_count = count;
        self
    }

    pub fn starting_life(mut self, life: i64) -> Self {
        self.starting_life = life;
        self
    }

    pub fn cards_per_player(mut self, count: usize) -> Self {
        self.cards_per_player = count;
        self
    }

    pub fn starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    /// Build the game. The seed fixes every deck order.
    pub fn build(self, seed: u64) -> SimpleGame {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut power = Vec::with_capacity(self.player_count * self.cards_per_player);

        let mut decks = PlayerMap::new(self.player_count, |_| Vec::new());
        for player in PlayerId::all(self.player_count) {
            let deck = &mut decks[player];
            for i in 0..self.cards_per_player {
                deck.push(ElementId::new(power.len() as u32));
                power.push((i % 5 + 1) as i64); // Cycle through power 1-5
            }
            deck.shuffle(&mut rng);
        }

        // Draw starting hands from the top (end) of each deck
        let mut hands = PlayerMap::new(self.player_count, |_| Vec::new());
        for player in PlayerId::all(self.player_count) {
            let deck = &mut decks[player];
            let keep = deck.len().saturating_sub(self.starting_hand_size);
            hands[player] = deck.split_off(keep);
        }

        SimpleGame {
            registry: Arc::new(SimpleGame::registry()),
            life: PlayerMap::with_value(self.player_count, self.starting_life),
            decks,
            hands,
            discards: PlayerMap::with_default(self.player_count),
            power,
            current: PlayerId::new(0),
        }
    }
}

impl SimpleGame {
    fn registry() -> ActionRegistry<SimpleGame> {
        let mut registry = ActionRegistry::new();

        registry.register(
            ActionDefinition::new(actions::DRAW, |game: &mut SimpleGame, player, _| {
                let card = game.decks[player].pop().ok_or("deck is empty")?;
                game.hands[player].push(card);
                Ok(())
            })
            .prompt("Draw a card")
            .condition(|ctx| !ctx.host.decks[ctx.player].is_empty()),
        );

        registry.register(
            ActionDefinition::new(actions::PLAY, SimpleGame::play)
                .prompt("Play a card at an opponent")
                .condition(|ctx| !ctx.host.hands[ctx.player].is_empty())
                .selection(
                    Selection::<SimpleGame>::element("card", |ctx| ctx.host.hands[ctx.player].clone())
                        .prompt("Card to play"),
                )
                .selection(
                    Selection::<SimpleGame>::player("target")
                        .prompt("Opponent to damage")
                        .player_filter(|ctx, target| target != ctx.player && ctx.host.is_alive(target))
                        .skip_if_only_one(),
                ),
        );

        registry.register(ActionDefinition::new(actions::PASS, |_, _, _| Ok(())).prompt("End your turn"));

        registry
    }

    fn play(&mut self, player: PlayerId, args: &Args) -> Result<(), ActionError> {
        let card = args.get("card").and_then(Value::as_element).ok_or("missing card")?;
        let target = args.get("target").and_then(Value::as_player).ok_or("missing target")?;

        let hand = &mut self.hands[player];
        let slot = hand
            .iter()
            .position(|&c| c == card)
            .ok_or_else(|| ActionError(format!("{card} is not in hand")))?;
        hand.remove(slot);
        self.discards[player].push(card);

        self.life[target] -= self.card_power(card);
        Ok(())
    }

    /// The turn structure: every living player takes one turn per round
    /// until one player is left.
    pub fn flow() -> FlowDefinition<SimpleGame> {
        let turn = PhaseNode::<SimpleGame>::new(
            "turn",
            ActionStepNode::new([actions::DRAW, actions::PLAY, actions::PASS]).prompt("Draw, play a card or pass"),
        )
        .on_enter(|ctx| {
            let turn = ctx.int("turn");
            ctx.set("turn", turn + 1);
        });

        let round = EachPlayerNode::<SimpleGame>::new(turn).filter(|ctx, player| ctx.host().is_alive(player));

        FlowDefinition::new(LoopNode::<SimpleGame>::new(round).while_(|ctx| ctx.host().alive_players().len() > 1))
            .variable("turn", 0)
            .complete_when(|ctx| ctx.host().alive_players().len() <= 1)
            .winners(|ctx| match ctx.host().alive_players().as_slice() {
                [winner] => vec![*winner],
                _ => Vec::new(),
            })
    }

    pub fn life(&self, player: PlayerId) -> i64 {
        self.life[player]
    }

    pub fn hand(&self, player: PlayerId) -> &[ElementId] {
        &self.hands[player]
    }

    pub fn deck_size(&self, player: PlayerId) -> usize {
        self.decks[player].len()
    }

    pub fn discard(&self, player: PlayerId) -> &[ElementId] {
        &self.discards[player]
    }

    /// Get a card's power value.
    pub fn card_power(&self, card: ElementId) -> i64 {
        self.power.get(card.raw() as usize).copied().unwrap_or(0)
    }

    /// Check if a player is alive.
    pub fn is_alive(&self, player: PlayerId) -> bool {
        self.life[player] > 0
    }

    /// Get alive players.
    pub fn alive_players(&self) -> Vec<PlayerId> {
        self.life.players_where(|&life| life > 0)
    }
}

impl Host for SimpleGame {
    fn player_count(&self) -> usize {
        self.life.player_count()
    }

    fn current_player(&self) -> PlayerId {
        self.current
    }

    fn set_current_player(&mut self, player: PlayerId) {
        self.current = player;
    }

    fn action(&self, name: &str) -> Option<Arc<ActionDefinition<Self>>> {
        self.registry.get(name)
    }

    fn available_actions(&self, player: PlayerId) -> Vec<String> {
        // Only the active player can act
        if player != self.current || !self.is_alive(player) {
            return Vec::new();
        }
        self.registry.names().to_vec()
    }

    fn resolve_element(&self, id: u32) -> Option<ElementId> {
        ((id as usize) < self.power.len()).then(|| ElementId::new(id))
    }
}
