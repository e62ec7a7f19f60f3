//! Shared test host.
//!
//! `Table` is a bare-bones game: a seat count, a current player, a few
//! integer counters and a log of every action that ran.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use turn_flow::actions::{ActionDefinition, ActionRegistry};
use turn_flow::core::{Args, PlayerId, Value};
use turn_flow::host::Host;

/// One performed action: who, what, and the resolved arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Performed {
    pub player: PlayerId,
    pub action: String,
    pub args: BTreeMap<String, Value>,
}

pub struct Table {
    pub players: usize,
    pub current: PlayerId,
    pub registry: ActionRegistry<Table>,
    pub counters: BTreeMap<String, i64>,
    /// Players the host refuses to let act.
    pub benched: Vec<PlayerId>,
    pub log: Vec<Performed>,
}

impl Table {
    pub fn new(players: usize) -> Self {
        Self {
            players,
            current: PlayerId::new(0),
            registry: ActionRegistry::new(),
            counters: BTreeMap::new(),
            benched: Vec::new(),
            log: Vec::new(),
        }
    }

    /// A table with one logging action per name.
    pub fn with_actions(players: usize, names: &[&str]) -> Self {
        let mut table = Self::new(players);
        for name in names {
            table.registry.register(logged(name));
        }
        table
    }

    pub fn counter(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn actions_by(&self, player: PlayerId) -> Vec<String> {
        self.log
            .iter()
            .filter(|p| p.player == player)
            .map(|p| p.action.clone())
            .collect()
    }

    pub fn players_in_order(&self) -> Vec<PlayerId> {
        self.log.iter().map(|p| p.player).collect()
    }
}

/// An action that records itself and bumps a counter of the same name.
pub fn logged(name: &str) -> ActionDefinition<Table> {
    let action = name.to_string();
    ActionDefinition::new(name, move |table: &mut Table, player, args: &Args| {
        *table.counters.entry(action.clone()).or_insert(0) += 1;
        table.log.push(Performed {
            player,
            action: action.clone(),
            args: args.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        });
        Ok(())
    })
}

impl Host for Table {
    fn player_count(&self) -> usize {
        self.players
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
        if self.benched.contains(&player) {
            return Vec::new();
        }
        self.registry.names().to_vec()
    }
}

pub fn p(index: u8) -> PlayerId {
    PlayerId::new(index)
}
