//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Zero-based seat position in the host's player collection. Positions are
//! stable for the lifetime of a game, which is what lets a serialized
//! `Position` refer to players by index.
//!
//! ## PlayerMap
//!
//! Per-player storage backed by `Vec` for O(1) access by `PlayerId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A seat at the table, 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Seat index in the host's player collection.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Convert a seat index into a player, if it exists in a game of
    /// `player_count` players.
    ///
    /// ```
    /// use turn_flow::core::PlayerId;
    ///
    /// assert_eq!(PlayerId::from_index(2, 3), Some(PlayerId::new(2)));
    /// assert_eq!(PlayerId::from_index(3, 3), None);
    /// ```
    #[must_use]
    pub fn from_index(index: usize, player_count: usize) -> Option<Self> {
        if index < player_count && index <= u8::MAX as usize {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Every seat in order.
    ///
    /// ```
    /// use turn_flow::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(4).collect();
    /// assert_eq!(players.len(), 4);
    /// assert_eq!(players[3], PlayerId::new(3));
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count.min(u8::MAX as usize + 1)).map(|i| PlayerId(i as u8))
    }

    /// All players in seat order, starting at `first` and wrapping around.
    pub fn rotation(first: PlayerId, player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count).map(move |offset| PlayerId(((first.index() + offset) % player_count) as u8))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// One `T` per seat.
///
/// ## Example
///
/// ```
/// use turn_flow::core::{PlayerId, PlayerMap};
///
/// let mut life: PlayerMap<i64> = PlayerMap::new(3, |_| 20);
/// life[PlayerId::new(1)] -= 5;
/// assert_eq!(life[PlayerId::new(1)], 15);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Build each seat's entry with `factory`.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        let data = PlayerId::all(player_count).map(factory).collect();
        Self { data }
    }

    /// Every seat starts with a copy of `value`.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    pub fn with_default(player_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(player_count, |_| T::default())
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Seats paired with their entries.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::all(self.data.len()).zip(self.data.iter())
    }

    /// Players whose entry satisfies `pred`, in seat order.
    pub fn players_where(&self, pred: impl Fn(&T) -> bool) -> Vec<PlayerId> {
        self.iter().filter(|(_, v)| pred(v)).map(|(p, _)| p).collect()
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_from_index() {
        assert_eq!(PlayerId::from_index(0, 2), Some(PlayerId::new(0)));
        assert_eq!(PlayerId::from_index(2, 2), None);
        assert_eq!(format!("{}", PlayerId::new(1)), "Player 1");
    }

    #[test]
    fn test_rotation() {
        let order: Vec<_> = PlayerId::rotation(PlayerId::new(2), 4).collect();
        assert_eq!(
            order,
            vec![PlayerId::new(2), PlayerId::new(3), PlayerId::new(0), PlayerId::new(1)]
        );
    }

    #[test]
    fn test_player_map_players_where() {
        let mut life: PlayerMap<i64> = PlayerMap::with_value(3, 10);
        life[PlayerId::new(1)] = 0;

        assert_eq!(life.players_where(|&l| l > 0), vec![PlayerId::new(0), PlayerId::new(2)]);
        assert_eq!(life.player_count(), 3);
    }

    #[test]
    fn test_player_map_serialization() {
        let map: PlayerMap<i32> = PlayerMap::new(2, |p| p.index() as i32 + 1);
        let json = serde_json::to_string(&map).unwrap();
        let deserialized: PlayerMap<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, deserialized);
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_player_map_zero_players() {
        let _: PlayerMap<i32> = PlayerMap::with_value(0, 0);
    }
}
