/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use log::debug;
use rand::{
    rngs::{StdRng, ThreadRng},
    seq::IndexedRandom,
    Rng, SeedableRng,
};

use super::{Game, Move};

/// A policy for choosing one move out of a list of legal moves.
///
/// Any closure taking a slice of moves implements this trait, so a caller can plug in
/// their own policy without defining a type.
///
/// # Example
/// ```
/// # use rookie::*;
/// let game = Game::default();
/// let mut last = |moves: &[Move]| moves.last().copied();
/// let mv = pick_move(&game, &mut last).unwrap();
/// assert!(game.is_legal(mv));
/// ```
pub trait MovePicker {
    /// Chooses one of `moves`, or `None` if there is nothing to choose from.
    fn pick(&mut self, moves: &[Move]) -> Option<Move>;
}

impl<F> MovePicker for F
where
    F: FnMut(&[Move]) -> Option<Move>,
{
    #[inline(always)]
    fn pick(&mut self, moves: &[Move]) -> Option<Move> {
        self(moves)
    }
}

/// Picks uniformly at random among the available moves.
#[derive(Debug, Clone)]
pub struct RandomPicker<R: Rng = StdRng> {
    rng: R,
}

impl<R: Rng> RandomPicker<R> {
    /// Creates a new [`RandomPicker`] drawing from `rng`.
    #[inline(always)]
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomPicker<StdRng> {
    /// Creates a reproducible [`RandomPicker`]: the same seed always yields the same choices.
    ///
    /// # Example
    /// ```
    /// # use rookie::*;
    /// let game = Game::default();
    /// let first = pick_move(&game, &mut RandomPicker::seeded(7));
    /// let second = pick_move(&game, &mut RandomPicker::seeded(7));
    /// assert_eq!(first, second);
    /// ```
    #[inline(always)]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl RandomPicker<ThreadRng> {
    /// Creates a [`RandomPicker`] backed by the thread-local generator.
    #[inline(always)]
    pub fn thread_local() -> Self {
        Self::new(rand::rng())
    }
}

impl Default for RandomPicker<StdRng> {
    #[inline(always)]
    fn default() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> MovePicker for RandomPicker<R> {
    #[inline(always)]
    fn pick(&mut self, moves: &[Move]) -> Option<Move> {
        moves.choose(&mut self.rng).copied()
    }
}

/// Always picks the first available move. Handy for deterministic tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPicker;

impl MovePicker for FirstPicker {
    #[inline(always)]
    fn pick(&mut self, moves: &[Move]) -> Option<Move> {
        moves.first().copied()
    }
}

/// Asks `picker` to choose one of the legal moves of the side to move in `game`.
///
/// Returns `None` if the side to move has no legal moves, or if the picker declines to choose.
pub fn pick_move(game: &Game, picker: &mut impl MovePicker) -> Option<Move> {
    let moves = game.legal_moves();
    let picked = picker.pick(&moves);
    debug!(
        "{} picked {picked:?} out of {} legal moves",
        game.side_to_move(),
        moves.len()
    );
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_picker_only_picks_legal_moves() {
        let mut picker = RandomPicker::seeded(42);
        let mut game = Game::default();

        for _ in 0..40 {
            let Some(mv) = pick_move(&game, &mut picker) else {
                break;
            };
            assert!(game.is_legal(mv), "{mv:?} is not legal in {game}");
            game.make_move(mv);
        }
    }

    #[test]
    fn test_seeded_pickers_agree() {
        let mut a = RandomPicker::seeded(1234);
        let mut b = RandomPicker::seeded(1234);
        let mut game = Game::default();

        for _ in 0..20 {
            let picked = pick_move(&game, &mut a);
            assert_eq!(picked, pick_move(&game, &mut b));
            let Some(mv) = picked else {
                break;
            };
            game.make_move(mv);
        }
    }

    #[test]
    fn test_no_moves_means_no_pick() {
        // Fool's mate
        let game =
            Game::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert!(pick_move(&game, &mut RandomPicker::thread_local()).is_none());
        assert!(pick_move(&game, &mut FirstPicker).is_none());
    }

    #[test]
    fn test_first_picker_and_closures() {
        let game = Game::default();
        let moves = game.legal_moves();
        assert_eq!(pick_move(&game, &mut FirstPicker), moves.first().copied());

        let mut never = |_: &[Move]| -> Option<Move> { None };
        assert_eq!(pick_move(&game, &mut never), None);
    }
}
