/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Deref, str::FromStr};

use anyhow::{bail, Result};
use log::{debug, trace, warn};

use super::{movegen, Color, Move, MoveList, Position, MAX_NUM_MOVES};

/// Whether a game can continue, and if not, how it ended.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GameState {
    /// The side to move has at least one legal move.
    Ongoing,

    /// The side to move is in check and has no legal moves.
    Checkmate { winner: Color },

    /// The side to move is not in check, but has no legal moves.
    Stalemate,
}

impl GameState {
    /// Returns `true` if the game is over.
    #[inline(always)]
    pub const fn is_over(&self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ongoing => write!(f, "ongoing"),
            Self::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            Self::Stalemate => write!(f, "stalemate"),
        }
    }
}

/// A [`Position`] together with the rules for what can legally be played from it.
///
/// A [`Game`] is a small `Copy` value, so exploring a line is a matter of copying it
/// and applying moves to the copy.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Game {
    /// The current [`Position`] of the game, including piece layouts, castling rights, turn counters, etc.
    position: Position,
}

impl Game {
    /// Creates a new [`Game`] from  the provided [`Position`].
    #[inline(always)]
    pub const fn new(position: Position) -> Self {
        Self { position }
    }

    /// Creates a new [`Game`] from the provided FEN string.
    #[inline(always)]
    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self::new(Position::from_fen(fen)?))
    }

    /// Copies `self` and returns a [`Game`] after having applied the provided [`Move`].
    #[inline(always)]
    pub fn with_move_made(&self, mv: Move) -> Self {
        let mut copied = *self;
        copied.make_move(mv);
        copied
    }

    /// Applies the move, if it is legal to make. If it is not legal, returns an `Err` explaining why.
    ///
    /// # Example
    /// ```
    /// # use rookie::*;
    /// let mut game = Game::default();
    /// let bogus = Move::new(Square::E2, Square::E5, MoveKind::Quiet);
    /// assert!(game.make_move_checked(bogus).is_err());
    /// assert_eq!(game, Game::default());
    /// ```
    pub fn make_move_checked(&mut self, mv: Move) -> Result<()> {
        if !self.is_legal(mv) {
            bail!(
                "Illegal move {mv:?} for {} in position {}",
                self.side_to_move(),
                self.position
            );
        }

        self.make_move(mv);
        Ok(())
    }

    /// Applies the provided [`Move`]. No enforcement of legality.
    #[inline(always)]
    pub fn make_move(&mut self, mv: Move) {
        debug!("{} plays {mv:?}", self.side_to_move());
        self.position.make_move(mv);
    }

    /// Applies the provided [`Move`]s. No enforcement of legality.
    #[inline(always)]
    pub fn make_moves(&mut self, moves: impl IntoIterator<Item = Move>) {
        for mv in moves {
            self.make_move(mv);
        }
    }

    /// Fetch the internal [`Position`] of this [`Game`].
    #[inline(always)]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Generate all legal moves for the side to move.
    ///
    /// # Example
    /// ```
    /// # use rookie::*;
    /// let game = Game::default();
    /// assert_eq!(game.legal_moves().len(), 20);
    /// ```
    #[inline(always)]
    pub fn legal_moves(&self) -> MoveList {
        self.legal_moves_for(self.side_to_move())
    }

    /// Generate all legal moves for `color`, regardless of whose turn it is.
    ///
    /// Every pseudo-legal move is tried on a copy of the position, and is kept only
    /// if it does not leave `color`'s King in check.
    ///
    /// At most [`MAX_NUM_MOVES`] moves are returned. Only a hand-built board with
    /// impossible material can exceed that, and the overflow is dropped with a warning.
    pub fn legal_moves_for(&self, color: Color) -> MoveList {
        let mut moves = MoveList::new();

        for mv in movegen::pseudo_legal_moves(&self.position, color) {
            if self.leaves_in_check(mv, color) {
                trace!("Rejecting {mv:?}: it leaves the {color} King in check");
                continue;
            }

            if moves.try_push(mv).is_err() {
                warn!("{color} has more than {MAX_NUM_MOVES} legal moves in {self}; ignoring the rest");
                break;
            }
        }

        moves
    }

    /// Returns `true` if `mv` can be played by the side to move.
    #[inline(always)]
    pub fn is_legal(&self, mv: Move) -> bool {
        self.legal_moves().contains(&mv)
    }

    /// Plays `mv` on a copy of the position and checks if `color` is in check afterwards.
    #[inline(always)]
    fn leaves_in_check(&self, mv: Move, color: Color) -> bool {
        movegen::is_in_check(&self.position.with_move_made(mv), color)
    }

    /// Returns `true` if `color`'s King is attacked.
    #[inline(always)]
    pub fn is_in_check(&self, color: Color) -> bool {
        movegen::is_in_check(&self.position, color)
    }

    /// Returns `true` if `color` is in check and has no legal moves.
    ///
    /// # Example
    /// ```
    /// # use rookie::*;
    /// // Scholar's mate
    /// let game = Game::from_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4").unwrap();
    /// assert!(game.is_checkmate(Color::Black));
    /// assert!(!game.is_checkmate(Color::White));
    /// ```
    #[inline(always)]
    pub fn is_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && self.legal_moves_for(color).is_empty()
    }

    /// Returns `true` if `color` is not in check but has no legal moves.
    #[inline(always)]
    pub fn is_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && self.legal_moves_for(color).is_empty()
    }

    /// Classifies the game from the perspective of the side to move.
    pub fn state(&self) -> GameState {
        let color = self.side_to_move();
        if !self.legal_moves_for(color).is_empty() {
            GameState::Ongoing
        } else if self.is_in_check(color) {
            GameState::Checkmate {
                winner: color.opponent(),
            }
        } else {
            GameState::Stalemate
        }
    }
}

impl Deref for Game {
    type Target = Position;
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.position
    }
}

impl FromStr for Game {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl From<Position> for Game {
    #[inline(always)]
    fn from(position: Position) -> Self {
        Self::new(position)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.position().fmt(f)
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = self.side_to_move();
        let moves = self
            .legal_moves()
            .iter()
            .map(Move::to_uci)
            .collect::<Vec<_>>()
            .join(" ");

        write!(
            f,
            "Position:\n{:?}\n\nIn check: {}\nState: {}\nLegal moves ({}): {moves}",
            self.position,
            self.is_in_check(color),
            self.state(),
            self.legal_moves().len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, MoveKind, Piece, Square, FEN_KIWIPETE};

    fn play(game: &mut Game, moves: &str) {
        for uci in moves.split_whitespace() {
            let mv = Move::from_uci(game, uci).unwrap();
            game.make_move(mv);
        }
    }

    fn has_move(game: &Game, from: Square, to: Square) -> bool {
        game.legal_moves()
            .iter()
            .any(|mv| mv.from() == from && mv.to() == to)
    }

    #[test]
    fn test_initial_mobility() {
        let mut game = Game::default();
        assert_eq!(game.legal_moves().len(), 20);

        play(&mut game, "e2e4");
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(game.legal_moves().len(), 20);
    }

    #[test]
    fn test_check_restricts_mobility() {
        // Bishop on b4 checks the King on e1 and the Knight cannot reach d2, so only King steps remain
        let game = Game::from_fen("4k3/8/8/8/1b6/8/8/4K1N1 w - - 0 1").unwrap();
        assert!(game.is_in_check(Color::White));

        let moves = game.legal_moves();
        assert_eq!(moves.len(), 4, "{moves:?}");
        for (from, to) in [
            (Square::E1, Square::E2),
            (Square::E1, Square::F2),
            (Square::E1, Square::F1),
            (Square::E1, Square::D1),
        ] {
            assert!(has_move(&game, from, to), "missing {from}{to}");
        }
        assert!(!has_move(&game, Square::E1, Square::D2));
    }

    #[test]
    fn test_pinned_piece_cannot_move_off_line() {
        let game = Game::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(game.legal_moves().iter().all(|mv| mv.from() != Square::E2));
    }

    #[test]
    fn test_fools_mate() {
        let mut game = Game::default();
        play(&mut game, "f2f3 e7e5 g2g4 d8h4");

        assert!(game.is_in_check(Color::White));
        assert!(game.is_checkmate(Color::White));
        assert!(!game.is_stalemate(Color::White));
        assert!(game.legal_moves().is_empty());
        assert_eq!(
            game.state(),
            GameState::Checkmate {
                winner: Color::Black
            }
        );
    }

    #[test]
    fn test_stalemate() {
        let game = Game::from_fen("8/8/8/8/8/1q6/2k5/K7 w - - 0 1").unwrap();
        assert!(!game.is_in_check(Color::White));
        assert!(game.is_stalemate(Color::White));
        assert!(!game.is_checkmate(Color::White));
        assert_eq!(game.state(), GameState::Stalemate);
        assert!(game.state().is_over());
    }

    #[test]
    fn test_en_passant_round_trip() {
        let mut game = Game::default();
        play(&mut game, "e2e4 a7a6 e4e5 d7d5");
        assert_eq!(game.ep_square(), Some(Square::D6));

        let ep = game
            .legal_moves()
            .into_iter()
            .find(|mv| mv.is_en_passant())
            .unwrap();
        assert_eq!((ep.from(), ep.to()), (Square::E5, Square::D6));

        game.make_move(ep);
        assert_eq!(game.piece_at(Square::D6), Some(Piece::WHITE_PAWN));
        assert_eq!(game.piece_at(Square::D5), None);
        assert_eq!(game.piece_at(Square::E5), None);
    }

    #[test]
    fn test_en_passant_expires() {
        let mut game = Game::default();
        play(&mut game, "e2e4 a7a6 e4e5 d7d5 h2h3 h7h6");
        assert_eq!(game.ep_square(), None);
        assert!(game.legal_moves().iter().all(|mv| !mv.is_en_passant()));
        assert!(!has_move(&game, Square::E5, Square::D6));
    }

    #[test]
    fn test_castling_conditions() {
        let game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(game.legal_moves().iter().any(|mv| mv.is_short_castle()));
        assert!(game.legal_moves().iter().any(|mv| mv.is_long_castle()));

        // Knight between King and Rook
        let game = Game::from_fen("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1").unwrap();
        assert!(!game.legal_moves().iter().any(|mv| mv.is_long_castle()));

        // Rook on f8 attacks the transit square
        let game = Game::from_fen("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1").unwrap();
        assert!(!game.legal_moves().iter().any(|mv| mv.is_short_castle()));

        // Attack on b1 does not matter, the King never crosses it
        let game = Game::from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert!(game.legal_moves().iter().any(|mv| mv.is_long_castle()));

        // No castling out of check
        let game = Game::from_fen("4k3/8/8/8/8/8/8/R3K2r w Q - 0 1").unwrap();
        assert!(game.is_in_check(Color::White));
        assert!(!game.legal_moves().iter().any(|mv| mv.is_castle()));
    }

    #[test]
    fn test_castling_rights_are_monotonic() {
        let mut game = Game::default();
        play(&mut game, "e2e4 e7e5 e1e2 e8e7 e2e1 e7e8");
        assert!(!game.can_castle(Color::White));
        assert!(!game.can_castle(Color::Black));
        assert_eq!(game.castling_rights_uci(), "-");
    }

    #[test]
    fn test_promotion_is_to_queen() {
        let mut game = Game::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let promotions: Vec<_> = game
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.is_promotion())
            .collect();
        assert_eq!(promotions.len(), 1);

        game.make_move(promotions[0]);
        assert_eq!(game.piece_at(Square::A8), Some(Piece::WHITE_QUEEN));
        assert!(game.is_in_check(Color::Black));
    }

    #[test]
    fn test_legal_moves_is_idempotent() {
        let game = Game::from_fen(FEN_KIWIPETE).unwrap();
        let before = game;
        let first = game.legal_moves();
        let second = game.legal_moves();
        assert_eq!(first, second);
        assert_eq!(game, before);
    }

    #[test]
    fn test_make_move_checked() {
        let mut game = Game::default();
        let e2e4 = Move::new(Square::E2, Square::E4, MoveKind::PawnDoublePush);
        assert!(game.make_move_checked(e2e4).is_ok());
        assert_eq!(game.side_to_move(), Color::Black);

        // Right squares, wrong tag
        let mislabeled = Move::new(Square::E7, Square::E5, MoveKind::Quiet);
        assert!(game.make_move_checked(mislabeled).is_err());
        assert_eq!(game.side_to_move(), Color::Black);
    }

    #[test]
    fn test_missing_king_has_no_legal_moves() {
        let game = Game::from_fen("8/8/8/8/8/8/4R3/k7 w - - 0 1").unwrap();
        assert!(game.is_in_check(Color::White));
        assert!(game.legal_moves().is_empty());
        assert!(game.is_checkmate(Color::White));
    }

    #[test]
    fn test_move_list_overflow_is_truncated() {
        // Twelve Queens cannot come from a real game, so the board is placed by hand
        let fen = "3Q4/1Q4Q1/4Q3/2Q4Q/Q4Q2/3Q4/1Q4Q1/K3Q2k w - - 0 1";
        assert!(Game::from_fen(fen).is_err());

        let mut position = Position::new();
        *position.board_mut() = Board::from_fen(fen).unwrap();

        let game = Game::new(position);
        assert_eq!(game.legal_moves().len(), MAX_NUM_MOVES);
    }

    #[test]
    fn test_with_move_made_leaves_original() {
        let game = Game::default();
        let mv = game.legal_moves()[0];
        let next = game.with_move_made(mv);
        assert_ne!(game, next);
        assert_eq!(game, Game::default());
    }
}
