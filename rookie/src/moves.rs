/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{bail, Result};

use super::{Game, Square};

/// Represents the different kinds of moves that can be made during a chess game.
///
/// The kind is decided by the move generator, and tells [`crate::Position::make_move`]
/// which side effects (rook relocation, en passant capture, etc.) to perform.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum MoveKind {
    /// Moving a piece to an empty square.
    #[default]
    Quiet,

    /// Capturing an enemy piece on the destination square.
    Capture,

    /// A Pawn advancing two squares from its starting rank.
    ///
    /// The file of the push is the file of the move's origin.
    PawnDoublePush,

    /// A Pawn capturing the enemy Pawn that just double-pushed past it.
    EnPassantCapture,

    /// Kingside castling.
    ShortCastle,

    /// Queenside castling.
    LongCastle,

    /// A Pawn advancing onto its last rank. Always promotes to a Queen.
    Promotion,

    /// A Pawn capturing onto its last rank. Always promotes to a Queen.
    CaptureAndPromotion,
}

/// A move of a piece from one [`Square`] to another, tagged with its [`MoveKind`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move {
    from: Square,
    to: Square,
    kind: MoveKind,
}

impl Move {
    /// Creates a new [`Move`] from the given [`Square`]s and a [`MoveKind`].
    ///
    /// # Example
    /// ```
    /// # use rookie::*;
    /// let e2e4 = Move::new(Square::E2, Square::E4, MoveKind::PawnDoublePush);
    /// assert_eq!(e2e4.to_string(), "e2e4");
    /// ```
    #[inline(always)]
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Self { from, to, kind }
    }

    /// Fetches the source (or "from") part of this [`Move`], as a [`Square`].
    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    /// Fetches the destination (or "to") part of this [`Move`], as a [`Square`].
    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Fetches the [`MoveKind`] part of this [`Move`].
    #[inline(always)]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// Fetches the parts of this [`Move`] in a tuple of `(from, to, kind)`.
    #[inline(always)]
    pub const fn parts(&self) -> (Square, Square, MoveKind) {
        (self.from, self.to, self.kind)
    }

    /// Returns `true` if this move removes an enemy piece from the board.
    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        matches!(
            self.kind,
            MoveKind::Capture | MoveKind::EnPassantCapture | MoveKind::CaptureAndPromotion
        )
    }

    #[inline(always)]
    pub const fn is_en_passant(&self) -> bool {
        matches!(self.kind, MoveKind::EnPassantCapture)
    }

    #[inline(always)]
    pub const fn is_pawn_double_push(&self) -> bool {
        matches!(self.kind, MoveKind::PawnDoublePush)
    }

    #[inline(always)]
    pub const fn is_short_castle(&self) -> bool {
        matches!(self.kind, MoveKind::ShortCastle)
    }

    #[inline(always)]
    pub const fn is_long_castle(&self) -> bool {
        matches!(self.kind, MoveKind::LongCastle)
    }

    #[inline(always)]
    pub const fn is_castle(&self) -> bool {
        self.is_short_castle() || self.is_long_castle()
    }

    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        matches!(
            self.kind,
            MoveKind::Promotion | MoveKind::CaptureAndPromotion
        )
    }

    /// Creates a [`Move`] from a string in coordinate notation, like `"e2e4"`.
    ///
    /// The string is first checked for shape (two squares, optionally followed by a `q` promotion suffix).
    /// The move's [`MoveKind`] is never guessed from the string: it is looked up in the legal moves
    /// of `game`, so a string that does not name a legal move for the side to move is an error.
    ///
    /// # Example
    /// ```
    /// # use rookie::*;
    /// let game = Game::default();
    /// let mv = Move::from_uci(&game, "e2e4").unwrap();
    /// assert_eq!(mv.kind(), MoveKind::PawnDoublePush);
    ///
    /// assert!(Move::from_uci(&game, "e2e5").is_err()); // illegal
    /// assert!(Move::from_uci(&game, "e2").is_err()); // malformed
    /// ```
    pub fn from_uci(game: &Game, uci: &str) -> Result<Self> {
        let uci: String = uci.chars().filter(|c| !c.is_whitespace()).collect();

        if !uci.is_ascii() {
            bail!("Invalid move {uci:?}: expected coordinates like \"e2e4\"");
        }

        let (squares, promotion) = match uci.len() {
            4 => (uci.as_str(), None),
            5 => {
                let (squares, suffix) = uci.split_at(4);
                (squares, Some(suffix))
            }
            _ => bail!("Invalid move {uci:?}: expected four characters, like \"e2e4\""),
        };

        let from = Square::from_uci(&squares[0..2])?;
        let to = Square::from_uci(&squares[2..4])?;

        let Some(mv) = game
            .legal_moves()
            .into_iter()
            .find(|mv| mv.from() == from && mv.to() == to)
        else {
            bail!("Illegal move {uci:?} for {}", game.side_to_move());
        };

        if let Some(suffix) = promotion {
            if !mv.is_promotion() {
                bail!("Invalid move {uci:?}: only pawn moves onto the last rank may have a suffix");
            }
            if !suffix.eq_ignore_ascii_case("q") {
                bail!("Invalid move {uci:?}: pawns may only promote to a Queen");
            }
        }

        Ok(mv)
    }

    /// Converts this [`Move`] to a string in coordinate notation, like `"e2e4"`.
    ///
    /// Promotions get a trailing `q`.
    pub fn to_uci(&self) -> String {
        if self.is_promotion() {
            format!("{}{}q", self.from, self.to)
        } else {
            format!("{}{}", self.from, self.to)
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.to_uci(), self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn test_uci_resolves_en_passant_tag() {
        let mut game = Game::default();
        for uci in ["e2e4", "a7a6", "e4e5", "d7d5"] {
            game.make_move(Move::from_uci(&game, uci).unwrap());
        }

        let mv = Move::from_uci(&game, "e5d6").unwrap();
        assert_eq!(mv.kind(), MoveKind::EnPassantCapture);
        assert!(mv.is_capture());
    }

    #[test]
    fn test_uci_resolves_castling_tag() {
        let game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(
            Move::from_uci(&game, "e1g1").unwrap().kind(),
            MoveKind::ShortCastle
        );
        assert_eq!(
            Move::from_uci(&game, "e1c1").unwrap().kind(),
            MoveKind::LongCastle
        );
    }

    #[test]
    fn test_uci_promotion_suffix() {
        let game = Game::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let plain = Move::from_uci(&game, "a7a8").unwrap();
        let suffixed = Move::from_uci(&game, "a7a8q").unwrap();
        assert_eq!(plain, suffixed);
        assert_eq!(plain.to_string(), "a7a8q");

        assert!(Move::from_uci(&game, "a7a8n").is_err());
        assert!(Move::from_uci(&game, "a1a2q").is_err());
    }

    #[test]
    fn test_uci_rejects_malformed_input() {
        let game = Game::default();
        for bad in ["", "e2", "e2e", "e2e4e5", "i2i4", "e0e4", "e2e9"] {
            assert!(Move::from_uci(&game, bad).is_err(), "{bad:?} was accepted");
        }
    }

    #[test]
    fn test_uci_only_accepts_side_to_move() {
        let game = Game::default();
        assert_eq!(game.side_to_move(), Color::White);
        assert!(Move::from_uci(&game, "e7e5").is_err());
        assert!(Move::from_uci(&game, " e2 e4 ").is_ok());
    }
}
