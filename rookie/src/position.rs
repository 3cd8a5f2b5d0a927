/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Deref, Index},
    str::FromStr,
};

use anyhow::{anyhow, bail, Result};

use super::{Color, File, Move, MoveKind, Piece, PieceKind, Rank, Square};

/// Whether one side may still castle kingside (`short`) and queenside (`long`).
///
/// Rights are only ever cleared during a game, never restored.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct CastlingRights {
    /// Kingside, with the Rook starting on the `h` file.
    pub(crate) short: bool,
    /// Queenside, with the Rook starting on the `a` file.
    pub(crate) long: bool,
}

impl CastlingRights {
    #[inline(always)]
    pub const fn new(short: bool, long: bool) -> Self {
        Self { short, long }
    }

    /// Rights to castle on both sides, as at the start of a game.
    #[inline(always)]
    pub const fn both() -> Self {
        Self::new(true, true)
    }

    #[inline(always)]
    pub const fn short(&self) -> bool {
        self.short
    }

    #[inline(always)]
    pub const fn long(&self) -> bool {
        self.long
    }

    /// Returns `true` if castling to either side is still permitted.
    #[inline(always)]
    pub const fn any(&self) -> bool {
        self.short || self.long
    }
}

/// Everything needed to continue a game from here: the pieces, whose turn it is,
/// the castling rights and the en passant square.
///
/// [`Position`] is `Copy`, so trying out a move on a scratch copy (see [`Position::with_move_made`])
/// can never disturb the original.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Piece placements.
    pub(crate) board: Board,

    /// Whose turn it is.
    side_to_move: Color,

    /// Indexed by [`Color`].
    castling_rights: [CastlingRights; Color::COUNT],

    /// The square skipped over by a Pawn double push on the previous ply, if any.
    ep_square: Option<Square>,

    /// Plies since the last capture or Pawn move. Only kept for FEN output.
    halfmove: usize,

    /// Starts at 1 and goes up after every Black move. Only kept for FEN output.
    fullmove: usize,
}

impl Position {
    /// An empty board with White to move and nothing else set.
    ///
    /// # Example
    /// ```
    /// # use rookie::*;
    /// assert_eq!(Position::new().to_fen(), FEN_EMPTY);
    /// ```
    pub const fn new() -> Self {
        Self {
            board: Board::new(),
            side_to_move: Color::White,
            castling_rights: [CastlingRights::new(false, false); Color::COUNT],
            ep_square: None,
            halfmove: 0,
            fullmove: 1,
        }
    }

    /// Creates the standard starting position, with White to move and all castling rights.
    pub const fn startpos() -> Self {
        let mut pos = Self::new();
        pos.board = Board::startpos();
        pos.castling_rights = [CastlingRights::both(); Color::COUNT];
        pos
    }

    /// Parses a FEN string.
    ///
    /// Only the placements are mandatory. Missing trailing fields default to those of the
    /// starting position. Material that no legal game could produce (more than 16 pieces or
    /// 8 Pawns for a side, two Kings, or more promoted pieces than missing Pawns) is rejected.
    ///
    /// # Example
    /// ```
    /// # use rookie::*;
    /// let pos = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1").unwrap();
    /// assert_eq!(pos.side_to_move(), Color::Black);
    ///
    /// assert!(Position::from_fen("QQQQk3/8/8/8/8/8/PPPPPPPP/4K3 w - - 0 1").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut pos = Self::new();
        let mut fields = fen.split_ascii_whitespace();

        let placements = fields
            .next()
            .ok_or(anyhow!("Invalid FEN {fen:?}: no piece placements"))?;
        pos.board = Board::from_fen(placements)?;
        pos.board.check_material()?;

        pos.side_to_move = fields.next().unwrap_or("w").parse()?;

        let castling = fields.next().unwrap_or("KQkq");
        if castling != "-" {
            for c in castling.chars() {
                let rights = &mut pos.castling_rights[Color::from_bool(c.is_ascii_lowercase())];
                match c.to_ascii_lowercase() {
                    'k' => rights.short = true,
                    'q' => rights.long = true,
                    _ => bail!("Invalid FEN {fen:?}: unknown castling right {c:?}"),
                }
            }
        }

        pos.ep_square = match fields.next().unwrap_or("-") {
            "-" => None,
            square => Some(Square::from_uci(square)?),
        };

        let halfmove = fields.next().unwrap_or("0");
        pos.halfmove = halfmove
            .parse()
            .map_err(|_| anyhow!("Invalid FEN {fen:?}: bad halfmove counter {halfmove:?}"))?;

        let fullmove = fields.next().unwrap_or("1");
        pos.fullmove = fullmove
            .parse()
            .map_err(|_| anyhow!("Invalid FEN {fen:?}: bad fullmove counter {fullmove:?}"))?;

        Ok(pos)
    }

    /// Returns a copy of `self` with `mv` applied.
    #[inline(always)]
    pub fn with_move_made(&self, mv: Move) -> Self {
        let mut next = *self;
        next.make_move(mv);
        next
    }

    /// Exports this position as a FEN string.
    pub fn to_fen(&self) -> String {
        let ep = self
            .ep_square
            .map_or_else(|| String::from("-"), |square| square.to_uci());

        format!(
            "{} {} {} {ep} {} {}",
            self.board.to_fen(),
            self.side_to_move.char(),
            self.castling_rights_uci(),
            self.halfmove,
            self.fullmove
        )
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// The square a Pawn may capture en passant onto this ply, if any.
    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline(always)]
    pub const fn castling_rights(&self) -> &[CastlingRights; Color::COUNT] {
        &self.castling_rights
    }

    #[inline(always)]
    pub const fn castling_rights_for(&self, color: Color) -> &CastlingRights {
        &self.castling_rights[color.index()]
    }

    /// The castling field of a FEN string, like `"KQkq"`, or `"-"` if nobody can castle.
    pub fn castling_rights_uci(&self) -> String {
        let field: String = Color::all()
            .into_iter()
            .flat_map(|color| {
                let rights = self.castling_rights[color];
                [(rights.short, 'k'), (rights.long, 'q')]
                    .into_iter()
                    .filter(|&(held, _)| held)
                    .map(move |(_, c)| if color.is_white() { c.to_ascii_uppercase() } else { c })
            })
            .collect();

        if field.is_empty() {
            String::from("-")
        } else {
            field
        }
    }

    #[inline(always)]
    pub const fn halfmove(&self) -> usize {
        self.halfmove
    }

    #[inline(always)]
    pub const fn fullmove(&self) -> usize {
        self.fullmove
    }

    /// Hands the turn to the other side without moving anything.
    #[inline(always)]
    pub fn toggle_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
    }

    #[inline(always)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Direct access to the pieces, for setting up positions by hand.
    ///
    /// Nothing is validated, so a board built this way may hold any material.
    #[inline(always)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Returns `true` if `color` still holds either castling right.
    #[inline(always)]
    pub const fn can_castle(&self, color: Color) -> bool {
        self.castling_rights[color.index()].any()
    }

    /// Applies each of `moves` in order. No enforcement of legality.
    #[inline(always)]
    pub fn make_moves(&mut self, moves: impl IntoIterator<Item = Move>) {
        moves.into_iter().for_each(|mv| self.make_move(mv));
    }

    /// Applies the move. No enforcement of legality.
    ///
    /// This is the only way the board changes during a game, and it is used both for
    /// real game progress and for the scratch copies made while filtering legal moves.
    /// A move from an empty square changes nothing.
    pub fn make_move(&mut self, mv: Move) {
        let (from, to, kind) = mv.parts();

        let Some(mut piece) = self.board.take(from) else {
            return;
        };
        let color = piece.color();

        // The EP square only ever lives for a single ply
        self.ep_square = None;

        self.halfmove += 1;
        if color.is_black() {
            self.fullmove += 1;
        }

        // En passant takes the Pawn that passed the destination, not whatever is on it
        let captured_square = if kind == MoveKind::EnPassantCapture {
            to.backward_by(color, 1)
        } else {
            Some(to)
        };

        if let Some(captured_square) = captured_square {
            if let Some(captured) = self.board.take(captured_square) {
                self.clear_castling_right_for_rook_square(captured.color(), captured_square);
                self.halfmove = 0;
            }
        }

        match kind {
            MoveKind::PawnDoublePush => self.ep_square = from.forward_by(color, 1),

            MoveKind::ShortCastle | MoveKind::LongCastle => {
                let (rook_from, rook_to) = if kind == MoveKind::ShortCastle {
                    (Square::H1, Square::F1)
                } else {
                    (Square::A1, Square::D1)
                };

                let rook_from = rook_from.rank_relative_to(color);
                if let Some(rook) = self.board.take(rook_from) {
                    self.board.place(rook, rook_to.rank_relative_to(color));
                }
            }

            _ => {}
        }

        match piece.kind() {
            PieceKind::Pawn => {
                self.halfmove = 0;
                if to.rank() == Rank::eighth(color) {
                    piece = piece.promoted(PieceKind::Queen);
                }
            }

            PieceKind::Rook => self.clear_castling_right_for_rook_square(color, from),

            PieceKind::King => self.castling_rights[color] = CastlingRights::default(),

            _ => {}
        }

        self.board.place(piece, to);
        self.toggle_side_to_move();
    }

    /// Clears the single castling right of `color` whose Rook starts on `square`, if any.
    #[inline(always)]
    fn clear_castling_right_for_rook_square(&mut self, color: Color, square: Square) {
        if square == Square::H1.rank_relative_to(color) {
            self.castling_rights[color].short = false;
        } else if square == Square::A1.rank_relative_to(color) {
            self.castling_rights[color].long = false;
        }
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Deref for Position {
    type Target = Board;
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.board
    }
}

impl Default for Position {
    #[inline(always)]
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ep = self
            .ep_square
            .map_or_else(|| String::from("-"), |square| square.to_uci());

        writeln!(f, "{}", self.board)?;
        writeln!(f, "to move: {}", self.side_to_move)?;
        writeln!(f, "castling: {}", self.castling_rights_uci())?;
        writeln!(f, "en passant: {ep}")?;
        write!(f, "clocks: {} / {}", self.halfmove, self.fullmove)
    }
}

/// The 64 squares and whatever stands on them.
///
/// Stored as a mailbox: one `Option<Piece>` per [`Square`], rank eight first.
/// See [`Position`] for side to move, castling and en passant.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    mailbox: [Option<Piece>; Square::COUNT],
}

impl Board {
    /// A board with no pieces.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            mailbox: [None; Square::COUNT],
        }
    }

    /// The standard starting layout.
    ///
    /// # Example
    /// ```
    /// # use rookie::*;
    /// let board = Board::startpos();
    /// assert_eq!(board.piece_at(Square::E1), Some(Piece::WHITE_KING));
    /// assert_eq!(board.piece_at(Square::D8), Some(Piece::BLACK_QUEEN));
    /// assert_eq!(board.iter().count(), 32);
    /// ```
    pub const fn startpos() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut mailbox = [None; Square::COUNT];
        let mut col = 0;
        while col < 8 {
            // Row 0 is rank eight, so Black's pieces come first
            mailbox[col] = Some(Piece::new(Color::Black, BACK_RANK[col]));
            mailbox[8 + col] = Some(Piece::BLACK_PAWN);
            mailbox[48 + col] = Some(Piece::WHITE_PAWN);
            mailbox[56 + col] = Some(Piece::new(Color::White, BACK_RANK[col]));
            col += 1;
        }

        Self { mailbox }
    }

    /// Parses the placement field of a FEN string. Anything after the first space is ignored.
    ///
    /// Material is not checked here, see [`Position::from_fen`].
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut board = Self::new();
        let placements = fen.split_ascii_whitespace().next().unwrap_or_default();

        let rows: Vec<&str> = placements.split('/').collect();
        if rows.len() != 8 {
            bail!("Invalid placements {placements:?}: expected 8 ranks, found {}", rows.len());
        }

        // FEN lists rank eight first, which is row 0
        for (row, row_placements) in rows.into_iter().enumerate() {
            let mut col: u8 = 0;

            for c in row_placements.chars() {
                if let Some(empty) = c.to_digit(10) {
                    col = col.saturating_add(empty as u8);
                    continue;
                }

                let piece = Piece::from_uci(c)?;
                let Some(square) = Square::from_coords(row as u8, col) else {
                    bail!("Too many squares on rank {}: {row_placements:?}", 8 - row);
                };
                board.place(piece, square);
                col += 1;
            }

            if col != 8 {
                bail!(
                    "Expected 8 squares on rank {}, found {col}: {row_placements:?}",
                    8 - row
                );
            }
        }

        Ok(board)
    }

    /// Fails if either side has material that cannot arise in a legal game.
    ///
    /// A missing King is allowed.
    fn check_material(&self) -> Result<()> {
        for color in Color::all() {
            let mut counts = [0usize; PieceKind::COUNT];
            for (_, piece) in self.pieces_of(color) {
                counts[piece.kind().index()] += 1;
            }

            let total: usize = counts.iter().sum();
            if total > 16 {
                bail!("{color} has {total} pieces, but a side starts with only 16");
            }

            let mut promoted = 0;
            for kind in PieceKind::all() {
                let count = counts[kind.index()];
                let at_start = match kind {
                    PieceKind::Pawn => 8,
                    PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook => 2,
                    PieceKind::Queen | PieceKind::King => 1,
                };

                match kind {
                    PieceKind::Pawn | PieceKind::King if count > at_start => {
                        bail!("{color} has {count} {kind}s, at most {at_start} allowed")
                    }
                    _ => promoted += count.saturating_sub(at_start),
                }
            }

            let pawns = counts[PieceKind::Pawn.index()];
            if pawns + promoted > 8 {
                bail!("{color} has {promoted} promoted pieces but only {} missing Pawns", 8 - pawns);
            }
        }

        Ok(())
    }

    /// Returns `true` if something stands on `square`.
    #[inline(always)]
    pub const fn has(&self, square: Square) -> bool {
        self.mailbox[square.index()].is_some()
    }

    /// Puts `piece` on `square`, replacing whatever was there.
    #[inline(always)]
    pub fn place(&mut self, piece: Piece, square: Square) {
        self.mailbox[square] = Some(piece);
    }

    /// Empties `square`.
    #[inline(always)]
    pub fn clear(&mut self, square: Square) {
        self.mailbox[square] = None;
    }

    /// Empties `square`, returning what stood there.
    ///
    /// # Example
    /// ```
    /// # use rookie::*;
    /// let mut board = Board::startpos();
    /// assert_eq!(board.take(Square::G1), Some(Piece::WHITE_KNIGHT));
    /// assert_eq!(board.take(Square::G1), None);
    /// ```
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.mailbox[square].take()
    }

    /// The [`Color`] of whatever stands on `square`.
    #[inline(always)]
    pub fn color_at(&self, square: Square) -> Option<Color> {
        self.mailbox[square].map(|piece| piece.color())
    }

    /// Whatever stands on `square`.
    ///
    /// # Example
    /// ```
    /// # use rookie::*;
    /// let board = Board::startpos();
    /// assert_eq!(board.piece_at(Square::A2), Some(Piece::WHITE_PAWN));
    /// assert_eq!(board.piece_at(Square::E4), None);
    /// ```
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.mailbox[square.index()]
    }

    /// Yields every occupied square and its piece, from `a8` to `h1`.
    #[inline(always)]
    pub const fn iter(&self) -> BoardIter<'_> {
        BoardIter {
            board: self,
            index: 0,
        }
    }

    /// Yields `color`'s pieces and their squares, from `a8` to `h1`.
    #[inline(always)]
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.iter().filter(move |(_, piece)| piece.color() == color)
    }

    /// The placement field of a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(72);
        let mut gap = 0;

        for square in Square::iter() {
            match self.piece_at(square) {
                Some(piece) => {
                    if gap > 0 {
                        fen.push_str(&gap.to_string());
                        gap = 0;
                    }
                    fen.push(piece.char());
                }
                None => gap += 1,
            }

            if square.col() == 7 {
                if gap > 0 {
                    fen.push_str(&gap.to_string());
                    gap = 0;
                }
                if square.row() != 7 {
                    fen.push('/');
                }
            }
        }

        fen
    }
}

impl Default for Board {
    #[inline(always)]
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Board {
    /// An ASCII grid with rank eight at the top, `.` for empty squares.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank} ")?;
            for file in File::iter() {
                let c = self.piece_at(file * rank).map_or('.', |piece| piece.char());
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }

        write!(f, "  ")?;
        for file in File::iter() {
            write!(f, " {file}")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl Index<Square> for Board {
    type Output = Option<Piece>;
    #[inline(always)]
    fn index(&self, square: Square) -> &Self::Output {
        &self.mailbox[square]
    }
}

/// Iterator over the occupied squares of a [`Board`]. See [`Board::iter`].
pub struct BoardIter<'a> {
    board: &'a Board,
    index: usize,
}

impl Iterator for BoardIter<'_> {
    type Item = (Square, Piece);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(square) = Square::from_index(self.index) {
            self.index += 1;
            if let Some(piece) = self.board.piece_at(square) {
                return Some((square, piece));
            }
        }

        None
    }
}
