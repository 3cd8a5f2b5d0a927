/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;
use log::warn;

use super::{Board, Color, Move, MoveKind, Piece, PieceKind, Position, Rank, Square, MAX_NUM_MOVES};

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_NUM_MOVES`] moves.
pub type MoveList = ArrayVec<Move, MAX_NUM_MOVES>;

/// Most moves a single piece can have: a Queen in the middle of an empty board has 27.
pub const MAX_PIECE_MOVES: usize = 28;

/// An alias for an [`arrayvec::ArrayVec`] holding the moves of a single piece.
pub type PieceMoveList = ArrayVec<Move, MAX_PIECE_MOVES>;

/// `(row, col)` offsets for a Knight's jumps.
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

/// `(row, col)` offsets for a King's steps.
const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Generates every pseudo-legal move for the piece on `from`.
///
/// "Pseudo-legal" means that the moves obey how the piece moves, but may leave
/// its own King in check. Castling is the exception: it is only generated when the King
/// is not in check and does not pass through or land on an attacked square.
///
/// Returns an empty list if `from` is empty.
///
/// # Example
/// ```
/// # use rookie::*;
/// let position = Position::default();
/// let knight_moves = pseudo_legal_moves_from(&position, Square::G1);
/// assert_eq!(knight_moves.len(), 2);
/// ```
pub fn pseudo_legal_moves_from(position: &Position, from: Square) -> PieceMoveList {
    let mut moves = PieceMoveList::default();
    let Some(piece) = position.piece_at(from) else {
        return moves;
    };
    let color = piece.color();

    match piece.kind() {
        PieceKind::Pawn => generate_pawn_moves(position, from, color, &mut moves),
        PieceKind::Knight => generate_stepping_moves(position, from, color, &KNIGHT_OFFSETS, &mut moves),
        PieceKind::Bishop => generate_sliding_moves(position, from, color, &DIAGONALS, &mut moves),
        PieceKind::Rook => generate_sliding_moves(position, from, color, &ORTHOGONALS, &mut moves),
        PieceKind::Queen => {
            generate_sliding_moves(position, from, color, &DIAGONALS, &mut moves);
            generate_sliding_moves(position, from, color, &ORTHOGONALS, &mut moves);
        }
        PieceKind::King => {
            generate_stepping_moves(position, from, color, &KING_OFFSETS, &mut moves);
            generate_castling_moves(position, from, color, &mut moves);
        }
    }

    moves
}

/// Yields every pseudo-legal move available to `color`'s pieces.
///
/// See [`pseudo_legal_moves_from`].
pub fn pseudo_legal_moves(position: &Position, color: Color) -> impl Iterator<Item = Move> + '_ {
    position
        .pieces_of(color)
        .flat_map(move |(from, _)| pseudo_legal_moves_from(position, from))
}

/// Creates and appends a [`Move`] that is either a quiet or capture.
#[inline(always)]
fn serialize_normal_move(board: &Board, from: Square, to: Square, moves: &mut PieceMoveList) {
    let kind = if board.has(to) {
        MoveKind::Capture
    } else {
        MoveKind::Quiet
    };

    moves.push(Move::new(from, to, kind));
}

fn generate_pawn_moves(position: &Position, from: Square, color: Color, moves: &mut PieceMoveList) {
    let board = position.board();

    // A Pawn is never on its last rank, but a hand-made FEN could put one there
    let Some(ahead) = from.forward_by(color, 1) else {
        return;
    };
    let promotes = ahead.rank() == Rank::eighth(color);

    if !board.has(ahead) {
        let kind = if promotes {
            MoveKind::Promotion
        } else {
            MoveKind::Quiet
        };
        moves.push(Move::new(from, ahead, kind));

        // Double push requires both squares in front to be empty
        if from.rank() == Rank::second(color) {
            if let Some(two_ahead) = ahead.forward_by(color, 1) {
                if !board.has(two_ahead) {
                    moves.push(Move::new(from, two_ahead, MoveKind::PawnDoublePush));
                }
            }
        }
    }

    for side in [-1, 1] {
        let Some(target) = ahead.offset(0, side) else {
            continue;
        };

        if board.color_at(target) == Some(color.opponent()) {
            let kind = if promotes {
                MoveKind::CaptureAndPromotion
            } else {
                MoveKind::Capture
            };
            moves.push(Move::new(from, target, kind));
        } else if position.ep_square() == Some(target) && can_capture_en_passant(board, target, color) {
            moves.push(Move::new(from, target, MoveKind::EnPassantCapture));
        }
    }
}

/// The Pawn taken en passant sits one rank behind the destination, beside the capturing Pawn.
#[inline(always)]
fn can_capture_en_passant(board: &Board, ep_square: Square, color: Color) -> bool {
    ep_square
        .backward_by(color, 1)
        .is_some_and(|victim| board.piece_at(victim) == Some(Piece::new(color.opponent(), PieceKind::Pawn)))
}

/// Knights and Kings: a fixed set of single jumps.
fn generate_stepping_moves(
    position: &Position,
    from: Square,
    color: Color,
    offsets: &[(i8, i8)],
    moves: &mut PieceMoveList,
) {
    let board = position.board();
    for &(rows, cols) in offsets {
        let Some(to) = from.offset(rows, cols) else {
            continue;
        };

        if board.color_at(to) != Some(color) {
            serialize_normal_move(board, from, to, moves);
        }
    }
}

/// Bishops, Rooks and Queens: slide along each direction until something is in the way.
fn generate_sliding_moves(
    position: &Position,
    from: Square,
    color: Color,
    directions: &[(i8, i8)],
    moves: &mut PieceMoveList,
) {
    let board = position.board();
    for &(rows, cols) in directions {
        let mut cursor = from;
        while let Some(to) = cursor.offset(rows, cols) {
            match board.color_at(to) {
                None => moves.push(Move::new(from, to, MoveKind::Quiet)),
                Some(blocker) => {
                    // Enemy blockers can be captured, friendly ones cannot
                    if blocker != color {
                        moves.push(Move::new(from, to, MoveKind::Capture));
                    }
                    break;
                }
            }
            cursor = to;
        }
    }
}

fn generate_castling_moves(position: &Position, from: Square, color: Color, moves: &mut PieceMoveList) {
    let rights = position.castling_rights_for(color);
    if !rights.any() || from != Square::E1.rank_relative_to(color) {
        return;
    }

    // Cannot castle out of check
    if is_attacked(position, from, color.opponent()) {
        return;
    }

    if rights.short() {
        generate_castling_move(
            position,
            color,
            Square::H1.rank_relative_to(color),
            Square::F1.rank_relative_to(color),
            Square::G1.rank_relative_to(color),
            MoveKind::ShortCastle,
            moves,
        );
    }

    if rights.long() {
        generate_castling_move(
            position,
            color,
            Square::A1.rank_relative_to(color),
            Square::D1.rank_relative_to(color),
            Square::C1.rank_relative_to(color),
            MoveKind::LongCastle,
            moves,
        );
    }
}

/// Appends a castling move for `color`'s King with the Rook on `rook`, if the path allows it.
///
/// Every square strictly between the King and Rook must be empty, and the King's `transit` and
/// `landing` squares must not be attacked.
fn generate_castling_move(
    position: &Position,
    color: Color,
    rook: Square,
    transit: Square,
    landing: Square,
    kind: MoveKind,
    moves: &mut PieceMoveList,
) {
    let board = position.board();
    let king = Square::E1.rank_relative_to(color);

    let rook_is_home = board
        .piece_at(rook)
        .is_some_and(|piece| piece.is_rook() && piece.color() == color);
    if !rook_is_home {
        return;
    }

    let (low, high) = if king.col() < rook.col() {
        (king.col(), rook.col())
    } else {
        (rook.col(), king.col())
    };

    let path_is_empty = (low + 1..high)
        .filter_map(|col| Square::from_coords(king.row(), col))
        .all(|square| !board.has(square));
    if !path_is_empty {
        return;
    }

    let opponent = color.opponent();
    if is_attacked(position, transit, opponent) || is_attacked(position, landing, opponent) {
        return;
    }

    moves.push(Move::new(king, landing, kind));
}

/// Returns `true` if `piece`, standing on `from`, could capture something on `target`.
///
/// This is pure geometry: it never considers castling, en passant, or whether the
/// capture would be legal, and Pawns attack diagonally whether or not anything is there.
pub fn attacks(board: &Board, from: Square, piece: Piece, target: Square) -> bool {
    match piece.kind() {
        PieceKind::Pawn => from.forward_by(piece.color(), 1).is_some_and(|ahead| {
            ahead.row() == target.row() && ahead.col().abs_diff(target.col()) == 1
        }),
        PieceKind::Knight => KNIGHT_OFFSETS
            .iter()
            .any(|&(rows, cols)| from.offset(rows, cols) == Some(target)),
        PieceKind::Bishop => slides_to(board, from, target, &DIAGONALS),
        PieceKind::Rook => slides_to(board, from, target, &ORTHOGONALS),
        PieceKind::Queen => {
            slides_to(board, from, target, &DIAGONALS)
                || slides_to(board, from, target, &ORTHOGONALS)
        }
        PieceKind::King => KING_OFFSETS
            .iter()
            .any(|&(rows, cols)| from.offset(rows, cols) == Some(target)),
    }
}

/// Returns `true` if a slider on `from` reaches `target` along one of `directions`, stopping at blockers.
fn slides_to(board: &Board, from: Square, target: Square, directions: &[(i8, i8)]) -> bool {
    directions.iter().any(|&(rows, cols)| {
        let mut cursor = from;
        while let Some(next) = cursor.offset(rows, cols) {
            if next == target {
                return true;
            }
            if board.has(next) {
                return false;
            }
            cursor = next;
        }
        false
    })
}

/// Yields the squares of all `by` pieces that attack `square`.
///
/// # Example
/// ```
/// # use rookie::*;
/// let position = Position::default();
/// let defenders: Vec<_> = attackers_of(&position, Square::F3, Color::White).collect();
/// assert_eq!(defenders, [Square::E2, Square::G2, Square::G1]);
/// ```
pub fn attackers_of(
    position: &Position,
    square: Square,
    by: Color,
) -> impl Iterator<Item = Square> + '_ {
    let board = position.board();
    board
        .pieces_of(by)
        .filter(move |&(from, piece)| attacks(board, from, piece, square))
        .map(|(from, _)| from)
}

/// Returns `true` if any piece of `by` attacks `square`.
///
/// # Example
/// ```
/// # use rookie::*;
/// let position = Position::default();
/// assert!(is_attacked(&position, Square::F3, Color::White));
/// assert!(!is_attacked(&position, Square::E4, Color::White));
/// ```
#[inline(always)]
pub fn is_attacked(position: &Position, square: Square, by: Color) -> bool {
    attackers_of(position, square, by).next().is_some()
}

/// Locates `color`'s King, if it has one.
#[inline(always)]
pub fn king_square(position: &Position, color: Color) -> Option<Square> {
    position
        .pieces_of(color)
        .find(|(_, piece)| piece.is_king())
        .map(|(square, _)| square)
}

/// Returns `true` if `color`'s King is attacked.
///
/// A side without a King is considered to be in check, so that a broken position
/// can never be reported as safe.
pub fn is_in_check(position: &Position, color: Color) -> bool {
    let Some(king) = king_square(position, color) else {
        warn!("No {color} King found in {position}; treating it as in check");
        return true;
    };

    is_attacked(position, king, color.opponent())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Checks if `moves` and `expected` contain all the same destinations, ignoring order
    fn lists_match(moves: &[Move], expected: &[Square]) {
        assert_eq!(
            moves.len(),
            expected.len(),
            "\nMoves: {:?}\nExpected: {:?}",
            moves,
            expected
        );

        for mv in moves {
            assert!(
                expected.contains(&mv.to()),
                "{} not found in {:?}",
                mv,
                expected
            );
        }
    }

    fn position(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn test_rook_blockers() {
        // Friendly Pawn on D2 and F4, enemy Pawns on D6 and B4
        let pos = position("4k3/8/3p4/8/1p1R1P2/8/3P4/4K3 w - - 0 1");
        let moves = pseudo_legal_moves_from(&pos, Square::D4);

        lists_match(
            &moves,
            &[
                Square::D3,
                Square::D5,
                Square::D6,
                Square::C4,
                Square::B4,
                Square::E4,
            ],
        );
        let captures = moves.iter().filter(|mv| mv.is_capture()).count();
        assert_eq!(captures, 2);
    }

    #[test]
    fn test_bishop_and_queen_rays() {
        let pos = position("4k3/8/8/8/3B4/8/8/4K3 w - - 0 1");
        assert_eq!(pseudo_legal_moves_from(&pos, Square::D4).len(), 13);

        let pos = position("4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1");
        assert_eq!(pseudo_legal_moves_from(&pos, Square::D4).len(), 27);
    }

    #[test]
    fn test_knight_jumps() {
        let pos = position("4k3/8/8/8/8/8/8/N3K3 w - - 0 1");
        lists_match(
            &pseudo_legal_moves_from(&pos, Square::A1),
            &[Square::B3, Square::C2],
        );

        let pos = position("4k3/8/8/8/3N4/8/8/4K3 w - - 0 1");
        assert_eq!(pseudo_legal_moves_from(&pos, Square::D4).len(), 8);
    }

    #[test]
    fn test_pawn_pushes_and_captures() {
        let pos = position("4k3/8/8/8/8/p1p5/1P6/4K3 w - - 0 1");
        let moves = pseudo_legal_moves_from(&pos, Square::B2);
        lists_match(&moves, &[Square::B3, Square::B4, Square::A3, Square::C3]);

        let double = moves.iter().find(|mv| mv.to() == Square::B4).unwrap();
        assert_eq!(double.kind(), MoveKind::PawnDoublePush);

        // Blocked pawns cannot push at all
        let pos = position("4k3/8/8/8/8/1n6/1P6/4K3 w - - 0 1");
        assert!(pseudo_legal_moves_from(&pos, Square::B2).is_empty());

        // A blocker two squares ahead only stops the double push
        let pos = position("4k3/8/8/8/1n6/8/1P6/4K3 w - - 0 1");
        lists_match(&pseudo_legal_moves_from(&pos, Square::B2), &[Square::B3]);
    }

    #[test]
    fn test_black_pawns_move_down() {
        let pos = Position::default();
        lists_match(
            &pseudo_legal_moves_from(&pos, Square::E7),
            &[Square::E6, Square::E5],
        );
    }

    #[test]
    fn test_promotions_are_tagged() {
        let pos = position("1n5k/P7/8/8/8/8/8/K7 w - - 0 1");
        let moves = pseudo_legal_moves_from(&pos, Square::A7);
        lists_match(&moves, &[Square::A8, Square::B8]);
        assert!(moves.iter().all(|mv| mv.is_promotion()));
        assert!(moves.iter().any(|mv| mv.kind() == MoveKind::CaptureAndPromotion));
    }

    #[test]
    fn test_en_passant_requires_adjacent_pawn() {
        let pos = position("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let moves = pseudo_legal_moves_from(&pos, Square::E5);
        let ep = moves.iter().find(|mv| mv.to() == Square::D6).unwrap();
        assert_eq!(ep.kind(), MoveKind::EnPassantCapture);

        // A pawn two files away cannot use the en passant square
        let pos = position("4k3/8/8/3p1P2/8/8/8/4K3 w - d6 0 1");
        let moves = pseudo_legal_moves_from(&pos, Square::F5);
        assert!(moves.iter().all(|mv| !mv.is_en_passant()));
    }

    #[test]
    fn test_attack_queries() {
        let pos = Position::default();

        // Pawns attack diagonally, even onto empty squares, but not straight ahead
        assert!(is_attacked(&pos, Square::D3, Color::White));
        assert!(!is_attacked(&pos, Square::D4, Color::White));
        assert!(is_attacked(&pos, Square::F6, Color::Black));

        // Sliders are stopped by blockers
        let pos = position("4k3/8/8/8/8/8/4P3/4RK2 w - - 0 1");
        assert!(is_attacked(&pos, Square::E2, Color::White));
        assert!(!is_attacked(&pos, Square::E3, Color::White));
        assert_eq!(
            attackers_of(&pos, Square::E2, Color::White).collect::<Vec<_>>(),
            [Square::E1, Square::F1]
        );
    }

    #[test]
    fn test_is_in_check() {
        let pos = position("4k3/8/8/8/1b6/8/8/4K3 w - - 0 1");
        assert!(is_in_check(&pos, Color::White));
        assert!(!is_in_check(&pos, Color::Black));

        // Blocking the diagonal removes the check
        let pos = position("4k3/8/8/8/1b6/8/3P4/4K3 w - - 0 1");
        assert!(!is_in_check(&pos, Color::White));
    }

    #[test]
    fn test_missing_king_counts_as_check() {
        let pos = position("8/8/8/8/8/8/8/k7 w - - 0 1");
        assert_eq!(king_square(&pos, Color::White), None);
        assert!(is_in_check(&pos, Color::White));
        assert!(!is_in_check(&pos, Color::Black));
    }

    #[test]
    fn test_castling_generation() {
        let pos = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let moves = pseudo_legal_moves_from(&pos, Square::E1);
        assert!(moves.iter().any(|mv| mv.is_short_castle() && mv.to() == Square::G1));
        assert!(moves.iter().any(|mv| mv.is_long_castle() && mv.to() == Square::C1));

        let moves = pseudo_legal_moves_from(&pos, Square::E8);
        assert!(moves.iter().any(|mv| mv.is_short_castle() && mv.to() == Square::G8));
        assert!(moves.iter().any(|mv| mv.is_long_castle() && mv.to() == Square::C8));
    }

    #[test]
    fn test_castling_blocked_by_pieces() {
        // Knight on B1 is not on the King's path, but is still between King and Rook
        let pos = position("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1");
        let moves = pseudo_legal_moves_from(&pos, Square::E1);
        assert!(moves.iter().any(|mv| mv.is_short_castle()));
        assert!(!moves.iter().any(|mv| mv.is_long_castle()));
    }

    #[test]
    fn test_castling_blocked_by_attacks() {
        // Rook on F8 covers the transit square F1
        let pos = position("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1");
        let moves = pseudo_legal_moves_from(&pos, Square::E1);
        assert!(!moves.iter().any(|mv| mv.is_short_castle()));
        assert!(moves.iter().any(|mv| mv.is_long_castle()));

        // Rook on G8 covers the landing square G1
        let pos = position("r3k1r1/8/8/8/8/8/8/R3K2R w KQq - 0 1");
        let moves = pseudo_legal_moves_from(&pos, Square::E1);
        assert!(!moves.iter().any(|mv| mv.is_short_castle()));

        // Cannot castle out of check
        let pos = position("r3k2r/8/8/8/8/8/4r3/R3K2R w KQ - 0 1");
        let moves = pseudo_legal_moves_from(&pos, Square::E1);
        assert!(!moves.iter().any(|mv| mv.is_castle()));
    }

    #[test]
    fn test_castling_blocked_by_pawn_attacks() {
        // The e2 Pawn does not check the King, but it covers F1
        let pos = position("4k3/8/8/8/8/8/4p3/4K2R w K - 0 1");
        assert!(!is_in_check(&pos, Color::White));
        assert!(is_attacked(&pos, Square::F1, Color::Black));
        let moves = pseudo_legal_moves_from(&pos, Square::E1);
        assert!(!moves.iter().any(|mv| mv.is_castle()));

        // Same for Black: the c7 Pawn covers D8
        let pos = position("r3k3/2P5/8/8/8/8/8/4K3 b q - 0 1");
        assert!(!is_in_check(&pos, Color::Black));
        let moves = pseudo_legal_moves_from(&pos, Square::E8);
        assert!(!moves.iter().any(|mv| mv.is_castle()));
    }

    #[test]
    fn test_castling_ignores_attacks_on_rook_path() {
        // B1 is attacked, but the King never crosses it
        let pos = position("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        let moves = pseudo_legal_moves_from(&pos, Square::E1);
        assert!(moves.iter().any(|mv| mv.is_long_castle()));
    }

    #[test]
    fn test_castling_requires_rights() {
        let pos = position("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1");
        let moves = pseudo_legal_moves_from(&pos, Square::E1);
        assert!(!moves.iter().any(|mv| mv.is_castle()));
    }

    #[test]
    fn test_startpos_pseudo_legal_count() {
        let pos = Position::default();
        assert_eq!(pseudo_legal_moves(&pos, Color::White).count(), 20);
        assert_eq!(pseudo_legal_moves(&pos, Color::Black).count(), 20);
    }
}
