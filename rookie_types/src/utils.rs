/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Maximum number of legal moves possible in any reachable chess position.
pub const MAX_NUM_MOVES: usize = 218;

/// FEN string for the starting position of chess.
pub const FEN_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A FEN string with no pieces on the board.
pub const FEN_EMPTY: &str = "8/8/8/8/8/8/8/8 w - - 0 1";

/// A popular FEN string for debugging move generation.
///
/// <https://www.chessprogramming.org/Perft_Results#Position_2>
pub const FEN_KIWIPETE: &str =
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

/// An endgame with discovered checks along the fourth and fifth ranks, good for testing en passant.
///
/// <https://www.chessprogramming.org/Perft_Results#Position_3>
pub const FEN_POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
