/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Game, Move};

/// Counts the leaf nodes of the legal move tree of `game`, `depth` plies deep.
///
/// See <https://www.chessprogramming.org/Perft> for reference counts.
///
/// # Example
/// ```
/// # use rookie::*;
/// let game = Game::default();
/// assert_eq!(perft(&game, 1), 20);
/// assert_eq!(perft(&game, 2), 400);
/// ```
pub fn perft(game: &Game, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = game.legal_moves();

    // Bulk counting: the leaves are exactly the legal moves
    if depth == 1 {
        return moves.len() as u64;
    }

    // Recursively accumulate the nodes from the remaining depths
    moves.into_iter().fold(0, |nodes, mv| {
        nodes + perft(&game.with_move_made(mv), depth - 1)
    })
}

/// Like [`perft`], but reports the node count below each root move separately.
///
/// Useful for locating the first move where two move generators disagree.
/// The counts sum to `perft(game, depth)`.
///
/// # Example
/// ```
/// # use rookie::*;
/// let game = Game::default();
/// let split = splitperft(&game, 2);
/// assert_eq!(split.len(), 20);
/// assert!(split.iter().all(|&(_, nodes)| nodes == 20));
/// ```
pub fn splitperft(game: &Game, depth: usize) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }

    game.legal_moves()
        .into_iter()
        .map(|mv| (mv, perft(&game.with_move_made(mv), depth - 1)))
        .collect()
}
