//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against published values to validate the move generator.

use crate::Position;

/// Counts the number of leaf nodes at the given depth.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = position.legal_moves();

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for m in &moves {
        let next = position.play(m);
        nodes += perft(&next, depth - 1);
    }
    nodes
}

/// Perft with divide: the node count below each root move, sorted by UCI.
/// Useful to localize a generation bug to one branch.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(String, u64)> {
    let moves = position.legal_moves();
    let mut results = Vec::with_capacity(moves.len());

    for m in &moves {
        let next = position.play(m);
        let nodes = if depth > 1 { perft(&next, depth - 1) } else { 1 };
        results.push((m.to_uci(false), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perft_startpos_shallow() {
        let position = Position::startpos();
        assert_eq!(perft(&position, 0), 1);
        assert_eq!(perft(&position, 1), 20);
        assert_eq!(perft(&position, 2), 400);
        assert_eq!(perft(&position, 3), 8902);
    }

    #[test]
    fn perft_startpos_depth_4() {
        let position = Position::startpos();
        assert_eq!(perft(&position, 4), 197281);
    }

    // Slow in debug builds; run with --ignored in release mode.
    #[test]
    #[ignore]
    fn perft_startpos_depth_5() {
        let position = Position::startpos();
        assert_eq!(perft(&position, 5), 4865609);
    }

    // Kiwipete exercises castling, pins, en passant and promotions.
    #[test]
    fn perft_kiwipete() {
        let position = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(perft(&position, 1), 48);
        assert_eq!(perft(&position, 2), 2039);
        assert_eq!(perft(&position, 3), 97862);
    }

    #[test]
    fn perft_check_evasions_and_promotions() {
        let position = Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
        assert_eq!(perft(&position, 1), 14);
        assert_eq!(perft(&position, 2), 191);
        assert_eq!(perft(&position, 3), 2812);

        let position =
            Position::from_fen("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1")
                .unwrap();
        assert_eq!(perft(&position, 1), 6);
        assert_eq!(perft(&position, 2), 264);
        assert_eq!(perft(&position, 3), 9467);
    }

    #[test]
    fn perft_talkchess_position() {
        let position =
            Position::from_fen("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 0 1")
                .unwrap();
        assert_eq!(perft(&position, 1), 44);
        assert_eq!(perft(&position, 2), 1486);
        assert_eq!(perft(&position, 3), 62379);
    }

    #[test]
    fn perft_divide_sums_to_perft() {
        let position = Position::startpos();
        let results = perft_divide(&position, 2);
        assert_eq!(results.len(), 20);
        let total: u64 = results.iter().map(|(_, n)| n).sum();
        assert_eq!(total, perft(&position, 2));
    }
}
