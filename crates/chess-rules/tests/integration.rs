//! Cross-module invariants: generation, application, notation and replay
//! working against each other.

use chess_core::{CastlingSide, Color, Piece, Role, Square};
use chess_rules::{chess960_start, Game, GameResult, Position, Reader, San, Variant};

const SAMPLE_FENS: [&str; 5] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 0 1",
];

#[test]
fn legal_moves_never_leave_own_king_in_check() {
    for fen in SAMPLE_FENS {
        let pos = Position::from_fen(fen).unwrap();
        let us = pos.turn;
        for m in &pos.legal_moves() {
            let after = pos.play(m);
            assert!(
                !after.board.check_of(us),
                "{} leaves the king in check in {}",
                m.to_uci(false),
                fen
            );
            assert!(
                after.board.is_valid(true),
                "{} broke the board in {}",
                m.to_uci(false),
                fen
            );
        }
    }
}

#[test]
fn fen_roundtrip_is_canonical() {
    for fen in SAMPLE_FENS {
        let pos = Position::from_fen(fen).unwrap();
        let emitted = pos.to_fen();
        assert_eq!(emitted, fen);
        assert_eq!(Position::from_fen(&emitted).unwrap(), pos);
    }
}

#[test]
fn san_roundtrip_along_a_game() {
    let mut pos = Position::startpos();
    for uci in [
        "e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6", "b1c3", "a7a6",
    ] {
        for m in &pos.legal_moves() {
            let san = chess_rules::to_san(&pos, m);
            let resolved = San::parse(&san).unwrap().to_move(&pos).unwrap();
            assert_eq!(resolved, *m, "roundtrip failed for {}", san);
        }
        let m = pos.parse_uci(uci).unwrap();
        pos = pos.play(&m);
    }
}

#[test]
fn castling_rights_are_monotonic() {
    let reading = Reader::full(
        "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6 5. O-O Be7 6. Re1 b5 7. Bb3 d6 \
         8. c3 O-O 9. h3 Na5 10. Bc2 c5 *",
    )
    .unwrap();
    assert!(reading.is_complete());

    let replay = reading.replay();
    let mut rights = replay.initial.castling.squares();
    for step in &replay.steps {
        let next = step.position.castling.squares();
        assert_eq!(next & rights, next, "castling rights were added back");
        rights = next;
    }
    // Both sides castled: no rights remain.
    assert!(rights.is_empty());
}

#[test]
fn en_passant_scenarios_from_fen() {
    let pos = Position::from_fen("4k3/8/8/pP6/8/8/8/4K3 w - a6 0 1").unwrap();
    let ep = pos
        .legal_moves()
        .into_iter()
        .find(|m| m.capture().is_some() && m.to() == Square::from_algebraic("a6").unwrap());
    assert!(ep.is_some(), "b5xa6 e.p. must be available");

    let pinned = Position::from_fen("4k3/8/8/KPp4r/8/8/8/8 w - c6 0 1").unwrap();
    assert!(
        pinned
            .legal_moves()
            .into_iter()
            .all(|m| m.to() != Square::from_algebraic("c6").unwrap()),
        "b5xc6 e.p. would expose the king"
    );
}

#[test]
fn chess960_castle_lands_on_standard_squares() {
    let pos = Position::from_fen_as(
        "bbqnnrkr/pppppppp/8/8/8/8/PPPPPPPP/BBQNNRKR w HFhf - 0 1",
        Variant::Chess960,
    )
    .unwrap();

    // Vacate e1/e8 with the knights, then clear f1/f8 so the h-rooks have
    // their landing square.
    let mut pos = pos;
    for san in ["d4", "d5", "Nd3", "Nd6", "Re1", "Re8"] {
        let m = San::parse(san).unwrap().to_move(&pos).unwrap();
        pos = pos.play(&m);
    }

    let castle = San::parse("O-O").unwrap().to_move(&pos).unwrap();
    assert_eq!(castle.castling_side(), Some(CastlingSide::KingSide));

    let after = pos.play(&castle);
    assert_eq!(
        after.board.piece_at(Square::G1),
        Some(Piece::new(Color::White, Role::King))
    );
    assert_eq!(
        after.board.piece_at(Square::F1),
        Some(Piece::new(Color::White, Role::Rook))
    );
}

#[test]
fn chess960_all_numbers_produce_valid_starts() {
    for n in 0..960 {
        let pos = chess960_start(n).unwrap();
        assert!(pos.board.is_valid(true), "number {} is broken", n);
        assert_eq!(pos.castling.squares().count(), 4);
        assert!(pos.legal_moves().len() >= 18, "number {}", n);
    }
}

#[test]
fn full_variant_games_replay() {
    // An atomic miniature: 1. Nf3 d5 2. Ne5 and the f7 explosion wins.
    let pgn = "[Variant \"Atomic\"]\n\n1. Nf3 d5 2. Ne5 e6 3. Nxf7 *";
    let reading = Reader::full(pgn).unwrap();
    assert!(reading.is_complete(), "{:?}", reading);
    let last = reading.replay().last_position();
    assert_eq!(last.outcome(), Some(GameResult::WhiteWins));
    assert!(last.board.pieces(Color::Black, Role::King).is_empty());
}

#[test]
fn game_and_replay_agree_on_fools_mate() {
    let mut game = Game::new();
    for san in ["f3", "e5", "g4", "Qh4#"] {
        game.play_san(san).unwrap();
    }

    let reading = Reader::full("1. f3 e5 2. g4 Qh4# 0-1").unwrap();
    assert_eq!(
        reading.replay().last_position().to_fen(),
        game.position().to_fen()
    );
    assert_eq!(game.result(), Some(GameResult::BlackWins));
}
