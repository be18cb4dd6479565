use ban_chess::*;
use chess::{parse_square, Side, Square};

fn sq(s: &str) -> Square {
    parse_square(s).unwrap()
}

mod opening {
    use super::*;

    #[test]
    fn banned_opening_move_is_rejected_and_alternative_accepted() {
        let mut engine = BanChessEngine::new();
        assert_eq!(
            engine.current_phase(),
            GamePhase::AwaitingBan {
                banner: Side::Black
            }
        );

        engine.submit_ban(sq("e2"), sq("e4")).unwrap();
        let before = engine.snapshot();

        let err = engine.submit_move(sq("e2"), sq("e4"), None).unwrap_err();
        assert!(matches!(err, BanChessError::InvalidMove(_)));
        assert_eq!(engine.snapshot(), before);

        let ply = engine.submit_move(sq("d2"), sq("d4"), None).unwrap();
        assert_eq!(ply.san, "d4");
        assert_eq!(
            ply.ban,
            Some(Ban {
                mv: BannedMove::new(sq("e2"), sq("e4")),
                by: Side::Black
            })
        );
        assert_eq!(
            engine.current_phase(),
            GamePhase::AwaitingBan {
                banner: Side::White
            }
        );
    }

    #[test]
    fn every_opening_move_is_bannable_once() {
        let engine = BanChessEngine::new();
        let bans = engine.effective_legal_bans();
        assert_eq!(bans.len(), 20);
        assert_eq!(engine.effective_legal_moves().len(), 20);
    }

    #[test]
    fn actions_out_of_turn_are_rejected() {
        let mut engine = BanChessEngine::new();
        assert!(matches!(
            engine.submit_move(sq("e2"), sq("e4"), None),
            Err(BanChessError::WrongPhase(_))
        ));

        engine.submit_ban_uci("e2e4").unwrap();
        assert!(matches!(
            engine.submit_ban_uci("d2d4"),
            Err(BanChessError::InvalidBan(_))
        ));
    }
}

mod endings {
    use super::*;

    #[test]
    fn banning_the_only_escape_from_check_is_checkmate() {
        let fen = "R3k3/8/8/2N5/7B/8/8/4K3 b - - 0 1";
        let mut engine = BanChessEngine::from_fen(fen, RuleConfig::default()).unwrap();
        assert!(engine.is_in_check());
        assert_eq!(engine.effective_legal_bans(), vec![BannedMove::new(sq("e8"), sq("f7"))]);

        let phase = engine.submit_ban(sq("e8"), sq("f7")).unwrap();
        assert_eq!(
            phase,
            GamePhase::Ended {
                result: GameResult::WhiteWins,
                reason: EndReason::Checkmate
            }
        );
        assert!(engine.history().is_empty());
        assert!(engine.effective_legal_moves().is_empty());
        assert!(matches!(
            engine.submit_move(sq("e8"), sq("f7"), None),
            Err(BanChessError::WrongPhase(_))
        ));
    }

    #[test]
    fn banning_the_only_move_without_check_is_stalemate() {
        let fen = "k7/2Q5/7p/8/7P/8/8/7K b - - 0 1";
        let mut engine = BanChessEngine::from_fen(fen, RuleConfig::default()).unwrap();
        assert!(!engine.is_in_check());

        let phase = engine.submit_ban_uci("h6h5").unwrap();
        assert_eq!(
            phase,
            GamePhase::Ended {
                result: GameResult::Draw,
                reason: EndReason::Stalemate
            }
        );
    }

    #[test]
    fn resignation_ends_an_ongoing_game_only() {
        let mut engine = BanChessEngine::new();
        engine.resign(Side::Black).unwrap();
        assert_eq!(
            engine.result(),
            Some((GameResult::WhiteWins, EndReason::Resignation))
        );
        assert!(matches!(
            engine.agree_draw(),
            Err(BanChessError::WrongPhase(_))
        ));
    }
}

mod records {
    use super::*;

    #[test]
    fn bans_extracted_in_ply_order() {
        assert_eq!(
            extract_all_bans("1. e4 {banning: e7e5} e6"),
            vec![None, Some(BannedMove::new(sq("e7"), sq("e5")))]
        );
    }

    #[test]
    fn record_built_through_the_service_replays_identically() {
        let svc = GameRecordService::default();
        let mut record = GameRecord::new();
        let actions = [
            PlayerAction::Ban {
                from: sq("e2"),
                to: sq("e4"),
            },
            PlayerAction::Move {
                from: sq("d2"),
                to: sq("d4"),
                promotion: None,
            },
            PlayerAction::Ban {
                from: sq("d7"),
                to: sq("d5"),
            },
            PlayerAction::Move {
                from: sq("g8"),
                to: sq("f6"),
                promotion: None,
            },
            PlayerAction::AgreeDraw,
        ];
        for action in actions {
            record = svc.apply(&record, action).unwrap().0;
        }

        assert_eq!(
            record.movetext,
            "{banning: e2e4} 1. d4 {banning: d7d5} Nf6 {termination: agreement} 1/2-1/2"
        );
        let engine = svc.reconstruct(&record).unwrap();
        assert_eq!(
            engine.result(),
            Some((GameResult::Draw, EndReason::Agreement))
        );
        assert_eq!(svc.serialize(&engine), record);
    }

    #[test]
    fn pgn_export_and_import() {
        let svc = GameRecordService::default();
        let record = svc
            .append_ban(&GameRecord::new(), sq("g1"), sq("f3"))
            .unwrap();
        let (record, _) = svc.append_move(&record, sq("e2"), sq("e4"), None).unwrap();

        let pgn = record.to_pgn();
        let back = GameRecord::from_pgn(&pgn).unwrap();
        assert_eq!(back, record);
        assert_eq!(svc.reconstruct(&back).unwrap().history().len(), 1);
    }

    #[test]
    fn unannotated_movetext_replays_as_plain_chess() {
        let svc = GameRecordService::default();
        let record = GameRecord {
            start_fen: chess::STARTING_FEN.to_string(),
            movetext: "1. f3 e5 2. g4 Qh4#".to_string(),
        };
        let engine = svc.reconstruct(&record).unwrap();
        assert_eq!(
            engine.result(),
            Some((GameResult::BlackWins, EndReason::Checkmate))
        );
        assert!(engine.history().iter().all(|ply| ply.ban.is_none()));
    }
}
