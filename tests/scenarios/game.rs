//! Test: full games through the battle session

use crate::helpers::*;
use pallet::game::{Action, Battle, GameError, Player, Position};

#[test]
fn test_scripted_game_is_won_by_a() {
    let battle = play(&WINNING_GAME);

    assert_eq!(battle.winner(), Some(Player::new(0)));
    assert_eq!(battle.turn(), WINNING_GAME.len());
    assert!(battle.display_board().ends_with("winner: A\n"));

    let before_last = play(&WINNING_GAME[..WINNING_GAME.len() - 1]);
    assert_eq!(before_last.winner(), None);
    assert_eq!(before_last.current_player(), Player::new(0));
}

#[test]
fn test_no_moves_after_the_game_is_over() {
    let mut battle = play(&WINNING_GAME);
    let action: Action = "b4:up".parse().unwrap();

    assert_eq!(battle.accept(&action), Err(GameError::GameIsOver));
    assert_eq!(battle.turn(), WINNING_GAME.len());
}

#[test]
fn test_undo_reopens_a_won_game() {
    let mut battle = play(&WINNING_GAME);
    assert!(battle.undo());
    assert_eq!(battle.winner(), None);
    assert_eq!(battle.current_player(), Player::new(0));

    let last: Action = WINNING_GAME[WINNING_GAME.len() - 1].parse().unwrap();
    battle.accept(&last).unwrap();
    assert_eq!(battle.winner(), Some(Player::new(0)));
}

#[test]
fn test_undo_stops_at_initial_state() {
    let mut battle = play(&["a1:down", "a6:up"]);
    assert!(battle.undo());
    assert!(battle.undo());
    assert!(!battle.undo());
    assert_eq!(battle.turn(), 0);
    assert_eq!(battle.display_board(), Battle::new().display_board());
}

#[test]
fn test_moving_the_opponents_piece_is_rejected() {
    let mut battle = Battle::new();
    let action: Action = "a6:up".parse().unwrap();

    assert_eq!(battle.accept(&action), Err(GameError::NotOwnedBy(Player::new(0))));
    assert_eq!(battle.turn(), 0);
    assert_eq!(battle.current_player(), Player::new(0));
}

#[test]
fn test_moving_off_the_board_is_rejected() {
    let mut battle = Battle::new();
    let action: Action = "a1:up".parse().unwrap();

    assert!(battle.accept(&action).is_err());
    assert_eq!(battle.turn(), 0);
}

#[test]
fn test_turns_alternate() {
    let battle = play(&["c1:down", "c6:up", "c2:down"]);
    assert_eq!(battle.current_player(), Player::new(1));
    assert!(battle.display_board().ends_with("turn 4: B to move\n"));

    let board = &battle.game().board;
    let c3: Position = "c3".parse().unwrap();
    assert_eq!(board.cell(&c3).unwrap().owner(), Some(Player::new(0)));
}
