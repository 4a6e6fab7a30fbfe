mod common;

use std::thread;

use common::ToyGame;
use policy_table::games::kuhn::{BET, PASS};
use policy_table::{
    Game, InvalidArgument, KuhnPoker, MatchingPennies, Policy, PolicyError, PolicyTable, State,
};

#[test]
fn probabilities_cover_the_legal_actions() -> Result<(), PolicyError> {
    let mut table = PolicyTable::new(&KuhnPoker)?;
    let state = KuhnPoker.new_initial_state().child(1).child(2).child(PASS);
    table.row_mut("2p")?.copy_from_slice(&[0.1, 0.9]);
    let probabilities = table.probabilities_for(&state, None)?;
    assert_eq!(probabilities.len(), 2);
    assert_eq!(probabilities[&PASS], 0.1);
    assert_eq!(probabilities[&BET], 0.9);
    assert_eq!(table.action_probabilities(&state, Some(1))?, probabilities);
    Ok(())
}

#[test]
fn unregistered_states_are_key_not_found() -> Result<(), PolicyError> {
    let mut table = PolicyTable::builder(&KuhnPoker).with_players([1]).build()?;
    let opening = KuhnPoker.new_initial_state().child(0).child(1);
    assert_eq!(
        table.probabilities_for(&opening, None),
        Err(PolicyError::KeyNotFound("0".to_string()))
    );
    assert_eq!(
        table.index_of(&opening),
        Err(PolicyError::KeyNotFound("0".to_string()))
    );
    // Player 1 has no decision at the opening, so no row exists for it either.
    assert!(matches!(
        table.probabilities_for(&opening, Some(1)),
        Err(PolicyError::KeyNotFound(_))
    ));
    assert!(matches!(table.row_mut("nope"), Err(PolicyError::KeyNotFound(_))));
    Ok(())
}

#[test]
fn players_outside_the_game_are_rejected() -> Result<(), PolicyError> {
    let table = PolicyTable::new(&KuhnPoker)?;
    let state = KuhnPoker.new_initial_state().child(0).child(1);
    assert_eq!(
        table.probabilities_for(&state, Some(2)),
        Err(PolicyError::from(InvalidArgument::PlayerOutOfRange {
            player: 2,
            num_players: 2,
        }))
    );
    Ok(())
}

#[test]
fn simultaneous_lookups_need_a_player() -> Result<(), PolicyError> {
    let table = PolicyTable::new(&MatchingPennies)?;
    let root = MatchingPennies.new_initial_state();
    assert_eq!(
        table.probabilities_for(&root, None),
        Err(PolicyError::from(InvalidArgument::PlayerRequired))
    );
    let second = table.probabilities_for(&root, Some(1))?;
    assert_eq!(second.into_iter().collect::<Vec<_>>(), vec![(0, 0.5), (1, 0.5)]);
    Ok(())
}

#[test]
fn row_writes_are_visible_through_lookups() -> Result<(), PolicyError> {
    let mut table = PolicyTable::new(&ToyGame::new())?;
    table.row_mut("p0 root")?[2] = 0.0;
    let root = ToyGame::new().new_initial_state();
    let index = table.index_of(&root)?;
    assert_eq!(table.row_at(index).map(|row| row[2]), Some(0.0));
    assert_eq!(table.probabilities_for(&root, None)?[&2], 0.0);
    Ok(())
}

#[test]
fn duplicates_without_probabilities_are_independent() -> Result<(), PolicyError> {
    let table = PolicyTable::new(&ToyGame::new())?;
    let mut copy = table.duplicate(false);
    assert!(copy.shares_layout(&table));
    copy.row_mut("p0 root")?.copy_from_slice(&[0.2, 0.3, 0.5]);
    let third = 1.0 / 3.0;
    assert_eq!(table.row("p0 root")?, &[third, third, third]);
    assert_eq!(copy.row("p0 root")?, &[0.2, 0.3, 0.5]);
    Ok(())
}

#[test]
fn duplicates_with_probabilities_start_equal() -> Result<(), PolicyError> {
    let mut table = PolicyTable::new(&KuhnPoker)?;
    table.row_mut("1b")?.copy_from_slice(&[0.0, 1.0]);
    let mut copy = table.duplicate(true);
    assert_eq!(copy.probabilities(), table.probabilities());
    copy.row_mut("1b")?.copy_from_slice(&[1.0, 0.0]);
    assert_eq!(table.row("1b")?, &[0.0, 1.0]);
    assert_eq!(copy.keys(), table.keys());
    Ok(())
}

#[test]
fn duplicates_can_move_to_other_threads() -> Result<(), PolicyError> {
    let table = PolicyTable::new(&KuhnPoker)?;
    let workers: Vec<_> = (0..2)
        .map(|player| {
            let mut copy = table.duplicate(true);
            thread::spawn(move || {
                for index in copy.player_rows(player) {
                    if let Some(row) = copy.row_at_mut(index) {
                        row.copy_from_slice(&[1.0, 0.0]);
                    }
                }
                copy
            })
        })
        .collect();
    for (player, worker) in workers.into_iter().enumerate() {
        let copy = worker.join().expect("worker");
        assert!(copy.shares_layout(&table));
        for index in copy.player_rows(player) {
            assert_eq!(copy.row_at(index), Some(&[1.0, 0.0][..]));
        }
    }
    assert!(table.probabilities().iter().all(|p| *p == 0.5));
    Ok(())
}
