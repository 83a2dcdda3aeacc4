//! The rule engine: legality, special cards, runs, and turn order.
//!
//! Everything here is a pure function of a [`Table`] and an action. The
//! room actor owns the live table and swaps in whatever
//! [`apply_play`] hands back.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, Rank, RulesError, Stage, Table};

/// Matching plays in a row that blow up the pile.
pub const RUN_TO_DETONATE: u8 = 4;

/// Why a pile was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detonation {
    /// A `10` was played.
    Ten,
    /// Four matching plays in a row, counting mirrors.
    FourOfAKind,
}

/// Side effects of a transition that the room should announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayEvent {
    /// The pile was destroyed. The acting player keeps the turn unless
    /// that was their last card.
    Detonated { player: PlayerId, cause: Detonation },
    /// The play was illegal and the player took the pile into their hand.
    PickedUp { player: PlayerId, cards: usize },
    /// The player moved on to a later pool, or ran out of cards.
    StageAdvanced { player: PlayerId, stage: Stage },
}

/// Whether `rank` may be played on a pile whose value is `pile_value`.
///
/// `2`, `3` and `10` can always be played. Anything else must meet or
/// beat the pile.
pub fn can_play(rank: Rank, pile_value: Option<u8>) -> bool {
    match (rank.strength(), pile_value) {
        (None, _) | (_, None) => true,
        (Some(strength), Some(value)) => strength >= value,
    }
}

/// Applies `player` playing one `rank` to `table`.
///
/// Returns the resulting table and the events it produced; `table` itself
/// is left alone. An `Err` means the action doesn't apply (wrong player,
/// card not held) and nothing should change.
pub fn apply_play(
    table: &Table,
    player: PlayerId,
    rank: Rank,
) -> Result<(Table, Vec<PlayEvent>), RulesError> {
    let seat = table.turn_index;
    let actor = table
        .players
        .get(seat)
        .filter(|p| p.id == player)
        .ok_or(RulesError::NotYourTurn(player))?;

    let stage = actor.stage();
    let pool = actor.pool(stage).ok_or(RulesError::PlayerOut(player))?;
    if !pool.contains(rank) {
        return Err(RulesError::CardNotInPool {
            player,
            rank,
            stage,
        });
    }

    let mut next = table.clone();
    let mut events = Vec::new();

    if !can_play(rank, next.pile_value) {
        let pile = std::mem::take(&mut next.pile);
        events.push(PlayEvent::PickedUp {
            player,
            cards: pile.len(),
        });
        next.players[seat].hand.extend(pile);
        next.reset_counters();
        return Ok((next, events));
    }

    if let Some(pool) = next.players[seat].pool_mut(stage) {
        pool.take(rank);
    }
    next.pile.push(rank);

    match rank {
        Rank::Ten => {
            detonate(&mut next, seat, player, Detonation::Ten, &mut events);
            return Ok((next, events));
        }
        Rank::Two => {
            next.pile_value = None;
            next.run_count = 1;
        }
        Rank::Three => {
            if next.last_normal_rank.is_some() {
                next.run_count += 1;
            }
        }
        normal => {
            next.run_count = if next.last_normal_rank == Some(normal) {
                next.run_count + 1
            } else {
                1
            };
            next.pile_value = normal.strength();
            next.last_normal_rank = Some(normal);
        }
    }

    if next.run_count >= RUN_TO_DETONATE {
        detonate(
            &mut next,
            seat,
            player,
            Detonation::FourOfAKind,
            &mut events,
        );
        return Ok((next, events));
    }

    let after = next.players[seat].stage();
    if after != stage {
        events.push(PlayEvent::StageAdvanced {
            player,
            stage: after,
        });
    }
    next.advance_turn();
    Ok((next, events))
}

/// Clears the pile. The detonating player keeps the turn unless that
/// play was their last card. An out player keeping the turn could never
/// play again and would stall the room, so the turn moves on through
/// [`Table::advance_turn`].
fn detonate(
    table: &mut Table,
    seat: usize,
    player: PlayerId,
    cause: Detonation,
    events: &mut Vec<PlayEvent>,
) {
    table.detonate();
    events.push(PlayEvent::Detonated { player, cause });
    if table.players[seat].is_out() {
        events.push(PlayEvent::StageAdvanced {
            player,
            stage: Stage::Out,
        });
        table.advance_turn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardPool, DECK_SIZE, Deck, Player};

    use Rank::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    fn player(id: u64, hand: &[Rank], up: &[Rank], down: &[Rank]) -> Player {
        Player {
            id: pid(id),
            name: format!("p{id}"),
            hand: CardPool::new(hand.to_vec()),
            face_up: CardPool::new(up.to_vec()),
            face_down: CardPool::new(down.to_vec()),
        }
    }

    /// A table with no deck and the given players; nothing has been
    /// played yet.
    fn table(players: Vec<Player>) -> Table {
        Table {
            players,
            deck: Deck::default(),
            pool_size: 3,
            pile: Vec::new(),
            pile_value: None,
            run_count: 0,
            last_normal_rank: None,
            turn_index: 0,
            discarded: 0,
        }
    }

    fn play(table: &Table, id: u64, rank: Rank) -> (Table, Vec<PlayEvent>) {
        apply_play(table, pid(id), rank).expect("play should apply")
    }

    fn bombed(events: &[PlayEvent]) -> bool {
        events
            .iter()
            .any(|e| matches!(e, PlayEvent::Detonated { .. }))
    }

    // =====================================================================
    // can_play
    // =====================================================================

    #[test]
    fn test_can_play_specials_always() {
        for rank in [Two, Three, Ten] {
            assert!(can_play(rank, None));
            assert!(can_play(rank, Some(14)));
        }
    }

    #[test]
    fn test_can_play_compares_strength() {
        for rank in Rank::ALL.into_iter().filter(|r| !r.is_special()) {
            assert!(can_play(rank, None), "{rank} on empty pile");
            for value in 4..=14 {
                let strength = rank.strength().unwrap();
                assert_eq!(can_play(rank, Some(value)), strength >= value);
            }
        }
    }

    #[test]
    fn test_can_play_equal_strength_is_legal() {
        assert!(can_play(Seven, Some(7)));
        assert!(!can_play(Six, Some(7)));
        assert!(can_play(Jack, Some(9)));
    }

    // =====================================================================
    // Rejections
    // =====================================================================

    #[test]
    fn test_not_your_turn_is_rejected() {
        let t = table(vec![
            player(1, &[Seven], &[], &[]),
            player(2, &[Seven], &[], &[]),
        ]);
        assert_eq!(
            apply_play(&t, pid(2), Seven).unwrap_err(),
            RulesError::NotYourTurn(pid(2))
        );
    }

    #[test]
    fn test_stranger_is_rejected() {
        let t = table(vec![player(1, &[Seven], &[], &[])]);
        assert!(matches!(
            apply_play(&t, pid(9), Seven),
            Err(RulesError::NotYourTurn(_))
        ));
    }

    #[test]
    fn test_card_not_in_hand_is_rejected() {
        let t = table(vec![player(1, &[Seven], &[Ace], &[])]);
        let err = apply_play(&t, pid(1), Ace).unwrap_err();
        assert_eq!(
            err,
            RulesError::CardNotInPool {
                player: pid(1),
                rank: Ace,
                stage: Stage::Hand
            }
        );
        assert!(err.is_invalid_action());
    }

    #[test]
    fn test_out_player_is_rejected() {
        let t = table(vec![player(1, &[], &[], &[])]);
        assert_eq!(
            apply_play(&t, pid(1), Ace).unwrap_err(),
            RulesError::PlayerOut(pid(1))
        );
    }

    #[test]
    fn test_rejection_leaves_input_untouched() {
        let t = table(vec![player(1, &[Seven], &[], &[])]);
        let before = t.clone();
        let _ = apply_play(&t, pid(1), King);
        assert_eq!(t, before);
    }

    // =====================================================================
    // Normal plays
    // =====================================================================

    #[test]
    fn test_seven_then_five_picks_up() {
        let t = table(vec![
            player(1, &[Seven, Nine], &[], &[]),
            player(2, &[Five, Eight], &[Ace], &[]),
        ]);

        let (t, events) = play(&t, 1, Seven);
        assert!(events.is_empty());
        assert_eq!(t.pile_value(), Some(7));
        assert_eq!(t.run_count(), 1);
        assert_eq!(t.last_normal_rank(), Some(Seven));
        assert_eq!(t.turn_index(), 1);

        let (t, events) = play(&t, 2, Five);
        assert_eq!(
            events,
            vec![PlayEvent::PickedUp {
                player: pid(2),
                cards: 1
            }]
        );
        assert!(t.pile().is_empty());
        assert_eq!(t.pile_value(), None);
        assert_eq!(t.run_count(), 0);
        assert_eq!(t.last_normal_rank(), None);
        assert_eq!(t.turn_index(), 1, "pickup keeps the turn");
        let p2 = &t.players()[1];
        assert_eq!(p2.stage(), Stage::Hand);
        assert_eq!(p2.hand.count(Five), 1, "attempted card is kept");
        assert_eq!(p2.hand.count(Seven), 1, "pile went into the hand");
    }

    #[test]
    fn test_pickup_from_face_up_returns_to_hand() {
        let t = table(vec![
            player(1, &[Nine], &[], &[]),
            player(2, &[], &[Four, Ace], &[]),
        ]);
        let (t, _) = play(&t, 1, Nine);
        assert_eq!(t.players()[1].stage(), Stage::FaceUp);

        let (t, _) = play(&t, 2, Four);

        let p2 = &t.players()[1];
        assert_eq!(p2.stage(), Stage::Hand);
        assert_eq!(p2.hand.cards(), &[Nine]);
        assert_eq!(p2.face_up.count(Four), 1);
        assert_eq!(t.turn_index(), 1);
    }

    #[test]
    fn test_hand_of_three_fours_runs_to_three_then_face_up() {
        let t = table(vec![player(1, &[Four, Four, Four], &[King], &[Ace])]);

        let (t, _) = play(&t, 1, Four);
        let (t, _) = play(&t, 1, Four);
        let (t, events) = play(&t, 1, Four);

        assert!(!bombed(&events));
        assert_eq!(t.run_count(), 3);
        assert_eq!(t.pile().len(), 3);
        assert_eq!(t.players()[0].stage(), Stage::FaceUp);
        assert_eq!(
            events,
            vec![PlayEvent::StageAdvanced {
                player: pid(1),
                stage: Stage::FaceUp
            }]
        );
    }

    #[test]
    fn test_hand_of_three_fours_alone_goes_out() {
        let t = table(vec![player(1, &[Four, Four, Four], &[], &[])]);
        let (t, _) = play(&t, 1, Four);
        let (t, _) = play(&t, 1, Four);
        let (t, _) = play(&t, 1, Four);
        assert_eq!(t.run_count(), 3);
        assert!(t.players()[0].is_out());
    }

    #[test]
    fn test_emptied_hand_skips_empty_face_up() {
        let t = table(vec![
            player(1, &[Six], &[], &[Ace]),
            player(2, &[Nine], &[], &[]),
        ]);
        let (t, events) = play(&t, 1, Six);
        assert_eq!(
            events,
            vec![PlayEvent::StageAdvanced {
                player: pid(1),
                stage: Stage::FaceDown
            }]
        );
        assert_eq!(t.players()[0].stage(), Stage::FaceDown);
    }

    #[test]
    fn test_plays_from_face_down_once_others_empty() {
        let t = table(vec![
            player(1, &[], &[], &[Jack, Queen]),
            player(2, &[Nine], &[], &[]),
        ]);
        let (t, _) = play(&t, 1, Queen);
        assert_eq!(t.players()[0].face_down.cards(), &[Jack]);
        assert_eq!(t.pile_value(), Some(12));
    }

    #[test]
    fn test_different_rank_resets_run() {
        let t = table(vec![player(1, &[Eight, Eight, Nine], &[], &[])]);
        let (t, _) = play(&t, 1, Eight);
        let (t, _) = play(&t, 1, Eight);
        assert_eq!(t.run_count(), 2);
        let (t, _) = play(&t, 1, Nine);
        assert_eq!(t.run_count(), 1);
        assert_eq!(t.last_normal_rank(), Some(Nine));
    }

    // =====================================================================
    // Special cards
    // =====================================================================

    #[test]
    fn test_two_resets_pile_value() {
        let t = table(vec![
            player(1, &[King], &[], &[]),
            player(2, &[Two, Four], &[], &[]),
            player(3, &[Four, Five], &[], &[]),
        ]);
        let (t, _) = play(&t, 1, King);
        let (t, _) = play(&t, 2, Two);
        assert_eq!(t.pile_value(), None);
        assert_eq!(t.run_count(), 1);
        assert_eq!(t.last_normal_rank(), Some(King), "2 leaves the rank");
        assert_eq!(t.turn_index(), 2);

        let (t, events) = play(&t, 3, Four);
        assert!(events.is_empty(), "4 beats a reset pile");
        assert_eq!(t.pile_value(), Some(4));
    }

    #[test]
    fn test_three_mirrors_without_changing_value() {
        let t = table(vec![
            player(1, &[Nine], &[], &[]),
            player(2, &[Three, Four], &[], &[]),
        ]);
        let (t, _) = play(&t, 1, Nine);
        let (t, _) = play(&t, 2, Three);
        assert_eq!(t.pile_value(), Some(9));
        assert_eq!(t.run_count(), 2);
        assert_eq!(t.last_normal_rank(), Some(Nine));
    }

    #[test]
    fn test_three_on_fresh_pile_does_not_count() {
        let t = table(vec![player(1, &[Three, Five], &[], &[])]);
        let (t, _) = play(&t, 1, Three);
        assert_eq!(t.run_count(), 0);
        assert_eq!(t.pile_value(), None);
        assert_eq!(t.pile(), &[Three]);
    }

    #[test]
    fn test_ten_detonates_and_keeps_turn() {
        let t = table(vec![
            player(1, &[Ace], &[], &[]),
            player(2, &[Ten, Six], &[], &[]),
        ]);
        let (t, _) = play(&t, 1, Ace);
        let (t, events) = play(&t, 2, Ten);

        assert_eq!(
            events,
            vec![PlayEvent::Detonated {
                player: pid(2),
                cause: Detonation::Ten
            }]
        );
        assert!(t.pile().is_empty());
        assert_eq!(t.pile_value(), None);
        assert_eq!(t.run_count(), 0);
        assert_eq!(t.last_normal_rank(), None);
        assert_eq!(t.turn_index(), 1);
        assert_eq!(t.discarded(), 2);
    }

    #[test]
    fn test_ten_ignores_run_count() {
        let t = table(vec![player(1, &[Five, Five, Five, Ten, Six], &[], &[])]);
        let (t, _) = play(&t, 1, Five);
        let (t, _) = play(&t, 1, Five);
        let (t, _) = play(&t, 1, Five);
        assert_eq!(t.run_count(), 3);
        let (t, events) = play(&t, 1, Ten);
        assert!(bombed(&events));
        assert_eq!(t.run_count(), 0);
        assert_eq!(t.discarded(), 4);
    }

    #[test]
    fn test_four_kings_in_a_row_detonate() {
        let t = table(vec![
            player(1, &[King, Four], &[], &[]),
            player(2, &[King, Four], &[], &[]),
            player(3, &[King, Four], &[], &[]),
            player(4, &[King, Four], &[], &[]),
        ]);
        let (t, _) = play(&t, 1, King);
        let (t, _) = play(&t, 2, King);
        let (t, _) = play(&t, 3, King);
        assert_eq!(t.run_count(), 3);
        assert_eq!(t.turn_index(), 3);

        let (t, events) = play(&t, 4, King);

        assert_eq!(
            events,
            vec![PlayEvent::Detonated {
                player: pid(4),
                cause: Detonation::FourOfAKind
            }]
        );
        assert!(t.pile().is_empty());
        assert_eq!(t.pile_value(), None);
        assert_eq!(t.run_count(), 0);
        assert_eq!(t.last_normal_rank(), None);
        assert_eq!(t.turn_index(), 3, "fourth player keeps the turn");
    }

    #[test]
    fn test_mirrors_extend_run_to_detonation() {
        let t = table(vec![
            player(1, &[Jack, Three], &[], &[]),
            player(2, &[Three, Four], &[], &[]),
        ]);
        let (t, _) = play(&t, 1, Jack);
        let (t, _) = play(&t, 2, Three);
        let (t, _) = play(&t, 1, Three);
        assert_eq!(t.run_count(), 3);
        assert_eq!(t.pile_value(), Some(11));

        // Player 2 has only a 4 left: illegal on a jack, so they pick up.
        let (t, events) = play(&t, 2, Four);
        assert!(matches!(events[0], PlayEvent::PickedUp { cards: 3, .. }));
        assert_eq!(t.run_count(), 0);
    }

    #[test]
    fn test_rank_then_three_mirrors_detonates() {
        let t = table(vec![player(1, &[Six, Three, Three, Three, Nine], &[], &[])]);
        let (t, _) = play(&t, 1, Six);
        let (t, _) = play(&t, 1, Three);
        let (t, _) = play(&t, 1, Three);
        let (t, events) = play(&t, 1, Three);
        assert_eq!(
            events,
            vec![PlayEvent::Detonated {
                player: pid(1),
                cause: Detonation::FourOfAKind
            }]
        );
        assert!(t.pile().is_empty());
    }

    #[test]
    fn test_last_card_ten_passes_turn() {
        let t = table(vec![
            player(1, &[Ten], &[], &[]),
            player(2, &[Nine], &[], &[]),
        ]);
        let (t, events) = play(&t, 1, Ten);
        assert!(bombed(&events));
        assert!(t.players()[0].is_out());
        assert_eq!(t.turn_index(), 1);
    }

    // =====================================================================
    // Turn order
    // =====================================================================

    #[test]
    fn test_turn_wraps_around() {
        let t = table(vec![
            player(1, &[Four, Six], &[], &[]),
            player(2, &[Five], &[], &[]),
        ]);
        let (t, _) = play(&t, 1, Four);
        let (t, _) = play(&t, 2, Five);
        assert_eq!(t.turn_index(), 0);
    }

    #[test]
    fn test_turn_skips_player_who_is_out() {
        let t = table(vec![
            player(1, &[Four, Six], &[], &[]),
            player(2, &[], &[], &[]),
            player(3, &[Five], &[], &[]),
        ]);
        let (t, _) = play(&t, 1, Four);
        assert_eq!(t.turn_index(), 2);
    }

    // =====================================================================
    // Conservation
    // =====================================================================

    #[test]
    fn test_cards_are_conserved_through_a_game() {
        let mut t = Table::new(Deck::standard(), 3, pid(1), "p1").unwrap();
        t.seat(pid(2), "p2").unwrap();
        t.seat(pid(3), "p3").unwrap();
        assert_eq!(t.accounted_cards(), DECK_SIZE);

        // Each turn, the holder plays their first playable card, or the
        // first card in their pool to force a pickup.
        for _ in 0..200 {
            let Some(holder) = t.turn_holder() else { break };
            let Some(pool) = holder.pool(holder.stage()) else { break };
            let rank = pool
                .cards()
                .iter()
                .copied()
                .find(|r| can_play(*r, t.pile_value()))
                .unwrap_or(pool.cards()[0]);
            let id = holder.id;
            let (next, _) = apply_play(&t, id, rank).unwrap();
            t = next;
            assert_eq!(t.accounted_cards(), DECK_SIZE);
        }
    }
}
