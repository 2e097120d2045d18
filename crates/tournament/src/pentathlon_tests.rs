use super::*;
use crate::types::Pairing;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn roster(n: usize) -> Vec<AgentStanding> {
    (1..=n)
        .map(|i| AgentStanding::new(format!("P{}", i), 1600 - i as i32 * 10))
        .collect()
}

fn setup(n: usize, events: &[&str]) -> (Vec<AgentStanding>, PentathlonState) {
    let standings = roster(n);
    let config = FormatConfig {
        game_type_order: events.iter().map(|e| e.to_string()).collect(),
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(0);
    let state = Pentathlon.initialize(&standings, &config, &mut rng).unwrap();
    (standings, state)
}

/// Every pairing of the round won by the lower-numbered seat
fn play_round(
    standings: &[AgentStanding],
    state: &PentathlonState,
    round: u32,
) -> Transition<PentathlonState> {
    let pairings = Pentathlon.generate_pairings(standings, &[], round, state).pairings;
    let results: Vec<MatchResult> = pairings
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let (winner, loser) = if p.player1 < p.player2 {
                (&p.player1, &p.player2)
            } else {
                (&p.player2, &p.player1)
            };
            MatchResult::win(format!("r{}-m{}", round, i), winner.clone(), loser.clone())
        })
        .collect();
    Pentathlon.update_standings(standings, &results, state)
}

#[test]
fn test_placement_points() {
    assert_eq!(placement_points(1), 5);
    assert_eq!(placement_points(2), 3);
    assert_eq!(placement_points(3), 2);
    assert_eq!(placement_points(4), 1);
    assert_eq!(placement_points(5), 0);
    assert_eq!(placement_points(0), 0);
}

#[test]
fn test_pairings_capped_at_half_the_field() {
    let (standings, state) = setup(4, &["chess"]);
    let result = Pentathlon.generate_pairings(&standings, &[], 1, &state);

    assert_eq!(result.pairings, vec![Pairing::new("P1", "P4"), Pairing::new("P2", "P3")]);
    assert!(result.byes.is_empty());
}

#[test]
fn test_event_advances_only_when_all_matchups_played() {
    let (mut standings, mut state) = setup(4, &["chess", "go"]);

    for round in 1..=2 {
        let t = play_round(&standings, &state, round);
        standings = t.standings;
        state = t.state;
        assert_eq!(state.current_event_index, 0, "round {}", round);
    }

    let t = play_round(&standings, &state, 3);
    assert_eq!(t.state.current_event_index, 1);
    assert!(t.state.played.is_empty());
    // Event wins reset for the next event
    assert!(t.standings.iter().all(|s| s.tournament_points == 0));

    let p1 = &t.state.scores["P1"];
    assert_eq!(p1.event_scores["chess"], 5);
    assert_eq!(p1.event_ranks["chess"], 1);
    assert_eq!(t.state.scores["P4"].event_scores["chess"], 1);
}

#[test]
fn test_replayed_matchup_is_skipped() {
    let (standings, state) = setup(4, &["chess"]);
    let first = Pentathlon.update_standings(&standings, &[MatchResult::win("a", "P1", "P2")], &state);
    let again = Pentathlon.update_standings(
        &first.standings,
        &[MatchResult::win("b", "P2", "P1")],
        &first.state,
    );

    assert_eq!(again.skipped[0].reason, MissReason::MatchupAlreadyPlayed);
    assert_eq!(again.standings[1].tournament_points, 0);
}

#[test]
fn test_points_conserved_and_tournament_completes() {
    let (mut standings, mut state) = setup(4, &["chess", "go", "poker"]);
    let config = FormatConfig {
        game_type_order: state.events.clone(),
        ..Default::default()
    };
    let rounds = Pentathlon.total_rounds(4, &config);
    assert_eq!(rounds, 9);

    for round in 1..=rounds {
        assert!(!Pentathlon.is_complete(&standings, &[], &state));
        let t = play_round(&standings, &state, round);
        assert!(t.skipped.is_empty());
        standings = t.standings;
        state = t.state;
        for scores in state.scores.values() {
            assert_eq!(scores.total_points, scores.event_scores.values().sum::<u32>());
        }
    }

    assert!(Pentathlon.is_complete(&standings, &[], &state));
    assert_eq!(state.scores["P1"].total_points, 15);
    assert_eq!(state.scores["P1"].first_places(), 3);

    let ranked = Pentathlon.final_rankings(&standings, &[], &state);
    let order: Vec<&str> = ranked.iter().map(|s| s.address.as_str()).collect();
    assert_eq!(order, vec!["P1", "P2", "P3", "P4"]);

    // Nothing more is paired once every event is done
    assert!(Pentathlon
        .generate_pairings(&standings, &[], rounds + 1, &state)
        .pairings
        .is_empty());
}

#[test]
fn test_first_places_break_point_ties() {
    let (standings, mut state) = setup(2, &["chess", "go"]);
    // P2 won one event outright, P1 has the same total from seconds
    state.scores.get_mut("P1").unwrap().award("chess", 2, 3);
    state.scores.get_mut("P1").unwrap().award("go", 2, 3);
    state.scores.get_mut("P2").unwrap().award("chess", 1, 5);
    state.scores.get_mut("P2").unwrap().award("go", 5, 1);
    state.current_event_index = 2;

    let ranked = Pentathlon.final_rankings(&standings, &[], &state);
    assert_eq!(ranked[0].address, "P2");
}

#[test]
fn test_single_agent_completes_immediately() {
    let (standings, state) = setup(1, &["chess", "go"]);
    assert!(Pentathlon.is_complete(&standings, &[], &state));
    assert_eq!(state.scores["P1"].total_points, 10);

    // Later updates leave the finished state alone
    let t = Pentathlon.update_standings(&standings, &[], &state);
    assert_eq!(t.state, state);
}

#[test]
fn test_empty_field_completes_immediately() {
    let (standings, state) = setup(0, &["chess", "go", "checkers"]);
    assert!(Pentathlon.is_complete(&standings, &[], &state));
    assert_eq!(state.current_event_index, 3);
}
