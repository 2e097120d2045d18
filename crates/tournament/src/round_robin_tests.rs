use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn roster(names: &[&str]) -> Vec<AgentStanding> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| AgentStanding::new(*name, 1500 - i as i32 * 10))
        .collect()
}

fn seating(names: &[&str]) -> RoundRobinState {
    RoundRobinState {
        seating: names.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn test_first_round_four_players() {
    let state = seating(&["A", "B", "C", "D"]);
    let result = RoundRobin.generate_pairings(&[], &[], 1, &state);

    assert_eq!(result.pairings, vec![Pairing::new("A", "D"), Pairing::new("B", "C")]);
    assert!(result.byes.is_empty());
}

#[test]
fn test_odd_count_gets_one_bye_per_round() {
    let state = seating(&["A", "B", "C", "D", "E"]);
    let mut bye_holders = HashSet::new();

    for round in 1..=5 {
        let result = RoundRobin.generate_pairings(&[], &[], round, &state);
        assert_eq!(result.pairings.len(), 2);
        assert_eq!(result.byes.len(), 1);
        bye_holders.insert(result.byes[0].clone());
    }
    // Everyone sits out exactly once per cycle
    assert_eq!(bye_holders.len(), 5);
}

#[test]
fn test_repeated_pairing_is_dropped() {
    let state = seating(&["A", "B", "C", "D"]);
    let earlier = RoundData::new(2, vec![Pairing::new("D", "A")]);

    let result = RoundRobin.generate_pairings(&[], &[earlier], 1, &state);

    assert_eq!(result.pairings, vec![Pairing::new("B", "C")]);
    assert!(result.byes.contains(&"A".to_string()));
    assert!(result.byes.contains(&"D".to_string()));
}

#[test]
fn test_next_cycle_may_repeat_pairings() {
    let state = seating(&["A", "B", "C", "D"]);
    let first = RoundData::new(1, vec![Pairing::new("A", "D"), Pairing::new("B", "C")]);

    // Round 4 starts a second cycle with the same pairings as round 1
    let result = RoundRobin.generate_pairings(&[], &[first], 4, &state);
    assert_eq!(result.pairings.len(), 2);
}

#[test]
fn test_scoring() {
    let standings = roster(&["A", "B", "C", "D"]);
    let state = seating(&["A", "B", "C", "D"]);
    let results = vec![
        MatchResult::win("m1", "A", "D"),
        MatchResult::draw("m2", "B", "C"),
    ];

    let transition = RoundRobin.update_standings(&standings, &results, &state);
    let points: Vec<i32> = transition
        .standings
        .iter()
        .map(|s| s.tournament_points)
        .collect();

    assert_eq!(points, vec![3, 1, 1, 0]);
    assert!(transition.skipped.is_empty());
}

#[test]
fn test_unknown_player_is_skipped() {
    let standings = roster(&["A", "B"]);
    let state = seating(&["A", "B"]);
    let results = vec![MatchResult::win("m1", "A", "Z")];

    let transition = RoundRobin.update_standings(&standings, &results, &state);

    assert_eq!(transition.standings, standings);
    assert_eq!(transition.skipped[0].reason, MissReason::UnknownPlayer);
}

#[test]
fn test_head_to_head_breaks_points_tie() {
    // C has the higher Elo but lost to B directly
    let mut standings = roster(&["A", "B", "C"]);
    standings[1].elo = 1400;
    standings[2].elo = 1700;
    standings[1].tournament_points = 3;
    standings[2].tournament_points = 3;
    let rounds = vec![RoundData {
        round: 1,
        pairings: vec![Pairing::new("B", "C")],
        results: vec![MatchResult::win("m1", "B", "C")],
        completed: true,
    }];

    let ranked = RoundRobin.final_rankings(&standings, &rounds, &seating(&["A", "B", "C"]));
    let order: Vec<&str> = ranked.iter().map(|s| s.address.as_str()).collect();

    assert_eq!(order, vec!["B", "C", "A"]);
}

#[test]
fn test_elo_breaks_remaining_ties() {
    let mut standings = roster(&["A", "B"]);
    standings[0].elo = 1200;
    standings[1].elo = 1600;

    let ranked = RoundRobin.final_rankings(&standings, &[], &seating(&["A", "B"]));
    assert_eq!(ranked[0].address, "B");
}

#[test]
fn test_total_rounds() {
    let config = FormatConfig::default();
    assert_eq!(RoundRobin.total_rounds(4, &config), 3);
    assert_eq!(RoundRobin.total_rounds(5, &config), 5);
    assert_eq!(RoundRobin.total_rounds(1, &config), 0);
}

#[test]
fn test_complete_after_cycle() {
    let standings = roster(&["A", "B", "C", "D"]);
    let mut rng = StdRng::seed_from_u64(7);
    let state = RoundRobin
        .initialize(&standings, &FormatConfig::default(), &mut rng)
        .unwrap();

    let mut rounds = Vec::new();
    for round in 1..=3 {
        assert!(!RoundRobin.is_complete(&standings, &rounds, &state));
        let pairing = RoundRobin.generate_pairings(&standings, &rounds, round, &state);
        let mut data = RoundData::new(round, pairing.pairings);
        data.completed = true;
        rounds.push(data);
    }
    assert!(RoundRobin.is_complete(&standings, &rounds, &state));
}

#[test]
fn test_duplicate_roster_rejected() {
    let standings = roster(&["A", "B", "A"]);
    let mut rng = StdRng::seed_from_u64(7);
    let err = RoundRobin
        .initialize(&standings, &FormatConfig::default(), &mut rng)
        .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateParticipant(a) if a == "A"));
}
