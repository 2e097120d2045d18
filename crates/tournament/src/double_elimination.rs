//! Double elimination: a first loss drops a player into the losers
//! bracket, a second loss knocks them out.
//!
//! The two bracket champions meet in a grand final. If the losers-bracket
//! champion wins it, the bracket resets and one more match decides.

use rand::Rng;

use crate::config::{FormatConfig, FormatType};
use crate::error::ConfigError;
use crate::format::{by_points_then_elo, check_setup, elimination_rounds, FormatHandler};
use crate::state::{Bracket, BracketPhase, Finalists};
use crate::types::{
    position_of, AgentStanding, BracketSide, LookupMiss, MatchResult, MissReason, Pairing,
    PairingResult, RoundData, Transition,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleElimination;

fn side_of(standing: &AgentStanding) -> BracketSide {
    standing.bracket_position.unwrap_or(BracketSide::Winners)
}

fn live_in<'a>(standings: &'a [AgentStanding], side: BracketSide) -> Vec<&'a AgentStanding> {
    standings
        .iter()
        .filter(|s| !s.eliminated && side_of(s) == side)
        .collect()
}

/// Sort by points then Elo and pair neighbours; the top seed takes the bye
/// when the count is odd
fn pair_bracket(mut players: Vec<&AgentStanding>, result: &mut PairingResult) {
    players.sort_by(|a, b| by_points_then_elo(a, b));
    let mut rest = players.as_slice();
    if rest.len() % 2 == 1 {
        result.byes.push(rest[0].address.clone());
        rest = &rest[1..];
    }
    for pair in rest.chunks(2) {
        result
            .pairings
            .push(Pairing::new(pair[0].address.clone(), pair[1].address.clone()));
    }
}

/// Move the bracket forward once the bracket populations allow it
fn advance_phase(bracket: &mut Bracket, standings: &[AgentStanding]) {
    if bracket.current_phase >= BracketPhase::GrandFinal {
        return;
    }
    let winners = live_in(standings, BracketSide::Winners);
    let losers = live_in(standings, BracketSide::Losers);

    if winners.len() == 1 && losers.len() == 1 {
        bracket.finalists = Some(Finalists {
            winners_champion: winners[0].address.clone(),
            losers_champion: losers[0].address.clone(),
        });
        bracket.set_phase(BracketPhase::GrandFinal);
        tracing::info!(
            winners_champion = %winners[0].address,
            losers_champion = %losers[0].address,
            "grand final set"
        );
    } else if winners.len() <= 1 && losers.len() > 1 && bracket.current_phase == BracketPhase::Winners {
        bracket.set_phase(BracketPhase::Losers);
        tracing::info!(remaining = losers.len(), "winners bracket decided, playing out losers bracket");
    }
}

impl FormatHandler for DoubleElimination {
    type State = Bracket;

    const FORMAT: FormatType = FormatType::DoubleElimination;

    fn initialize<R: Rng + ?Sized>(
        &self,
        participants: &[AgentStanding],
        config: &FormatConfig,
        _rng: &mut R,
    ) -> Result<Self::State, ConfigError> {
        check_setup(Self::FORMAT, participants, config)?;
        Ok(Bracket::new())
    }

    fn generate_pairings(
        &self,
        participants: &[AgentStanding],
        _previous_rounds: &[RoundData],
        _current_round: u32,
        state: &Self::State,
    ) -> PairingResult {
        let mut result = PairingResult::default();

        match state.current_phase {
            BracketPhase::GrandFinal | BracketPhase::Reset => {
                if let Some(finalists) = &state.finalists {
                    let alive = |address: &str| {
                        participants
                            .iter()
                            .any(|p| p.address == address && !p.eliminated)
                    };
                    if alive(&finalists.winners_champion) && alive(&finalists.losers_champion) {
                        result.pairings.push(Pairing::new(
                            finalists.winners_champion.clone(),
                            finalists.losers_champion.clone(),
                        ));
                    }
                }
            }
            BracketPhase::Winners => {
                pair_bracket(live_in(participants, BracketSide::Winners), &mut result);
                pair_bracket(live_in(participants, BracketSide::Losers), &mut result);
            }
            BracketPhase::Losers => {
                // The winners champion waits for the grand final
                result.byes.extend(
                    live_in(participants, BracketSide::Winners)
                        .iter()
                        .map(|s| s.address.clone()),
                );
                pair_bracket(live_in(participants, BracketSide::Losers), &mut result);
            }
        }

        result
    }

    fn update_standings(
        &self,
        standings: &[AgentStanding],
        results: &[MatchResult],
        state: &Self::State,
    ) -> Transition<Self::State> {
        let mut standings = standings.to_vec();
        let mut bracket = state.clone();
        let mut skipped = Vec::new();
        let mut winners_round = Vec::new();
        let mut losers_round = Vec::new();

        for result in results {
            if result.is_draw {
                skipped.push(LookupMiss::skip(result, MissReason::DrawNotAllowed));
                continue;
            }
            let Some(loser_address) = result.loser.as_deref() else {
                skipped.push(LookupMiss::skip(result, MissReason::NoActiveMatch));
                continue;
            };
            let (Some(w), Some(l)) = (
                position_of(&standings, &result.winner),
                position_of(&standings, loser_address),
            ) else {
                skipped.push(LookupMiss::skip(result, MissReason::UnknownPlayer));
                continue;
            };
            if standings[w].eliminated || standings[l].eliminated {
                skipped.push(LookupMiss::skip(result, MissReason::AlreadyEliminated));
                continue;
            }

            match bracket.current_phase {
                BracketPhase::GrandFinal | BracketPhase::Reset => {
                    let Some(finalists) = bracket.finalists.clone() else {
                        skipped.push(LookupMiss::skip(result, MissReason::NoActiveMatch));
                        continue;
                    };
                    if !result.involves(&finalists.winners_champion, &finalists.losers_champion) {
                        skipped.push(LookupMiss::skip(result, MissReason::NoActiveMatch));
                        continue;
                    }

                    bracket
                        .final_matches
                        .push(Pairing::new(result.winner.clone(), loser_address));
                    standings[w].tournament_points += 1;
                    standings[l].losses_bracket += 1;

                    let forces_reset = bracket.current_phase == BracketPhase::GrandFinal
                        && result.winner == finalists.losers_champion;
                    if forces_reset {
                        standings[l].bracket_position = Some(BracketSide::Losers);
                        bracket.set_phase(BracketPhase::Reset);
                        tracing::info!(
                            winner = %result.winner,
                            "losers champion took the grand final, bracket reset"
                        );
                    } else {
                        standings[l].eliminated = true;
                        tracing::info!(champion = %result.winner, "grand final decided");
                    }
                }
                BracketPhase::Winners | BracketPhase::Losers => {
                    let side = side_of(&standings[w]);
                    if side != side_of(&standings[l]) {
                        skipped.push(LookupMiss::skip(result, MissReason::NoActiveMatch));
                        continue;
                    }

                    standings[w].tournament_points += 1;
                    standings[w].bracket_position = Some(side);
                    standings[l].losses_bracket += 1;
                    match side {
                        BracketSide::Winners => {
                            standings[l].bracket_position = Some(BracketSide::Losers);
                            winners_round.push(Pairing::new(result.winner.clone(), loser_address));
                        }
                        BracketSide::Losers => {
                            standings[l].eliminated = true;
                            losers_round.push(Pairing::new(result.winner.clone(), loser_address));
                        }
                    }
                    advance_phase(&mut bracket, &standings);
                }
            }
        }

        if !winners_round.is_empty() {
            bracket.rounds.push(winners_round);
        }
        if !losers_round.is_empty() {
            bracket.losers_rounds.push(losers_round);
        }

        Transition {
            standings,
            state: bracket,
            skipped,
        }
    }

    fn is_complete(&self, standings: &[AgentStanding], _rounds: &[RoundData], _state: &Self::State) -> bool {
        standings.iter().filter(|s| !s.eliminated).count() <= 1
    }

    /// Fewer losses first, then points, then Elo
    fn final_rankings(
        &self,
        standings: &[AgentStanding],
        _rounds: &[RoundData],
        _state: &Self::State,
    ) -> Vec<AgentStanding> {
        let mut ranked = standings.to_vec();
        ranked.sort_by(|a, b| {
            a.losses_bracket
                .cmp(&b.losses_bracket)
                .then_with(|| by_points_then_elo(a, b))
        });
        ranked
    }

    fn total_rounds(&self, participant_count: usize, _config: &FormatConfig) -> u32 {
        let winners_rounds = elimination_rounds(participant_count);
        if winners_rounds == 0 {
            return 0;
        }
        let losers_rounds = 2 * winners_rounds - 1;
        winners_rounds + losers_rounds + 2
    }
}

#[cfg(test)]
#[path = "double_elimination_tests.rs"]
mod double_elimination_tests;
