//! Royal rumble: staggered entry, last agent standing wins
//!
//! The free-for-all is played as a series of 1v1 eliminations. A clock
//! advances by the entry interval on every `update_standings` call and
//! entrants join once it reaches their entry time.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use crate::config::{FormatConfig, FormatType};
use crate::error::ConfigError;
use crate::format::{check_setup, FormatHandler};
use crate::state::{RumbleParticipant, RumbleState};
use crate::types::{
    position_of, AgentStanding, LookupMiss, MatchResult, MissReason, Pairing, PairingResult,
    RoundData, Transition,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RoyalRumble;

/// Entry time for the participant at `entry_order`
pub fn entry_time(entry_order: u32, starting_participants: u32, interval: u64) -> u64 {
    if entry_order < starting_participants {
        0
    } else {
        u64::from(entry_order - starting_participants + 1).saturating_mul(interval)
    }
}

impl FormatHandler for RoyalRumble {
    type State = RumbleState;

    const FORMAT: FormatType = FormatType::RoyalRumble;

    fn initialize<R: Rng + ?Sized>(
        &self,
        participants: &[AgentStanding],
        config: &FormatConfig,
        rng: &mut R,
    ) -> Result<Self::State, ConfigError> {
        check_setup(Self::FORMAT, participants, config)?;

        let mut order: Vec<&str> = participants.iter().map(|p| p.address.as_str()).collect();
        order.shuffle(rng);

        let participants = order
            .iter()
            .enumerate()
            .map(|(i, address)| {
                let entry_order = i as u32;
                let participant = RumbleParticipant {
                    address: address.to_string(),
                    entry_order,
                    entry_time: entry_time(
                        entry_order,
                        config.starting_participants,
                        config.entry_interval_seconds,
                    ),
                    elimination_order: None,
                    eliminated_by: None,
                    survival_time: None,
                    eliminations: 0,
                };
                (address.to_string(), participant)
            })
            .collect::<BTreeMap<_, _>>();

        Ok(RumbleState {
            participants,
            current_time: 0,
            entry_interval: config.entry_interval_seconds,
            eliminations_recorded: 0,
        })
    }

    /// Active agents sorted by ascending Elo, neighbours paired; with an odd
    /// count the strongest agent gets a pass
    fn generate_pairings(
        &self,
        participants: &[AgentStanding],
        _previous_rounds: &[RoundData],
        _current_round: u32,
        state: &Self::State,
    ) -> PairingResult {
        let mut active: Vec<&AgentStanding> = participants
            .iter()
            .filter(|p| !p.eliminated && state.is_active(&p.address))
            .collect();
        active.sort_by(|a, b| a.elo.cmp(&b.elo).then_with(|| a.address.cmp(&b.address)));

        let mut result = PairingResult::default();
        for pair in active.chunks(2) {
            match pair {
                [a, b] => result
                    .pairings
                    .push(Pairing::new(a.address.clone(), b.address.clone())),
                [single] => result.byes.push(single.address.clone()),
                _ => unreachable!(),
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
        let mut rumble = state.clone();
        let mut skipped = Vec::new();

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
            if !rumble.participants.contains_key(&result.winner)
                || !rumble.participants.contains_key(loser_address)
            {
                skipped.push(LookupMiss::skip(result, MissReason::UnknownPlayer));
                continue;
            }
            if standings[w].eliminated || standings[l].eliminated {
                skipped.push(LookupMiss::skip(result, MissReason::AlreadyEliminated));
                continue;
            }
            if !rumble.has_entered(&result.winner) || !rumble.has_entered(loser_address) {
                skipped.push(LookupMiss::skip(result, MissReason::NotYetEntered));
                continue;
            }

            rumble.eliminations_recorded += 1;
            let order = rumble.eliminations_recorded;
            let now = rumble.current_time;
            if let Some(loser) = rumble.participants.get_mut(loser_address) {
                assert!(
                    loser.elimination_order.is_none(),
                    "{} eliminated twice",
                    loser.address
                );
                loser.elimination_order = Some(order);
                loser.eliminated_by = Some(result.winner.clone());
                loser.survival_time = Some(now.saturating_sub(loser.entry_time));
            }
            if let Some(winner) = rumble.participants.get_mut(&result.winner) {
                winner.eliminations += 1;
            }
            standings[l].eliminated = true;
            standings[w].tournament_points += 1;
            tracing::info!(
                eliminated = %loser_address,
                by = %result.winner,
                order,
                time = now,
                "rumble elimination"
            );
        }

        let previous = rumble.current_time;
        rumble.current_time = rumble.current_time.saturating_add(rumble.entry_interval);
        for entrant in rumble
            .participants
            .values()
            .filter(|p| p.entry_time > previous && p.entry_time <= rumble.current_time)
        {
            tracing::info!(entrant = %entrant.address, time = entrant.entry_time, "entered the rumble");
        }

        Transition {
            standings,
            state: rumble,
            skipped,
        }
    }

    fn is_complete(&self, standings: &[AgentStanding], _rounds: &[RoundData], state: &Self::State) -> bool {
        state.all_entered() && standings.iter().filter(|s| !s.eliminated).count() <= 1
    }

    /// Survivors first, then later elimination, longer survival, more eliminations
    fn final_rankings(
        &self,
        standings: &[AgentStanding],
        _rounds: &[RoundData],
        state: &Self::State,
    ) -> Vec<AgentStanding> {
        let now = state.current_time;
        let stats = |address: &str| {
            state
                .participants
                .get(address)
                .map(|p| (p.elimination_order, p.survival_at(now), p.eliminations))
                .unwrap_or((None, 0, 0))
        };

        let mut ranked = standings.to_vec();
        ranked.sort_by(|a, b| {
            let (a_order, a_survival, a_kills) = stats(&a.address);
            let (b_order, b_survival, b_kills) = stats(&b.address);
            a.eliminated
                .cmp(&b.eliminated)
                .then_with(|| b_order.cmp(&a_order))
                .then_with(|| b_survival.cmp(&a_survival))
                .then_with(|| b_kills.cmp(&a_kills))
                .then_with(|| b.elo.cmp(&a.elo))
                .then_with(|| a.address.cmp(&b.address))
        });
        ranked
    }

    fn total_rounds(&self, participant_count: usize, config: &FormatConfig) -> u32 {
        if participant_count < 2 {
            return 0;
        }
        let late_entrants = (participant_count as u32).saturating_sub(config.starting_participants);
        (participant_count as u32 - 1).max(late_entrants + 1)
    }
}

#[cfg(test)]
#[path = "royal_rumble_tests.rs"]
mod royal_rumble_tests;
