//! The traveler decision engine.

use rand::{Rng, RngCore};
use skyhop_core::{Flight, HopResult, TravelerState};
use skyhop_gateway::FlightGateway;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::scoring::{rank, score_flight, PersonalityWeights, ScoredFlight};
use crate::window::compute_window;

/// Drives one traveler, one tick at a time.
pub struct TravelerEngine<G> {
    gateway: G,
    config: EngineConfig,
}

impl<G: FlightGateway> TravelerEngine<G> {
    /// Create an engine with default configuration.
    pub fn new(gateway: G) -> Self {
        Self::with_config(gateway, EngineConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(gateway: G, config: EngineConfig) -> Self {
        Self { gateway, config }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Run a single tick against `state`.
    ///
    /// Never fails: gateway errors and dry windows reschedule a short retry
    /// and are reported through the returned [`HopResult`]. While the gate is
    /// closed `state` is left untouched.
    pub async fn tick<R: RngCore + ?Sized>(
        &self,
        state: &mut TravelerState,
        now_utc: i64,
        rng: &mut R,
    ) -> HopResult {
        if state.next_event_utc > 0 && now_utc < state.next_event_utc {
            debug!("Gate closed for another {}s", state.next_event_utc - now_utc);
            return HopResult::waiting(state.next_event_utc);
        }

        if state.sim_time_utc == 0 {
            state.sim_time_utc = now_utc - state.lag_seconds;
            info!("Initialized story clock to {}", state.sim_time_utc);
        }

        let window = compute_window(
            state.sim_time_utc,
            state.lookback_hours,
            self.config.max_window_secs,
        );
        debug!(
            "Searching {} departures in [{}, {}] ({}s)",
            state.current_airport,
            window.begin_utc,
            window.end_utc,
            window.span_secs()
        );

        let flights = match self
            .gateway
            .fetch_departures(&state.current_airport, window.begin_utc, window.end_utc)
            .await
        {
            Ok(flights) => flights,
            Err(e) => {
                warn!(
                    "Flight source failed for {} (timeout: {}, status: {:?}): {}",
                    state.current_airport,
                    e.is_timeout(),
                    e.status(),
                    e
                );
                state.next_event_utc = now_utc + self.config.retry_delay_secs;
                return HopResult::gateway_failure(window, &e);
            }
        };

        let fetched = flights.len();
        let candidates = self.candidates(state, flights);
        debug!("{} of {} departures are eligible", candidates.len(), fetched);

        if candidates.is_empty() {
            state.sim_time_utc += self.config.dry_window_advance_secs;
            state.next_event_utc = now_utc + self.config.retry_delay_secs;
            warn!(
                "Dry window at {}; story clock nudged to {}",
                state.current_airport, state.sim_time_utc
            );
            return HopResult::dry_window(window, fetched);
        }

        let candidate_count = candidates.len();
        let mut scored = self.score_candidates(state, candidates, rng);
        rank(&mut scored);
        let chosen_idx = self.select(scored.len(), rng);
        let ScoredFlight { flight, score } = scored.swap_remove(chosen_idx);

        // Observed arrivals are kept as-is unless they would rewind the story clock.
        let depart_utc = flight.first_seen;
        let arrive_utc = flight
            .last_seen
            .unwrap_or(depart_utc + self.config.default_flight_secs)
            .max(state.sim_time_utc);
        let wait = (arrive_utc - depart_utc).max(self.config.min_wait_secs);

        let origin = std::mem::replace(&mut state.current_airport, flight.destination.clone());
        state.next_event_utc = now_utc + wait;
        state.sim_time_utc = arrive_utc;
        state.push_recent(flight.destination.clone());

        info!(
            "Hopped {} -> {} on {} (score {:.3}, rank {}, next tick in {}s)",
            origin,
            flight.destination,
            flight.label(),
            score,
            chosen_idx + 1,
            wait
        );

        let reason = if chosen_idx == 0 {
            format!("Hopped (personality scoring: {}).", state.personality)
        } else {
            format!(
                "Hopped (personality scoring: {}, explored rank {}).",
                state.personality,
                chosen_idx + 1
            )
        };
        HopResult::hopped(
            flight,
            depart_utc,
            arrive_utc,
            window,
            candidate_count,
            score,
            reason,
        )
    }

    /// Departures the traveler could actually take from where it is now.
    fn candidates(&self, state: &TravelerState, flights: Vec<Flight>) -> Vec<Flight> {
        flights
            .into_iter()
            .filter(|f| f.origin == state.current_airport)
            .filter(|f| f.first_seen >= state.sim_time_utc)
            .filter(|f| !f.destination.is_empty())
            .filter(|f| f.destination != state.current_airport)
            .collect()
    }

    fn score_candidates<R: RngCore + ?Sized>(
        &self,
        state: &TravelerState,
        candidates: Vec<Flight>,
        rng: &mut R,
    ) -> Vec<ScoredFlight> {
        let weights = PersonalityWeights::for_personality(state.personality);
        let amplitude = self.config.jitter_amplitude;

        candidates
            .into_iter()
            .map(|flight| {
                let jitter = if amplitude > 0.0 {
                    rng.gen_range(-amplitude..=amplitude)
                } else {
                    0.0
                };
                let novel = !state.recently_visited(&flight.destination);
                let score = score_flight(&weights, novel, flight.duration_secs(), jitter);
                debug!(
                    "  {} -> {}: {:.3}",
                    flight.label(),
                    flight.destination,
                    score
                );
                ScoredFlight { flight, score }
            })
            .collect()
    }

    /// Index into the ranked list: usually the best, occasionally a random top-k pick.
    fn select<R: RngCore + ?Sized>(&self, ranked_len: usize, rng: &mut R) -> usize {
        let top_k = self.config.explore_top_k.min(ranked_len);
        if top_k > 1 && rng.gen::<f64>() < self.config.explore_probability {
            return rng.gen_range(0..top_k);
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use skyhop_core::{GatewayError, HopKind, Personality, SearchWindow, SECS_PER_DAY};

    use super::*;

    const NOW: i64 = 1_700_000_000;

    /// Gateway that replays queued responses and records each query.
    #[derive(Default)]
    struct ScriptedGateway {
        responses: Mutex<VecDeque<Result<Vec<Flight>, GatewayError>>>,
        calls: Mutex<Vec<(String, i64, i64)>>,
    }

    impl ScriptedGateway {
        fn with(responses: Vec<Result<Vec<Flight>, GatewayError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, i64, i64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FlightGateway for ScriptedGateway {
        async fn fetch_departures(
            &self,
            airport: &str,
            begin_utc: i64,
            end_utc: i64,
        ) -> Result<Vec<Flight>, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((airport.to_string(), begin_utc, end_utc));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// Generator that always yields the same word.
    struct StubRng(u64);

    impl StubRng {
        /// `gen::<f64>()` lands just under 1.0, so exploration never fires.
        fn never_explore() -> Self {
            StubRng(u64::MAX)
        }
    }

    impl RngCore for StubRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.0.to_le_bytes();
            for (idx, byte) in dest.iter_mut().enumerate() {
                *byte = bytes[idx % bytes.len()];
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    /// Generator that replays a fixed cycle of words.
    struct SequenceRng {
        words: Vec<u64>,
        next: usize,
    }

    impl SequenceRng {
        fn new(words: Vec<u64>) -> Self {
            Self { words, next: 0 }
        }
    }

    impl RngCore for SequenceRng {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }

        fn next_u64(&mut self) -> u64 {
            let word = self.words[self.next % self.words.len()];
            self.next += 1;
            word
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn flight(origin: &str, destination: &str, depart: i64, arrive: Option<i64>) -> Flight {
        Flight {
            icao24: format!("{}{}", origin, destination).to_lowercase(),
            callsign: format!("T{destination}"),
            origin: origin.to_string(),
            destination: destination.to_string(),
            first_seen: depart,
            last_seen: arrive,
        }
    }

    fn started_state() -> TravelerState {
        TravelerState {
            current_airport: "KCVG".to_string(),
            sim_time_utc: NOW - SECS_PER_DAY,
            ..TravelerState::default()
        }
    }

    #[tokio::test]
    async fn test_closed_gate_leaves_state_untouched() {
        let engine = TravelerEngine::new(ScriptedGateway::default());
        let mut state = TravelerState {
            next_event_utc: NOW + 1,
            ..started_state()
        };
        let before = state.clone();

        let result = engine.tick(&mut state, NOW, &mut StubRng::never_explore()).await;

        assert!(!result.did_hop);
        assert_eq!(result.kind, HopKind::Waiting);
        assert!(result.reason.starts_with("Not time yet"));
        assert_eq!(state, before);
        assert!(engine.gateway().calls().is_empty());
    }

    #[tokio::test]
    async fn test_first_tick_initializes_story_clock() {
        let engine = TravelerEngine::new(ScriptedGateway::default());
        let mut state = TravelerState::default();
        assert_eq!(state.lag_seconds, 86_400);

        engine.tick(&mut state, NOW, &mut StubRng::never_explore()).await;

        let calls = engine.gateway().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "KCVG");
        assert_eq!(calls[0].1, NOW - 86_400);
    }

    #[tokio::test]
    async fn test_empty_window_nudges_clock_and_retries() {
        let engine = TravelerEngine::new(ScriptedGateway::with(vec![Ok(vec![])]));
        let mut state = started_state();
        let sim_before = state.sim_time_utc;

        let result = engine.tick(&mut state, NOW, &mut StubRng::never_explore()).await;

        assert!(!result.did_hop);
        assert_eq!(result.kind, HopKind::DryWindow);
        assert_eq!(state.sim_time_utc, sim_before + 10_800);
        assert_eq!(state.next_event_utc, NOW + 300);
        assert_eq!(state.current_airport, "KCVG");
    }

    #[tokio::test]
    async fn test_single_candidate_hop() {
        let depart = NOW - SECS_PER_DAY + 600;
        let engine = TravelerEngine::new(ScriptedGateway::with(vec![Ok(vec![flight(
            "KCVG",
            "KORD",
            depart,
            Some(depart + 3_600),
        )])]));
        let mut state = started_state();

        let result = engine.tick(&mut state, NOW, &mut StubRng::never_explore()).await;

        assert!(result.did_hop);
        assert_eq!(result.kind, HopKind::Hopped);
        assert_eq!(result.depart_utc, depart);
        assert_eq!(result.arrive_utc, depart + 3_600);
        assert_eq!(result.candidates, 1);
        assert_eq!(result.flight.as_ref().map(|f| f.destination.as_str()), Some("KORD"));
        assert_eq!(state.next_event_utc, NOW + 3_600);
        assert_eq!(state.current_airport, "KORD");
        assert_eq!(state.sim_time_utc, depart + 3_600);
        assert_eq!(state.recent_airports, vec!["KORD".to_string()]);
    }

    #[tokio::test]
    async fn test_gateway_error_schedules_retry() {
        let engine = TravelerEngine::new(ScriptedGateway::with(vec![Err(
            GatewayError::transport("connection refused"),
        )]));
        let mut state = started_state();
        let sim_before = state.sim_time_utc;

        let result = engine.tick(&mut state, NOW, &mut StubRng::never_explore()).await;

        assert!(!result.did_hop);
        assert_eq!(result.kind, HopKind::GatewayFailure);
        assert!(result.reason.contains("error"));
        assert_eq!(state.next_event_utc, NOW + 300);
        assert_eq!(state.sim_time_utc, sim_before);
        assert_eq!(state.current_airport, "KCVG");
    }

    #[tokio::test]
    async fn test_ineligible_departures_make_a_dry_window() {
        let sim = NOW - SECS_PER_DAY;
        let engine = TravelerEngine::new(ScriptedGateway::with(vec![Ok(vec![
            flight("KCVG", "KCVG", sim + 60, Some(sim + 3_000)),
            flight("KLUK", "KORD", sim + 60, Some(sim + 3_000)),
            flight("KCVG", "KATL", sim - 60, Some(sim + 3_000)),
        ])]));
        let mut state = started_state();

        let result = engine.tick(&mut state, NOW, &mut StubRng::never_explore()).await;

        assert_eq!(result.kind, HopKind::DryWindow);
        assert!(result.reason.contains("3 departures"));
        assert_eq!(state.current_airport, "KCVG");
    }

    #[tokio::test]
    async fn test_self_loop_is_never_chosen() {
        let sim = NOW - SECS_PER_DAY;
        let engine = TravelerEngine::new(ScriptedGateway::with(vec![Ok(vec![
            flight("KCVG", "KCVG", sim + 60, Some(sim + 600)),
            flight("KCVG", "KDTW", sim + 60, Some(sim + 20_000)),
        ])]));
        let mut state = TravelerState {
            personality: Personality::Budget,
            ..started_state()
        };

        let result = engine.tick(&mut state, NOW, &mut StdRng::seed_from_u64(11)).await;

        assert_eq!(result.candidates, 1);
        assert_eq!(state.current_airport, "KDTW");
    }

    #[tokio::test]
    async fn test_missing_arrival_assumes_two_hours() {
        let depart = NOW - SECS_PER_DAY + 60;
        let engine = TravelerEngine::new(ScriptedGateway::with(vec![Ok(vec![flight(
            "KCVG", "KMCO", depart, None,
        )])]));
        let mut state = started_state();

        let result = engine.tick(&mut state, NOW, &mut StubRng::never_explore()).await;

        assert_eq!(result.arrive_utc, depart + 7_200);
        assert_eq!(state.sim_time_utc, depart + 7_200);
        assert_eq!(state.next_event_utc, NOW + 7_200);
    }

    #[tokio::test]
    async fn test_early_arrival_is_kept_with_minimum_wait() {
        let sim = NOW - SECS_PER_DAY;
        let depart = sim + 600;
        let engine = TravelerEngine::new(ScriptedGateway::with(vec![Ok(vec![flight(
            "KCVG",
            "KBNA",
            depart,
            Some(sim + 300),
        )])]));
        let mut state = started_state();

        let result = engine.tick(&mut state, NOW, &mut StubRng::never_explore()).await;

        assert_eq!(result.arrive_utc, sim + 300);
        assert_eq!(state.sim_time_utc, sim + 300);
        assert_eq!(state.next_event_utc, NOW + 60);
    }

    #[tokio::test]
    async fn test_arrival_never_rewinds_story_clock() {
        let sim = NOW - SECS_PER_DAY;
        let depart = sim + 60;
        let engine = TravelerEngine::new(ScriptedGateway::with(vec![Ok(vec![flight(
            "KCVG",
            "KBNA",
            depart,
            Some(depart - 500),
        )])]));
        let mut state = started_state();

        let result = engine.tick(&mut state, NOW, &mut StubRng::never_explore()).await;

        assert_eq!(result.arrive_utc, sim);
        assert_eq!(state.sim_time_utc, sim);
        assert_eq!(state.next_event_utc, NOW + 60);
    }

    #[tokio::test]
    async fn test_chaotic_prefers_unvisited_destination() {
        let sim = NOW - SECS_PER_DAY;
        let engine = TravelerEngine::new(ScriptedGateway::with(vec![Ok(vec![
            flight("KCVG", "KORD", sim + 60, Some(sim + 3_600)),
            flight("KCVG", "KDEN", sim + 120, Some(sim + 3_600)),
        ])]));
        let mut state = TravelerState {
            recent_airports: vec!["KORD".to_string()],
            ..started_state()
        };

        engine.tick(&mut state, NOW, &mut StubRng::never_explore()).await;

        assert_eq!(state.current_airport, "KDEN");
        assert_eq!(state.recent_airports, vec!["KORD".to_string(), "KDEN".to_string()]);
    }

    #[tokio::test]
    async fn test_recent_buffer_after_many_hops() {
        let route = ["KORD", "KDEN", "KSEA", "KSFO"];
        let mut responses = Vec::new();
        let mut from = "KCVG";
        let mut depart = NOW - SECS_PER_DAY + 60;
        for to in route {
            responses.push(Ok(vec![flight(from, to, depart, Some(depart + 1_800))]));
            from = to;
            depart += 3_600;
        }
        let engine = TravelerEngine::new(ScriptedGateway::with(responses));
        let mut state = TravelerState {
            avoid_recent_n: 3,
            ..started_state()
        };

        let mut now = NOW;
        for _ in route {
            let result = engine.tick(&mut state, now, &mut StubRng::never_explore()).await;
            assert!(result.did_hop);
            assert!(state.recent_airports.len() <= 3);
            now = state.next_event_utc;
        }

        assert_eq!(state.recent_airports, vec!["KDEN", "KSEA", "KSFO"]);
        assert_eq!(state.current_airport, "KSFO");
    }

    /// Invents departures from whatever airport is queried; every third call
    /// is dry and every fifth fails.
    #[derive(Default)]
    struct SyntheticGateway {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl FlightGateway for SyntheticGateway {
        async fn fetch_departures(
            &self,
            airport: &str,
            begin_utc: i64,
            _end_utc: i64,
        ) -> Result<Vec<Flight>, GatewayError> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if n % 5 == 0 {
                return Err(GatewayError::Status {
                    status: 503,
                    message: "busy".to_string(),
                });
            }
            if n % 3 == 0 {
                return Ok(Vec::new());
            }
            let destinations = ["KORD", "KATL", "KDFW", "KLAX", "KJFK", "KCVG"];
            Ok(destinations
                .iter()
                .enumerate()
                .map(|(i, to)| {
                    let depart = begin_utc + 600 * (i as i64 + 1);
                    let arrive = (i % 2 == 0).then_some(depart + 1_800 * (i as i64 + 1));
                    flight(airport, to, depart, arrive)
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_invariants_hold_over_many_ticks() {
        let engine = TravelerEngine::new(SyntheticGateway::default());
        let mut rng = StdRng::seed_from_u64(42);
        let mut state = TravelerState {
            avoid_recent_n: 4,
            ..started_state()
        };

        let mut now = NOW;
        let mut hops = 0;
        for _ in 0..40 {
            let sim_before = state.sim_time_utc;
            let airport_before = state.current_airport.clone();

            let result = engine.tick(&mut state, now, &mut rng).await;

            assert!(state.sim_time_utc >= sim_before);
            assert!(state.recent_airports.len() <= 4);
            assert!(state.next_event_utc > now);
            if let Some(window) = result.window {
                assert!(window.span_secs() <= 172_800);
                assert!(window.day_spread() <= 1);
            }
            if result.did_hop {
                hops += 1;
                let chosen = result.flight.unwrap();
                assert_ne!(chosen.destination, airport_before);
                assert_eq!(state.current_airport, chosen.destination);
                assert_eq!(state.sim_time_utc, result.arrive_utc);
            }
            now = state.next_event_utc;
        }
        assert!(hops > 10);
    }

    #[tokio::test]
    async fn test_queried_window_respects_source_limits() {
        let engine = TravelerEngine::new(ScriptedGateway::default());
        let mut state = TravelerState {
            lookback_hours: 96,
            ..started_state()
        };

        let result = engine.tick(&mut state, NOW, &mut StubRng::never_explore()).await;

        let window: SearchWindow = result.window.unwrap();
        assert!(window.span_secs() <= 172_800);
        assert!(window.day_spread() <= 1);
        let (_, begin, end) = engine.gateway().calls()[0].clone();
        assert_eq!((begin, end), (window.begin_utc, window.end_utc));
        assert_eq!(begin, NOW - SECS_PER_DAY);
    }

    /// Three budget candidates ranked KORD (1h), KATL (3h), KDEN (6h).
    fn three_budget_candidates() -> (ScriptedGateway, TravelerState) {
        let sim = NOW - SECS_PER_DAY;
        let gateway = ScriptedGateway::with(vec![Ok(vec![
            flight("KCVG", "KDEN", sim + 60, Some(sim + 60 + 6 * 3_600)),
            flight("KCVG", "KORD", sim + 60, Some(sim + 60 + 3_600)),
            flight("KCVG", "KATL", sim + 60, Some(sim + 60 + 3 * 3_600)),
        ])]);
        let state = TravelerState {
            personality: Personality::Budget,
            ..started_state()
        };
        (gateway, state)
    }

    fn no_jitter() -> EngineConfig {
        EngineConfig {
            jitter_amplitude: 0.0,
            ..EngineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_exploring_tick_takes_a_lower_ranked_flight() {
        let (gateway, mut state) = three_budget_candidates();
        let engine = TravelerEngine::with_config(gateway, no_jitter());
        // A zero word puts the coin at 0.0; the second word maps to index 2 of 3.
        let mut rng = SequenceRng::new(vec![0, 0xAAAA_AAAA_AAAA_AAAB]);

        let result = engine.tick(&mut state, NOW, &mut rng).await;

        assert!(result.did_hop);
        assert_eq!(result.candidates, 3);
        assert!(result.reason.contains("explored rank 3"), "{}", result.reason);
        assert_eq!(state.current_airport, "KDEN");
        assert_eq!(state.next_event_utc, NOW + 6 * 3_600);
    }

    #[tokio::test]
    async fn test_unexplored_tick_takes_the_best_flight() {
        let (gateway, mut state) = three_budget_candidates();
        let engine = TravelerEngine::with_config(gateway, no_jitter());

        let result = engine.tick(&mut state, NOW, &mut StubRng::never_explore()).await;

        assert_eq!(result.reason, "Hopped (personality scoring: budget).");
        assert_eq!(state.current_airport, "KORD");
    }

    #[tokio::test]
    async fn test_tick_accepts_a_trait_object_rng() {
        let (gateway, mut state) = three_budget_candidates();
        let engine = TravelerEngine::new(gateway);
        let mut seeded = StdRng::seed_from_u64(5);
        let rng: &mut dyn RngCore = &mut seeded;

        let result = engine.tick(&mut state, NOW, rng).await;

        assert!(result.did_hop);
        assert_ne!(state.current_airport, "KCVG");
    }

    #[test]
    fn test_exploration_stays_in_top_five() {
        let engine = TravelerEngine::new(ScriptedGateway::default());
        let mut rng = StdRng::seed_from_u64(7);

        let picks: Vec<usize> = (0..2_000).map(|_| engine.select(12, &mut rng)).collect();

        assert!(picks.iter().all(|&i| i < 5));
        let explored = picks.iter().filter(|&&i| i > 0).count();
        assert!(explored > 50 && explored < 400, "explored {explored}");
    }

    #[test]
    fn test_single_candidate_never_explores() {
        let engine = TravelerEngine::new(ScriptedGateway::default());
        let mut rng = StdRng::seed_from_u64(3);
        assert!((0..500).all(|_| engine.select(1, &mut rng) == 0));
    }
}
