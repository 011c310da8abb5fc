//! One run: load, tick, persist, emit.

use anyhow::Context;
use rand::RngCore;
use skyhop_core::{HopResult, TravelerState};
use skyhop_engine::TravelerEngine;
use skyhop_gateway::FlightGateway;
use skyhop_state::{
    render_caption, write_caption, LatestHop, StateStore, TripJournal, TripLogEntry,
};
use tracing::info;

use crate::config::OutputPaths;

/// What a run did, for the final status line.
#[derive(Debug)]
pub struct TickReport {
    pub from: String,
    pub hop: HopResult,
    pub state: TravelerState,
    pub entry: Option<TripLogEntry>,
}

impl TickReport {
    pub fn status_line(&self) -> String {
        match &self.entry {
            Some(entry) => format!(
                "HOP #{}: {} -> {} depart={} arrive={} next_event_utc={}",
                entry.seq,
                entry.from,
                entry.to,
                entry.depart_utc,
                entry.arrive_utc,
                self.state.next_event_utc
            ),
            None => format!(
                "NO HOP at {}: {} next_event_utc={} sim_time_utc={}",
                self.from,
                self.hop.reason,
                self.state.next_event_utc,
                self.state.sim_time_utc
            ),
        }
    }
}

/// Run exactly one tick against the persisted traveler.
///
/// State is saved after every tick so rescheduling survives runs without a
/// hop. The journal, caption and latest summary are only written on a hop.
pub async fn run_tick<G, S, R>(
    engine: &TravelerEngine<G>,
    store: &S,
    paths: &OutputPaths,
    now_utc: i64,
    rng: &mut R,
) -> anyhow::Result<TickReport>
where
    G: FlightGateway,
    S: StateStore,
    R: RngCore + ?Sized,
{
    let mut state = store.load().await.context("loading traveler state")?;
    state.validate().context("validating traveler state")?;

    let from = state.current_airport.clone();
    let hop = engine.tick(&mut state, now_utc, rng).await;

    store.save(&state).await.context("saving traveler state")?;

    let journal = TripJournal::new(&paths.trip_log);
    let seq = if hop.did_hop {
        journal.next_seq().await.context("reading trip journal")?
    } else {
        0
    };

    let entry = TripLogEntry::from_hop(seq, now_utc, &from, &hop, state.personality);
    if let Some(entry) = &entry {
        journal.append(entry).await.context("appending to trip journal")?;

        let caption = render_caption(entry, &state);
        write_caption(&paths.caption, &caption)
            .await
            .context("writing caption")?;
        LatestHop::new(entry, &state)
            .write(&paths.latest)
            .await
            .context("writing latest hop summary")?;

        info!("Post artifacts written for hop #{}", entry.seq);
    }

    Ok(TickReport {
        from,
        hop,
        state,
        entry,
    })
}
