//! Batched next-departure loading for a route's stop list
//!
//! Schedules for all stops on a route are fetched in fixed-size chunks: every
//! stop in a chunk is requested concurrently, and the next chunk starts only
//! once the whole chunk has settled. That bounds in-flight requests against a
//! backend that may be cold-starting, while results still land incrementally.
//!
//! Each batch carries the generation current when it was launched. The app
//! bumps its generation on any selection change and drops updates whose
//! generation no longer matches, so a superseded batch can never overwrite
//! the data of a newer selection.

use chrono::NaiveTime;
use futures::future::join_all;
use std::future::Future;
use tokio::sync::mpsc;

use crate::api::{ApiClient, ApiError, DayType, Direction};
use crate::schedule::{next_departure, NextDeparture};

/// Number of concurrent schedule fetches per chunk
pub const DEPARTURE_CHUNK_SIZE: usize = 5;

/// Outcome of a next-departure lookup for one stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartureStatus {
    /// A departure is coming up
    Upcoming(NextDeparture),
    /// The schedule was fetched but holds no later departure this transit day
    NoneToday,
    /// The fetch for this stop failed
    Unknown,
}

/// A per-stop result published while a batch is running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureUpdate {
    /// Generation the batch was launched under
    pub generation: u64,
    pub stop_name: String,
    pub status: DepartureStatus,
}

/// Chunked fan-out driver, generic over the schedule fetch.
///
/// Within a chunk all fetches run concurrently; chunks run strictly in
/// sequence. A failed fetch is isolated to its stop and published as
/// `Unknown` without aborting the batch.
pub async fn load_departures<F, Fut, P>(
    stop_names: &[String],
    now: NaiveTime,
    fetch: F,
    mut publish: P,
) where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<String>, ApiError>>,
    P: FnMut(String, DepartureStatus),
{
    for chunk in stop_names.chunks(DEPARTURE_CHUNK_SIZE) {
        let fetches = chunk.iter().map(|stop| {
            let stop = stop.clone();
            let pending = fetch(stop.clone());
            async move { (stop, pending.await) }
        });

        for (stop, result) in join_all(fetches).await {
            let status = match result {
                Ok(times) => match next_departure(&times, now) {
                    Some(departure) => DepartureStatus::Upcoming(departure),
                    None => DepartureStatus::NoneToday,
                },
                Err(_) => DepartureStatus::Unknown,
            };
            publish(stop, status);
        }
    }
}

/// Spawns a background batch load over the API client.
///
/// Updates are tagged with `generation` and sent over `tx` as they arrive;
/// the receiver decides whether they still apply.
pub fn spawn_batch(
    api: ApiClient,
    route: String,
    direction: Direction,
    day_type: DayType,
    stop_names: Vec<String>,
    generation: u64,
    tx: mpsc::UnboundedSender<DepartureUpdate>,
) {
    tokio::spawn(async move {
        let now = chrono::Local::now().time();
        let fetch = |stop: String| {
            let api = api.clone();
            let route = route.clone();
            async move {
                api.schedule(&route, &stop, direction, day_type)
                    .await
                    .map(|fetched| fetched.data)
            }
        };
        load_departures(&stop_names, now, fetch, |stop_name, status| {
            let _ = tx.send(DepartureUpdate {
                generation,
                stop_name,
                status,
            });
        })
        .await;
    });
}
