//! Concurrent fan-out of per-identifier requests.
//!
//! Every request is started at once and polled on the caller's task; no
//! throttling happens here. Results come back in completion order. The
//! caller restores a deterministic order with [`correlate`], which sorts
//! requests and completions by identifier, zips them, then orders the
//! pairs by library position.

use crate::{
    collaborators::{Lookup, LookupError},
    error::Result,
    progress::Progress,
    Error, Identifier, Position, Record,
};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;

/// One identifier to look up, and where its record lives (if anywhere).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub identifier: Identifier,
    /// Position of the existing record, or `None` for a new identifier
    pub position: Option<Position>,
}

impl LookupRequest {
    /// Request for a record already in the library.
    pub fn existing(identifier: impl Into<Identifier>, position: Position) -> Self {
        Self {
            identifier: identifier.into(),
            position: Some(position),
        }
    }

    /// Request for an identifier not yet in the library.
    pub fn new_identifier(identifier: impl Into<Identifier>) -> Self {
        Self {
            identifier: identifier.into(),
            position: None,
        }
    }
}

/// The outcome of one request, tagged with the identifier it was for.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion<T, E> {
    pub identifier: Identifier,
    pub outcome: std::result::Result<T, E>,
}

/// Outcome of a metadata lookup.
pub type LookupResult = Completion<Record, LookupError>;

/// Run `op` for every identifier concurrently.
///
/// Returns exactly one completion per identifier, in completion order.
/// `progress` is bumped once per completion, success or failure.
pub async fn fan_out<'a, T, E, F, Fut>(
    identifiers: impl IntoIterator<Item = &'a str>,
    progress: &Progress,
    op: F,
) -> Vec<Completion<T, E>>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut in_flight: FuturesUnordered<_> = identifiers
        .into_iter()
        .map(|identifier| {
            let pending = op(identifier);
            async move {
                Completion {
                    identifier: identifier.to_string(),
                    outcome: pending.await,
                }
            }
        })
        .collect();

    let mut completed = Vec::with_capacity(in_flight.len());
    while let Some(completion) = in_flight.next().await {
        progress.incr();
        tracing::debug!(
            identifier = %completion.identifier,
            ok = completion.outcome.is_ok(),
            done = progress.done(),
            total = progress.total(),
            "request completed"
        );
        completed.push(completion);
    }
    completed
}

/// Look up every request concurrently.
///
/// A record without a title counts as a failed lookup.
pub async fn dispatch<L: Lookup>(
    lookup: &L,
    requests: &[LookupRequest],
    progress: &Progress,
) -> Vec<LookupResult> {
    fan_out(
        requests.iter().map(|r| r.identifier.as_str()),
        progress,
        |doi| async move {
            match lookup.lookup(doi).await {
                Ok(record) if !record.has_title() => {
                    Err(LookupError::MissingTitle(doi.to_string()))
                }
                other => other,
            }
        },
    )
    .await
}

/// Pair each request with its completion, independent of completion order.
///
/// Both lists are sorted by identifier and zipped; the pairs are then
/// ordered by ascending position, with new identifiers last in identifier
/// order. Fails if the two lists do not carry the same identifiers.
pub fn correlate<T, E>(
    mut requests: Vec<LookupRequest>,
    mut completions: Vec<Completion<T, E>>,
) -> Result<Vec<(LookupRequest, Completion<T, E>)>> {
    requests.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    completions.sort_by(|a, b| a.identifier.cmp(&b.identifier));

    let mut requests = requests.into_iter();
    let mut completions = completions.into_iter();
    let mut pairs = Vec::new();
    loop {
        match (requests.next(), completions.next()) {
            (Some(request), Some(completion)) => {
                if request.identifier != completion.identifier {
                    return Err(Error::Uncorrelated(completion.identifier));
                }
                pairs.push((request, completion));
            }
            (Some(request), None) => return Err(Error::Uncorrelated(request.identifier)),
            (None, Some(completion)) => return Err(Error::Uncorrelated(completion.identifier)),
            (None, None) => break,
        }
    }

    pairs.sort_by_key(|(request, _)| request.position.unwrap_or(Position::MAX));
    Ok(pairs)
}
