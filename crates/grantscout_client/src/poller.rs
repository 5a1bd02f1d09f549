use std::sync::Arc;
use std::time::Duration;

use client_logging::{client_debug, client_warn, set_poll_cycle};
use tokio_util::sync::CancellationToken;

use crate::types::{ClientEvent, Flow, JobId};
use crate::GrantsApi;

/// Receiver for client events emitted by the poll loop.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ClientEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<ClientEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<ClientEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }
}

/// Polls one job at a fixed cadence until it reaches a terminal state, the
/// fetch errors, or `cancel` fires.
///
/// Fetches are serialized: the next wait starts only after the previous
/// response was handled, so at most one status request is in flight for this
/// job. Once a terminal state is observed, no further fetch is issued for
/// the job identifier. A job stuck in `active` polls until the watcher is
/// cancelled.
pub async fn poll_job<S: EventSink>(
    api: Arc<dyn GrantsApi>,
    flow: Flow,
    job_id: JobId,
    interval: Duration,
    cancel: CancellationToken,
    sink: S,
) {
    let mut cycle: u64 = 0;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
        cycle += 1;
        set_poll_cycle(cycle);

        match api.job_status(&job_id).await {
            Ok(snapshot) => {
                client_debug!(
                    "job {} cycle {} state {:?}",
                    job_id,
                    cycle,
                    snapshot.state
                );
                let terminal = snapshot.state.is_terminal();
                sink.emit(ClientEvent::StatusUpdate {
                    flow,
                    job_id: job_id.clone(),
                    state: snapshot.state,
                });
                if terminal {
                    return;
                }
            }
            Err(error) => {
                client_warn!("job {} status fetch failed: {}", job_id, error);
                sink.emit(ClientEvent::PollFailed {
                    flow,
                    job_id,
                    error,
                });
                return;
            }
        }

        if cancel.is_cancelled() {
            return;
        }
    }
}
