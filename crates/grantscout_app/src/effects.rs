use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use client_logging::{client_debug, client_info, client_warn, get_poll_cycle};
use grantscout_client::{ApiError, ClientEvent, ClientHandle, HarvestSource, SuggestedSourcesPage};
use grantscout_core::{Effect, Flow, JobStatusView, Msg, ProgressSnapshot, ReadModel};

/// Everything the main loop can receive: core messages plus read-model
/// payloads that have no counterpart in the state machine.
pub enum AppEvent {
    Core(Msg),
    Suggested {
        result: Result<SuggestedSourcesPage, ApiError>,
    },
    Sources {
        result: Result<Vec<HarvestSource>, ApiError>,
    },
    SourceCreated {
        result: Result<HarvestSource, ApiError>,
    },
}

pub struct EffectRunner {
    handle: ClientHandle,
}

impl EffectRunner {
    pub fn new(handle: ClientHandle, app_tx: mpsc::Sender<AppEvent>) -> Self {
        let runner = Self { handle };
        runner.spawn_event_loop(app_tx);
        runner
    }

    pub fn handle(&self) -> &ClientHandle {
        &self.handle
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::TriggerDiscovery {
                    funder_id,
                    manual_links,
                    search_depth,
                } => {
                    client_info!(
                        "TriggerDiscovery funder={} links={} depth={}",
                        funder_id,
                        manual_links.len(),
                        search_depth
                    );
                    self.handle.discover(funder_id, manual_links, search_depth);
                }
                Effect::TriggerHarvest { source_id } => {
                    client_info!("TriggerHarvest source={}", source_id);
                    self.handle.harvest(source_id);
                }
                Effect::WatchJob { flow, job_id } => {
                    self.handle.watch(map_flow(flow), job_id);
                }
                Effect::Invalidate(read_model) => {
                    self.handle.invalidate(map_read_model(read_model));
                }
            }
        }
    }

    fn spawn_event_loop(&self, app_tx: mpsc::Sender<AppEvent>) {
        let handle = self.handle.clone();
        thread::spawn(move || loop {
            if let Some(event) = handle.try_recv() {
                let app_event = match event {
                    ClientEvent::TriggerFinished { flow, result } => match result {
                        Ok(job_id) => AppEvent::Core(Msg::TriggerSucceeded {
                            flow: map_flow_back(flow),
                            job_id,
                        }),
                        Err(error) => {
                            client_warn!("{:?} trigger failed: {}", flow, error);
                            AppEvent::Core(Msg::TriggerFailed {
                                flow: map_flow_back(flow),
                            })
                        }
                    },
                    ClientEvent::StatusUpdate {
                        flow,
                        job_id,
                        state,
                    } => {
                        if state.is_terminal() {
                            client_debug!(
                                "job {} reached a terminal state on cycle {}",
                                job_id,
                                get_poll_cycle()
                            );
                        }
                        AppEvent::Core(Msg::JobStatusFetched {
                            flow: map_flow_back(flow),
                            job_id,
                            status: map_state(state),
                        })
                    }
                    ClientEvent::PollFailed {
                        flow,
                        job_id,
                        error,
                    } => {
                        client_warn!(
                            "job {} polling failed on cycle {}: {}",
                            job_id,
                            get_poll_cycle(),
                            error
                        );
                        AppEvent::Core(Msg::JobStatusFetchFailed {
                            flow: map_flow_back(flow),
                            job_id,
                        })
                    }
                    ClientEvent::SuggestedLoaded {
                        result, from_cache, ..
                    } => {
                        if from_cache {
                            client_debug!("suggested sources served from cache");
                        }
                        AppEvent::Suggested { result }
                    }
                    ClientEvent::SourcesLoaded {
                        result, from_cache, ..
                    } => {
                        if from_cache {
                            client_debug!("configured sources served from cache");
                        }
                        AppEvent::Sources { result }
                    }
                    ClientEvent::SourceCreated { result } => AppEvent::SourceCreated { result },
                };
                if app_tx.send(app_event).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn map_flow(flow: Flow) -> grantscout_client::Flow {
    match flow {
        Flow::Discovery => grantscout_client::Flow::Discovery,
        Flow::Harvest => grantscout_client::Flow::Harvest,
    }
}

fn map_flow_back(flow: grantscout_client::Flow) -> Flow {
    match flow {
        grantscout_client::Flow::Discovery => Flow::Discovery,
        grantscout_client::Flow::Harvest => Flow::Harvest,
    }
}

fn map_state(state: grantscout_client::JobState) -> JobStatusView {
    match state {
        grantscout_client::JobState::Waiting => JobStatusView::Waiting,
        grantscout_client::JobState::Active { progress } => JobStatusView::Active {
            progress: progress.map(|p| ProgressSnapshot {
                phase: p.phase,
                percent: p.percent,
                current_url: p.current_url,
            }),
        },
        grantscout_client::JobState::Completed => JobStatusView::Completed,
        grantscout_client::JobState::Failed { reason } => JobStatusView::Failed { reason },
    }
}

fn map_read_model(read_model: ReadModel) -> grantscout_client::ReadModelKey {
    match read_model {
        ReadModel::SuggestedSources { funder_id } => {
            grantscout_client::ReadModelKey::SuggestedSources { funder_id }
        }
        ReadModel::ConfiguredSources { funder_id } => {
            grantscout_client::ReadModelKey::ConfiguredSources { funder_id }
        }
        ReadModel::FunderDetail { funder_id } => {
            grantscout_client::ReadModelKey::FunderDetail { funder_id }
        }
    }
}
