use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use client_logging::client_info;
use tokio_util::sync::CancellationToken;

use crate::cache::{ReadModelCache, ReadModelKey, ReadModelValue};
use crate::poller::{poll_job, ChannelEventSink};
use crate::types::{ClientEvent, CreateSourceRequest, Flow, JobId};
use crate::GrantsApi;

enum ClientCommand {
    Discover {
        funder_id: String,
        manual_links: Vec<String>,
        search_depth: u32,
    },
    Harvest {
        source_id: String,
    },
    Watch {
        flow: Flow,
        job_id: JobId,
    },
    FetchSuggested {
        funder_id: String,
    },
    FetchSources {
        funder_id: String,
    },
    CreateSource(CreateSourceRequest),
    Invalidate(ReadModelKey),
    Shutdown,
}

/// Command/event bridge between the synchronous shell and the async client.
///
/// Owns a dedicated thread running a tokio runtime. Commands are processed
/// in submission order; watchers run as spawned tasks, one per flow. A new
/// watch for a flow cancels the previous one, and dropping the handle (or
/// calling [`ClientHandle::shutdown`]) cancels them all.
#[derive(Clone)]
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<ClientEvent>>>,
}

impl ClientHandle {
    pub fn new(api: Arc<dyn GrantsApi>, poll_interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<ClientCommand>();
        let (event_tx, event_rx) = mpsc::channel::<ClientEvent>();
        let cache = Arc::new(ReadModelCache::new());

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut watchers: HashMap<Flow, CancellationToken> = HashMap::new();

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    ClientCommand::Shutdown => break,
                    ClientCommand::Watch { flow, job_id } => {
                        let token = CancellationToken::new();
                        if let Some(previous) = watchers.insert(flow, token.clone()) {
                            previous.cancel();
                        }
                        client_info!("watching {:?} job {}", flow, job_id);
                        let api = api.clone();
                        let sink = ChannelEventSink::new(event_tx.clone());
                        runtime.spawn(poll_job(
                            api,
                            flow,
                            job_id,
                            poll_interval,
                            token,
                            sink,
                        ));
                    }
                    ClientCommand::Invalidate(key) => {
                        cache.invalidate(&key);
                    }
                    other => {
                        let api = api.clone();
                        let cache = cache.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_command(api.as_ref(), &cache, other, event_tx).await;
                        });
                    }
                }
            }

            // Channel closed or shutdown: stop every live watcher so no
            // timer outlives the consuming view.
            for token in watchers.values() {
                token.cancel();
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn discover(&self, funder_id: impl Into<String>, manual_links: Vec<String>, search_depth: u32) {
        let _ = self.cmd_tx.send(ClientCommand::Discover {
            funder_id: funder_id.into(),
            manual_links,
            search_depth,
        });
    }

    pub fn harvest(&self, source_id: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::Harvest {
            source_id: source_id.into(),
        });
    }

    pub fn watch(&self, flow: Flow, job_id: impl Into<JobId>) {
        let _ = self.cmd_tx.send(ClientCommand::Watch {
            flow,
            job_id: job_id.into(),
        });
    }

    pub fn fetch_suggested(&self, funder_id: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::FetchSuggested {
            funder_id: funder_id.into(),
        });
    }

    pub fn fetch_sources(&self, funder_id: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::FetchSources {
            funder_id: funder_id.into(),
        });
    }

    pub fn create_source(&self, request: CreateSourceRequest) {
        let _ = self.cmd_tx.send(ClientCommand::CreateSource(request));
    }

    pub fn invalidate(&self, key: ReadModelKey) {
        let _ = self.cmd_tx.send(ClientCommand::Invalidate(key));
    }

    /// Stops all watchers and ends the runtime thread.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(ClientCommand::Shutdown);
    }

    pub fn try_recv(&self) -> Option<ClientEvent> {
        self.event_rx
            .lock()
            .expect("event channel lock")
            .try_recv()
            .ok()
    }
}

async fn handle_command(
    api: &dyn GrantsApi,
    cache: &ReadModelCache,
    command: ClientCommand,
    event_tx: mpsc::Sender<ClientEvent>,
) {
    match command {
        ClientCommand::Discover {
            funder_id,
            manual_links,
            search_depth,
        } => {
            let result = api
                .discover_sources(&funder_id, &manual_links, search_depth)
                .await;
            let _ = event_tx.send(ClientEvent::TriggerFinished {
                flow: Flow::Discovery,
                result,
            });
        }
        ClientCommand::Harvest { source_id } => {
            let result = api.trigger_harvest(&source_id).await;
            let _ = event_tx.send(ClientEvent::TriggerFinished {
                flow: Flow::Harvest,
                result,
            });
        }
        ClientCommand::FetchSuggested { funder_id } => {
            let key = ReadModelKey::SuggestedSources {
                funder_id: funder_id.clone(),
            };
            if let Some(ReadModelValue::Suggested(page)) = cache.get(&key) {
                let _ = event_tx.send(ClientEvent::SuggestedLoaded {
                    funder_id,
                    result: Ok(page),
                    from_cache: true,
                });
                return;
            }
            let generation = cache.generation(&key);
            let result = api.suggested_sources(&funder_id).await;
            if let Ok(page) = &result {
                cache.store(key, generation, ReadModelValue::Suggested(page.clone()));
            }
            let _ = event_tx.send(ClientEvent::SuggestedLoaded {
                funder_id,
                result,
                from_cache: false,
            });
        }
        ClientCommand::FetchSources { funder_id } => {
            let key = ReadModelKey::ConfiguredSources {
                funder_id: funder_id.clone(),
            };
            if let Some(ReadModelValue::Sources(sources)) = cache.get(&key) {
                let _ = event_tx.send(ClientEvent::SourcesLoaded {
                    funder_id,
                    result: Ok(sources),
                    from_cache: true,
                });
                return;
            }
            let generation = cache.generation(&key);
            let result = api.configured_sources(&funder_id).await;
            if let Ok(sources) = &result {
                cache.store(key, generation, ReadModelValue::Sources(sources.clone()));
            }
            let _ = event_tx.send(ClientEvent::SourcesLoaded {
                funder_id,
                result,
                from_cache: false,
            });
        }
        ClientCommand::CreateSource(request) => {
            let result = api.create_source(&request).await;
            let _ = event_tx.send(ClientEvent::SourceCreated { result });
        }
        // Handled synchronously in the command loop.
        ClientCommand::Watch { .. } | ClientCommand::Invalidate(_) | ClientCommand::Shutdown => {}
    }
}
