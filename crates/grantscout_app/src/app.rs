use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use client_logging::client_info;
use grantscout_client::{
    ClientHandle, CreateSourceRequest, HarvestSource, SuggestedSourcesPage,
};
use grantscout_core::{
    suggested_source_name, update, AppState, AppViewModel, Flow, Msg, SessionStatus, SessionView,
    SourceRef,
};

use crate::effects::{AppEvent, EffectRunner};
use crate::persistence;

/// Ceiling for one read-model or adoption round-trip. Job polling itself has
/// no ceiling: an active job keeps producing status events until torn down.
const EVENT_TIMEOUT: Duration = Duration::from_secs(30);

struct Shell {
    state: AppState,
    runner: EffectRunner,
    rx: mpsc::Receiver<AppEvent>,
}

impl Shell {
    fn new(handle: ClientHandle, funder_id: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        let runner = EffectRunner::new(handle, tx);
        Self {
            state: AppState::new(funder_id),
            runner,
            rx,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
        if self.state.consume_dirty() {
            render(&self.state.view());
        }
    }

    /// Feeds incoming messages through `update` until `flow`'s session
    /// reaches a terminal state.
    fn run_until_terminal(&mut self, flow: Flow) -> Result<SessionStatus> {
        loop {
            let status = self.state.session(flow).status();
            if status.is_terminal() {
                return Ok(status);
            }
            match self.rx.recv() {
                Ok(AppEvent::Core(msg)) => self.dispatch(msg),
                Ok(_) => {}
                Err(_) => bail!("client event channel closed"),
            }
        }
    }

    fn wait_event<T>(&mut self, mut pick: impl FnMut(AppEvent) -> Option<T>) -> Result<T> {
        let deadline = Instant::now() + EVENT_TIMEOUT;
        loop {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .context("timed out waiting for backend response")?;
            match self.rx.recv_timeout(remaining) {
                Ok(AppEvent::Core(msg)) => self.dispatch(msg),
                Ok(event) => {
                    if let Some(value) = pick(event) {
                        return Ok(value);
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    bail!("timed out waiting for backend response")
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    bail!("client event channel closed")
                }
            }
        }
    }

    fn wait_suggested(&mut self) -> Result<SuggestedSourcesPage> {
        self.wait_event(|event| match event {
            AppEvent::Suggested { result, .. } => Some(result),
            _ => None,
        })?
        .map_err(|err| anyhow!("failed to load suggested sources: {err}"))
    }

    fn wait_sources(&mut self) -> Result<Vec<HarvestSource>> {
        self.wait_event(|event| match event {
            AppEvent::Sources { result } => Some(result),
            _ => None,
        })?
        .map_err(|err| anyhow!("failed to load configured sources: {err}"))
    }

    fn wait_created(&mut self) -> Result<HarvestSource> {
        self.wait_event(|event| match event {
            AppEvent::SourceCreated { result } => Some(result),
            _ => None,
        })?
        .map_err(|err| anyhow!("failed to create source: {err}"))
    }
}

pub fn run_discover(
    handle: ClientHandle,
    funder_id: &str,
    links: &[String],
    depth: u32,
    adopt: Option<usize>,
) -> Result<()> {
    if funder_id.is_empty() {
        // The state machine ignores a discover click without a funder, so
        // refuse it here instead of waiting on events that never come.
        bail!("funder id must not be empty");
    }
    let state_dir = state_dir();
    let restored = persistence::load_staged_links(&state_dir);

    let mut shell = Shell::new(handle, funder_id);
    if !restored.is_empty() {
        client_info!("restored {} staged link(s)", restored.len());
        shell.dispatch(Msg::RestoreStagedLinks(restored));
    }
    if !links.is_empty() {
        shell.dispatch(Msg::LinksPasted(links.join("\n")));
    }
    if let Some(stats) = shell.state.view().last_link_stats {
        if stats.rejected > 0 {
            println!("Ignored {} malformed or duplicate link(s).", stats.rejected);
        }
    }
    shell.dispatch(Msg::SearchDepthChanged(depth));
    shell.dispatch(Msg::DiscoverClicked);

    let status = shell.run_until_terminal(Flow::Discovery)?;
    if status != SessionStatus::Completed {
        // Staged input survives a failed run so the next attempt can reuse it.
        persistence::save_staged_links(&state_dir, shell.state.staged_links());
        match shell.state.session(Flow::Discovery).failed_reason() {
            Some(reason) => bail!("discovery failed: {reason}"),
            None => bail!("discovery failed"),
        }
    }

    persistence::save_staged_links(&state_dir, &[]);
    shell.runner.handle().fetch_suggested(funder_id);
    let page = shell.wait_suggested()?;
    print_suggestions(&page);

    if let Some(count) = adopt {
        adopt_top(&mut shell, funder_id, &page, count)?;
    }
    Ok(())
}

pub fn run_harvest(handle: ClientHandle, source_id: &str, funder_id: &str) -> Result<()> {
    let mut shell = Shell::new(handle, funder_id);
    shell.runner.handle().fetch_sources(funder_id);
    let sources = shell.wait_sources()?;
    let source = sources
        .iter()
        .find(|source| source.id == source_id)
        .with_context(|| format!("source {source_id} is not configured for funder {funder_id}"))?;

    let source_ref = SourceRef {
        id: source.id.clone(),
        enabled: source.enabled,
    };
    let name = source.name.clone();
    shell.dispatch(Msg::HarvestClicked { source: source_ref });
    if !source.enabled {
        // The state machine refused the trigger; nothing was sent.
        println!("Source \"{name}\" is disabled; harvest not triggered.");
        return Ok(());
    }

    let status = shell.run_until_terminal(Flow::Harvest)?;
    if status != SessionStatus::Completed {
        match shell.state.session(Flow::Harvest).failed_reason() {
            Some(reason) => bail!("harvest failed: {reason}"),
            None => bail!("harvest failed"),
        }
    }

    // The harvest invalidated the configured-sources read-model; this read
    // comes back fresh, with the new lastRunAt.
    shell.runner.handle().fetch_sources(funder_id);
    let sources = shell.wait_sources()?;
    print_sources(&sources);
    Ok(())
}

pub fn run_sources(handle: ClientHandle, funder_id: &str) -> Result<()> {
    let mut shell = Shell::new(handle, funder_id);
    shell.runner.handle().fetch_sources(funder_id);
    let sources = shell.wait_sources()?;
    print_sources(&sources);
    Ok(())
}

fn adopt_top(
    shell: &mut Shell,
    funder_id: &str,
    page: &SuggestedSourcesPage,
    count: usize,
) -> Result<()> {
    let chosen = &page.sources[..count.min(page.sources.len())];
    if chosen.is_empty() {
        println!("No suggestions to adopt.");
        return Ok(());
    }
    for suggestion in chosen {
        let name = suggested_source_name(
            suggestion.anchor_text.as_deref(),
            suggestion.title.as_deref(),
            &suggestion.url,
        );
        shell.runner.handle().create_source(CreateSourceRequest {
            name,
            base_url: suggestion.url.clone(),
            funder_id: funder_id.to_string(),
        });
        let created = shell.wait_created()?;
        println!("Adopted \"{}\" as source {}.", created.name, created.id);
    }
    Ok(())
}

/// The state file lives in the invocation directory: a failed `discover`
/// retried from the same directory restores its staged links.
fn state_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn render(view: &AppViewModel) {
    render_session("discovery", &view.discovery);
    render_session("harvest", &view.harvest);
}

fn render_session(name: &str, session: &SessionView) {
    match session.status {
        SessionStatus::Idle => {}
        SessionStatus::Running => {
            if let Some(label) = &session.phase_label {
                let percent = session.percent.unwrap_or(0);
                match &session.current_url {
                    Some(url) => println!("[{name}] {label} ({percent}%) {url}"),
                    None => println!("[{name}] {label} ({percent}%)"),
                }
            } else {
                println!("[{name}] running...");
            }
        }
        SessionStatus::Completed => println!("[{name}] completed"),
        SessionStatus::Failed => match &session.failed_reason {
            Some(reason) => println!("[{name}] failed: {reason}"),
            None => println!("[{name}] failed"),
        },
    }
}

fn print_suggestions(page: &SuggestedSourcesPage) {
    if page.sources.is_empty() {
        println!("No suggested sources yet.");
        return;
    }
    println!("Suggested sources:");
    for suggestion in &page.sources {
        let name = suggested_source_name(
            suggestion.anchor_text.as_deref(),
            suggestion.title.as_deref(),
            &suggestion.url,
        );
        println!(
            "  {:>5.2}  {}  {}",
            suggestion.score, name, suggestion.url
        );
    }
    if let Some(at) = &page.last_discovery_at {
        println!("Last discovery: {at}");
    }
}

fn print_sources(sources: &[HarvestSource]) {
    if sources.is_empty() {
        println!("No configured sources.");
        return;
    }
    println!("Configured sources:");
    for source in sources {
        let marker = if source.enabled { "enabled" } else { "disabled" };
        match &source.last_run_at {
            Some(at) => println!(
                "  {}  {} [{}] {}  last run {}",
                source.id, source.name, marker, source.base_url, at
            ),
            None => println!(
                "  {}  {} [{}] {}",
                source.id, source.name, marker, source.base_url
            ),
        }
    }
}
