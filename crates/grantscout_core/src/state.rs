use url::Url;

use crate::view_model::{AppViewModel, SessionView};

/// Opaque backend job identifier, assigned at trigger time.
pub type JobId = String;
/// Funder (target entity) identifier.
pub type FunderId = String;
/// Configured harvest-source identifier.
pub type SourceId = String;

/// The two independent job flows tracked per funder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    Discovery,
    Harvest,
}

/// Reference to a configured source as the view sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub id: SourceId,
    pub enabled: bool,
}

/// In-flight progress as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub phase: String,
    pub percent: u8,
    pub current_url: Option<String>,
}

/// Backend job state as observed by one status fetch.
///
/// Tagged so that progress alongside a terminal state is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatusView {
    Waiting,
    Active { progress: Option<ProgressSnapshot> },
    Completed,
    Failed { reason: Option<String> },
}

/// Local mirror of one job flow's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

/// Client-local tracking of one job's lifecycle.
///
/// Invariants: `Running` implies `job_id` is set; `Idle` implies it is not.
/// `progress` is cleared on every terminal transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollSession {
    status: SessionStatus,
    job_id: Option<JobId>,
    progress: Option<ProgressSnapshot>,
    failed_reason: Option<String>,
}

impl PollSession {
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn progress(&self) -> Option<&ProgressSnapshot> {
        self.progress.as_ref()
    }

    pub fn failed_reason(&self) -> Option<&str> {
        self.failed_reason.as_deref()
    }

    /// True when a status event for `job_id` should be applied to this session.
    /// Events for superseded or unknown job ids are stale and must be dropped.
    pub(crate) fn accepts(&self, job_id: &str) -> bool {
        self.status == SessionStatus::Running && self.job_id.as_deref() == Some(job_id)
    }

    pub(crate) fn start(&mut self, job_id: JobId) {
        self.status = SessionStatus::Running;
        self.job_id = Some(job_id);
        self.progress = None;
        self.failed_reason = None;
    }

    pub(crate) fn record_progress(&mut self, progress: ProgressSnapshot) {
        self.progress = Some(progress);
    }

    pub(crate) fn complete(&mut self) {
        self.status = SessionStatus::Completed;
        self.progress = None;
    }

    pub(crate) fn fail(&mut self, reason: Option<String>) {
        self.status = SessionStatus::Failed;
        self.progress = None;
        self.failed_reason = reason;
    }

    /// A trigger that never produced a job identifier.
    pub(crate) fn fail_without_job(&mut self) {
        self.job_id = None;
        self.fail(None);
    }
}

/// Counts for the most recent link paste.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LastLinkStats {
    pub staged: usize,
    pub rejected: usize,
}

/// Full client-side state for one funder's discovery and harvest flows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    funder_id: FunderId,
    staged_links: Vec<String>,
    search_depth: u32,
    discovery: PollSession,
    harvest: PollSession,
    last_link_stats: Option<LastLinkStats>,
    dirty: bool,
}

impl AppState {
    pub fn new(funder_id: impl Into<FunderId>) -> Self {
        Self {
            funder_id: funder_id.into(),
            search_depth: 1,
            ..Self::default()
        }
    }

    pub fn funder_id(&self) -> &str {
        &self.funder_id
    }

    pub fn staged_links(&self) -> &[String] {
        &self.staged_links
    }

    pub fn search_depth(&self) -> u32 {
        self.search_depth
    }

    pub fn session(&self, flow: Flow) -> &PollSession {
        match flow {
            Flow::Discovery => &self.discovery,
            Flow::Harvest => &self.harvest,
        }
    }

    pub(crate) fn session_mut(&mut self, flow: Flow) -> &mut PollSession {
        match flow {
            Flow::Discovery => &mut self.discovery,
            Flow::Harvest => &mut self.harvest,
        }
    }

    pub(crate) fn set_search_depth(&mut self, depth: u32) {
        self.search_depth = depth;
    }

    /// Stage every line of `raw` that parses as an absolute URL and is not
    /// already staged. Malformed and duplicate lines are dropped silently;
    /// the counts land in `last_link_stats`.
    pub(crate) fn stage_links(&mut self, raw: &str) -> LastLinkStats {
        let mut stats = LastLinkStats::default();
        for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
            if Url::parse(line).is_err() {
                stats.rejected += 1;
                continue;
            }
            if self.staged_links.iter().any(|staged| staged == line) {
                stats.rejected += 1;
                continue;
            }
            self.staged_links.push(line.to_string());
            stats.staged += 1;
        }
        self.last_link_stats = Some(stats.clone());
        stats
    }

    pub(crate) fn remove_link(&mut self, url: &str) -> bool {
        let before = self.staged_links.len();
        self.staged_links.retain(|staged| staged != url);
        self.staged_links.len() != before
    }

    pub(crate) fn clear_staged_links(&mut self) {
        self.staged_links.clear();
    }

    /// The staged links that will actually be submitted: re-checked against
    /// URL parsing so the trigger payload never carries a malformed entry.
    pub(crate) fn submittable_links(&self) -> Vec<String> {
        self.staged_links
            .iter()
            .filter(|link| Url::parse(link).is_ok())
            .cloned()
            .collect()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            funder_id: self.funder_id.clone(),
            discovery: SessionView::project(&self.discovery),
            harvest: SessionView::project(&self.harvest),
            staged_links: self.staged_links.clone(),
            search_depth: self.search_depth,
            last_link_stats: self.last_link_stats.clone(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a render is due and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
