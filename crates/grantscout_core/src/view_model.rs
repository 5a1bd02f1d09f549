use crate::phase::phase_label;
use crate::{FunderId, JobId, LastLinkStats, PollSession, SessionStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub funder_id: FunderId,
    pub discovery: SessionView,
    pub harvest: SessionView,
    pub staged_links: Vec<String>,
    pub search_depth: u32,
    pub last_link_stats: Option<LastLinkStats>,
    pub dirty: bool,
}

/// Render-ready projection of one poll session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    pub status: SessionStatus,
    pub job_id: Option<JobId>,
    pub phase_label: Option<String>,
    pub percent: Option<u8>,
    pub current_url: Option<String>,
    pub failed_reason: Option<String>,
}

impl SessionView {
    pub(crate) fn project(session: &PollSession) -> Self {
        let progress = session.progress();
        Self {
            status: session.status(),
            job_id: session.job_id().cloned(),
            phase_label: progress.map(|p| phase_label(&p.phase)),
            percent: progress.map(|p| p.percent),
            current_url: progress.and_then(|p| p.current_url.clone()),
            failed_reason: session.failed_reason().map(ToOwned::to_owned),
        }
    }
}
