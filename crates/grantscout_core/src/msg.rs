#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User pasted or typed link text to stage for discovery (may be multi-line).
    LinksPasted(String),
    /// User removed a staged link.
    LinkRemoved(String),
    /// User changed the discovery traversal depth.
    SearchDepthChanged(u32),
    /// User asked to discover sources for the current funder.
    DiscoverClicked,
    /// User asked to harvest a configured source.
    HarvestClicked { source: crate::SourceRef },
    /// A trigger call returned a job identifier.
    TriggerSucceeded { flow: crate::Flow, job_id: crate::JobId },
    /// A trigger call failed before any job existed.
    TriggerFailed { flow: crate::Flow },
    /// A status fetch for a watched job returned.
    JobStatusFetched {
        flow: crate::Flow,
        job_id: crate::JobId,
        status: crate::JobStatusView,
    },
    /// A status fetch itself errored (transport or decoding).
    JobStatusFetchFailed { flow: crate::Flow, job_id: crate::JobId },
    /// Restore staged links persisted by a previous run.
    RestoreStagedLinks(Vec<String>),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
