#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    TriggerDiscovery {
        funder_id: crate::FunderId,
        manual_links: Vec<String>,
        search_depth: u32,
    },
    TriggerHarvest {
        source_id: crate::SourceId,
    },
    WatchJob {
        flow: crate::Flow,
        job_id: crate::JobId,
    },
    Invalidate(ReadModel),
}

/// A cached backend projection that must be refetched after a job changes
/// the data underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReadModel {
    SuggestedSources { funder_id: crate::FunderId },
    ConfiguredSources { funder_id: crate::FunderId },
    FunderDetail { funder_id: crate::FunderId },
}
