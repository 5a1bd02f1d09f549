//! Grantscout client: REST surface, job polling, and read-model caching.
mod api;
mod cache;
mod handle;
mod poller;
mod types;

pub use api::{ClientSettings, GrantsApi, ReqwestGrantsApi};
pub use cache::{ReadModelCache, ReadModelKey, ReadModelValue};
pub use handle::ClientHandle;
pub use poller::{poll_job, ChannelEventSink, EventSink};
pub use types::{
    ApiError, ClientEvent, CreateSourceRequest, Flow, HarvestSource, JobId, JobProgress,
    JobSnapshot, JobState, SuggestedSource, SuggestedSourcesPage,
};
