//! Grantscout core: pure poll-session state machine and view-model helpers.
mod effect;
mod msg;
mod phase;
mod source_name;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, ReadModel};
pub use msg::Msg;
pub use phase::phase_label;
pub use source_name::suggested_source_name;
pub use state::{
    AppState, Flow, FunderId, JobId, JobStatusView, LastLinkStats, PollSession, ProgressSnapshot,
    SessionStatus, SourceId, SourceRef,
};
pub use update::update;
pub use view_model::{AppViewModel, SessionView};
