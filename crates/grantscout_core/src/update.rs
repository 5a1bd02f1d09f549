use crate::{AppState, Effect, Flow, JobStatusView, Msg, ReadModel};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::LinksPasted(raw) => {
            let stats = state.stage_links(&raw);
            if stats.staged > 0 || stats.rejected > 0 {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::LinkRemoved(url) => {
            if state.remove_link(&url) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SearchDepthChanged(depth) => {
            if depth != state.search_depth() {
                state.set_search_depth(depth);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DiscoverClicked => {
            if state.funder_id().is_empty() {
                return (state, Vec::new());
            }
            // Staged links are re-filtered here so the payload never carries
            // an entry that stopped parsing as an absolute URL.
            vec![Effect::TriggerDiscovery {
                funder_id: state.funder_id().to_string(),
                manual_links: state.submittable_links(),
                search_depth: state.search_depth(),
            }]
        }
        Msg::HarvestClicked { source } => {
            // Disabled sources are blocked at the call site: no trigger, no
            // session change.
            if !source.enabled {
                return (state, Vec::new());
            }
            vec![Effect::TriggerHarvest {
                source_id: source.id,
            }]
        }
        Msg::TriggerSucceeded { flow, job_id } => {
            state.session_mut(flow).start(job_id.clone());
            if flow == Flow::Discovery {
                // Only a successful submission consumes the staged input.
                state.clear_staged_links();
            }
            state.mark_dirty();
            vec![Effect::WatchJob { flow, job_id }]
        }
        Msg::TriggerFailed { flow } => {
            state.session_mut(flow).fail_without_job();
            state.mark_dirty();
            Vec::new()
        }
        Msg::JobStatusFetched {
            flow,
            job_id,
            status,
        } => {
            if !state.session(flow).accepts(&job_id) {
                // Stale response for a superseded or finished job.
                return (state, Vec::new());
            }
            apply_status(&mut state, flow, status)
        }
        Msg::JobStatusFetchFailed { flow, job_id } => {
            if !state.session(flow).accepts(&job_id) {
                return (state, Vec::new());
            }
            state.session_mut(flow).fail(None);
            state.mark_dirty();
            Vec::new()
        }
        Msg::RestoreStagedLinks(links) => {
            let raw = links.join("\n");
            if state.stage_links(&raw).staged > 0 {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_status(state: &mut AppState, flow: Flow, status: JobStatusView) -> Vec<Effect> {
    match status {
        JobStatusView::Waiting => Vec::new(),
        JobStatusView::Active { progress } => {
            if let Some(progress) = progress {
                state.session_mut(flow).record_progress(progress);
                state.mark_dirty();
            }
            Vec::new()
        }
        JobStatusView::Completed => {
            state.session_mut(flow).complete();
            state.mark_dirty();
            invalidations(flow, state.funder_id())
        }
        JobStatusView::Failed { reason } => {
            state.session_mut(flow).fail(reason);
            state.mark_dirty();
            Vec::new()
        }
    }
}

/// Read-models that depend on a completed job's effects. Emitted exactly
/// once: the session leaves `Running` in the same transition, so a repeated
/// terminal observation is dropped by the stale guard.
fn invalidations(flow: Flow, funder_id: &str) -> Vec<Effect> {
    match flow {
        Flow::Discovery => vec![Effect::Invalidate(ReadModel::SuggestedSources {
            funder_id: funder_id.to_string(),
        })],
        Flow::Harvest => vec![
            Effect::Invalidate(ReadModel::ConfiguredSources {
                funder_id: funder_id.to_string(),
            }),
            Effect::Invalidate(ReadModel::FunderDetail {
                funder_id: funder_id.to_string(),
            }),
        ],
    }
}
