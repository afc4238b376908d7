mod client;
mod filters;
mod grade;
mod poller;
mod types;
mod view;

pub use client::{HttpSource, SnapshotSource};
pub use filters::{empty_to_end, percentage_limit, pipeline_width, progress_to_front, search_for};
pub use grade::letter_grade;
pub use poller::{Poller, RefreshState, TokioClock, POLL_INTERVAL};
pub use types::{decode_results, CdPipelineState, PipelineResult, PipelineStage};
pub use view::{ViewState, INITIAL_DISPLAYED, PAGE_STEP};

/// Orders and filters rows the way the board displays them: matches for
/// the active search, in-progress and queued pipelines first, never-updated
/// plans last.
pub fn arrange<'a>(results: &'a [PipelineResult], view: &ViewState) -> Vec<&'a PipelineResult> {
    let rows: Vec<&PipelineResult> = results.iter().collect();
    let rows = search_for(&rows, view.search());
    let rows = empty_to_end(&rows, |r| &r.cdresult);
    progress_to_front(&rows, |r| &r.cdresult)
}
