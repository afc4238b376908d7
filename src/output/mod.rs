mod progress;
mod styling;
mod tables;

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::board::{arrange, PipelineResult, RefreshState, ViewState};

pub use progress::LoadingSpinner;
pub use styling::{dim, magenta_bold};
pub use tables::board_table;

use styling::{bright, bright_red, cyan};

/// Prints the pipeboard banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🚦 pipeboard"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("CD pipeline wall board")
    );
}

/// Renders one frame of the live board: search header, visible rows and
/// the pagination footer.
pub fn render_board(
    view: &ViewState,
    state: &RefreshState,
    results: &[PipelineResult],
    now: DateTime<Utc>,
) -> String {
    let mut output = String::new();
    let arranged = arrange(results, view);
    let visible = view.visible(&arranged);

    let _ = writeln!(output, "{} {}", bright("Pipeline"), dim(format!("({} plans)", results.len())));

    if view.show_search_bar {
        let term = view.search().unwrap_or("");
        let _ = writeln!(
            output,
            "{} {}  {} {}",
            cyan("Search:"),
            bright(term),
            dim("Link:"),
            dim(view.share_link(term))
        );
    }

    let _ = writeln!(output, "{}", board_table(visible, now));

    let _ = writeln!(
        output,
        "{}",
        dim(format!(
            "Showing {} of {} - press Enter to load more, Ctrl-C to quit ({} refreshes, {} failed)",
            visible.len(),
            arranged.len(),
            state.cycles,
            state.failures
        ))
    );

    if let Some(error) = &state.last_error {
        let _ = writeln!(
            output,
            "{} {}",
            bright_red("Last refresh failed:"),
            dim(error)
        );
    }

    output
}
