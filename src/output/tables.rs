use chrono::{DateTime, Utc};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::board::{
    letter_grade, percentage_limit, pipeline_width, CdPipelineState, PipelineResult, PipelineStage,
};

use super::styling::{bright_green, bright_red, bright_yellow, cyan, dim};

/// Total connector length of a stage strip, in characters.
const STRIP_CONNECTORS: f64 = 12.0;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Builds the board table for the visible rows.
pub fn board_table(rows: &[&PipelineResult], now: DateTime<Utc>) -> Table {
    let mut table = create_table();
    table.set_header(
        [
            "Project", "Plan", "State", "Updated", "Deployed", "Changes", "Uptime", "Pipeline",
            "Contributors",
        ]
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect::<Vec<_>>(),
    );

    for row in rows {
        let cd = &row.cdresult;
        table.add_row(vec![
            Cell::new(&cd.project_name),
            Cell::new(match &row.plan_key {
                Some(key) => format!("{}\n{key}", cd.plan_name),
                None => cd.plan_name.clone(),
            }),
            state_cell(cd.state()),
            Cell::new(
                cd.last_update_time
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".to_string()),
            ),
            Cell::new(deployed_text(cd.days_since_deployment(now))),
            Cell::new(cd.num_changes),
            uptime_cell(row),
            Cell::new(stage_strip(&cd.pipeline_stages)),
            Cell::new(
                cd.contributors
                    .iter()
                    .map(|c| c.fullname.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        ]);
    }

    table
}

pub fn state_cell(state: Option<&CdPipelineState>) -> Cell {
    let text = state_label(state);
    match state {
        Some(CdPipelineState::InProgress) => Cell::new(text).fg(TableColor::Yellow),
        Some(CdPipelineState::Queued) => Cell::new(text).fg(TableColor::Cyan),
        Some(CdPipelineState::Other(label)) if label.contains("FAIL") => {
            Cell::new(text).fg(TableColor::Red)
        }
        Some(CdPipelineState::Other(label)) if label.contains("SUCCESS") => {
            Cell::new(text).fg(TableColor::Green)
        }
        _ => Cell::new(text),
    }
}

fn state_label(state: Option<&CdPipelineState>) -> String {
    match state {
        Some(CdPipelineState::InProgress) => "in progress".to_string(),
        Some(CdPipelineState::Queued) => "queued".to_string(),
        Some(CdPipelineState::Other(label)) => label
            .trim_start_matches("CD_")
            .replace('_', " ")
            .to_lowercase(),
        None => "-".to_string(),
    }
}

fn deployed_text(days: Option<i64>) -> String {
    match days {
        None => "never".to_string(),
        Some(0) => "today".to_string(),
        Some(1) => "1 day ago".to_string(),
        Some(days) => format!("{days} days ago"),
    }
}

/// Uptime as a clamped percentage with its letter grade, color coded the
/// same way as success rates.
fn uptime_cell(row: &PipelineResult) -> Cell {
    let Some(uptime) = row.uptime_grade.as_ref() else {
        return Cell::new("-");
    };

    let grade = uptime
        .grade
        .as_deref()
        .or_else(|| letter_grade(uptime.uptime_percentage));
    let Some(grade) = grade else {
        return Cell::new("-");
    };

    let rate = percentage_limit(uptime.uptime_percentage * 100.0);
    let text = format!("{grade} ({rate:.1}%)");
    if rate > 80.0 {
        Cell::new(text).fg(TableColor::Green)
    } else if rate >= 50.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}

/// Renders stages joined by connectors that together span a fixed width,
/// however many stages there are. Each stage is marked and coloured by its
/// state.
pub fn stage_strip(stages: &[PipelineStage]) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let connector_len = (pipeline_width(stages.len()) * STRIP_CONNECTORS).round().max(1.0) as usize;
    let connector = format!(" {} ", "─".repeat(connector_len));
    stages
        .iter()
        .map(stage_text)
        .collect::<Vec<_>>()
        .join(&connector)
}

fn stage_text(stage: &PipelineStage) -> String {
    let name = &stage.stage_name;
    match stage.state.as_ref() {
        Some(CdPipelineState::InProgress) => bright_yellow(format!("◐ {name}")).to_string(),
        Some(CdPipelineState::Queued) => cyan(format!("… {name}")).to_string(),
        Some(CdPipelineState::Other(label)) if label.contains("FAIL") => {
            bright_red(format!("✗ {name}")).to_string()
        }
        Some(CdPipelineState::Other(label)) if label.contains("SUCCESS") => {
            bright_green(format!("✓ {name}")).to_string()
        }
        _ => dim(format!("○ {name}")).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> PipelineResult {
        serde_json::from_value(value).unwrap()
    }

    fn stages(value: serde_json::Value) -> Vec<PipelineStage> {
        serde_json::from_value(value).unwrap()
    }

    fn plain_strip(value: serde_json::Value) -> String {
        console::strip_ansi_codes(&stage_strip(&stages(value))).into_owned()
    }

    #[test]
    fn stage_strip_spreads_connectors() {
        assert_eq!(plain_strip(json!([])), "");
        assert_eq!(plain_strip(json!([{"stageName": "Build"}])), "○ Build");
        assert_eq!(
            plain_strip(json!([{"stageName": "Build"}, {"stageName": "Ship"}])),
            format!("○ Build {} ○ Ship", "─".repeat(12))
        );
        assert_eq!(
            plain_strip(json!([
                {"stageName": "Build"},
                {"stageName": "Test"},
                {"stageName": "Ship"}
            ])),
            format!("○ Build {0} ○ Test {0} ○ Ship", "─".repeat(6))
        );
    }

    #[test]
    fn stage_strip_marks_stage_states() {
        let strip = plain_strip(json!([
            {"stageName": "Build", "state": "CD_SUCCESS"},
            {"stageName": "Test", "state": "CD_FAILED"},
            {"stageName": "Stage", "state": "CD_IN_PROGRESS"},
            {"stageName": "Prod", "state": "CD_QUEUED"},
            {"stageName": "Smoke"}
        ]));

        assert_eq!(
            strip,
            format!("✓ Build {0} ✗ Test {0} ◐ Stage {0} … Prod {0} ○ Smoke", "─".repeat(3))
        );
    }

    #[test]
    fn state_labels_are_readable() {
        assert_eq!(state_label(Some(&CdPipelineState::InProgress)), "in progress");
        assert_eq!(
            state_label(Some(&CdPipelineState::Other("CD_MANUALLY_PAUSED".into()))),
            "manually paused"
        );
        assert_eq!(state_label(None), "-");
    }

    #[test]
    fn deployed_text_handles_missing_deployments() {
        assert_eq!(deployed_text(None), "never");
        assert_eq!(deployed_text(Some(0)), "today");
        assert_eq!(deployed_text(Some(1)), "1 day ago");
        assert_eq!(deployed_text(Some(12)), "12 days ago");
    }

    #[test]
    fn uptime_cell_clamps_and_grades() {
        let graded = row(json!({
            "cdresult": {"projectName": "a", "planName": "b"},
            "uptimeGrade": {"uptimePercentage": 1.2}
        }));
        assert_eq!(uptime_cell(&graded).content(), "A (100.0%)");

        let ungraded = row(json!({
            "cdresult": {"projectName": "a", "planName": "b"},
            "uptimeGrade": {"uptimePercentage": -1.0}
        }));
        assert_eq!(uptime_cell(&ungraded).content(), "-");
    }

    #[test]
    fn board_table_has_one_row_per_result() {
        let first = row(json!({"cdresult": {"projectName": "Web", "planName": "Deploy"}}));
        let second = row(json!({"cdresult": {"projectName": "Api", "planName": "Deploy"}}));

        let table = board_table(&[&first, &second], Utc::now());
        assert_eq!(table.row_iter().count(), 2);

        let rendered = table.to_string();
        assert!(rendered.contains("Web"));
        assert!(rendered.contains("never"));
    }
}
