//! List transformations applied to the published dataset before rendering.
//!
//! None of these mutate their input. Reordering filters are stable and only
//! clone the items they are given, so passing `&[&PipelineResult]` keeps
//! element identity intact.

use super::types::{CdPipelineState, CdResult, PipelineResult};

/// Moves rows that have never been updated to the end of the list.
pub fn empty_to_end<T, F>(items: &[T], key: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &CdResult,
{
    let (present, empty): (Vec<T>, Vec<T>) = items
        .iter()
        .cloned()
        .partition(|item| key(item).last_update_time.is_some());

    present.into_iter().chain(empty).collect()
}

/// Puts in-progress pipelines first, then queued ones, then everything else.
pub fn progress_to_front<T, F>(items: &[T], key: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &CdResult,
{
    let mut in_progress = Vec::new();
    let mut queued = Vec::new();
    let mut rest = Vec::new();

    for item in items {
        match key(item).state() {
            Some(CdPipelineState::InProgress) => in_progress.push(item.clone()),
            Some(CdPipelineState::Queued) => queued.push(item.clone()),
            _ => rest.push(item.clone()),
        }
    }

    in_progress.into_iter().chain(queued).chain(rest).collect()
}

/// Keyword search over project name, plan name and contributors.
///
/// An empty or missing term returns the input unchanged. Each matching row
/// is returned once, in input order.
pub fn search_for<T>(items: &[T], search: Option<&str>) -> Vec<T>
where
    T: Clone + AsRef<PipelineResult>,
{
    let Some(search) = search.filter(|s| !s.is_empty()) else {
        return items.to_vec();
    };

    let needle = search.to_lowercase();
    items
        .iter()
        .filter(|item| matches_search(&(*item).as_ref().cdresult, &needle))
        .cloned()
        .collect()
}

fn matches_search(cdresult: &CdResult, needle: &str) -> bool {
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    contains(&cdresult.project_name)
        || contains(&cdresult.plan_name)
        || cdresult
            .contributors
            .iter()
            .any(|c| contains(&c.username) || contains(&c.fullname))
}

/// Width of one stage connector as a fraction of the whole strip.
///
/// A single-stage pipeline has no connectors, so its width is zero.
#[allow(clippy::cast_precision_loss)]
pub fn pipeline_width(stage_count: usize) -> f64 {
    if stage_count > 1 {
        1.0 / (stage_count - 1) as f64
    } else {
        0.0
    }
}

pub fn percentage_limit(value: f64) -> f64 {
    if value <= 100.0 {
        value
    } else {
        100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::fixtures::{result, with_contributor, with_state, with_update};

    fn names(items: &[&PipelineResult]) -> Vec<String> {
        items
            .iter()
            .map(|r| r.cdresult.project_name.clone())
            .collect()
    }

    #[cfg(test)]
    mod empty_to_end {
        use super::*;

        #[test]
        fn moves_never_updated_rows_last() {
            let rows = vec![
                result("a", "p"),
                with_update(result("b", "p"), 1_000),
                result("c", "p"),
                with_update(result("d", "p"), 500),
            ];
            let refs: Vec<&PipelineResult> = rows.iter().collect();

            let sorted = empty_to_end(&refs, |r| &r.cdresult);
            assert_eq!(names(&sorted), vec!["b", "d", "a", "c"]);
        }

        #[test]
        fn keeps_identity_of_borrowed_rows() {
            let rows = vec![result("a", "p"), with_update(result("b", "p"), 1)];
            let refs: Vec<&PipelineResult> = rows.iter().collect();

            let sorted = empty_to_end(&refs, |r| &r.cdresult);
            assert!(std::ptr::eq(sorted[0], &rows[1]));
            assert!(std::ptr::eq(sorted[1], &rows[0]));
        }

        #[test]
        fn empty_list_stays_empty() {
            let refs: Vec<&PipelineResult> = Vec::new();
            assert!(empty_to_end(&refs, |r| &r.cdresult).is_empty());
        }
    }

    #[cfg(test)]
    mod progress_to_front {
        use super::*;

        #[test]
        fn orders_in_progress_then_queued_then_rest() {
            let rows = vec![
                with_state(result("done1", "p"), "CD_SUCCESS"),
                with_state(result("queued1", "p"), "CD_QUEUED"),
                with_state(result("running1", "p"), "CD_IN_PROGRESS"),
                result("unknown", "p"),
                with_state(result("queued2", "p"), "CD_QUEUED"),
                with_state(result("running2", "p"), "CD_IN_PROGRESS"),
            ];
            let refs: Vec<&PipelineResult> = rows.iter().collect();

            let sorted = progress_to_front(&refs, |r| &r.cdresult);
            assert_eq!(
                names(&sorted),
                vec!["running1", "running2", "queued1", "queued2", "done1", "unknown"]
            );
        }

        #[test]
        fn works_on_owned_rows() {
            let rows = vec![
                result("idle", "p"),
                with_state(result("running", "p"), "CD_IN_PROGRESS"),
            ];

            let sorted = progress_to_front(&rows, |r| &r.cdresult);
            assert_eq!(sorted[0].cdresult.project_name, "running");
            assert_eq!(sorted.len(), rows.len());
        }
    }

    #[cfg(test)]
    mod search_for {
        use super::*;

        #[test]
        fn empty_input_yields_empty_output() {
            let refs: Vec<&PipelineResult> = Vec::new();
            assert!(search_for(&refs, Some("x")).is_empty());
        }

        #[test]
        fn empty_or_missing_term_is_identity() {
            let rows = vec![result("a", "p"), result("b", "q")];
            let refs: Vec<&PipelineResult> = rows.iter().collect();

            assert_eq!(names(&search_for(&refs, Some(""))), vec!["a", "b"]);
            assert_eq!(names(&search_for(&refs, None)), vec!["a", "b"]);
        }

        #[test]
        fn matches_case_insensitively() {
            let rows = vec![result("Foo", "Deploy"), result("Bar", "Deploy")];
            let refs: Vec<&PipelineResult> = rows.iter().collect();

            assert_eq!(names(&search_for(&refs, Some("foo"))), vec!["Foo"]);
            assert_eq!(names(&search_for(&refs, Some("DEPLOY"))), vec!["Foo", "Bar"]);
        }

        #[test]
        fn matches_contributors() {
            let rows = vec![
                with_contributor(result("a", "p"), "jdoe", "Jane Doe"),
                with_contributor(result("b", "p"), "rroe", "Richard Roe"),
            ];
            let refs: Vec<&PipelineResult> = rows.iter().collect();

            assert_eq!(names(&search_for(&refs, Some("jane"))), vec!["a"]);
            assert_eq!(names(&search_for(&refs, Some("RROE"))), vec!["b"]);
        }

        #[test]
        fn returns_each_row_once() {
            let row = with_contributor(
                with_contributor(result("alpha", "p"), "al", "Al One"),
                "al2",
                "Al Two",
            );
            let rows = vec![row];
            let refs: Vec<&PipelineResult> = rows.iter().collect();

            assert_eq!(search_for(&refs, Some("al")).len(), 1);
        }
    }

    #[test]
    fn pipeline_width_handles_short_pipelines() {
        assert_eq!(pipeline_width(0), 0.0);
        assert_eq!(pipeline_width(1), 0.0);
        assert_eq!(pipeline_width(3), 0.5);
        assert_eq!(pipeline_width(5), 0.25);
    }

    #[test]
    fn percentage_limit_clamps_at_hundred() {
        assert_eq!(percentage_limit(50.0), 50.0);
        assert_eq!(percentage_limit(100.0), 100.0);
        assert_eq!(percentage_limit(150.0), 100.0);
        assert_eq!(percentage_limit(-5.0), -5.0);
    }
}
