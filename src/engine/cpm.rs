use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::engine::graph::DependencyGraph;
use crate::model::TaskId;

/// Tasks whose slack magnitude is below this are considered critical.
/// Absorbs floating error from the day arithmetic.
pub const SLACK_EPSILON: f64 = 0.1;

/// Earliest/latest start and finish for one task, in days from project start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskSchedule {
    pub earliest_start: f64,
    pub earliest_finish: f64,
    pub latest_start: f64,
    pub latest_finish: f64,
    /// `latest_start - earliest_start`; zero on the critical path.
    pub slack: f64,
}

/// Output of critical-path analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpmResult {
    pub schedules: HashMap<TaskId, TaskSchedule>,
    /// Tasks with |slack| < [`SLACK_EPSILON`].
    pub critical: HashSet<TaskId>,
    /// Valid tasks never reached by the forward pass. With a well-formed
    /// DAG this is empty; members of a dependency cycle land here instead
    /// of being silently mis-ranked (they get no schedule and are never
    /// critical).
    pub unreachable: HashSet<TaskId>,
    /// Longest-path length over the whole graph, in days. Zero when there
    /// are no valid tasks.
    pub project_duration: f64,
}

impl CpmResult {
    pub fn is_critical(&self, id: &TaskId) -> bool {
        self.critical.contains(id)
    }

    pub fn slack(&self, id: &TaskId) -> Option<f64> {
        self.schedules.get(id).map(|s| s.slack)
    }
}

/// Critical Path Method over a dependency graph.
///
/// Forward pass in Kahn topological order assigns earliest start/finish,
/// the backward pass (out-degree countdown) assigns latest start/finish,
/// and slack falls out as the difference. Results are independent of the
/// iteration order of the input collections. Never panics; degenerate or
/// malformed graphs degrade to partial or empty results.
pub fn analyze(graph: &DependencyGraph) -> CpmResult {
    let mut result = CpmResult::default();
    if graph.valid.is_empty() {
        return result;
    }

    let is_valid = |id: &TaskId| graph.valid.contains(id);

    // Forward pass: earliest start = max EF over valid predecessors.
    let mut in_degree: HashMap<&TaskId, usize> = HashMap::new();
    for id in &graph.valid {
        let degree = graph
            .predecessors_of(id)
            .iter()
            .filter(|p| is_valid(p))
            .count();
        in_degree.insert(id, degree);
    }

    // Seed with zero in-degree tasks, sorted so the traversal is
    // reproducible run to run (values do not depend on the order, the
    // internal map layout does).
    let mut seeds: Vec<&TaskId> = in_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(id, _)| *id)
        .collect();
    seeds.sort();

    let mut earliest_start: HashMap<&TaskId, f64> = HashMap::new();
    let mut earliest_finish: HashMap<&TaskId, f64> = HashMap::new();
    let mut queue: VecDeque<&TaskId> = VecDeque::new();
    for id in seeds {
        earliest_start.insert(id, 0.0);
        earliest_finish.insert(id, graph.duration(id) as f64);
        queue.push_back(id);
    }

    let mut reached: Vec<&TaskId> = Vec::new();
    while let Some(id) = queue.pop_front() {
        reached.push(id);
        let finish = earliest_finish[id];
        for succ in graph.successors_of(id).iter().filter(|s| is_valid(s)) {
            let es = earliest_start.entry(succ).or_insert(0.0);
            if finish > *es {
                *es = finish;
            }
            let degree = in_degree.get_mut(succ).map(|d| {
                *d -= 1;
                *d
            });
            if degree == Some(0) {
                let es = earliest_start[succ];
                earliest_finish.insert(succ, es + graph.duration(succ) as f64);
                queue.push_back(succ);
            }
        }
    }

    // Residual in-degree after the queue drains means a cycle.
    for id in &graph.valid {
        if !earliest_finish.contains_key(id) {
            result.unreachable.insert(id.clone());
        }
    }

    let reached_set: HashSet<&TaskId> = reached.iter().copied().collect();

    // Project duration: max EF over sinks.
    let project_duration = reached
        .iter()
        .filter(|id| {
            !graph
                .successors_of(id)
                .iter()
                .any(|s| reached_set.contains(s))
        })
        .map(|id| earliest_finish[*id])
        .fold(0.0_f64, f64::max);
    result.project_duration = project_duration;

    // Backward pass: latest finish = min LS over reached successors.
    let mut out_degree: HashMap<&TaskId, usize> = HashMap::new();
    for &id in &reached {
        let degree = graph
            .successors_of(id)
            .iter()
            .filter(|s| reached_set.contains(s))
            .count();
        out_degree.insert(id, degree);
    }

    let mut latest_finish: HashMap<&TaskId, f64> = HashMap::new();
    let mut latest_start: HashMap<&TaskId, f64> = HashMap::new();
    let mut back_queue: VecDeque<&TaskId> = VecDeque::new();
    let mut sinks: Vec<&TaskId> = out_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(id, _)| *id)
        .collect();
    sinks.sort();
    for id in sinks {
        latest_finish.insert(id, project_duration);
        latest_start.insert(id, project_duration - graph.duration(id) as f64);
        back_queue.push_back(id);
    }

    while let Some(id) = back_queue.pop_front() {
        let start = latest_start[id];
        for pred in graph
            .predecessors_of(id)
            .iter()
            .filter(|p| reached_set.contains(p))
        {
            let lf = latest_finish.entry(pred).or_insert(f64::INFINITY);
            if start < *lf {
                *lf = start;
            }
            let degree = out_degree.get_mut(pred).map(|d| {
                *d -= 1;
                *d
            });
            if degree == Some(0) {
                let lf = latest_finish[pred];
                latest_start.insert(pred, lf - graph.duration(pred) as f64);
                back_queue.push_back(pred);
            }
        }
    }

    for &id in &reached {
        let es = earliest_start[id];
        let ef = earliest_finish[id];
        let ls = latest_start.get(id).copied().unwrap_or(es);
        let lf = latest_finish.get(id).copied().unwrap_or(ef);
        let slack = ls - es;
        result.schedules.insert(
            id.clone(),
            TaskSchedule {
                earliest_start: es,
                earliest_finish: ef,
                latest_start: ls,
                latest_finish: lf,
                slack,
            },
        );
        if slack.abs() < SLACK_EPSILON {
            result.critical.insert(id.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;
    use chrono::{Duration, NaiveDate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: &str, days: i64, deps: &[&str]) -> Task {
        Task::new(id, date(2026, 1, 1), date(2026, 1, 1) + Duration::days(days))
            .with_id(id)
            .with_dependencies(deps.iter().map(|d| TaskId::from(*d)).collect())
    }

    fn analyze_tasks(tasks: &[Task]) -> CpmResult {
        analyze(&DependencyGraph::build(tasks, true))
    }

    #[test]
    fn test_chain_of_three() {
        let tasks = vec![task("a", 2, &[]), task("b", 2, &["a"]), task("c", 2, &["b"])];
        let result = analyze_tasks(&tasks);

        let a = result.schedules[&TaskId::from("a")];
        let b = result.schedules[&TaskId::from("b")];
        let c = result.schedules[&TaskId::from("c")];
        assert_eq!((a.earliest_start, a.earliest_finish), (0.0, 2.0));
        assert_eq!((b.earliest_start, b.earliest_finish), (2.0, 4.0));
        assert_eq!((c.earliest_start, c.earliest_finish), (4.0, 6.0));
        assert_eq!(result.project_duration, 6.0);
        for id in ["a", "b", "c"] {
            assert!(result.is_critical(&id.into()), "{id} should be critical");
            assert_eq!(result.slack(&id.into()), Some(0.0));
        }
    }

    #[test]
    fn test_parallel_task_has_slack() {
        let tasks = vec![
            task("a", 2, &[]),
            task("b", 2, &["a"]),
            task("c", 2, &["b"]),
            task("d", 1, &[]),
        ];
        let result = analyze_tasks(&tasks);

        let d = result.schedules[&TaskId::from("d")];
        assert_eq!((d.earliest_start, d.earliest_finish), (0.0, 1.0));
        assert_eq!(d.latest_start, 5.0);
        assert_eq!(d.slack, 5.0);
        assert!(!result.is_critical(&TaskId::from("d")));
        assert_eq!(result.project_duration, 6.0);
    }

    #[test]
    fn test_diamond_join_takes_longest_predecessor() {
        let tasks = vec![
            task("a", 1, &[]),
            task("b", 5, &["a"]),
            task("c", 2, &["a"]),
            task("d", 1, &["b", "c"]),
        ];
        let result = analyze_tasks(&tasks);

        let d = result.schedules[&TaskId::from("d")];
        assert_eq!(d.earliest_start, 6.0);
        assert_eq!(result.project_duration, 7.0);
        // the short branch is not critical
        assert!(!result.is_critical(&TaskId::from("c")));
        assert!(result.is_critical(&TaskId::from("b")));
    }

    #[test]
    fn test_empty_graph() {
        let result = analyze_tasks(&[]);
        assert!(result.schedules.is_empty());
        assert!(result.critical.is_empty());
        assert_eq!(result.project_duration, 0.0);
    }

    #[test]
    fn test_isolated_task_is_trivially_critical() {
        let result = analyze_tasks(&[task("solo", 3, &[])]);
        assert!(result.is_critical(&TaskId::from("solo")));
        assert_eq!(result.project_duration, 3.0);
    }

    #[test]
    fn test_cycle_members_reported_unreachable() {
        let tasks = vec![
            task("a", 2, &["b"]),
            task("b", 2, &["a"]),
            task("c", 2, &[]),
        ];
        let result = analyze_tasks(&tasks);

        assert!(result.unreachable.contains(&TaskId::from("a")));
        assert!(result.unreachable.contains(&TaskId::from("b")));
        assert!(result.schedules.get(&TaskId::from("a")).is_none());
        assert!(!result.is_critical(&TaskId::from("a")));
        // the untangled task still schedules normally
        assert!(result.is_critical(&TaskId::from("c")));
        assert_eq!(result.project_duration, 2.0);
    }

    #[test]
    fn test_dateless_task_never_affects_results() {
        let mut ghost = task("ghost", 4, &[]);
        ghost.start = None;
        ghost.end = None;
        let tasks = vec![task("a", 2, &[]), task("b", 2, &["a"]), ghost];
        let result = analyze_tasks(&tasks);

        assert!(result.schedules.get(&TaskId::from("ghost")).is_none());
        assert_eq!(result.project_duration, 4.0);
    }
}
