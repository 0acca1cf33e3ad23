// Banker's Algorithm Safety Check
use super::types::*;
use crate::error::{Error, Result};
use tracing::{debug, info};

/// Searches for an order in which every process can obtain its remaining
/// need from the free pool and then return its allocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyEvaluator {
    scan_order: ScanOrder,
}

impl SafetyEvaluator {
    pub fn new(scan_order: ScanOrder) -> Self {
        SafetyEvaluator { scan_order }
    }

    pub fn scan_order(&self) -> ScanOrder {
        self.scan_order
    }

    pub fn evaluate(&self, state: &ResourceState) -> SafetyOutcome {
        let n = state.processes();
        let mut work = state.available().to_vec();
        let mut finish = vec![false; n];
        let mut sequence = Vec::with_capacity(n);

        // Every pass admits at least one process or ends the search, so at
        // most n passes run.
        while sequence.len() < n {
            let admitted = match self.scan_order {
                ScanOrder::Continue => {
                    let mut admitted = 0;
                    for i in 0..n {
                        if !finish[i] && can_run(&state.need()[i], &work) {
                            admit(state, i, &mut work, &mut finish, &mut sequence);
                            admitted += 1;
                        }
                    }
                    admitted
                }
                ScanOrder::Restart => {
                    match (0..n).find(|&i| !finish[i] && can_run(&state.need()[i], &work)) {
                        Some(i) => {
                            admit(state, i, &mut work, &mut finish, &mut sequence);
                            1
                        }
                        None => 0,
                    }
                }
            };

            if admitted == 0 {
                let blocked: Vec<usize> = (0..n).filter(|&i| !finish[i]).collect();
                info!(?blocked, "no process can proceed, system is deadlocked");
                return SafetyOutcome::Deadlock;
            }
        }

        info!(sequence = ?sequence, "safe sequence found");
        SafetyOutcome::Safe(SafeSequence(sequence))
    }
}

fn can_run(need: &[u64], work: &[u64]) -> bool {
    need.iter().zip(work).all(|(need, free)| need <= free)
}

fn admit(
    state: &ResourceState,
    process: usize,
    work: &mut [u64],
    finish: &mut [bool],
    sequence: &mut Vec<usize>,
) {
    // Cannot overflow: work never exceeds the validated total supply
    for (free, held) in work.iter_mut().zip(&state.allocation()[process]) {
        *free += held;
    }
    finish[process] = true;
    sequence.push(process);
    debug!(process, work = ?work, "admitted process");
}

/// Checks `n`/`m` against the matrices, builds the state and runs the
/// default evaluator.
pub fn evaluate(
    n: usize,
    m: usize,
    allocation: Vec<Vec<u64>>,
    maximum: Vec<Vec<u64>>,
    available: Vec<u64>,
) -> Result<SafetyOutcome> {
    if allocation.len() != n {
        return Err(Error::InvalidInput(format!(
            "expected {} allocation rows, found {}",
            n,
            allocation.len()
        )));
    }
    if available.len() != m {
        return Err(Error::InvalidInput(format!(
            "expected {} available entries, found {}",
            m,
            available.len()
        )));
    }
    let state = ResourceState::new(allocation, maximum, available)?;
    Ok(SafetyEvaluator::default().evaluate(&state))
}

/// Replays `sequence` against `state` and reports whether every admission
/// had its need covered at that moment and every process ran exactly once.
pub fn is_sound_sequence(state: &ResourceState, sequence: &SafeSequence) -> bool {
    let n = state.processes();
    if sequence.len() != n {
        return false;
    }
    let mut work = state.available().to_vec();
    let mut finish = vec![false; n];
    for &i in sequence.as_slice() {
        if i >= n || finish[i] || !can_run(&state.need()[i], &work) {
            return false;
        }
        for (free, held) in work.iter_mut().zip(&state.allocation()[i]) {
            *free += held;
        }
        finish[i] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn textbook(available: Vec<u64>) -> ResourceState {
        ResourceState::new(
            vec![
                vec![0, 1, 0],
                vec![2, 0, 0],
                vec![3, 0, 2],
                vec![2, 1, 1],
                vec![0, 0, 2],
            ],
            vec![
                vec![7, 5, 3],
                vec![3, 2, 2],
                vec![9, 0, 2],
                vec![2, 2, 2],
                vec![4, 3, 3],
            ],
            available,
        )
        .unwrap()
    }

    #[test]
    fn test_textbook_safe_state() {
        let state = textbook(vec![3, 3, 2]);
        let outcome = SafetyEvaluator::default().evaluate(&state);
        let sequence = outcome.sequence().unwrap();
        assert_eq!(sequence.as_slice(), &[1, 3, 4, 0, 2]);
        assert_eq!(sequence.to_string(), "P1 P3 P4 P0 P2");
        assert!(is_sound_sequence(&state, sequence));
    }

    #[test]
    fn test_restart_prefers_lowest_index() {
        let state = textbook(vec![3, 3, 2]);
        let outcome = SafetyEvaluator::new(ScanOrder::Restart).evaluate(&state);
        let sequence = outcome.sequence().unwrap();
        assert_eq!(sequence.as_slice(), &[1, 3, 0, 2, 4]);
        assert!(is_sound_sequence(&state, sequence));
    }

    #[test]
    fn test_textbook_unsafe_state() {
        let state = textbook(vec![0, 0, 0]);
        assert_eq!(
            SafetyEvaluator::default().evaluate(&state),
            SafetyOutcome::Deadlock
        );
        assert_eq!(
            SafetyEvaluator::new(ScanOrder::Restart).evaluate(&state),
            SafetyOutcome::Deadlock
        );
    }

    #[test]
    fn test_default_scan_order_is_continue() {
        assert_eq!(SafetyEvaluator::default().scan_order(), ScanOrder::Continue);
        assert_eq!(
            SafetyEvaluator::new(ScanOrder::Restart).scan_order(),
            ScanOrder::Restart
        );
    }

    #[test]
    fn test_no_processes_is_safe() {
        let state = ResourceState::new(vec![], vec![], vec![1, 2]).unwrap();
        let outcome = SafetyEvaluator::default().evaluate(&state);
        assert_eq!(outcome, SafetyOutcome::Safe(SafeSequence(vec![])));
    }

    #[test]
    fn test_no_resource_kinds_admits_in_index_order() {
        let empty = vec![vec![]; 3];
        let state = ResourceState::new(empty.clone(), empty, vec![]).unwrap();
        for order in [ScanOrder::Continue, ScanOrder::Restart] {
            let outcome = SafetyEvaluator::new(order).evaluate(&state);
            assert_eq!(outcome.sequence().unwrap().as_slice(), &[0, 1, 2]);
        }
    }

    #[test]
    fn test_released_units_unblock_earlier_process() {
        // P0 waits on what P1 releases
        let state = ResourceState::new(
            vec![vec![0], vec![2]],
            vec![vec![3], vec![2]],
            vec![1],
        )
        .unwrap();
        let outcome = SafetyEvaluator::default().evaluate(&state);
        assert_eq!(outcome.sequence().unwrap().as_slice(), &[1, 0]);
    }

    #[test]
    fn test_partial_progress_then_deadlock() {
        let state = ResourceState::new(
            vec![vec![1, 0], vec![0, 1], vec![0, 0]],
            vec![vec![1, 2], vec![2, 1], vec![0, 0]],
            vec![0, 0],
        )
        .unwrap();
        assert_eq!(
            SafetyEvaluator::default().evaluate(&state),
            SafetyOutcome::Deadlock
        );
    }

    #[test]
    fn test_evaluate_checks_dimensions() {
        assert!(evaluate(2, 1, vec![vec![0]], vec![vec![0]], vec![0]).is_err());
        assert!(evaluate(1, 2, vec![vec![0]], vec![vec![0]], vec![0]).is_err());
        let outcome = evaluate(1, 1, vec![vec![1]], vec![vec![2]], vec![1]).unwrap();
        assert!(outcome.is_safe());
    }

    #[test]
    fn test_evaluate_rejects_negative_need() {
        let err = evaluate(1, 1, vec![vec![2]], vec![vec![1]], vec![0]).unwrap_err();
        assert!(err.is_input_error());
    }

    fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
        if items.is_empty() {
            return vec![vec![]];
        }
        let mut result = Vec::new();
        for (k, &first) in items.iter().enumerate() {
            let mut rest = items.to_vec();
            rest.remove(k);
            for mut tail in permutations(&rest) {
                tail.insert(0, first);
                result.push(tail);
            }
        }
        result
    }

    fn any_state() -> impl Strategy<Value = ResourceState> {
        (0usize..6, 0usize..4).prop_flat_map(|(n, m)| {
            (
                proptest::collection::vec(
                    proptest::collection::vec((0u64..5, 0u64..5), m..=m),
                    n..=n,
                ),
                proptest::collection::vec(0u64..6, m..=m),
            )
                .prop_map(|(cells, available)| {
                    let allocation = cells
                        .iter()
                        .map(|row| row.iter().map(|&(a, _)| a).collect())
                        .collect();
                    let maximum = cells
                        .iter()
                        .map(|row| row.iter().map(|&(a, extra)| a + extra).collect())
                        .collect();
                    ResourceState::new(allocation, maximum, available).unwrap()
                })
        })
    }

    proptest! {
        #[test]
        fn produced_sequences_are_sound(state in any_state()) {
            for order in [ScanOrder::Continue, ScanOrder::Restart] {
                if let SafetyOutcome::Safe(seq) = SafetyEvaluator::new(order).evaluate(&state) {
                    prop_assert!(is_sound_sequence(&state, &seq));
                }
            }
        }

        #[test]
        fn finds_an_order_whenever_one_exists(state in any_state()) {
            let indices: Vec<usize> = (0..state.processes()).collect();
            let exists = permutations(&indices)
                .into_iter()
                .any(|p| is_sound_sequence(&state, &SafeSequence(p)));
            for order in [ScanOrder::Continue, ScanOrder::Restart] {
                prop_assert_eq!(SafetyEvaluator::new(order).evaluate(&state).is_safe(), exists);
            }
        }

        #[test]
        fn repeated_runs_agree(state in any_state()) {
            let evaluator = SafetyEvaluator::default();
            prop_assert_eq!(evaluator.evaluate(&state), evaluator.evaluate(&state));
        }
    }
}
