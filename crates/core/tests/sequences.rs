mod common;

use common::{assert_order_respects, position, verdicts};
use mtsort_core::{check, Error, Execution, Pass, Strategy};

fn walkthrough() -> Vec<Execution<&'static str>> {
    sequence![
        [A -> B, B -> C, C -> D],
        [A -> B, B -> D, C -> D],
        [D -> B, B -> D, C -> D],
        [A -> B, B -> D, C -> D],
    ]
}

/// Six nodes in a chain whose middle keeps being reshuffled.
fn shuffles() -> Vec<Execution<&'static str>> {
    sequence![
        [a -> b, b -> c, c -> d, d -> e, e -> f],
        [a -> b, b -> d, c -> d, d -> e, e -> f],
        [a -> b, b -> d, c -> b, d -> e, e -> f],
        [a -> b, e -> d, c -> b, d -> e, e -> f],
        [a -> b, e -> d, c -> b, d -> f, e -> f],
        [a -> b, e -> d, c -> b, d -> f, e -> c],
        [f -> b, e -> d, c -> b, d -> f, e -> c],
    ]
}

#[test]
fn test_walkthrough_report() {
    let executions = walkthrough();
    let report = check(&executions, Strategy::Incremental).unwrap();

    assert_eq!(verdicts(&report), [true, true, false, true]);
    assert_eq!(report.executions[0].pass, Pass::Baseline);
    assert_eq!(report.executions[1].pass, Pass::Skipped);
    assert_eq!(
        report.executions[2].pass,
        Pass::Resorted {
            leading: 1,
            trailing: 3
        }
    );
    assert_eq!(report.executions[3].pass, Pass::Baseline);
    assert_eq!(report.executions[2].order, ["A", "C", "B", "D"]);

    for (entry, execution) in report.executions.iter().zip(&executions) {
        assert_order_respects(entry, execution);
    }
}

#[test]
fn test_strategies_agree_on_verdicts() {
    for executions in [walkthrough(), shuffles()] {
        let incremental = check(&executions, Strategy::Incremental).unwrap();
        let full = check(&executions, Strategy::Full).unwrap();

        assert_eq!(verdicts(&incremental), verdicts(&full));
        for ((inc, ful), execution) in incremental
            .executions
            .iter()
            .zip(&full.executions)
            .zip(&executions)
        {
            assert_order_respects(inc, execution);
            assert_order_respects(ful, execution);
        }
        // Both run the same baseline on the first execution.
        assert_eq!(incremental.executions[0], full.executions[0]);
    }
}

#[test]
fn test_shuffles_verdicts() {
    let report = check(&shuffles(), Strategy::Incremental).unwrap();
    assert_eq!(verdicts(&report), [true, true, true, false, true, true, true]);
    assert_eq!(report.executions[6].order, ["a", "e", "c", "d", "f", "b"]);
}

#[test]
fn test_resort_range_is_tight() {
    let executions = shuffles();
    let report = check(&executions, Strategy::Incremental).unwrap();

    for index in 1..executions.len() {
        let previous = &report.executions[index - 1];
        let current = &report.executions[index];
        if !previous.ok {
            continue;
        }

        let violated: Vec<(usize, usize)> = executions[index]
            .iter()
            .filter(|r| r.pred != r.succ)
            .map(|r| (position(previous, r.pred), position(previous, r.succ)))
            .filter(|(pred, succ)| pred > succ)
            .collect();

        match current.pass {
            Pass::Skipped => {
                assert!(violated.is_empty());
                assert_eq!(current.order, previous.order);
            }
            Pass::Resorted { leading, trailing } => {
                let expected_leading = violated.iter().map(|&(_, succ)| succ).min();
                let expected_trailing = violated.iter().map(|&(pred, _)| pred).max();
                assert_eq!(Some(leading), expected_leading, "execution {index}");
                assert_eq!(Some(trailing), expected_trailing, "execution {index}");

                assert_eq!(current.order[..leading], previous.order[..leading]);
                assert_eq!(current.order[trailing + 1..], previous.order[trailing + 1..]);
            }
            Pass::Baseline => panic!("execution {index} was rebuilt"),
        }
    }
}

#[test]
fn test_cycle_in_middle_of_sequence() {
    let executions = sequence![
        [a -> b, b -> c, c -> d],
        [a -> b, b -> c, c -> a],
        [a -> b, b -> c, c -> d],
        [a -> b, b -> a, c -> d],
    ];
    let report = check(&executions, Strategy::Incremental).unwrap();

    assert_eq!(verdicts(&report), [true, false, true, false]);
    for (entry, execution) in report.executions.iter().zip(&executions) {
        assert_eq!(entry.order.len(), 4);
        assert_order_respects(entry, execution);
    }
    let failed: Vec<usize> = report.failed().map(|e| e.execution).collect();
    assert_eq!(failed, [1, 3]);
}

#[test]
fn test_processing_is_deterministic() {
    let executions = shuffles();
    let first = check(&executions, Strategy::Incremental).unwrap();
    let second = check(&executions, Strategy::Incremental).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_slot_count_change_is_fatal() {
    let executions = sequence![[a -> b, b -> c], [a -> b]];
    let error = check(&executions, Strategy::Incremental).unwrap_err();
    assert_eq!(
        error,
        Error::SlotCount {
            execution: 1,
            expected: 2,
            found: 1,
        }
    );
    assert!(check(&executions, Strategy::Full).is_ok());
}

#[test]
fn test_mismatch_message_names_the_slot() {
    let executions = sequence![[A -> B, B -> C], [D -> A, B -> C]];
    let error = check(&executions, Strategy::Incremental).unwrap_err();
    assert!(matches!(error, Error::SlotMismatch { slot: 0, .. }));
    assert!(error.to_string().contains("slot 0"));
}

#[cfg(feature = "serde")]
#[test]
fn test_report_serializes() {
    let report = check(&walkthrough(), Strategy::Incremental).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["executions"][2]["ok"], false);
    assert_eq!(json["executions"][0]["order"][0], "A");
}
