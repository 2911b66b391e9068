use mtsort_core::{ExecutionReport, Relation, Report};

/// Builds one execution from `pred -> succ` pairs.
///
/// ```ignore
/// let exec = execution![A -> B, B -> C];
/// ```
#[macro_export]
macro_rules! execution {
    ($($pred:ident -> $succ:ident),* $(,)?) => {
        vec![$(mtsort_core::Relation::new(stringify!($pred), stringify!($succ))),*]
    };
}

/// Builds an execution sequence, one bracketed execution per entry.
#[macro_export]
macro_rules! sequence {
    ($([$($body:tt)*]),* $(,)?) => {
        vec![$($crate::execution![$($body)*]),*]
    };
}

pub fn position(report: &ExecutionReport, label: &str) -> usize {
    report
        .order
        .iter()
        .position(|l| l == label)
        .unwrap_or_else(|| panic!("{label} missing from order of execution {}", report.execution))
}

/// Every relation that was not dropped to break a cycle holds in the order.
pub fn assert_order_respects(report: &ExecutionReport, execution: &[Relation<&str>]) {
    for relation in execution {
        if relation.pred == relation.succ {
            continue;
        }
        let dropped = report
            .broken
            .iter()
            .any(|b| b.pred == relation.pred && b.succ == relation.succ);
        if dropped {
            continue;
        }
        assert!(
            position(report, relation.pred) < position(report, relation.succ),
            "execution {}: {} -> {} violated by {:?}",
            report.execution,
            relation.pred,
            relation.succ,
            report.order
        );
    }
}

pub fn verdicts(report: &Report) -> Vec<bool> {
    report.executions.iter().map(|e| e.ok).collect()
}
