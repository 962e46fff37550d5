use crate::domain::{AnnotatedRow, FundingCredit, RateSummary};
use crate::execution::errors::FundingError;

/// Anything carrying a term and an annualized rate can be ranked:
/// normalized book rows and the lending-history feed both qualify.
pub trait RateCandidate {
    fn annual_rate_percent(&self) -> Option<f64>;
    fn period(&self) -> u32;
}

impl RateCandidate for AnnotatedRow {
    fn annual_rate_percent(&self) -> Option<f64> {
        self.annual_rate_percent
    }

    fn period(&self) -> u32 {
        self.row.period
    }
}

impl RateCandidate for FundingCredit {
    fn annual_rate_percent(&self) -> Option<f64> {
        Some(self.annual_rate_percent)
    }

    fn period(&self) -> u32 {
        self.period
    }
}

/// Highest annualized rate among candidates with `period <= max_period_days`.
///
/// Ties keep the earliest candidate. `Ok(None)` when nothing qualifies.
pub fn select_best<T: RateCandidate>(
    candidates: &[T],
    max_period_days: Option<u32>,
) -> Result<Option<&T>, FundingError> {
    if candidates.is_empty() {
        return Err(FundingError::InvalidInput(
            "select_best needs a non-empty candidate list".to_string(),
        ));
    }

    let mut best: Option<(&T, f64)> = None;

    for item in candidates {
        let apr = match item.annual_rate_percent() {
            Some(v) => v,
            None => continue,
        };

        if let Some(max) = max_period_days {
            if item.period() > max {
                continue;
            }
        }

        let best_apr = best.map_or(f64::NEG_INFINITY, |(_, v)| v);
        if apr > best_apr {
            best = Some((item, apr));
        }
    }

    Ok(best.map(|(item, _)| item))
}

/// The `n` richest rows by annualized rate, stable on ties.
pub fn top_n(book: &[AnnotatedRow], n: usize) -> Vec<RateSummary> {
    let mut ranked: Vec<(&AnnotatedRow, f64)> = book
        .iter()
        .filter_map(|r| r.annual_rate_percent.map(|apr| (r, apr)))
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(n)
        .map(|(r, apr)| RateSummary {
            annual_rate_percent: apr,
            period: r.row.period,
            amount: r.row.amount.abs().round() as i64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderBookRow;
    use crate::strategy::normalizer::normalize;

    fn annotated(rate: f64, period: u32, amount: f64, apr: f64) -> AnnotatedRow {
        AnnotatedRow {
            row: OrderBookRow {
                rate,
                period,
                count: 1,
                amount,
            },
            annual_rate_percent: Some(apr),
        }
    }

    fn sample_book() -> Vec<AnnotatedRow> {
        vec![
            annotated(0.0003965, 20, -2026983.51368533, 14.47),
            annotated(0.0003287, 120, -3705002.31490664, 12.0),
            annotated(0.0002021, 59, -198984.73163536, 7.38),
            annotated(0.0001865, 15, -150447.89574246, 6.81),
            annotated(0.000182, 30, -15000.0, 6.64),
            annotated(0.000161, 3, -262924.99245563, 5.88),
            annotated(0.0001515, 109, -235121.40850379, 5.53),
            annotated(0.0001511, 29, -450000.0, 5.52),
            annotated(0.0001485, 2, -554.32162038, 5.42),
        ]
    }

    #[test]
    fn picks_only_row_within_term() {
        let book = vec![
            annotated(0.0003965, 20, -100.0, 14.47),
            annotated(0.0003287, 120, -200.0, 12.0),
        ];
        let best = select_best(&book, Some(30)).unwrap().unwrap();
        assert_eq!(best, &book[0]);
    }

    #[test]
    fn filtered_max_is_not_global_max() {
        let book = sample_book();

        let best = select_best(&book, Some(10)).unwrap().unwrap();
        assert_eq!(best.period(), 3);
        assert_eq!(best.annual_rate_percent, Some(5.88));

        let best = select_best(&book, None).unwrap().unwrap();
        assert_eq!(best.period(), 20);
    }

    #[test]
    fn never_returns_row_beyond_max_days() {
        let book = sample_book();
        for max in [1, 2, 3, 14, 15, 20, 29, 30, 59, 200] {
            if let Some(best) = select_best(&book, Some(max)).unwrap() {
                assert!(best.period() <= max);
            }
        }
    }

    #[test]
    fn none_when_no_row_qualifies() {
        let book = sample_book();
        assert_eq!(select_best(&book, Some(1)).unwrap(), None);
    }

    #[test]
    fn ties_keep_earliest_row() {
        let book = vec![
            annotated(0.0002, 10, -1.0, 7.3),
            annotated(0.0002, 12, -2.0, 7.3),
            annotated(0.0001, 5, -3.0, 3.65),
        ];
        let best = select_best(&book, Some(30)).unwrap().unwrap();
        assert_eq!(best.period(), 10);
    }

    #[test]
    fn unannotated_rows_are_skipped() {
        let mut book = sample_book();
        book[0].annual_rate_percent = None;
        let best = select_best(&book, None).unwrap().unwrap();
        assert_eq!(best.period(), 120);

        let blank = vec![AnnotatedRow {
            annual_rate_percent: None,
            ..book[1]
        }];
        assert_eq!(select_best(&blank, None).unwrap(), None);
    }

    #[test]
    fn empty_book_is_invalid_input() {
        let empty: Vec<AnnotatedRow> = Vec::new();
        assert!(matches!(
            select_best(&empty, Some(30)),
            Err(FundingError::InvalidInput(_))
        ));
    }

    #[test]
    fn ranks_lending_history_feed() {
        let credit = |id, period, apr| FundingCredit {
            id,
            symbol: "fUST".into(),
            amount: 200.0,
            status: "ACTIVE".into(),
            rate: 0.0,
            period,
            annual_rate_percent: apr,
            opened_at_ms: None,
        };
        let feed = vec![credit(1, 2, 9.1), credit(2, 60, 15.0), credit(3, 7, 11.4)];

        let best = select_best(&feed, Some(30)).unwrap().unwrap();
        assert_eq!(best.id, 3);
    }

    #[test]
    fn top_n_sorts_and_strips_sign() {
        let top = top_n(&sample_book(), 3);

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].annual_rate_percent, 14.47);
        assert_eq!(top[0].period, 20);
        assert_eq!(top[0].amount, 2026984);
        assert_eq!(top[1].period, 120);
        assert_eq!(top[2].amount, 198985);
    }

    #[test]
    fn top_n_is_stable_on_ties() {
        let book = vec![
            annotated(0.0001, 2, -10.0, 3.65),
            annotated(0.0002, 4, -20.0, 7.3),
            annotated(0.0001, 6, -30.0, 3.65),
        ];
        let periods: Vec<u32> = top_n(&book, 5).iter().map(|s| s.period).collect();
        assert_eq!(periods, vec![4, 2, 6]);
    }

    #[test]
    fn top_n_over_normalized_book() {
        let raw = vec![
            OrderBookRow {
                rate: 0.0001,
                period: 2,
                count: 1,
                amount: -554.4,
            },
            OrderBookRow {
                rate: 0.0003,
                period: 2,
                count: 1,
                amount: -1.0,
            },
        ];
        let top = top_n(&normalize(&raw), 5);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].amount, 554);
    }
}
