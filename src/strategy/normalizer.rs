use std::collections::HashSet;

use crate::domain::{annual_rate_percent, AnnotatedRow, BookField, NormalizedBook, OrderBookRow};

/// Keep the first row for every distinct value of `key`, in input order.
pub fn deduplicate(rows: &[OrderBookRow], key: BookField) -> Vec<OrderBookRow> {
    let mut seen = HashSet::new();

    rows.iter()
        .filter(|row| seen.insert(key.value(row).to_bits()))
        .copied()
        .collect()
}

/// Append the annualized percentage of `rate` to every row.
pub fn annualize(rows: &[OrderBookRow], rate: BookField) -> Vec<AnnotatedRow> {
    rows.iter()
        .map(|row| {
            let daily = rate.value(row);
            AnnotatedRow {
                row: *row,
                annual_rate_percent: daily.is_finite().then(|| annual_rate_percent(daily)),
            }
        })
        .collect()
}

/// Dedup by `dedup_key`, then annualize `rate`. The input snapshot is untouched.
pub fn normalize_with(
    rows: &[OrderBookRow],
    dedup_key: BookField,
    rate: BookField,
) -> NormalizedBook {
    annualize(&deduplicate(rows, dedup_key), rate)
}

/// One row per period, annualized from the daily rate.
pub fn normalize(rows: &[OrderBookRow]) -> NormalizedBook {
    normalize_with(rows, BookField::Period, BookField::Rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rate: f64, period: u32, count: u32, amount: f64) -> OrderBookRow {
        OrderBookRow {
            rate,
            period,
            count,
            amount,
        }
    }

    fn sample() -> Vec<OrderBookRow> {
        vec![
            row(0.0003965, 20, 1, -2026983.51),
            row(0.0003287, 120, 2, -3705002.31),
            row(0.0003100, 20, 4, -1500.0),
            row(0.0002021, 59, 1, -198984.73),
            row(0.0001865, 120, 1, -150447.89),
            row(0.000182, 30, 3, -15000.0),
        ]
    }

    #[test]
    fn first_row_per_period_wins() {
        let book = normalize(&sample());
        let periods: Vec<u32> = book.iter().map(|r| r.period()).collect();

        assert_eq!(periods, vec![20, 120, 59, 30]);
        assert_eq!(book[0].rate(), 0.0003965);
        assert_eq!(book[1].rate(), 0.0003287);
    }

    #[test]
    fn no_duplicate_keys_for_any_field() {
        let rows = sample();
        for key in [
            BookField::Rate,
            BookField::Period,
            BookField::Count,
            BookField::Amount,
        ] {
            let kept = deduplicate(&rows, key);
            let mut values: Vec<u64> = kept.iter().map(|r| key.value(r).to_bits()).collect();
            let before = values.len();
            values.sort_unstable();
            values.dedup();
            assert_eq!(values.len(), before, "{:?}", key);

            // every kept row is the first occurrence in the original order
            for r in &kept {
                let first = rows
                    .iter()
                    .find(|o| key.value(o).to_bits() == key.value(r).to_bits())
                    .unwrap();
                assert_eq!(first, r);
            }
        }
    }

    #[test]
    fn count_dedup_keeps_first_seen() {
        let kept = deduplicate(&sample(), BookField::Count);
        let counts: Vec<u32> = kept.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![1, 2, 4, 3]);
    }

    #[test]
    fn annualized_field_matches_formula() {
        let book = normalize(&sample());
        for r in &book {
            let expected = (r.rate() * 365.0 * 100.0 * 100.0).round() / 100.0;
            assert_eq!(r.annual_rate_percent, Some(expected));
        }
        assert_eq!(book[0].annual_rate_percent, Some(14.47));
    }

    #[test]
    fn non_finite_rate_is_left_unannotated() {
        let rows = vec![row(f64::NAN, 2, 1, -10.0), row(0.0001, 3, 1, -10.0)];
        let book = normalize(&rows);

        assert_eq!(book.len(), 2);
        assert_eq!(book[0].annual_rate_percent, None);
        assert_eq!(book[1].annual_rate_percent, Some(3.65));
    }

    #[test]
    fn input_snapshot_is_not_mutated() {
        let rows = sample();
        let copy = rows.clone();
        let _ = normalize(&rows);
        assert_eq!(rows, copy);
    }

    #[test]
    fn empty_book_normalizes_to_empty() {
        assert!(normalize(&[]).is_empty());
    }
}
