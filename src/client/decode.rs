//! Positional Bitfinex arrays → typed records.
//!
//! This is the only place that knows field indices. Rows that are too short
//! or carry the wrong JSON type in a required slot are dropped, never
//! escalated: the public feeds occasionally include partial rows.

use log::debug;
use serde_json::Value;

use crate::domain::offer::OfferRequest;
use crate::domain::{
    annual_rate_percent, round_dp, BookPrecision, FrrStats, FundingCredit, FundingOffer,
    LedgerEntry, OfferResult, OfferStatus, OrderBookRow, WalletEntry, WalletType,
};

// [RATE, PERIOD, COUNT, AMOUNT]
const BOOK_RATE: usize = 0;
const BOOK_PERIOD: usize = 1;
const BOOK_COUNT: usize = 2;
const BOOK_AMOUNT: usize = 3;

// [OFFER_ID, PERIOD, RATE, AMOUNT]
const RAW_BOOK_PERIOD: usize = 1;
const RAW_BOOK_RATE: usize = 2;
const RAW_BOOK_AMOUNT: usize = 3;

// [TYPE, CURRENCY, BALANCE, UNSETTLED_INTEREST, AVAILABLE_BALANCE, ...]
const WALLET_TYPE: usize = 0;
const WALLET_CURRENCY: usize = 1;
const WALLET_BALANCE: usize = 2;
const WALLET_UNSETTLED: usize = 3;
const WALLET_AVAILABLE: usize = 4;

// credits, loans and credit history share one layout:
// [ID, SYMBOL, SIDE, MTS_CREATE, MTS_UPDATE, AMOUNT, FLAGS, STATUS,
//  RATE_TYPE, _, _, RATE, PERIOD, MTS_OPENING, ...]
const CREDIT_ID: usize = 0;
const CREDIT_SYMBOL: usize = 1;
const CREDIT_AMOUNT: usize = 5;
const CREDIT_STATUS: usize = 7;
const CREDIT_RATE: usize = 11;
const CREDIT_PERIOD: usize = 12;
const CREDIT_MTS_OPENING: usize = 13;

// [ID, SYMBOL, MTS_CREATED, MTS_UPDATED, AMOUNT, AMOUNT_ORIG, TYPE, _, _,
//  FLAGS, STATUS, _, _, _, RATE, PERIOD, ...]
const OFFER_ID: usize = 0;
const OFFER_SYMBOL: usize = 1;
const OFFER_AMOUNT: usize = 4;
const OFFER_AMOUNT_ORIG: usize = 5;
const OFFER_TYPE: usize = 6;
const OFFER_STATUS: usize = 10;
const OFFER_RATE: usize = 14;
const OFFER_PERIOD: usize = 15;

// [ID, CURRENCY, WALLET, MTS, _, AMOUNT, BALANCE, _, DESCRIPTION]
const LEDGER_ID: usize = 0;
const LEDGER_CURRENCY: usize = 1;
const LEDGER_MTS: usize = 3;
const LEDGER_AMOUNT: usize = 5;
const LEDGER_BALANCE: usize = 6;
const LEDGER_DESCRIPTION: usize = 8;

// [MTS, _, _, FRR, AVG_PERIOD, _, _, FUNDING_AMOUNT, FUNDING_AMOUNT_USED, ...]
const STATS_MTS: usize = 0;
const STATS_FRR: usize = 3;
const STATS_AVG_PERIOD: usize = 4;
const STATS_AMOUNT: usize = 7;
const STATS_AMOUNT_USED: usize = 8;

// [MTS, TYPE, MESSAGE_ID, _, DATA, CODE, STATUS, TEXT]
const NOTIFY_DATA: usize = 4;
const NOTIFY_STATUS: usize = 6;
const NOTIFY_TEXT: usize = 7;

// ==================================================
// FIELD HELPERS
// ==================================================

fn num(row: &[Value], idx: usize) -> Option<f64> {
    row.get(idx).and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn whole(row: &[Value], idx: usize) -> Option<u64> {
    let v = row.get(idx)?;
    v.as_u64().or_else(|| {
        v.as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}

fn small(row: &[Value], idx: usize) -> Option<u32> {
    u32::try_from(whole(row, idx)?).ok()
}

/// Missing → `0`; present but out of `u32` range → `None`, dropping the row.
fn small_or_zero(row: &[Value], idx: usize) -> Option<u32> {
    match row.get(idx) {
        None | Some(Value::Null) => Some(0),
        Some(_) => small(row, idx),
    }
}

fn int(row: &[Value], idx: usize) -> Option<i64> {
    row.get(idx).and_then(Value::as_i64)
}

fn text(row: &[Value], idx: usize) -> Option<String> {
    row.get(idx).and_then(Value::as_str).map(str::to_string)
}

fn rows(data: &Value) -> impl Iterator<Item = &Vec<Value>> {
    data.as_array()
        .map(|a| a.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_array)
}

// ==================================================
// PUBLIC BOOK
// ==================================================

pub fn book_row(row: &[Value], precision: BookPrecision) -> Option<OrderBookRow> {
    if precision.is_raw() {
        return Some(OrderBookRow {
            rate: num(row, RAW_BOOK_RATE)?,
            period: small(row, RAW_BOOK_PERIOD)?,
            count: 1,
            amount: num(row, RAW_BOOK_AMOUNT)?,
        });
    }

    Some(OrderBookRow {
        rate: num(row, BOOK_RATE)?,
        period: small(row, BOOK_PERIOD)?,
        count: small(row, BOOK_COUNT)?,
        amount: num(row, BOOK_AMOUNT)?,
    })
}

pub fn order_book(data: &Value, precision: BookPrecision) -> Vec<OrderBookRow> {
    rows(data)
        .filter_map(|r| {
            let decoded = book_row(r, precision);
            if decoded.is_none() {
                debug!("dropping malformed book row {:?}", r);
            }
            decoded
        })
        .collect()
}

// ==================================================
// ACCOUNT
// ==================================================

pub fn wallets(data: &Value) -> Vec<WalletEntry> {
    rows(data)
        .filter_map(|r| {
            Some(WalletEntry {
                wallet_type: WalletType::parse(&text(r, WALLET_TYPE)?),
                currency: text(r, WALLET_CURRENCY)?,
                balance: num(r, WALLET_BALANCE)?,
                unsettled_interest: num(r, WALLET_UNSETTLED).unwrap_or(0.0),
                available_balance: num(r, WALLET_AVAILABLE),
            })
        })
        .collect()
}

fn credit(r: &[Value]) -> Option<FundingCredit> {
    let rate = num(r, CREDIT_RATE).unwrap_or(0.0);
    Some(FundingCredit {
        id: whole(r, CREDIT_ID)?,
        symbol: text(r, CREDIT_SYMBOL)?,
        amount: num(r, CREDIT_AMOUNT)?,
        status: text(r, CREDIT_STATUS).unwrap_or_default(),
        rate,
        period: small_or_zero(r, CREDIT_PERIOD)?,
        annual_rate_percent: annual_rate_percent(rate),
        opened_at_ms: int(r, CREDIT_MTS_OPENING),
    })
}

/// Credits, loans and credit history all decode here.
pub fn funding_credits(data: &Value) -> Vec<FundingCredit> {
    rows(data).filter_map(|r| credit(r)).collect()
}

pub fn funding_offers(data: &Value) -> Vec<FundingOffer> {
    rows(data)
        .filter_map(|r| {
            Some(FundingOffer {
                id: whole(r, OFFER_ID)?,
                symbol: text(r, OFFER_SYMBOL)?,
                amount: num(r, OFFER_AMOUNT)?,
                amount_orig: num(r, OFFER_AMOUNT_ORIG).unwrap_or(0.0),
                offer_type: text(r, OFFER_TYPE).unwrap_or_default(),
                status: text(r, OFFER_STATUS).unwrap_or_default(),
                rate: num(r, OFFER_RATE).unwrap_or(0.0),
                period: small_or_zero(r, OFFER_PERIOD)?,
            })
        })
        .collect()
}

pub fn ledger_entries(data: &Value) -> Vec<LedgerEntry> {
    rows(data)
        .filter_map(|r| {
            Some(LedgerEntry {
                id: whole(r, LEDGER_ID)?,
                currency: text(r, LEDGER_CURRENCY)?,
                mts: int(r, LEDGER_MTS)?,
                amount: num(r, LEDGER_AMOUNT)?,
                balance: num(r, LEDGER_BALANCE).unwrap_or(0.0),
                description: text(r, LEDGER_DESCRIPTION).unwrap_or_default(),
            })
        })
        .collect()
}

/// First (latest) row of the `funding/stats` history.
pub fn frr_stats(data: &Value) -> Option<FrrStats> {
    let r = rows(data).next()?;
    let frr = num(r, STATS_FRR)?;

    Some(FrrStats {
        mts: int(r, STATS_MTS)?,
        frr,
        daily_frr_percent: round_dp(frr * 100.0, 4),
        annual_frr_percent: annual_rate_percent(frr),
        avg_period: num(r, STATS_AVG_PERIOD).unwrap_or(0.0),
        amount_provided: num(r, STATS_AMOUNT).unwrap_or(0.0),
        amount_used: num(r, STATS_AMOUNT_USED).unwrap_or(0.0),
    })
}

// ==================================================
// OFFER SUBMISSION
// ==================================================

/// Turn the `fon-req` notification into a per-offer result.
pub fn offer_notification(data: &Value, request: &OfferRequest) -> OfferResult {
    let row = match data.as_array() {
        Some(r) => r.as_slice(),
        None => {
            return OfferResult::failed(request, format!("unexpected response: {}", data));
        }
    };

    let status = text(row, NOTIFY_STATUS)
        .map(|s| OfferStatus::parse(&s))
        .unwrap_or(OfferStatus::Error);
    let description = text(row, NOTIFY_TEXT).unwrap_or_else(|| data.to_string());
    let offer_id = row
        .get(NOTIFY_DATA)
        .and_then(Value::as_array)
        .and_then(|offer| whole(offer, OFFER_ID));

    OfferResult {
        offer_id,
        ..OfferResult::for_request(request, status, description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_aggregated_book_and_drops_short_rows() {
        let data = json!([
            [0.0003965, 20, 1, -2026983.51368533],
            [0.0003287, 120],
            [0.0002021, 59, 1, -198984.73163536],
            "garbage",
            [0.0001865, "15", 1, -150447.89]
        ]);

        let book = order_book(&data, BookPrecision::P1);

        assert_eq!(book.len(), 2);
        assert_eq!(book[0].rate, 0.0003965);
        assert_eq!(book[0].period, 20);
        assert_eq!(book[1].period, 59);
        assert_eq!(book[1].amount, -198984.73163536);
    }

    #[test]
    fn decodes_raw_book_layout() {
        let data = json!([[1234567, 30, 0.000182, -15000.0]]);
        let book = order_book(&data, BookPrecision::R0);

        assert_eq!(
            book,
            vec![OrderBookRow {
                rate: 0.000182,
                period: 30,
                count: 1,
                amount: -15000.0
            }]
        );
    }

    #[test]
    fn drops_rows_with_out_of_range_period_or_count() {
        let book = order_book(
            &json!([
                [0.0002, 4294967296u64, 1, -100.0],
                [0.0002, 30, 4294967297u64, -100.0],
                [0.0002, 30, 2, -100.0]
            ]),
            BookPrecision::P1,
        );
        assert_eq!(book.len(), 1);
        assert_eq!(book[0].count, 2);

        let mut credit = vec![json!(null); 14];
        credit[0] = json!(1);
        credit[1] = json!("fUST");
        credit[5] = json!(100.0);
        credit[12] = json!(4294967296u64);
        assert!(funding_credits(&json!([credit.clone()])).is_empty());

        credit[12] = json!(null);
        assert_eq!(funding_credits(&json!([credit]))[0].period, 0);
    }

    #[test]
    fn wallet_without_available_balance() {
        let data = json!([
            ["exchange", "UST", 12.5, 0, 12.5, null, null],
            ["funding", "UST", 302.83, 0.0012, null, null, null],
            ["funding", "USD", 50]
        ]);

        let w = wallets(&data);

        assert_eq!(w.len(), 3);
        assert_eq!(w[1].wallet_type, WalletType::Funding);
        assert_eq!(w[1].available_balance, None);
        assert_eq!(w[1].lendable(), 302.83);
        assert_eq!(w[2].unsettled_interest, 0.0);
    }

    #[test]
    fn decodes_credit_rows() {
        let data = json!([[
            26222883, "fUST", 1, 1700000000000u64, 1700000100000u64, 250.0, 0, "ACTIVE",
            "FIXED", null, null, 0.0002, 30, 1700000000000u64, 1700086400000u64,
            0, 0, null, 0, null, 0, "tBTCUST"
        ]]);

        let credits = funding_credits(&data);

        assert_eq!(credits.len(), 1);
        let c = &credits[0];
        assert_eq!(c.id, 26222883);
        assert!(c.is_active());
        assert_eq!(c.rate, 0.0002);
        assert_eq!(c.period, 30);
        assert_eq!(c.annual_rate_percent, 7.3);
        assert_eq!(c.opened_at_ms, Some(1_700_000_000_000));
    }

    #[test]
    fn decodes_active_offer_rows() {
        let data = json!([[
            41237, "fUST", 1700000000000u64, 1700000000000u64, 150.0, 150.0, "LIMIT",
            null, null, 0, "ACTIVE", null, null, null, 0.0004, 2, 0, 0, null, 0
        ]]);

        let offers = funding_offers(&data);
        assert_eq!(offers[0].id, 41237);
        assert_eq!(offers[0].rate, 0.0004);
        assert_eq!(offers[0].period, 2);
        assert_eq!(offers[0].status, "ACTIVE");
    }

    #[test]
    fn decodes_ledger_and_stats() {
        let ledger = ledger_entries(&json!([[
            2531822314i64, "UST", null, 1700000000000i64, null, 0.0416, 303.1, null,
            "Margin Funding Payment on wallet funding"
        ]]));
        assert_eq!(ledger[0].amount, 0.0416);
        assert!(ledger[0].description.starts_with("Margin Funding"));

        let stats = frr_stats(&json!([[
            1700000000000i64, null, null, 0.0002, 12.5, null, null, 1000000.0, 750000.0
        ]]))
        .unwrap();
        assert_eq!(stats.daily_frr_percent, 0.02);
        assert_eq!(stats.annual_frr_percent, 7.3);
        assert_eq!(stats.amount_used, 750000.0);

        assert!(frr_stats(&json!([])).is_none());
    }

    #[test]
    fn notification_carries_status_and_offer_id() {
        let req = OfferRequest::limit("fUST", 151.0, 0.0002, 10);
        let data = json!([
            1700000000000i64, "fon-req", null, null,
            [41238, "fUST", 1700000000000i64, 1700000000000i64, 151, 151, "LIMIT"],
            null, "SUCCESS", "Submitting funding offer of 151.0 UST at 0.02000 for 10 days."
        ]);

        let res = offer_notification(&data, &req);

        assert_eq!(res.status, OfferStatus::Success);
        assert_eq!(res.offer_id, Some(41238));
        assert_eq!(res.amount, 151.0);
        assert!(res.description.starts_with("Submitting"));
    }

    #[test]
    fn unexpected_notification_is_an_error_result() {
        let req = OfferRequest::limit("fUST", 151.0, 0.0002, 10);
        let res = offer_notification(&json!({"oops": true}), &req);
        assert_eq!(res.status, OfferStatus::Error);
    }
}
