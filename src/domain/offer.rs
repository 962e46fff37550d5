use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OfferType {
    /// Fixed daily rate.
    Limit,
    /// Variable rate relative to FRR; submitted with rate 0.
    FrrDeltaVar,
}

impl OfferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferType::Limit => "LIMIT",
            OfferType::FrrDeltaVar => "FRRDELTAVAR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfferRequest {
    pub offer_type: OfferType,
    pub symbol: String,
    pub amount: f64,
    pub rate: f64,
    pub period: u32,
    pub flags: u32,
}

/// Body of `auth/w/funding/offer/submit`.
#[derive(Debug, Clone, Serialize)]
pub struct OfferPayload {
    #[serde(rename = "type")]
    pub offer_type: String,
    pub symbol: String,
    pub amount: String,
    pub rate: String,
    pub period: u32,
    pub flags: u32,
}

impl OfferRequest {
    pub fn limit(symbol: &str, amount: f64, rate: f64, period: u32) -> Self {
        Self {
            offer_type: OfferType::Limit,
            symbol: symbol.to_string(),
            amount,
            rate,
            period,
            flags: 0,
        }
    }

    /// Rate that actually goes on the wire; FRR offers float, so `0`.
    pub fn submitted_rate(&self) -> f64 {
        match self.offer_type {
            OfferType::Limit => self.rate,
            OfferType::FrrDeltaVar => 0.0,
        }
    }

    pub fn payload(&self) -> OfferPayload {
        let rate = match self.offer_type {
            OfferType::Limit => decimal_string(self.rate, 8),
            OfferType::FrrDeltaVar => dec!(0).to_string(),
        };

        OfferPayload {
            offer_type: self.offer_type.as_str().to_string(),
            symbol: self.symbol.clone(),
            amount: decimal_string(self.amount, 8),
            rate,
            period: self.period,
            flags: self.flags,
        }
    }
}

/// Exchange amounts travel as decimal strings; f64 Display would leak
/// binary noise such as `302.83000000000004`.
pub fn decimal_string(value: f64, dp: u32) -> String {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(dp).normalize().to_string())
        .unwrap_or_else(|| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_payload_uses_decimal_strings() {
        let req = OfferRequest::limit("fUST", 200.0 + 102.83, 0.0003965, 20);
        let p = req.payload();

        assert_eq!(p.offer_type, "LIMIT");
        assert_eq!(p.amount, "302.83");
        assert_eq!(p.rate, "0.0003965");
        assert_eq!(p.period, 20);
        assert_eq!(p.flags, 0);
    }

    #[test]
    fn frr_offer_submits_zero_rate() {
        let mut req = OfferRequest::limit("fUST", 150.0, 0.0004, 2);
        req.offer_type = OfferType::FrrDeltaVar;

        let json = serde_json::to_value(req.payload()).unwrap();
        assert_eq!(json["type"], "FRRDELTAVAR");
        assert_eq!(json["rate"], "0");
        assert_eq!(json["amount"], "150");
        assert_eq!(req.submitted_rate(), 0.0);
    }
}
