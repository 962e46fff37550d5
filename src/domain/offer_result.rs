use serde::Serialize;

use super::offer::OfferRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    Success,
    Error,
    Failure,
    /// READ_ONLY mode: logged, never sent.
    DryRun,
}

impl OfferStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "SUCCESS" => OfferStatus::Success,
            "FAILURE" => OfferStatus::Failure,
            _ => OfferStatus::Error,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, OfferStatus::Success | OfferStatus::DryRun)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferResult {
    pub status: OfferStatus,
    pub description: String,
    pub amount: f64,
    pub rate: f64,
    pub period: u32,
    pub offer_id: Option<u64>,
}

impl OfferResult {
    pub fn for_request(request: &OfferRequest, status: OfferStatus, description: String) -> Self {
        Self {
            status,
            description,
            amount: request.amount,
            rate: request.submitted_rate(),
            period: request.period,
            offer_id: None,
        }
    }

    /// Submission never reached a decoded exchange answer.
    pub fn failed(request: &OfferRequest, reason: String) -> Self {
        Self::for_request(request, OfferStatus::Error, reason)
    }

    pub fn dry_run(request: &OfferRequest) -> Self {
        Self::for_request(
            request,
            OfferStatus::DryRun,
            "READ_ONLY mode, offer not sent".to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::offer::OfferType;

    #[test]
    fn result_reports_the_rate_sent() {
        let mut req = OfferRequest::limit("fUST", 200.0, 0.0003, 30);
        assert_eq!(OfferResult::dry_run(&req).rate, 0.0003);

        req.offer_type = OfferType::FrrDeltaVar;
        let res = OfferResult::failed(&req, "timeout".into());
        assert_eq!(res.rate, 0.0);
        assert_eq!(res.period, 30);
    }
}
