use crate::domain::{WalletEntry, WalletType};

/// Lendable balance of every funding wallet holding `currency`, in snapshot
/// order. Empty when the account has no such wallet.
pub fn extract_funding_balance(wallets: &[WalletEntry], currency: &str) -> Vec<f64> {
    wallets
        .iter()
        .filter(|w| w.wallet_type == WalletType::Funding && w.currency == currency)
        .map(WalletEntry::lendable)
        .collect()
}

/// Every funding wallet, any currency.
pub fn funding_wallets(wallets: &[WalletEntry]) -> Vec<&WalletEntry> {
    wallets
        .iter()
        .filter(|w| w.wallet_type == WalletType::Funding)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(kind: &str, currency: &str, balance: f64, available: Option<f64>) -> WalletEntry {
        WalletEntry {
            wallet_type: WalletType::parse(kind),
            currency: currency.to_string(),
            balance,
            unsettled_interest: 0.0,
            available_balance: available,
        }
    }

    #[test]
    fn picks_funding_wallet_for_currency() {
        let wallets = vec![
            wallet("exchange", "UST", 900.0, Some(900.0)),
            wallet("funding", "USD", 50.0, Some(50.0)),
            wallet("funding", "UST", 302.83, Some(151.0)),
            wallet("margin", "UST", 10.0, None),
        ];

        assert_eq!(extract_funding_balance(&wallets, "UST"), vec![151.0]);
        assert_eq!(extract_funding_balance(&wallets, "USD"), vec![50.0]);
    }

    #[test]
    fn falls_back_to_raw_balance() {
        let wallets = vec![wallet("funding", "UST", 302.83, None)];
        assert_eq!(extract_funding_balance(&wallets, "UST"), vec![302.83]);
    }

    #[test]
    fn keeps_encounter_order_for_multiple_matches() {
        let wallets = vec![
            wallet("funding", "UST", 1.0, Some(1.0)),
            wallet("funding", "UST", 2.0, Some(2.0)),
        ];
        assert_eq!(extract_funding_balance(&wallets, "UST"), vec![1.0, 2.0]);
    }

    #[test]
    fn empty_when_no_match() {
        let wallets = vec![wallet("exchange", "UST", 900.0, None)];
        assert!(extract_funding_balance(&wallets, "UST").is_empty());
        assert!(extract_funding_balance(&[], "UST").is_empty());
    }

    #[test]
    fn lists_only_funding_wallets() {
        let wallets = vec![
            wallet("exchange", "UST", 900.0, None),
            wallet("funding", "USD", 50.0, None),
        ];
        let funding = funding_wallets(&wallets);
        assert_eq!(funding.len(), 1);
        assert_eq!(funding[0].currency, "USD");
    }
}
