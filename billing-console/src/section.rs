use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named areas of the customer screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    CollectPayment,
    Renew,
    Subscription,
    AdjustBalance,
    AddOnBill,
    #[default]
    BalanceHistory,
    Hardware,
    FollowUp,
    Edit,
    Documents,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::CollectPayment,
        Section::Renew,
        Section::Subscription,
        Section::AdjustBalance,
        Section::AddOnBill,
        Section::BalanceHistory,
        Section::Hardware,
        Section::FollowUp,
        Section::Edit,
        Section::Documents,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Section::CollectPayment => "collect-payment",
            Section::Renew => "renew",
            Section::Subscription => "subscription",
            Section::AdjustBalance => "adjust-balance",
            Section::AddOnBill => "add-on-bill",
            Section::BalanceHistory => "balance-history",
            Section::Hardware => "hardware",
            Section::FollowUp => "follow-up",
            Section::Edit => "edit",
            Section::Documents => "documents",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.slug() == s.trim())
            .ok_or_else(|| format!("unknown section '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs_parse_back() {
        for section in Section::ALL {
            assert_eq!(section.slug().parse::<Section>().unwrap(), section);
        }
        assert!("billing".parse::<Section>().is_err());
    }

    #[test]
    fn test_serde_uses_slug() {
        let json = serde_json::to_string(&Section::AddOnBill).unwrap();
        assert_eq!(json, "\"add-on-bill\"");
    }
}
