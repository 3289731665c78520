use billing_console::SubmitAction;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use ledger_client::PaymentMethod;
use std::path::PathBuf;
use uuid::Uuid;

/// NetLedger operator console
#[derive(Parser, Debug)]
#[command(name = "netledger", version)]
#[command(about = "Customer balance ledger console for subscription billing")]
pub struct Cli {
    /// Configuration file (defaults to ./netledger.yaml when present)
    #[arg(short, long, env = "NETLEDGER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Run against an in-process ledger seeded from a YAML fixture
    #[arg(long, value_name = "FIXTURE", global = true)]
    pub offline: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Balance, last bill, last payment and available actions
    Summary { customer: Uuid },

    /// Ledger entries, newest first
    History { customer: Uuid },

    /// Active plan catalog
    Plans,

    /// Collect a payment
    Pay {
        customer: Uuid,
        amount: String,
        #[arg(long, default_value = "0")]
        discount: String,
        #[arg(long, default_value = "CASH")]
        method: PaymentMethod,
        #[arg(long)]
        comment: Option<String>,
        /// Invoice this payment settles
        #[arg(long)]
        invoice: Option<Uuid>,
    },

    /// Set the balance to an exact figure
    Adjust {
        customer: Uuid,
        #[arg(allow_hyphen_values = true)]
        new_balance: String,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Bill a one-off item
    AddOn {
        customer: Uuid,
        item: String,
        price: String,
    },

    /// Generate a renewal invoice
    Renew {
        customer: Uuid,
        /// Months covered; defaults to the subscription cycle
        #[arg(long)]
        months: Option<u32>,
        /// Continue from the end of the last invoiced period
        #[arg(long)]
        from_last_invoice: bool,
        /// Plan code to bill; repeat for several plans
        #[arg(long = "plan", value_name = "CODE")]
        plans: Vec<String>,
        /// Bill a fixed amount when no plan or subscription applies
        #[arg(long)]
        fixed_amount: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        additional: Option<String>,
        #[arg(long, value_enum, default_value_t = ActionArg::Generate)]
        action: ActionArg,
        /// Override today's date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Delete the latest ledger entry
    Delete {
        customer: Uuid,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show the invoice or payment behind a history row
    Show {
        customer: Uuid,
        /// Row number as printed by `history`, starting at 0
        position: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionArg {
    /// Generate & Collect
    Collect,
    Generate,
    /// Generate & View
    View,
}

impl From<ActionArg> for SubmitAction {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::Collect => SubmitAction::GenerateAndCollect,
            ActionArg::Generate => SubmitAction::Generate,
            ActionArg::View => SubmitAction::GenerateAndView,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_payment() {
        let id = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from([
            "netledger", "pay", &id, "1000", "--discount", "200", "--method", "phonepe",
        ])
        .unwrap();
        match cli.command {
            Command::Pay {
                amount,
                discount,
                method,
                ..
            } => {
                assert_eq!(amount, "1000");
                assert_eq!(discount, "200");
                assert_eq!(method, PaymentMethod::PhonePe);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_negative_adjustment_parses() {
        let id = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from(["netledger", "adjust", &id, "-150"]).unwrap();
        assert!(matches!(cli.command, Command::Adjust { ref new_balance, .. } if new_balance == "-150"));
    }

    #[test]
    fn test_renew_with_plans() {
        let id = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from([
            "netledger", "renew", &id, "--plan", "F100", "--plan", "IPTV", "--action", "collect",
            "--today", "2024-04-01",
        ])
        .unwrap();
        match cli.command {
            Command::Renew {
                plans,
                action,
                today,
                ..
            } => {
                assert_eq!(plans, vec!["F100", "IPTV"]);
                assert_eq!(SubmitAction::from(action), SubmitAction::GenerateAndCollect);
                assert_eq!(today, NaiveDate::from_ymd_opt(2024, 4, 1));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
