use crate::cli::{ActionArg, Cli, Command};
use crate::fixture::OfflineFixture;
use crate::render;
use anyhow::{bail, Context, Result};
use billing_console::{CustomerWorkspace, DeleteConfirmation, DraftTab, Preview, WorkspaceSettings};
use chrono::{Local, Utc};
use config_engine::{ConfigEngine, ConsoleConfig};
use dialoguer::{theme::ColorfulTheme, Confirm};
use ledger_client::{HttpLedgerClient, PaymentMethod, Transaction};
use std::sync::Arc;
use uuid::Uuid;

/// Asks on the terminal before a ledger entry is removed
pub struct PromptConfirmation {
    pub assume_yes: bool,
}

impl DeleteConfirmation for PromptConfirmation {
    fn confirm(&self, entry: &Transaction) -> bool {
        if self.assume_yes {
            return true;
        }
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete {}? This cannot be undone", render::entry(entry)))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// Load configuration, install logging and run one command
pub async fn run(cli: Cli) -> Result<()> {
    let config = ConfigEngine::from_default_sources(cli.config.as_deref()).context("loading configuration")?;

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    logger_redacted::init(&logging).context("initialising logging")?;

    let workspace = build_workspace(&config, cli.offline.as_deref())?;
    execute(&workspace, cli.command).await
}

pub fn build_workspace(config: &ConsoleConfig, offline: Option<&std::path::Path>) -> Result<CustomerWorkspace> {
    let settings = WorkspaceSettings::from_config(config);
    let workspace = match offline {
        Some(path) => {
            let ledger = Arc::new(OfflineFixture::load(path)?.into_ledger());
            tracing::info!(fixture = %path.display(), "Running against offline ledger");
            CustomerWorkspace::new(ledger.clone(), ledger.clone(), ledger)
        }
        None => {
            let client = Arc::new(HttpLedgerClient::from_config(config).context("building ledger client")?);
            CustomerWorkspace::new(client.clone(), client.clone(), client)
        }
    };
    Ok(workspace.with_settings(settings))
}

pub async fn execute(workspace: &CustomerWorkspace, command: Command) -> Result<()> {
    match command {
        Command::Summary { customer } => {
            let projection = workspace.open_customer(customer).await?;
            println!("{}", render::summary(&projection));
        }
        Command::History { customer } => {
            let projection = workspace.open_customer(customer).await?;
            println!("{}", render::history(projection.history()));
        }
        Command::Plans => {
            let catalog = workspace.load_catalog().await?;
            println!("{}", render::plans(&catalog));
        }
        Command::Pay {
            customer,
            amount,
            discount,
            method,
            comment,
            invoice,
        } => pay(workspace, customer, amount, discount, method, comment, invoice).await?,
        Command::Adjust {
            customer,
            new_balance,
            reason,
        } => {
            workspace.open_customer(customer).await?;
            workspace.update_adjustment_form(|form| {
                form.new_balance = new_balance;
                form.reason = reason.unwrap_or_default();
            });
            let delta = workspace.adjustment_delta()?;
            let entry = workspace.submit_adjustment().await?;
            render::success(&format!(
                "Balance adjusted by {delta}: {} → {}",
                entry.balance_before, entry.balance_after
            ));
        }
        Command::AddOn { customer, item, price } => {
            workspace.open_customer(customer).await?;
            workspace.update_add_on_form(|form| {
                form.item_name = item;
                form.price = price;
            });
            let projected = workspace.add_on_projection()?;
            let invoice = workspace.submit_add_on().await?;
            render::success(&format!(
                "Add-on billed for {}, balance now {projected}",
                invoice.amount_total
            ));
        }
        Command::Renew {
            customer,
            months,
            from_last_invoice,
            plans,
            fixed_amount,
            additional,
            action,
            today,
        } => {
            let renewal = Renewal {
                months,
                from_last_invoice,
                plan_codes: plans,
                fixed_amount,
                additional,
                action,
                today: today.unwrap_or_else(|| Local::now().date_naive()),
            };
            renew(workspace, customer, renewal).await?;
        }
        Command::Delete { customer, yes } => {
            workspace.open_customer(customer).await?;
            let confirmation = PromptConfirmation { assume_yes: yes };
            match workspace.delete_latest(&confirmation).await {
                Ok(entry) => render::success(&format!("Deleted {}", render::entry(&entry))),
                Err(billing_console::ConsoleError::Cancelled) => println!("Nothing deleted"),
                Err(err) => return Err(err.into()),
            }
        }
        Command::Show { customer, position } => {
            workspace.open_customer(customer).await?;
            let preview = workspace.open_preview(position).await?;
            println!("{}", render::preview(&preview));
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn pay(
    workspace: &CustomerWorkspace,
    customer: Uuid,
    amount: String,
    discount: String,
    method: PaymentMethod,
    comment: Option<String>,
    invoice: Option<Uuid>,
) -> Result<()> {
    workspace.open_customer(customer).await?;
    workspace.update_payment_form(|form| {
        form.amount = amount;
        form.discount = discount;
        form.method = method;
        form.comments = comment.unwrap_or_default();
        form.invoice_id = invoice;
        form.recorded_at = Some(Utc::now());
    });
    println!("{}", render::payment_preview(&workspace.payment_preview()?));

    let payment = workspace.submit_payment().await?;
    let balance = workspace.projection().map(|p| p.balance()).unwrap_or_default();
    render::success(&format!(
        "Payment {} recorded, balance now {balance}",
        payment.id
    ));
    Ok(())
}

struct Renewal {
    months: Option<u32>,
    from_last_invoice: bool,
    plan_codes: Vec<String>,
    fixed_amount: Option<String>,
    additional: Option<String>,
    action: ActionArg,
    today: chrono::NaiveDate,
}

async fn renew(workspace: &CustomerWorkspace, customer: Uuid, renewal: Renewal) -> Result<()> {
    workspace.open_customer(customer).await?;

    if !renewal.plan_codes.is_empty() {
        let catalog = workspace.load_catalog().await?;
        for code in &renewal.plan_codes {
            let Some(plan) = catalog.iter().find(|p| p.code.eq_ignore_ascii_case(code)) else {
                bail!("unknown plan code '{code}'");
            };
            if !workspace.selected_plans().iter().any(|p| p.id == plan.id) {
                workspace.toggle_plan(plan.id);
            }
        }
    }

    let tab = if renewal.plan_codes.is_empty() && renewal.fixed_amount.is_some() {
        DraftTab::FixedAmount
    } else {
        DraftTab::Plans
    };
    workspace.open_bill_draft(tab)?;
    if let Some(fixed) = renewal.fixed_amount {
        workspace.update_draft(|draft| {
            draft.fixed_amount = fixed;
            Ok(())
        })?;
    }

    let period = workspace.stage_renewal(renewal.today, renewal.from_last_invoice, renewal.months)?;
    if let Some(additional) = renewal.additional {
        workspace.update_draft(|draft| draft.set_additional_amount(&additional))?;
    }

    let draft = workspace.draft();
    println!("Billing period {period}");
    for item in draft.items() {
        println!("  - {} {}", item.name, item.total_amount);
    }
    println!(
        "Subtotal {}, additional {}, previous balance {}, grand total {}",
        draft.subtotal(),
        draft.additional_amount(),
        draft.prev_balance(),
        draft.grand_total()
    );

    let invoice = workspace.submit_bill_draft(renewal.action.into()).await?;
    render::success(&format!("Invoice {} generated for {}", invoice.id, invoice.amount_total));

    match renewal.action {
        ActionArg::Collect => {
            let form = workspace.payment_form();
            println!(
                "Collect with: netledger pay {customer} {} --invoice {}",
                form.amount,
                invoice.id
            );
        }
        ActionArg::View => {
            if let Some(preview @ Preview::Invoice(_)) = workspace.preview() {
                println!("{}", render::preview(&preview));
            }
        }
        ActionArg::Generate => {}
    }
    Ok(())
}
