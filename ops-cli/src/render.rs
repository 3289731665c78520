//! Terminal output for the operator CLI

use billing_console::{ActionGate, LedgerProjection, PaymentPreview, Preview, TransactionHistory};
use colored::{ColoredString, Colorize};
use ledger_client::{Direction, Invoice, Payment, Plan, Transaction, TransactionKind};
use rust_decimal::Decimal;
use std::fmt::Write;

fn money(amount: Decimal) -> String {
    format!("₹{}", amount.round_dp(2))
}

/// Owed balances in red, credit in green
fn balance(amount: Decimal) -> ColoredString {
    let text = money(amount);
    if amount > Decimal::ZERO {
        text.red().bold()
    } else {
        text.green().bold()
    }
}

fn kind_label(entry: &Transaction) -> &'static str {
    match entry.kind {
        TransactionKind::Invoice if entry.is_subscription_invoice() => "Subscription bill",
        TransactionKind::Invoice => "Invoice",
        TransactionKind::Payment => "Payment",
        TransactionKind::BalanceAdjustment => "Adjustment",
        TransactionKind::AddOnBill => "Add-on bill",
    }
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

pub fn summary(projection: &LedgerProjection) -> String {
    let customer = projection.customer();
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", customer.name.bold(), customer.phone);
    if let Some(area) = &customer.area {
        let _ = writeln!(out, "  Area:          {area}");
    }
    let _ = writeln!(out, "  Balance:       {}", balance(projection.balance()));

    match projection.last_bill() {
        Some(bill) => {
            let period = match (bill.period_start, bill.period_end) {
                (Some(from), Some(to)) => format!(" for {from} to {to}"),
                _ => String::new(),
            };
            let _ = writeln!(
                out,
                "  Last bill:     {} on {}{}",
                money(bill.amount_total),
                bill.created_at.format("%Y-%m-%d"),
                period
            );
        }
        None => {
            let _ = writeln!(out, "  Last bill:     {}", "none".dimmed());
        }
    }
    match projection.last_payment() {
        Some(payment) => {
            let _ = writeln!(
                out,
                "  Last payment:  {} via {} on {}",
                money(payment.amount),
                payment.method,
                payment.collected_at.format("%Y-%m-%d")
            );
        }
        None => {
            let _ = writeln!(out, "  Last payment:  {}", "none".dimmed());
        }
    }

    for subscription in &customer.subscriptions {
        let _ = writeln!(
            out,
            "  Plan:          {} {} every {} month(s), {:?}",
            subscription.plan_name,
            money(subscription.price),
            subscription.cycle_months,
            subscription.status
        );
    }
    if let Some(legacy) = &customer.legacy_subscription {
        let _ = writeln!(out, "  Plan (legacy): {} {}", legacy.plan_name, money(legacy.price));
    }

    let _ = write!(out, "  Actions:       {}", actions(projection.actions()));
    out
}

fn actions(gate: ActionGate) -> String {
    [
        (gate.collect_payment, "pay"),
        (gate.renew, "renew"),
        (gate.renew_from_last_invoice, "renew --from-last-invoice"),
        (gate.adjust_balance, "adjust"),
        (gate.add_on_bill, "add-on"),
        (gate.delete_latest, "delete"),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .map(|(_, name)| name)
    .collect::<Vec<_>>()
    .join(", ")
}

pub fn history(history: &TransactionHistory) -> String {
    if history.is_empty() {
        return "No ledger entries".dimmed().to_string();
    }
    let mut out = String::new();
    for (position, entry) in history.entries().iter().enumerate() {
        let amount = match entry.direction {
            Direction::Debit => format!("+{}", money(entry.amount)).red(),
            Direction::Credit => format!("-{}", money(entry.amount)).green(),
        };
        let marker = if history.is_deletable(position) {
            " [deletable]".yellow().to_string()
        } else {
            String::new()
        };
        let warning = if entry.is_balanced() {
            String::new()
        } else {
            " [balance mismatch]".red().bold().to_string()
        };
        let _ = writeln!(
            out,
            "{:>3}  {}  {:<17} {:>12}  {} → {}  {}{}{}",
            position,
            entry.transaction_date.format("%Y-%m-%d %H:%M"),
            kind_label(entry),
            amount,
            money(entry.balance_before),
            money(entry.balance_after),
            entry.description,
            marker,
            warning
        );
    }
    out.trim_end().to_string()
}

pub fn plans(catalog: &[Plan]) -> String {
    if catalog.is_empty() {
        return "No active plans".dimmed().to_string();
    }
    catalog
        .iter()
        .map(|plan| format!("{:<10} {:<30} {}/month", plan.code.bold(), plan.name, money(plan.monthly_price)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn invoice(invoice: &Invoice) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Invoice".bold(), invoice.id);
    let _ = writeln!(out, "  Kind:      {:?}", invoice.invoice_kind);
    if let (Some(from), Some(to)) = (invoice.period_start, invoice.period_end) {
        let _ = writeln!(out, "  Period:    {from} to {to}");
    }
    if let Some(due) = invoice.due_date {
        let _ = writeln!(out, "  Due:       {due}");
    }
    for item in &invoice.items {
        let _ = writeln!(
            out,
            "  - {:<28} {} × {} = {}",
            item.name,
            item.quantity.normalize(),
            money(item.unit_price),
            money(item.total_amount)
        );
    }
    let _ = writeln!(out, "  Subtotal:  {}", money(invoice.subtotal));
    if !invoice.tax_amount.is_zero() {
        let _ = writeln!(out, "  Tax:       {}", money(invoice.tax_amount));
    }
    let _ = writeln!(out, "  Total:     {}", money(invoice.amount_total).bold());
    let _ = writeln!(out, "  Paid:      {}", money(invoice.total_paid));
    let _ = write!(out, "  Status:    {:?}", invoice.status);
    out
}

pub fn payment(payment: &Payment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Payment".bold(), payment.id);
    let _ = writeln!(out, "  Amount:    {}", money(payment.amount));
    if !payment.discount.is_zero() {
        let _ = writeln!(out, "  Discount:  {}", money(payment.discount));
    }
    let _ = writeln!(out, "  Method:    {}", payment.method);
    let _ = write!(out, "  Collected: {}", payment.collected_at.format("%Y-%m-%d %H:%M"));
    if let Some(by) = &payment.collected_by {
        let _ = write!(out, " by {by}");
    }
    if let Some(invoice_id) = payment.invoice_id {
        let _ = write!(out, "\n  Invoice:   {invoice_id}");
    }
    if let Some(comments) = payment.comments.as_deref().filter(|c| !c.is_empty()) {
        let _ = write!(out, "\n  Comments:  {comments}");
    }
    out
}

pub fn preview(preview: &Preview) -> String {
    match preview {
        Preview::Invoice(inv) => invoice(inv),
        Preview::Payment(pay) => payment(pay),
    }
}

pub fn payment_preview(preview: &PaymentPreview) -> String {
    let mut out = format!(
        "Total payable {}, balance after payment {}",
        money(preview.total_payable),
        balance(preview.projected_balance)
    );
    if preview.discount_exceeds_amount {
        out.push_str(&format!("\n{}", "Discount is larger than the amount".yellow()));
    }
    out
}

pub fn entry(entry: &Transaction) -> String {
    format!(
        "{} of {} on {} ({} → {})",
        kind_label(entry),
        money(entry.amount),
        entry.transaction_date.format("%Y-%m-%d %H:%M"),
        money(entry.balance_before),
        money(entry.balance_after)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ledger_client::{PaymentMethod, ReferenceType, TransactionReference};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn plain() {
        colored::control::set_override(false);
    }

    fn payment_entry(hour: u32, before: Decimal, amount: Decimal) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            kind: TransactionKind::Payment,
            transaction_date: Utc.with_ymd_and_hms(2024, 4, 1, hour, 0, 0).unwrap(),
            balance_before: before,
            balance_after: before - amount,
            direction: Direction::Credit,
            amount,
            reference: Some(TransactionReference {
                ref_type: ReferenceType::Payment,
                id: Uuid::new_v4(),
            }),
            description: "Cash".to_string(),
            invoice_kind: None,
        }
    }

    #[test]
    fn test_history_marks_only_latest_as_deletable() {
        plain();
        let entries = TransactionHistory::new(vec![
            payment_entry(9, dec!(500), dec!(100)),
            payment_entry(10, dec!(400), dec!(100)),
        ]);
        let text = history(&entries);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  0  2024-04-01 10:00"));
        assert!(lines[0].contains("[deletable]"));
        assert!(!lines[1].contains("[deletable]"));
        assert!(lines[0].contains("-₹100"));
    }

    #[test]
    fn test_mismatched_balance_is_flagged() {
        plain();
        let mut broken = payment_entry(9, dec!(500), dec!(100));
        broken.balance_after = dec!(450);
        let text = history(&TransactionHistory::new(vec![broken]));
        assert!(text.contains("[balance mismatch]"));
    }

    #[test]
    fn test_payment_detail() {
        plain();
        let text = payment(&Payment {
            id: Uuid::nil(),
            invoice_id: None,
            amount: dec!(800),
            discount: dec!(68),
            method: PaymentMethod::Upi,
            collected_at: Utc.with_ymd_and_hms(2024, 4, 2, 11, 30, 0).unwrap(),
            comments: Some("April".to_string()),
            collected_by: None,
        });
        assert!(text.contains("Amount:    ₹800"));
        assert!(text.contains("Discount:  ₹68"));
        assert!(text.contains("Method:    UPI"));
        assert!(text.contains("Comments:  April"));
    }

    #[test]
    fn test_payment_preview_warns_on_large_discount() {
        plain();
        let text = payment_preview(&PaymentPreview {
            total_payable: dec!(150),
            projected_balance: dec!(0),
            discount_exceeds_amount: true,
        });
        assert!(text.contains("Total payable ₹150"));
        assert!(text.contains("Discount is larger"));
    }

    #[test]
    fn test_empty_catalog() {
        plain();
        assert_eq!(plans(&[]), "No active plans");
    }
}
