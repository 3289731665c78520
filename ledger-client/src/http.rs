//! REST binding for the ledger, catalog and customer directory

use crate::error::{LedgerError, LedgerResult};
use crate::models::{BalanceSummary, Customer, Invoice, Payment, Plan, Transaction};
use crate::requests::{NewAddOnBill, NewBalanceAdjustment, NewPayment, NewSubscriptionInvoice};
use crate::service::{CatalogService, CustomerDirectory, LedgerService};
use async_trait::async_trait;
use config_engine::ConsoleConfig;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Error body the ledger sends with non-success replies
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// HTTP client for the remote ledger
pub struct HttpLedgerClient {
    ledger_url: String,
    catalog_url: String,
    auth_token: Option<SecretString>,
    client: reqwest::Client,
}

impl HttpLedgerClient {
    /// Create a client with a per-request timeout
    pub fn new(ledger_url: &str, timeout: Duration) -> LedgerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("netledger/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let ledger_url = ledger_url.trim_end_matches('/').to_string();
        Ok(Self {
            catalog_url: ledger_url.clone(),
            ledger_url,
            auth_token: None,
            client,
        })
    }

    pub fn from_config(config: &ConsoleConfig) -> LedgerResult<Self> {
        let mut client = Self::new(&config.ledger.base_url, config.request_timeout())?
            .with_catalog_url(config.catalog_url());
        if let Some(token) = &config.ledger.auth_token {
            client = client.with_auth_token(token.clone());
        }
        Ok(client)
    }

    pub fn with_catalog_url(mut self, catalog_url: &str) -> Self {
        self.catalog_url = catalog_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_auth_token(mut self, token: SecretString) -> Self {
        self.auth_token = Some(token);
        self
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let req = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    fn ledger(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, format!("{}{}", self.ledger_url, path))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        resource: &'static str,
        id: impl ToString,
    ) -> LedgerResult<T> {
        let response = Self::check(req.send().await?, resource, id).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        resource: &'static str,
        id: impl ToString,
    ) -> LedgerResult<T> {
        self.fetch(self.ledger(Method::POST, path).json(body), resource, id)
            .await
    }

    async fn delete(&self, path: &str, resource: &'static str, id: Uuid) -> LedgerResult<()> {
        let response = self.ledger(Method::DELETE, path).send().await?;
        Self::check(response, resource, id).await?;
        Ok(())
    }

    /// Map non-success replies onto NotFound / Rejected
    async fn check(response: Response, resource: &'static str, id: impl ToString) -> LedgerResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(LedgerError::not_found(resource, id));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        tracing::warn!(status = status.as_u16(), resource, %message, "Ledger rejected request");
        Err(LedgerError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl LedgerService for HttpLedgerClient {
    async fn balance_summary(&self, customer_id: Uuid) -> LedgerResult<BalanceSummary> {
        let path = format!("/customers/{customer_id}/ledger/summary");
        self.fetch(self.ledger(Method::GET, &path), "customer", customer_id)
            .await
    }

    async fn transaction_history(&self, customer_id: Uuid) -> LedgerResult<Vec<Transaction>> {
        let path = format!("/customers/{customer_id}/ledger/transactions");
        self.fetch(self.ledger(Method::GET, &path), "customer", customer_id)
            .await
    }

    async fn create_payment(&self, customer_id: Uuid, payment: NewPayment) -> LedgerResult<Payment> {
        let path = format!("/customers/{customer_id}/payments");
        self.post(&path, &payment, "customer", customer_id).await
    }

    async fn create_balance_adjustment(
        &self,
        customer_id: Uuid,
        adjustment: NewBalanceAdjustment,
    ) -> LedgerResult<Transaction> {
        let path = format!("/customers/{customer_id}/balance-adjustments");
        self.post(&path, &adjustment, "customer", customer_id).await
    }

    async fn create_add_on_bill(&self, customer_id: Uuid, add_on: NewAddOnBill) -> LedgerResult<Invoice> {
        let path = format!("/customers/{customer_id}/add-on-bills");
        self.post(&path, &add_on, "customer", customer_id).await
    }

    async fn create_subscription_invoice(
        &self,
        customer_id: Uuid,
        draft: NewSubscriptionInvoice,
    ) -> LedgerResult<Invoice> {
        let path = format!("/customers/{customer_id}/invoices");
        self.post(&path, &draft, "customer", customer_id).await
    }

    async fn get_invoice(&self, invoice_id: Uuid) -> LedgerResult<Invoice> {
        let path = format!("/invoices/{invoice_id}");
        self.fetch(self.ledger(Method::GET, &path), "invoice", invoice_id)
            .await
    }

    async fn get_payment(&self, payment_id: Uuid) -> LedgerResult<Payment> {
        let path = format!("/payments/{payment_id}");
        self.fetch(self.ledger(Method::GET, &path), "payment", payment_id)
            .await
    }

    async fn delete_transaction(&self, transaction_id: Uuid) -> LedgerResult<()> {
        self.delete(&format!("/transactions/{transaction_id}"), "transaction", transaction_id)
            .await
    }

    async fn delete_payment(&self, payment_id: Uuid) -> LedgerResult<()> {
        self.delete(&format!("/payments/{payment_id}"), "payment", payment_id)
            .await
    }
}

#[async_trait]
impl CatalogService for HttpLedgerClient {
    async fn list_active_plans(&self) -> LedgerResult<Vec<Plan>> {
        let req = self
            .request(Method::GET, format!("{}/plans", self.catalog_url))
            .query(&[("status", "active")]);
        let plans: Vec<Plan> = self.fetch(req, "plan catalog", "active").await?;
        Ok(plans.into_iter().filter(|p| p.active).collect())
    }
}

#[async_trait]
impl CustomerDirectory for HttpLedgerClient {
    async fn get_customer(&self, customer_id: Uuid) -> LedgerResult<Customer> {
        let path = format!("/customers/{customer_id}");
        self.fetch(self.ledger(Method::GET, &path), "customer", customer_id)
            .await
    }
}
