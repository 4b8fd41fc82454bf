use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::SubscriptionPlan;
use crate::models::vacancy::{BoostKind, Currency};

pub const SUBSCRIPTION_DAYS: i64 = 30;
pub const REFUND_WINDOW_DAYS: i64 = 30;
const TAX_PERCENT: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Subscription,
    Service,
    Boost,
    Refund,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    Electronic,
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Highlight,
    Urgent,
    Feature,
    DatabaseAccess,
    Analytics,
}

impl ServiceKind {
    pub fn price(&self) -> i64 {
        match self {
            ServiceKind::Highlight => 50_000,
            ServiceKind::Urgent => 30_000,
            ServiceKind::Feature => 150_000,
            ServiceKind::DatabaseAccess => 500_000,
            ServiceKind::Analytics => 80_000,
        }
    }

    /// Vacancy boost this service activates, if any.
    pub fn boost(&self) -> Option<BoostKind> {
        match self {
            ServiceKind::Highlight => Some(BoostKind::Highlight),
            ServiceKind::Urgent => Some(BoostKind::Urgent),
            ServiceKind::Feature => Some(BoostKind::Feature),
            ServiceKind::DatabaseAccess | ServiceKind::Analytics => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Highlight => "highlight",
            ServiceKind::Urgent => "urgent",
            ServiceKind::Feature => "feature",
            ServiceKind::DatabaseAccess => "database_access",
            ServiceKind::Analytics => "analytics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetModel {
    Vacancy,
    Company,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionDetails {
    pub plan: SubscriptionPlan,
    pub duration: i64,
    pub auto_renew: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItem {
    pub service: ServiceKind,
    pub target: Option<Uuid>,
    pub target_model: Option<TargetModel>,
    pub duration: Option<i64>,
    pub price: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentDetails {
    pub card_last4: Option<String>,
    pub card_brand: Option<String>,
    pub bank_name: Option<String>,
    pub transaction_id: Option<String>,
}

impl PaymentDetails {
    fn merge(&mut self, other: PaymentDetails) {
        if other.card_last4.is_some() {
            self.card_last4 = other.card_last4;
        }
        if other.card_brand.is_some() {
            self.card_brand = other.card_brand;
        }
        if other.bank_name.is_some() {
            self.bank_name = other.bank_name;
        }
        if other.transaction_id.is_some() {
            self.transaction_id = other.transaction_id;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusChange {
    pub status: PaymentStatus,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub payment_type: PaymentType,
    pub subscription: Option<Json<SubscriptionDetails>>,
    pub services: Json<Vec<ServiceItem>>,
    pub amount_total: i64,
    pub amount_subtotal: i64,
    pub amount_tax: i64,
    pub amount_discount: i64,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    pub payment_details: Json<PaymentDetails>,
    pub status: PaymentStatus,
    pub status_history: Json<Vec<PaymentStatusChange>>,
    pub invoice_number: String,
    pub description: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_successful(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    pub fn is_refundable(&self, now: DateTime<Utc>) -> bool {
        self.is_successful()
            && self
                .paid_at
                .map(|paid| now - paid < Duration::days(REFUND_WINDOW_DAYS))
                .unwrap_or(false)
    }

    /// Stub gateway confirmation: flips straight to `completed`.
    pub fn complete(&mut self, details: PaymentDetails, now: DateTime<Utc>) -> Result<()> {
        if !matches!(self.status, PaymentStatus::Pending | PaymentStatus::Processing) {
            return Err(Error::BadRequest(format!(
                "Payment cannot be completed from status {:?}",
                self.status
            )));
        }
        self.payment_details.0.merge(details);
        self.set_status(PaymentStatus::Completed, None, now);
        self.paid_at = Some(now);
        Ok(())
    }

    pub fn fail(&mut self, reason: Option<String>, now: DateTime<Utc>) -> Result<()> {
        if !matches!(self.status, PaymentStatus::Pending | PaymentStatus::Processing) {
            return Err(Error::BadRequest("Only open payments can fail".to_string()));
        }
        self.set_status(PaymentStatus::Failed, reason, now);
        Ok(())
    }

    pub fn refund(&mut self, reason: Option<String>, now: DateTime<Utc>) -> Result<()> {
        if !self.is_refundable(now) {
            return Err(Error::BadRequest(
                "Payment is not eligible for a refund".to_string(),
            ));
        }
        self.set_status(PaymentStatus::Refunded, reason, now);
        self.refunded_at = Some(now);
        Ok(())
    }

    pub fn receipt(&self) -> Receipt {
        let mut items: Vec<ReceiptItem> = self
            .services
            .0
            .iter()
            .map(|s| ReceiptItem {
                description: format!("Service: {}", s.service.as_str()),
                quantity: 1,
                price: to_major(s.price),
                amount: to_major(s.price),
            })
            .collect();
        if let Some(sub) = &self.subscription {
            items.push(ReceiptItem {
                description: format!(
                    "Subscription: {} for {} days",
                    sub.0.plan.as_str(),
                    sub.0.duration
                ),
                quantity: 1,
                price: to_major(self.amount_subtotal),
                amount: to_major(self.amount_subtotal),
            });
        }
        Receipt {
            invoice_number: self.invoice_number.clone(),
            date: self.paid_at.unwrap_or(self.created_at),
            customer: self.user_id,
            items,
            subtotal: to_major(self.amount_subtotal),
            tax: to_major(self.amount_tax),
            discount: to_major(self.amount_discount),
            total: to_major(self.amount_total),
            currency: self.currency,
        }
    }

    fn set_status(&mut self, status: PaymentStatus, reason: Option<String>, now: DateTime<Utc>) {
        self.status = status;
        self.status_history.0.push(PaymentStatusChange {
            status,
            reason,
            timestamp: now,
        });
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiptItem {
    pub description: String,
    pub quantity: i32,
    pub price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub invoice_number: String,
    pub date: DateTime<Utc>,
    pub customer: Uuid,
    pub items: Vec<ReceiptItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub currency: Currency,
}

fn to_major(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub subtotal: i64,
    pub tax: i64,
    pub discount: i64,
    pub total: i64,
}

pub fn plan_price(plan: SubscriptionPlan) -> Result<i64> {
    match plan {
        SubscriptionPlan::Basic => Ok(299_000),
        SubscriptionPlan::Standard => Ok(799_000),
        SubscriptionPlan::Premium => Ok(1_499_000),
        SubscriptionPlan::Free => Err(Error::BadRequest(
            "The free plan cannot be purchased".to_string(),
        )),
    }
}

pub fn plan_features(plan: SubscriptionPlan) -> Vec<String> {
    let features: &[&str] = match plan {
        SubscriptionPlan::Free => &[],
        SubscriptionPlan::Basic => &["1_vacancy", "basic_search", "50_applications"],
        SubscriptionPlan::Standard => &[
            "5_vacancies",
            "advanced_search",
            "200_applications",
            "highlight",
            "analytics",
        ],
        SubscriptionPlan::Premium => &[
            "15_vacancies",
            "full_search",
            "unlimited_applications",
            "all_features",
            "personal_manager",
        ],
    };
    features.iter().map(|f| f.to_string()).collect()
}

/// Subscriptions are billed at list price without tax.
pub fn subscription_quote(plan: SubscriptionPlan) -> Result<Quote> {
    let price = plan_price(plan)?;
    Ok(Quote {
        subtotal: price,
        tax: 0,
        discount: 0,
        total: price,
    })
}

/// Sum of line items plus 20% tax, rounded half away from zero.
pub fn service_quote(items: &[ServiceItem]) -> Quote {
    let subtotal: i64 = items.iter().map(|i| i.price).sum();
    let tax = (subtotal * TAX_PERCENT + 50) / 100;
    Quote {
        subtotal,
        tax,
        discount: 0,
        total: subtotal + tax,
    }
}

/// `INV-{last 6 digits of the ms clock}-{3 uppercase alphanumerics}`
pub fn generate_invoice_number(now: DateTime<Utc>) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..3)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!(
        "INV-{:06}-{}",
        now.timestamp_millis().rem_euclid(1_000_000),
        suffix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(service: ServiceKind) -> ServiceItem {
        ServiceItem {
            service,
            target: None,
            target_model: None,
            duration: None,
            price: service.price(),
        }
    }

    fn pending(now: DateTime<Utc>) -> Payment {
        let quote = subscription_quote(SubscriptionPlan::Standard).unwrap();
        Payment {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            payment_type: PaymentType::Subscription,
            subscription: Some(Json(SubscriptionDetails {
                plan: SubscriptionPlan::Standard,
                duration: SUBSCRIPTION_DAYS,
                auto_renew: false,
            })),
            services: Json(vec![]),
            amount_total: quote.total,
            amount_subtotal: quote.subtotal,
            amount_tax: quote.tax,
            amount_discount: quote.discount,
            currency: Currency::Rub,
            payment_method: PaymentMethod::Card,
            payment_details: Json(PaymentDetails::default()),
            status: PaymentStatus::Pending,
            status_history: Json(vec![]),
            invoice_number: generate_invoice_number(now),
            description: None,
            paid_at: None,
            refunded_at: None,
            expires_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn service_totals_add_twenty_percent_tax() {
        let quote = service_quote(&[item(ServiceKind::Highlight), item(ServiceKind::Urgent)]);
        assert_eq!(quote.subtotal, 80_000);
        assert_eq!(quote.tax, 16_000);
        assert_eq!(quote.total, 96_000);

        let odd = service_quote(&[ServiceItem {
            price: 13,
            ..item(ServiceKind::Analytics)
        }]);
        assert_eq!(odd.tax, 3);
    }

    #[test]
    fn subscription_quote_uses_plan_table() {
        assert_eq!(subscription_quote(SubscriptionPlan::Basic).unwrap().total, 299_000);
        assert_eq!(subscription_quote(SubscriptionPlan::Premium).unwrap().tax, 0);
        assert!(subscription_quote(SubscriptionPlan::Free).is_err());
        assert_eq!(plan_features(SubscriptionPlan::Standard).len(), 5);
        assert!(plan_features(SubscriptionPlan::Premium).contains(&"personal_manager".to_string()));
    }

    #[test]
    fn invoice_number_format() {
        let now = Utc::now();
        let inv = generate_invoice_number(now);
        let parts: Vec<&str> = inv.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert_eq!(parts[1].len(), 6);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 3);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn completing_sets_paid_at_and_history() {
        let now = Utc::now();
        let mut payment = pending(now);
        assert!(!payment.is_successful());

        payment
            .complete(
                PaymentDetails {
                    transaction_id: Some("demo_1".into()),
                    card_last4: Some("4242".into()),
                    ..Default::default()
                },
                now,
            )
            .unwrap();
        assert!(payment.is_successful());
        assert_eq!(payment.paid_at, Some(now));
        assert_eq!(payment.status_history.0.len(), 1);
        assert_eq!(payment.payment_details.0.card_last4.as_deref(), Some("4242"));
        assert!(payment.complete(PaymentDetails::default(), now).is_err());
    }

    #[test]
    fn refund_window_is_thirty_days() {
        let now = Utc::now();
        let mut payment = pending(now - Duration::days(40));
        assert!(!payment.is_refundable(now));
        payment
            .complete(PaymentDetails::default(), now - Duration::days(31))
            .unwrap();
        assert!(!payment.is_refundable(now));
        assert!(payment.refund(None, now).is_err());

        let mut recent = pending(now);
        recent.complete(PaymentDetails::default(), now).unwrap();
        recent.refund(Some("duplicate charge".into()), now).unwrap();
        assert_eq!(recent.status, PaymentStatus::Refunded);
        assert_eq!(recent.refunded_at, Some(now));
        assert_eq!(
            recent.status_history.0.last().unwrap().reason.as_deref(),
            Some("duplicate charge")
        );
    }

    #[test]
    fn failed_payment_cannot_complete() {
        let now = Utc::now();
        let mut payment = pending(now);
        payment.fail(Some("card declined".into()), now).unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);
        assert!(payment.complete(PaymentDetails::default(), now).is_err());
    }

    #[test]
    fn receipt_is_in_major_units() {
        let now = Utc::now();
        let mut payment = pending(now);
        payment.services = Json(vec![item(ServiceKind::Feature)]);
        payment.amount_subtotal = 150_000;
        payment.amount_tax = 30_000;
        payment.amount_total = 180_000;
        let receipt = payment.receipt();
        assert_eq!(receipt.items[0].price, Decimal::new(1500, 0));
        assert_eq!(receipt.total, Decimal::new(1800, 0));
        assert_eq!(receipt.date, now);
    }
}
