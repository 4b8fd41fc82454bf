use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::payment_dto::{
    ActivatedSubscription, HistoryQuery, ServicesPayload, SubscriptionPayload,
    SubscriptionResponse,
};
use crate::error::{unique_violation, Error, Result};
use crate::middleware::auth::CurrentUser;
use crate::models::payment::{
    generate_invoice_number, plan_features, service_quote, subscription_quote, Payment,
    PaymentDetails, PaymentMethod, PaymentType, Quote, Receipt, ServiceItem, SubscriptionDetails,
    TargetModel, SUBSCRIPTION_DAYS,
};
use crate::models::vacancy::Currency;
use crate::services::user_service::UserService;
use crate::services::vacancy_service::VacancyService;
use crate::utils::{time, token::generate_access_token};

const INVOICE_ATTEMPTS: usize = 3;
const DEFAULT_HISTORY_LIMIT: i64 = 10;
const MAX_HISTORY_LIMIT: i64 = 100;

struct NewPayment {
    user_id: Uuid,
    payment_type: PaymentType,
    subscription: Option<SubscriptionDetails>,
    services: Vec<ServiceItem>,
    quote: Quote,
    description: String,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct PaymentService {
    pool: PgPool,
    users: UserService,
    vacancies: VacancyService,
}

impl PaymentService {
    pub fn new(pool: PgPool, users: UserService, vacancies: VacancyService) -> Self {
        Self {
            pool,
            users,
            vacancies,
        }
    }

    pub async fn subscribe(
        &self,
        user_id: Uuid,
        payload: SubscriptionPayload,
    ) -> Result<SubscriptionResponse> {
        let quote = subscription_quote(payload.plan)?;
        let now = time::now();
        let expires_at = now + Duration::days(SUBSCRIPTION_DAYS);

        let pending = self
            .insert(NewPayment {
                user_id,
                payment_type: PaymentType::Subscription,
                subscription: Some(SubscriptionDetails {
                    plan: payload.plan,
                    duration: SUBSCRIPTION_DAYS,
                    auto_renew: payload.auto_renew,
                }),
                services: Vec::new(),
                quote,
                description: format!("Subscription {}", payload.plan.as_str()),
                expires_at: Some(expires_at),
            })
            .await?;
        let payment = self.settle(pending).await?;

        let features = plan_features(payload.plan);
        self.users
            .activate_subscription(user_id, payload.plan, expires_at, &features, payload.auto_renew)
            .await?;

        Ok(SubscriptionResponse {
            payment,
            subscription: ActivatedSubscription {
                plan: payload.plan,
                expires_at,
                features,
            },
        })
    }

    pub async fn purchase_services(&self, user_id: Uuid, payload: ServicesPayload) -> Result<Payment> {
        let mut items = Vec::with_capacity(payload.services.len());
        for request in payload.services {
            if request.service.boost().is_some() {
                let target = request.target.ok_or_else(|| {
                    Error::BadRequest("Boost services need a target vacancy".to_string())
                })?;
                if request.target_model.unwrap_or(TargetModel::Vacancy) != TargetModel::Vacancy {
                    return Err(Error::BadRequest(
                        "Boost services can only target vacancies".to_string(),
                    ));
                }
                self.vacancies.owned_by(target, user_id).await?;
            }
            items.push(ServiceItem {
                service: request.service,
                target: request.target,
                target_model: request.target_model,
                duration: request.duration,
                price: request.service.price(),
            });
        }

        let quote = service_quote(&items);
        let description = items
            .iter()
            .map(|i| i.service.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let pending = self
            .insert(NewPayment {
                user_id,
                payment_type: PaymentType::Service,
                subscription: None,
                services: items,
                quote,
                description: format!("Services: {}", description),
                expires_at: None,
            })
            .await?;
        let payment = self.settle(pending).await?;

        for item in payment.services.0.iter() {
            if let (Some(kind), Some(target)) = (item.service.boost(), item.target) {
                let days = item.duration.unwrap_or_else(|| kind.default_days());
                self.vacancies.boost(target, user_id, kind, days).await?;
            }
        }

        Ok(payment)
    }

    pub async fn history(&self, user_id: Uuid, query: HistoryQuery) -> Result<Vec<Payment>> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    pub async fn receipt(&self, id: Uuid, caller: &CurrentUser) -> Result<Receipt> {
        let payment = self.find(id).await?;
        if payment.user_id != caller.id && !caller.is_admin() {
            return Err(Error::Forbidden(
                "You can only view your own receipts".to_string(),
            ));
        }
        Ok(payment.receipt())
    }

    pub async fn refund(&self, id: Uuid, reason: Option<String>) -> Result<Payment> {
        let mut payment = self.find(id).await?;
        payment.refund(reason, time::now())?;
        let payment = self.persist(&payment).await?;
        warn!(payment_id = %id, amount = payment.amount_total, "payment refunded");
        Ok(payment)
    }

    async fn find(&self, id: Uuid) -> Result<Payment> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Payment not found".to_string()))
    }

    async fn insert(&self, new: NewPayment) -> Result<Payment> {
        let subscription = new.subscription.map(Json);
        let services = Json(new.services);

        for attempt in 1..=INVOICE_ATTEMPTS {
            let invoice_number = generate_invoice_number(time::now());
            let result = sqlx::query_as::<_, Payment>(
                r#"
                INSERT INTO payments (
                    user_id, payment_type, subscription, services,
                    amount_total, amount_subtotal, amount_tax, amount_discount,
                    currency, payment_method, invoice_number, description, expires_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                RETURNING *
                "#,
            )
            .bind(new.user_id)
            .bind(new.payment_type)
            .bind(&subscription)
            .bind(&services)
            .bind(new.quote.total)
            .bind(new.quote.subtotal)
            .bind(new.quote.tax)
            .bind(new.quote.discount)
            .bind(Currency::Rub)
            .bind(PaymentMethod::Card)
            .bind(&invoice_number)
            .bind(&new.description)
            .bind(new.expires_at)
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(payment) => return Ok(payment),
                Err(e) if unique_violation(&e).is_some() && attempt < INVOICE_ATTEMPTS => {
                    warn!(invoice_number = %invoice_number, attempt, "invoice number collision");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::Internal(
            "could not allocate an invoice number".to_string(),
        ))
    }

    /// Stub gateway: every charge succeeds with a demo card.
    async fn settle(&self, mut payment: Payment) -> Result<Payment> {
        let details = PaymentDetails {
            card_last4: Some("4242".to_string()),
            card_brand: Some("visa".to_string()),
            bank_name: None,
            transaction_id: Some(format!("demo_{}", generate_access_token(16))),
        };
        payment.complete(details, time::now())?;
        let payment = self.persist(&payment).await?;
        info!(
            payment_id = %payment.id,
            invoice = %payment.invoice_number,
            total = payment.amount_total,
            "payment completed"
        );
        Ok(payment)
    }

    async fn persist(&self, payment: &Payment) -> Result<Payment> {
        let saved = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET
                status = $2,
                status_history = $3,
                payment_details = $4,
                paid_at = $5,
                refunded_at = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment.id)
        .bind(payment.status)
        .bind(&payment.status_history)
        .bind(&payment.payment_details)
        .bind(payment.paid_at)
        .bind(payment.refunded_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }
}
