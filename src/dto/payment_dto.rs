use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::payment::{Payment, PaymentType, ServiceKind, TargetModel};
use crate::models::user::SubscriptionPlan;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubscriptionPayload {
    #[validate(custom(function = "validate_paid_plan"))]
    pub plan: SubscriptionPlan,
    #[serde(default)]
    pub auto_renew: bool,
}

fn validate_paid_plan(plan: &SubscriptionPlan) -> Result<(), ValidationError> {
    if *plan == SubscriptionPlan::Free {
        let mut err = ValidationError::new("plan");
        err.message = Some("Choose basic, standard or premium".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServiceRequest {
    pub service: ServiceKind,
    pub target: Option<Uuid>,
    pub target_model: Option<TargetModel>,
    #[validate(range(min = 1, max = 365))]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServicesPayload {
    #[validate(length(min = 1, message = "Choose at least one service"), nested)]
    pub services: Vec<ServiceRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RefundPayload {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivatedSubscription {
    pub plan: SubscriptionPlan,
    pub expires_at: DateTime<Utc>,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub payment: Payment,
    pub subscription: ActivatedSubscription,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RevenueRow {
    pub year: i32,
    pub month: i32,
    pub payment_type: PaymentType,
    pub total_amount: i64,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_plan_is_not_purchasable() {
        let payload = SubscriptionPayload {
            plan: SubscriptionPlan::Free,
            auto_renew: false,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn services_need_at_least_one_item() {
        let payload: ServicesPayload = serde_json::from_value(serde_json::json!({
            "services": []
        }))
        .unwrap();
        assert!(payload.validate().is_err());

        let payload: ServicesPayload = serde_json::from_value(serde_json::json!({
            "services": [{ "service": "database_access" }]
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.services[0].service, ServiceKind::DatabaseAccess);
    }
}
