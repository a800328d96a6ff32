use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Usage limits for a subscription tier. A value of -1 means unlimited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub daily_requests: i64,
    pub monthly_requests: i64,
    pub max_tokens_per_request: i64,
    pub max_conversations: i64,
    pub features: Vec<String>,
}

impl PlanLimits {
    pub const UNLIMITED: i64 = -1;

    pub fn is_unlimited(value: i64) -> bool {
        value == Self::UNLIMITED
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    pub plan_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub limits: PlanLimits,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The three fixed subscription tiers.
pub fn seed_plans() -> Vec<PlanConfig> {
    let now = Utc::now();
    vec![
        PlanConfig {
            plan_id: "free".into(),
            name: "Free".into(),
            description: "Get started with Time AI".into(),
            price: 0.0,
            currency: "usd".into(),
            limits: PlanLimits {
                daily_requests: 25,
                monthly_requests: 500,
                max_tokens_per_request: 4096,
                max_conversations: 10,
                features: vec!["basic-models".into(), "community-support".into()],
            },
            is_active: true,
            created_at: now,
            updated_at: now,
        },
        PlanConfig {
            plan_id: "pro".into(),
            name: "Pro".into(),
            description: "Faster models and more headroom for daily use".into(),
            price: 9.99,
            currency: "usd".into(),
            limits: PlanLimits {
                daily_requests: 250,
                monthly_requests: 5000,
                max_tokens_per_request: 16384,
                max_conversations: 100,
                features: vec![
                    "all-models".into(),
                    "file-sources".into(),
                    "priority-support".into(),
                ],
            },
            is_active: true,
            created_at: now,
            updated_at: now,
        },
        PlanConfig {
            plan_id: "max".into(),
            name: "Max".into(),
            description: "Unlimited usage for power users".into(),
            price: 29.99,
            currency: "usd".into(),
            limits: PlanLimits {
                daily_requests: PlanLimits::UNLIMITED,
                monthly_requests: PlanLimits::UNLIMITED,
                max_tokens_per_request: 32768,
                max_conversations: PlanLimits::UNLIMITED,
                features: vec![
                    "all-models".into(),
                    "file-sources".into(),
                    "priority-support".into(),
                    "early-access".into(),
                ],
            },
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    ]
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_three_tiers_in_order() {
        let plans = seed_plans();
        let ids: Vec<&str> = plans.iter().map(|p| p.plan_id.as_str()).collect();
        assert_eq!(ids, ["free", "pro", "max"]);
    }

    #[test]
    fn free_tier_costs_nothing() {
        let plans = seed_plans();
        assert_eq!(plans[0].price, 0.0);
        assert!(plans[0].is_active);
    }

    #[test]
    fn max_tier_is_unlimited() {
        let max = &seed_plans()[2];
        assert!(PlanLimits::is_unlimited(max.limits.daily_requests));
        assert!(PlanLimits::is_unlimited(max.limits.monthly_requests));
        assert!(PlanLimits::is_unlimited(max.limits.max_conversations));
        assert!(!PlanLimits::is_unlimited(max.limits.max_tokens_per_request));
    }

    #[test]
    fn plan_serializes_camel_case() {
        let json = serde_json::to_value(&seed_plans()[0]).unwrap();
        assert_eq!(json["planId"], "free");
        assert_eq!(json["limits"]["dailyRequests"], 25);
        assert_eq!(json["isActive"], true);
    }
}
