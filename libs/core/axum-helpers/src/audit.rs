//! Audit log for security-relevant mutations (admin catalog writes,
//! order status changes, checkout).
//!
//! Events go to the `audit` tracing target so they can be routed separately.
//!
//! ```ignore
//! AuditEvent::for_principal(&admin, "product.update", format!("product:{}", id))
//!     .with_request(&headers)
//!     .with_details(json!({"price": product.price}))
//!     .log();
//! ```

use crate::auth::Principal;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
    Denied,
}

#[derive(Debug, Serialize)]
pub struct AuditEvent {
    pub user_id: Option<String>,
    /// e.g. "product.create", "order.checkout"
    pub action: String,
    /// e.g. "product:<uuid>"
    pub resource: Option<String>,
    pub outcome: AuditOutcome,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        user_id: Option<String>,
        action: impl Into<String>,
        resource: Option<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            user_id,
            action: action.into(),
            resource,
            outcome,
            ip_address: None,
            user_agent: None,
            timestamp: Utc::now(),
            details: None,
        }
    }

    /// Successful action by an authenticated principal.
    pub fn for_principal(
        principal: &Principal,
        action: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self::new(
            Some(principal.user_id.clone()),
            action,
            Some(resource.into()),
            AuditOutcome::Success,
        )
    }

    pub fn with_outcome(mut self, outcome: AuditOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Client IP and user agent from the request headers.
    pub fn with_request(mut self, headers: &HeaderMap) -> Self {
        self.ip_address = extract_ip_from_headers(headers);
        self.user_agent = extract_user_agent(headers);
        self
    }

    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    pub fn log(self) {
        tracing::info!(
            target: "audit",
            user_id = self.user_id,
            action = %self.action,
            resource = self.resource,
            outcome = ?self.outcome,
            ip = self.ip_address,
            user_agent = self.user_agent,
            timestamp = %self.timestamp,
            details = ?self.details,
            "{}",
            serde_json::to_string(&self).unwrap_or_else(|_| "Failed to serialize audit event".to_string())
        );
    }
}

/// First hop of `X-Forwarded-For`, else `X-Real-IP`.
pub fn extract_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(extract_ip_from_headers(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(extract_ip_from_headers(&headers).as_deref(), Some("10.0.0.2"));
    }

    #[test]
    fn test_event_for_principal() {
        let admin = Principal {
            user_id: "admin-1".into(),
            email: None,
            name: None,
            roles: BTreeSet::from(["admin".to_string()]),
            email_verified: true,
        };
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", "curl/8".parse().unwrap());

        let event = AuditEvent::for_principal(&admin, "product.create", "product:1")
            .with_request(&headers)
            .with_details(serde_json::json!({"slug": "widget"}));

        assert_eq!(event.user_id.as_deref(), Some("admin-1"));
        assert_eq!(event.outcome, AuditOutcome::Success);
        assert_eq!(event.user_agent.as_deref(), Some("curl/8"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["outcome"], "success");
        assert_eq!(json["details"]["slug"], "widget");
        event.log();
    }
}
