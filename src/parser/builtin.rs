//! The built-in conformance sequence.
//!
//! This is the fixed, ordered set of checks the harness runs when no suite
//! file is given. Dependent checks come after the login that feeds them.

use super::types::{Capture, CheckSpec, CheckSuite, Expect};
use crate::utils::config::HarnessConfig;
use serde_json::json;
use std::collections::HashMap;

/// Context slot for the admin bearer token.
pub const ADMIN_TOKEN: &str = "admin_token";

/// Context slot for the dealer bearer token.
pub const DEALER_TOKEN: &str = "dealer_token";

fn check(name: &str, method: &str, path: &str) -> CheckSpec {
    CheckSpec {
        name: name.to_string(),
        method: method.to_string(),
        path: path.to_string(),
        body: None,
        headers: None,
        auth: None,
        expect: Expect::default(),
        capture: Vec::new(),
        timeout_ms: None,
        tags: Vec::new(),
    }
}

fn expect_ok() -> Expect {
    Expect {
        ok: Some(true),
        ..Default::default()
    }
}

/// Build the default suite from harness configuration.
pub fn builtin_suite(config: &HarnessConfig) -> CheckSuite {
    let mut vars = HashMap::new();
    vars.insert("dealer_id".to_string(), config.dealer_id.clone());

    let mut checks = Vec::new();

    checks.push(CheckSpec {
        expect: expect_ok(),
        ..check("Health endpoint", "GET", "/health")
    });

    checks.push(CheckSpec {
        expect: Expect {
            ok: Some(true),
            fields: vec!["routes".to_string()],
            contains: HashMap::from([(
                "routes".to_string(),
                vec![
                    json!("/api/public"),
                    json!("/api/dealer"),
                    json!("/api/admin"),
                ],
            )]),
            ..Default::default()
        },
        ..check("API status endpoint", "GET", "/api")
    });

    checks.push(CheckSpec {
        body: Some(json!({
            "username": config.admin_username,
            "password": config.admin_password,
        })),
        expect: Expect {
            ok: Some(true),
            fields: vec!["token".to_string()],
            ..Default::default()
        },
        capture: vec![Capture {
            var: ADMIN_TOKEN.to_string(),
            field: "token".to_string(),
        }],
        ..check("Admin login", "POST", "/api/admin/login")
    });

    // A 401 is tolerated here: the dealer may not exist on a fresh install.
    checks.push(CheckSpec {
        body: Some(json!({
            "dealerId": config.dealer_id,
            "passcode": config.dealer_passcode,
        })),
        expect: Expect {
            status: vec![200, 401],
            ..Default::default()
        },
        capture: vec![Capture {
            var: DEALER_TOKEN.to_string(),
            field: "token".to_string(),
        }],
        ..check("Dealer login", "POST", "/api/dealer/login")
    });

    // The reset endpoint answers ok even for unknown emails.
    checks.push(CheckSpec {
        body: Some(json!({ "email": config.reset_email })),
        expect: expect_ok(),
        ..check("Passcode reset request", "POST", "/api/dealer/request-reset")
    });

    checks.push(CheckSpec {
        body: Some(json!({
            "token": "invalid_token",
            "passcode": "newpass123",
        })),
        expect: Expect {
            status: vec![400],
            ..Default::default()
        },
        ..check(
            "Passcode reset with invalid token",
            "POST",
            "/api/dealer/reset-passcode",
        )
    });

    checks.push(CheckSpec {
        expect: Expect {
            ok: Some(true),
            fields: vec!["qrCode".to_string(), "url".to_string()],
            ..Default::default()
        },
        ..check("QR code generation", "GET", "/api/public/qrcode/${dealer_id}")
    });

    // One result per exported collection.
    for collection in ["dealers", "vehicles", "requests"] {
        checks.push(CheckSpec {
            auth: Some(ADMIN_TOKEN.to_string()),
            expect: Expect {
                csv: true,
                ..Default::default()
            },
            ..check(
                &format!("CSV export {}", collection),
                "GET",
                &format!("/api/admin/export/{}", collection),
            )
        });
    }

    checks.push(CheckSpec {
        auth: Some(ADMIN_TOKEN.to_string()),
        body: Some(json!({
            "vehicleIds": ["VEH-TEST-001", "VEH-TEST-002"],
            "status": "available",
        })),
        expect: expect_ok(),
        ..check("Bulk update vehicles", "POST", "/api/admin/vehicles/bulk-update")
    });

    checks.push(CheckSpec {
        auth: Some(ADMIN_TOKEN.to_string()),
        expect: Expect {
            ok: Some(true),
            fields: vec!["alertsSent".to_string()],
            ..Default::default()
        },
        ..check("Check alerts", "POST", "/api/admin/check-alerts")
    });

    // Storefront endpoints may legitimately 404 when no dealers exist yet.
    checks.push(CheckSpec {
        expect: Expect {
            status: vec![200, 404],
            ..Default::default()
        },
        ..check(
            "Public dealer profile",
            "GET",
            "/api/public/dealer/${dealer_id}",
        )
    });

    checks.push(CheckSpec {
        expect: Expect {
            status: vec![200, 404],
            ..Default::default()
        },
        ..check(
            "Public dealer vehicles",
            "GET",
            "/api/public/dealer/${dealer_id}/vehicles",
        )
    });

    checks.push(CheckSpec {
        body: Some(json!({
            "dealerId": config.dealer_id,
            "vehicleId": "VEH-TEST-001",
        })),
        expect: Expect {
            status: vec![200, 404],
            ok: Some(true),
            fields: vec!["url".to_string()],
            ..Default::default()
        },
        ..check(
            "Checkout session creation",
            "POST",
            "/api/public/checkout/session",
        )
    });

    CheckSuite {
        name: Some("builtin".to_string()),
        base_url: None,
        default_timeout_ms: Some(config.default_timeout_ms),
        vars: Some(vars),
        tags: Vec::new(),
        checks,
    }
}
