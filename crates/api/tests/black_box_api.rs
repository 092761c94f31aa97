use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use orgadmin_api::config::ApiConfig;
use orgadmin_auth::{JwtClaims, Role};
use orgadmin_core::{OrgId, UserId};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Same router as prod, in-memory stores, ephemeral port.
        let app = orgadmin_api::app::build_app(ApiConfig::for_secret(jwt_secret))
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

const SECRET: &str = "test-secret";

fn mint_jwt(jwt_secret: &str, user_id: UserId, org_id: OrgId, roles: Vec<Role>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id,
        org_id,
        roles,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn billing_policies() -> serde_json::Value {
    json!([
        {
            "id": "admins-manage-billing",
            "effect": "allow",
            "actions": ["org.billing.*"],
            "resources": ["org.billing"],
            "priority": 10,
            "condition": { "subject": { "role": { "op": "in", "value": ["owner", "admin"] } } }
        },
        {
            "id": "contractors-never-touch-billing",
            "effect": "deny",
            "actions": ["org.billing.*"],
            "resources": ["org.billing"],
            "priority": 100,
            "condition": { "subject": { "employmentType": "contractor" } }
        }
    ])
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn(SECRET).await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn(SECRET).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    let forged = mint_jwt("other-secret", UserId::new(), OrgId::new(), vec![Role::ADMIN]);
    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn org_context_is_derived_from_token() {
    let srv = TestServer::spawn(SECRET).await;
    let org_id = OrgId::new();
    let user_id = UserId::new();
    let token = mint_jwt(SECRET, user_id, org_id, vec![Role::MANAGER]);

    let res = reqwest::Client::new()
        .get(srv.url("/whoami"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["orgId"].as_str().unwrap(), org_id.to_string());
    assert_eq!(body["userId"].as_str().unwrap(), user_id.to_string());
    assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "manager"));
    assert!(body["permissions"].as_array().unwrap().iter().any(|p| p == "org.policies.read"));
}

#[tokio::test]
async fn policy_crud_lifecycle() {
    let srv = TestServer::spawn(SECRET).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(SECRET, UserId::new(), OrgId::new(), vec![Role::ADMIN]);

    let res = client
        .put(srv.url("/abac/policies"))
        .bearer_auth(&token)
        .json(&billing_policies())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let ids: Vec<&str> = body["policies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["contractors-never-touch-billing", "admins-manage-billing"]);

    // Shorthand is stored in explicit form.
    let res = client
        .get(srv.url("/abac/policies/contractors-never-touch-billing"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let policy: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        policy["condition"]["subject"]["employmentType"],
        json!({ "op": "eq", "value": "contractor" })
    );

    let res = client
        .put(srv.url("/abac/policies/hr-read"))
        .bearer_auth(&token)
        .json(&json!({
            "id": "hr-read",
            "effect": "allow",
            "actions": ["hr.employee.read"],
            "resources": ["hr.employee"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(srv.url("/abac/policies/hr-read"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(srv.url("/abac/policies/hr-read"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn invalid_policies_are_rejected_and_set_is_unchanged() {
    let srv = TestServer::spawn(SECRET).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(SECRET, UserId::new(), OrgId::new(), vec![Role::ADMIN]);

    client
        .put(srv.url("/abac/policies"))
        .bearer_auth(&token)
        .json(&billing_policies())
        .send()
        .await
        .unwrap();

    let res = client
        .put(srv.url("/abac/policies"))
        .bearer_auth(&token)
        .json(&json!([
            { "id": "bad", "effect": "allow", "actions": ["hr.*.read"], "resources": ["hr.employee"] }
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_policy");

    let res = client
        .put(srv.url("/abac/policies"))
        .bearer_auth(&token)
        .json(&json!([
            { "id": "bad-op", "effect": "allow", "actions": ["*"], "resources": ["*"],
              "condition": { "subject": { "level": { "op": "gte", "value": 3 } } } }
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = client
        .get(srv.url("/abac/policies"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["policies"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn policy_administration_requires_permissions() {
    let srv = TestServer::spawn(SECRET).await;
    let client = reqwest::Client::new();
    let org_id = OrgId::new();
    let member = mint_jwt(SECRET, UserId::new(), org_id, vec![Role::MEMBER]);
    let manager = mint_jwt(SECRET, UserId::new(), org_id, vec![Role::MANAGER]);

    let res = client
        .get(srv.url("/abac/policies"))
        .bearer_auth(&member)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(srv.url("/abac/policies"))
        .bearer_auth(&manager)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(srv.url("/abac/policies"))
        .bearer_auth(&manager)
        .json(&billing_policies())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn policy_sets_are_isolated_per_org() {
    let srv = TestServer::spawn(SECRET).await;
    let client = reqwest::Client::new();
    let admin_a = mint_jwt(SECRET, UserId::new(), OrgId::new(), vec![Role::ADMIN]);
    let admin_b = mint_jwt(SECRET, UserId::new(), OrgId::new(), vec![Role::ADMIN]);

    client
        .put(srv.url("/abac/policies"))
        .bearer_auth(&admin_a)
        .json(&billing_policies())
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = client
        .get(srv.url("/abac/policies"))
        .bearer_auth(&admin_b)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["policies"].as_array().unwrap().is_empty());

    let res = client
        .get(srv.url("/abac/policies/admins-manage-billing"))
        .bearer_auth(&admin_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_then_import_round_trips_with_warnings() {
    let srv = TestServer::spawn(SECRET).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(SECRET, UserId::new(), OrgId::new(), vec![Role::ADMIN]);

    client
        .put(srv.url("/abac/policies"))
        .bearer_auth(&token)
        .json(&billing_policies())
        .send()
        .await
        .unwrap();

    let exported: serde_json::Value = client
        .get(srv.url("/abac/policies/export"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(exported["version"], 1);
    assert_eq!(exported["policies"].as_array().unwrap().len(), 2);

    let mut document = exported.clone();
    document["policies"].as_array_mut().unwrap().push(json!({
        "id": "payroll",
        "effect": "allow",
        "actions": ["payroll.run"],
        "resources": ["payroll"]
    }));

    let res = client
        .post(srv.url("/abac/policies/import"))
        .bearer_auth(&token)
        .json(&document)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["imported"], 3);
    let warnings = body["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|w| w["policyId"] == "payroll"));

    let res = client
        .post(srv.url("/abac/policies/import"))
        .bearer_auth(&token)
        .json(&json!({ "version": 7, "policies": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn simulate_explains_the_billing_scenario() {
    let srv = TestServer::spawn(SECRET).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(SECRET, UserId::new(), OrgId::new(), vec![Role::ADMIN]);

    client
        .put(srv.url("/abac/policies"))
        .bearer_auth(&token)
        .json(&billing_policies())
        .send()
        .await
        .unwrap();

    let simulate = |subject: serde_json::Value| {
        client
            .post(srv.url("/abac/simulate"))
            .bearer_auth(&token)
            .json(&json!({
                "action": "org.billing.update",
                "resourceType": "org.billing",
                "subject": subject,
            }))
            .send()
    };

    let body: serde_json::Value = simulate(json!({ "role": "admin", "employmentType": "contractor" }))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["decision"], "deny");
    assert_eq!(body["decidingPolicy"], "contractors-never-touch-billing");

    let body: serde_json::Value = simulate(json!({ "role": "admin", "employmentType": "full_time" }))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["decision"], "allow");
    assert_eq!(body["decidingPolicy"], "admins-manage-billing");

    let body: serde_json::Value = simulate(json!({ "role": "member" }))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["decision"], "deny");
    assert_eq!(body["reason"], "no_applicable_policy");
}

#[tokio::test]
async fn access_check_uses_directory_attributes_and_owner_bypass() {
    let srv = TestServer::spawn(SECRET).await;
    let client = reqwest::Client::new();
    let org_id = OrgId::new();
    let admin_id = UserId::new();
    let contractor_id = UserId::new();
    let admin = mint_jwt(SECRET, admin_id, org_id, vec![Role::ADMIN]);
    let contractor = mint_jwt(SECRET, contractor_id, org_id, vec![Role::ADMIN]);
    let owner = mint_jwt(SECRET, UserId::new(), org_id, vec![Role::OWNER]);

    client
        .put(srv.url("/abac/policies"))
        .bearer_auth(&admin)
        .json(&billing_policies())
        .send()
        .await
        .unwrap();

    for (user_id, employment) in [(admin_id, "full_time"), (contractor_id, "contractor")] {
        let res = client
            .put(srv.url(&format!("/directory/members/{user_id}")))
            .bearer_auth(&admin)
            .json(&json!({ "roles": ["admin"], "attributes": { "employmentType": employment } }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let check = |token: &str| {
        client
            .post(srv.url("/authz/check"))
            .bearer_auth(token)
            .json(&json!({ "action": "org.billing.update", "resourceType": "org.billing" }))
            .send()
    };

    let body: serde_json::Value = check(&admin).await.unwrap().json().await.unwrap();
    assert_eq!(body["decision"], "allow");
    assert_eq!(body["reason"], "policy_allow");

    let body: serde_json::Value = check(&contractor).await.unwrap().json().await.unwrap();
    assert_eq!(body["decision"], "deny");
    assert_eq!(body["reason"], "policy_deny");
    assert_eq!(body["decidingPolicy"], "contractors-never-touch-billing");

    let body: serde_json::Value = check(&owner).await.unwrap().json().await.unwrap();
    assert_eq!(body["decision"], "allow");
    assert_eq!(body["reason"], "owner_bypass");
}

#[tokio::test]
async fn resource_catalogue_lists_registered_types() {
    let srv = TestServer::spawn(SECRET).await;
    let client = reqwest::Client::new();
    let org_id = OrgId::new();
    let member = mint_jwt(SECRET, UserId::new(), org_id, vec![Role::MEMBER]);
    let token = mint_jwt(SECRET, UserId::new(), org_id, vec![Role::MANAGER]);

    let res = client
        .get(srv.url("/abac/resources"))
        .bearer_auth(member)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = client
        .get(srv.url("/abac/resources"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let resources = body["resources"].as_array().unwrap();
    let billing = resources
        .iter()
        .find(|r| r["resourceType"] == "org.billing")
        .unwrap();
    assert!(billing["actions"].as_array().unwrap().iter().any(|a| a == "org.billing.update"));
}

#[tokio::test]
async fn role_catalogue_requires_policy_read() {
    let srv = TestServer::spawn(SECRET).await;
    let client = reqwest::Client::new();
    let org_id = OrgId::new();
    let member = mint_jwt(SECRET, UserId::new(), org_id, vec![Role::MEMBER]);
    let manager = mint_jwt(SECRET, UserId::new(), org_id, vec![Role::MANAGER]);

    let res = client.get(srv.url("/roles")).bearer_auth(member).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = client
        .get(srv.url("/roles"))
        .bearer_auth(manager)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let roles = body["roles"].as_array().unwrap();
    let owner = roles.iter().find(|r| r["name"] == "owner").unwrap();
    assert_eq!(owner["bypassesAbac"], true);
    let member = roles.iter().find(|r| r["name"] == "member").unwrap();
    assert_eq!(member["bypassesAbac"], false);
    assert!(member["permissions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn directory_writes_require_directory_permission() {
    let srv = TestServer::spawn(SECRET).await;
    let client = reqwest::Client::new();
    let org_id = OrgId::new();
    let manager = mint_jwt(SECRET, UserId::new(), org_id, vec![Role::MANAGER]);
    let admin = mint_jwt(SECRET, UserId::new(), org_id, vec![Role::ADMIN]);
    let member_id = UserId::new();
    let path = srv.url(&format!("/directory/members/{member_id}"));

    let res = client
        .put(&path)
        .bearer_auth(&manager)
        .json(&json!({ "roles": ["member"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(srv.url("/directory/members/not-a-uuid"))
        .bearer_auth(&admin)
        .json(&json!({ "roles": ["member"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(&path)
        .bearer_auth(&admin)
        .json(&json!({ "roles": ["member"], "departmentId": "eng" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.delete(&path).bearer_auth(&admin).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = client.delete(&path).bearer_auth(&admin).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
