use seedgate_client::{ApiClient, StartupRunner};
use seedgate_config::{
    ApiConfig, AuthSettings, CredentialConfig, FederationConfig, SetupActionConfig, StartupConfig,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let config = ApiConfig {
        base_url: server.uri(),
        request_timeout_secs: 5,
        auth: AuthSettings {
            api_key: Some("super".into()),
            elevated_api_key: Some("super-duper".into()),
            ..AuthSettings::default()
        },
    };
    ApiClient::new(&config).unwrap()
}

#[tokio::test]
async fn full_startup_pass_touches_every_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sysadmin/tenants/"))
        .and(header("X-API-KEY", "super"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "t1", "name": "acme"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/modules/"))
        .and(header("X-API-KEY", "super-duper"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": 11, "name": "EU Models"},
                {"id": 12, "name": "Other"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/modules/t1/"))
        .and(header("X-API-KEY", "super-duper"))
        .and(body_json(json!([{"id": 11}])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/sysadmin/tenants/t1/federation"))
        .and(body_json(json!({
            "provider": "corp-idp",
            "client_id": "client-1",
            "client_secret": "hush",
            "discovery_endpoint": "https://idp.example/.well-known/openid-configuration",
            "redirect_path": "/oauth/callback"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/sysadmin/tenants/t1/credentials/acme-ai"))
        .and(body_json(json!({"api_key": "provider-key"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut startup = StartupConfig::default();
    startup.modules.names = vec!["EU Models".into()];
    startup.federation = Some(FederationConfig {
        provider: "corp-idp".into(),
        client_id: "client-1".into(),
        client_secret: "hush".into(),
        discovery_endpoint: "https://idp.example/.well-known/openid-configuration".into(),
        redirect_path: "/oauth/callback".into(),
        path: "/api/v1/sysadmin/tenants/{tenant_id}/federation".into(),
    });
    startup.credentials = vec![CredentialConfig {
        provider: "acme-ai".into(),
        api_key: "provider-key".into(),
        path: "/api/v1/sysadmin/tenants/{tenant_id}/credentials/{provider}".into(),
    }];

    let client = client_for(&server);
    let report = StartupRunner::new(&client, &startup).run(false).await;

    assert_eq!(report.tenant_id.as_deref(), Some("t1"));
    assert_eq!(report.modules_enabled, 1);
    assert!(report.federation_applied);
    assert_eq!(report.credentials_applied, 1);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn tenant_is_selected_by_name_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sysadmin/tenants/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "t1", "name": "first"},
                {"id": "t2", "name": "wanted"}
            ]
        })))
        .mount(&server)
        .await;

    let mut startup = StartupConfig::default();
    startup.scope.tenant_name = Some("wanted".into());

    let client = client_for(&server);
    let report = StartupRunner::new(&client, &startup).run(true).await;
    assert_eq!(report.tenant_id.as_deref(), Some("t2"));
}

#[tokio::test]
async fn missing_module_is_counted_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sysadmin/tenants/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "t1", "name": "acme"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/modules/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let mut startup = StartupConfig::default();
    startup.modules.names = vec!["Ghost Module".into()];

    let client = client_for(&server);
    let report = StartupRunner::new(&client, &startup).run(false).await;
    assert_eq!(report.modules_enabled, 0);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn setup_action_posts_payload_when_flag_is_true() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"userManagement": {"showSetupOnFirstLoad": true}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/owner/setup"))
        .and(body_json(json!({
            "email": "admin@example.test",
            "firstName": "Admin",
            "lastName": "User",
            "password": "change-me"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let startup = StartupConfig {
        setup: Some(SetupActionConfig {
            settings_path: "/rest/settings".into(),
            flag_pointer: "/data/userManagement/showSetupOnFirstLoad".into(),
            setup_path: "/rest/owner/setup".into(),
            payload: json!({
                "email": "admin@example.test",
                "firstName": "Admin",
                "lastName": "User",
                "password": "change-me"
            }),
        }),
        ..StartupConfig::default()
    };

    let client = client_for(&server);
    let report = StartupRunner::new(&client, &startup).run(false).await;
    assert!(report.setup_performed);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn setup_action_skips_when_flag_is_false() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"userManagement": {"showSetupOnFirstLoad": false}}
        })))
        .mount(&server)
        .await;

    let startup = StartupConfig {
        setup: Some(SetupActionConfig {
            settings_path: "/rest/settings".into(),
            flag_pointer: "/data/userManagement/showSetupOnFirstLoad".into(),
            setup_path: "/rest/owner/setup".into(),
            payload: json!({"email": "admin@example.test"}),
        }),
        ..StartupConfig::default()
    };

    let client = client_for(&server);
    let report = StartupRunner::new(&client, &startup).run(false).await;
    assert!(!report.setup_performed);
    assert_eq!(report.failed, 0);
}
