//! REST-backed resource collections.

use std::sync::Arc;

use async_trait::async_trait;
use seedgate_core::{CollectionError, DesiredResource, RemoteCollection, RemoteResource};
use seedgate_config::ClassManifest;
use serde_json::{json, Value};
use tracing::warn;

use crate::client::{fill_path, ApiClient};

/// Unwraps a listing response: either an `{"items": [...]}` envelope or a
/// bare JSON array.
pub(crate) fn items_of(value: Value) -> Result<Vec<Value>, CollectionError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(CollectionError::decode(
                "listing response has no 'items' array",
            )),
        },
        _ => Err(CollectionError::decode(
            "listing response is neither an array nor an object",
        )),
    }
}

/// One resource class served over REST, with paths from the seed manifest.
pub struct RestCollection {
    client: Arc<ApiClient>,
    name: String,
    list_path: String,
    create_path: String,
    item_path: Option<String>,
    enable_path: Option<String>,
    /// Scope substituted into `{tenant_id}` placeholders
    tenant_id: Option<String>,
}

impl RestCollection {
    pub fn from_manifest(
        client: Arc<ApiClient>,
        class: &ClassManifest,
        tenant_id: Option<&str>,
    ) -> Self {
        Self {
            client,
            name: class.name.clone(),
            list_path: class.list_path.clone(),
            create_path: class
                .create_path
                .clone()
                .unwrap_or_else(|| class.list_path.clone()),
            item_path: class.item_path.clone(),
            enable_path: class.enable.as_ref().map(|e| e.path.clone()),
            tenant_id: tenant_id.map(str::to_string),
        }
    }

    fn item_path_for(&self, operation: &str, id: &str) -> Result<String, CollectionError> {
        let template = self
            .item_path
            .as_deref()
            .ok_or_else(|| CollectionError::unsupported(format!("{operation} on {}", self.name)))?;
        Ok(fill_path(template, &[("id", id)]))
    }
}

#[async_trait]
impl RemoteCollection for RestCollection {
    fn class(&self) -> &str {
        &self.name
    }

    async fn list(&self) -> Result<Vec<RemoteResource>, CollectionError> {
        let value = self.client.get(&self.list_path).await?;
        items_of(value)?
            .into_iter()
            .map(|item| {
                RemoteResource::from_value(item).map_err(|e| CollectionError::decode(e.to_string()))
            })
            .collect()
    }

    async fn create(&self, desired: &DesiredResource) -> Result<String, CollectionError> {
        let body = Value::Object(desired.attributes.clone());
        let value = self.client.post(&self.create_path, &body).await?;
        match value.get("id") {
            Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(CollectionError::missing_field("id")),
        }
    }

    async fn update(&self, id: &str, desired: &DesiredResource) -> Result<(), CollectionError> {
        let path = self.item_path_for("update", id)?;
        let body = Value::Object(desired.attributes.clone());
        self.client.put(&path, &body).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, CollectionError> {
        let path = self.item_path_for("delete", id)?;
        let (status, body) = self.client.delete(&path).await?;
        if status == 200 || status == 204 {
            Ok(true)
        } else {
            warn!(class = %self.name, id = %id, status, body = %body, "Delete refused");
            Ok(false)
        }
    }

    async fn enable(
        &self,
        id: &str,
        _desired: &DesiredResource,
        make_default: bool,
    ) -> Result<(), CollectionError> {
        let template = self
            .enable_path
            .as_deref()
            .ok_or_else(|| CollectionError::unsupported(format!("enable on {}", self.name)))?;
        let tenant_id = self.tenant_id.as_deref().ok_or_else(|| {
            CollectionError::unsupported(format!("enable on {} without a tenant scope", self.name))
        })?;
        let path = fill_path(template, &[("tenant_id", tenant_id), ("id", id)]);
        let body = json!({
            "is_org_enabled": true,
            "is_org_default": make_default,
        });
        self.client.post(&path, &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedgate_config::{ApiConfig, SeedManifest};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn manifest_class(raw: &str) -> ClassManifest {
        SeedManifest::from_json(raw).unwrap().classes.remove(0)
    }

    fn client_for(server: &MockServer) -> Arc<ApiClient> {
        let config = ApiConfig {
            base_url: server.uri(),
            ..ApiConfig::default()
        };
        Arc::new(ApiClient::new(&config).unwrap())
    }

    #[test]
    fn items_envelope_and_bare_array_are_accepted() {
        let envelope = json!({"items": [{"id": 1, "name": "a"}]});
        assert_eq!(items_of(envelope).unwrap().len(), 1);

        let bare = json!([{"id": 1, "name": "a"}]);
        assert_eq!(items_of(bare).unwrap().len(), 1);

        assert!(items_of(json!({"data": []})).is_err());
        assert!(items_of(json!("nope")).is_err());
    }

    #[test]
    fn create_path_falls_back_to_list_path() {
        let class = manifest_class(
            r#"{"classes": [{"name": "models", "list_path": "/models/", "resources": []}]}"#,
        );
        assert!(class.create_path.is_none());
        assert_eq!(class.list_path, "/models/");
    }

    #[tokio::test]
    async fn list_decodes_remote_resources() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": 7, "name": "m2", "org": "platform"},
                    {"id": "9", "name": "m3", "org": "vendor"}
                ]
            })))
            .mount(&server)
            .await;

        let class = manifest_class(
            r#"{"classes": [{"name": "models", "list_path": "/models/", "resources": []}]}"#,
        );
        let collection = RestCollection::from_manifest(client_for(&server), &class, None);
        let remote = collection.list().await.unwrap();
        assert_eq!(remote.len(), 2);
        assert_eq!(remote[0].id, "7");
        assert_eq!(remote[1].id, "9");
    }

    #[tokio::test]
    async fn create_posts_attributes_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/create"))
            .and(body_json(json!({"name": "m1", "family": "openai"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "new-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let class = manifest_class(
            r#"{"classes": [{
                "name": "models",
                "list_path": "/models/",
                "create_path": "/models/create",
                "resources": []
            }]}"#,
        );
        let collection = RestCollection::from_manifest(client_for(&server), &class, None);
        let desired =
            DesiredResource::from_value(json!({"name": "m1", "family": "openai"})).unwrap();
        assert_eq!(collection.create(&desired).await.unwrap(), "new-1");
    }

    #[tokio::test]
    async fn delete_maps_204_to_success_and_409_to_refusal() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/models/7"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/models/9"))
            .respond_with(ResponseTemplate::new(409).set_body_string("in use"))
            .mount(&server)
            .await;

        let class = manifest_class(
            r#"{"classes": [{
                "name": "models",
                "list_path": "/models/",
                "item_path": "/models/{id}",
                "resources": []
            }]}"#,
        );
        let collection = RestCollection::from_manifest(client_for(&server), &class, None);
        assert!(collection.delete("7").await.unwrap());
        assert!(!collection.delete("9").await.unwrap());
    }

    #[tokio::test]
    async fn enable_fills_tenant_scope_and_flags() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenants/t1/models/42/"))
            .and(body_json(json!({"is_org_enabled": true, "is_org_default": true})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let class = manifest_class(
            r#"{"classes": [{
                "name": "models",
                "list_path": "/models/",
                "enable": {"path": "/tenants/{tenant_id}/models/{id}/"},
                "resources": []
            }]}"#,
        );
        let collection = RestCollection::from_manifest(client_for(&server), &class, Some("t1"));
        let desired = DesiredResource::from_value(json!({"name": "m1"})).unwrap();
        collection.enable("42", &desired, true).await.unwrap();
    }

    #[tokio::test]
    async fn enable_without_scope_is_unsupported() {
        let server = MockServer::start().await;
        let class = manifest_class(
            r#"{"classes": [{
                "name": "models",
                "list_path": "/models/",
                "enable": {"path": "/tenants/{tenant_id}/models/{id}/"},
                "resources": []
            }]}"#,
        );
        let collection = RestCollection::from_manifest(client_for(&server), &class, None);
        let desired = DesiredResource::from_value(json!({"name": "m1"})).unwrap();
        let err = collection.enable("42", &desired, false).await.unwrap_err();
        assert!(matches!(err, CollectionError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn update_without_item_path_is_unsupported() {
        let server = MockServer::start().await;
        let class = manifest_class(
            r#"{"classes": [{"name": "models", "list_path": "/models/", "resources": []}]}"#,
        );
        let collection = RestCollection::from_manifest(client_for(&server), &class, None);
        let desired = DesiredResource::from_value(json!({"name": "m1"})).unwrap();
        let err = collection.update("7", &desired).await.unwrap_err();
        assert!(matches!(err, CollectionError::Unsupported { .. }));
    }
}
