//! HTTP gateway to the remote persistence service.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use supplydesk_access::{Permission, Role, User};
use supplydesk_categories::Category;
use supplydesk_console::{ConsoleConfig, Gateway, Managed, PermissionCatalog, RemoteError};

use crate::wire::{
    CategoryBody, CategoryWire, PermissionWire, RoleBody, RoleWire, StatusBody, UserBody, UserWire,
};

const PERMISSIONS_PATH: &str = "/permisos";

/// Where an entity kind lives on the service and how it is encoded.
pub trait Resource: Managed {
    const PATH: &'static str;

    /// Some kinds are created on a dedicated route.
    const CREATE_PATH: &'static str = Self::PATH;

    type Wire: DeserializeOwned + Into<Self> + Send;

    fn body(draft: &Self::Draft) -> impl Serialize + Send + Sync + '_;
}

impl Resource for Category {
    const PATH: &'static str = "/categorias_insumo";

    type Wire = CategoryWire;

    fn body(draft: &Self::Draft) -> impl Serialize + Send + Sync + '_ {
        CategoryBody::from(draft)
    }
}

impl Resource for Role {
    const PATH: &'static str = "/roles";

    type Wire = RoleWire;

    fn body(draft: &Self::Draft) -> impl Serialize + Send + Sync + '_ {
        RoleBody::from(draft)
    }
}

impl Resource for User {
    const PATH: &'static str = "/usuarios";
    const CREATE_PATH: &'static str = "/usuarios/registro";

    type Wire = UserWire;

    fn body(draft: &Self::Draft) -> impl Serialize + Send + Sync + '_ {
        UserBody::from(draft)
    }
}

/// Map a non-success status to the console's remote error.
pub fn status_error(status: StatusCode, body: String) -> RemoteError {
    match status {
        StatusCode::CONFLICT => RemoteError::Conflict(body),
        StatusCode::NOT_FOUND => RemoteError::NotFound,
        other => RemoteError::Api(other.as_u16(), body),
    }
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(config: &ConsoleConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.auth_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let req = self.client.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, RemoteError> {
        let resp = req.send().await.map_err(|e| RemoteError::Network(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(%status, %body, "remote call rejected");
        Err(status_error(status, body))
    }

    async fn fetch_list<W: DeserializeOwned + Send>(&self, path: &str) -> Result<Vec<W>, RemoteError> {
        let resp = self.send(self.request(Method::GET, path)).await?;
        resp.json().await.map_err(|e| RemoteError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl<E: Resource> Gateway<E> for HttpGateway {
    async fn list(&self) -> Result<Vec<E>, RemoteError> {
        let wires: Vec<E::Wire> = self.fetch_list(E::PATH).await?;
        Ok(wires.into_iter().map(Into::into).collect())
    }

    async fn create(&self, draft: &E::Draft) -> Result<(), RemoteError> {
        let req = self.request(Method::POST, E::CREATE_PATH).json(&E::body(draft));
        self.send(req).await?;
        Ok(())
    }

    async fn update(&self, id: E::Id, draft: &E::Draft) -> Result<(), RemoteError> {
        let path = format!("{}/{id}", E::PATH);
        let req = self.request(Method::PUT, &path).json(&E::body(draft));
        self.send(req).await?;
        Ok(())
    }

    async fn delete(&self, id: E::Id) -> Result<(), RemoteError> {
        let path = format!("{}/{id}", E::PATH);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn set_active(&self, id: E::Id, active: bool) -> Result<(), RemoteError> {
        let path = format!("{}/{id}/estado", E::PATH);
        let req = self.request(Method::PATCH, &path).json(&StatusBody { activo: active });
        self.send(req).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PermissionCatalog for HttpGateway {
    async fn list_permissions(&self) -> Result<Vec<Permission>, RemoteError> {
        let wires: Vec<PermissionWire> = self.fetch_list(PERMISSIONS_PATH).await?;
        Ok(wires.into_iter().map(Permission::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_and_missing_statuses_are_distinguished() {
        assert_eq!(
            status_error(StatusCode::CONFLICT, "FK".into()),
            RemoteError::Conflict("FK".into())
        );
        assert_eq!(status_error(StatusCode::NOT_FOUND, String::new()), RemoteError::NotFound);
        assert_eq!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
            RemoteError::Api(500, "boom".into())
        );
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = ConsoleConfig {
            api_url: "http://localhost:3000/api/".into(),
            ..ConsoleConfig::default()
        };
        let gateway = HttpGateway::new(&config).unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:3000/api");
    }
}
