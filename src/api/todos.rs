use super::{ApiClient, ApiError};
use crate::models::{Todo, TodoRequest};
use crate::session::TokenStore;
use reqwest::Method;
use std::rc::Rc;

/// One call per verb of the `/api/todos` resource.
pub trait TodoGateway {
    /// Ordering of the result is whatever the server returns.
    fn list(&self, completed: Option<bool>) -> Result<Vec<Todo>, ApiError>;
    fn get(&self, id: &str) -> Result<Todo, ApiError>;
    fn create(&self, request: &TodoRequest) -> Result<Todo, ApiError>;
    fn update(&self, id: &str, request: &TodoRequest) -> Result<Todo, ApiError>;
    fn toggle(&self, id: &str) -> Result<Todo, ApiError>;
    fn delete(&self, id: &str) -> Result<(), ApiError>;
}

pub struct HttpTodoGateway {
    client: ApiClient,
    tokens: Rc<dyn TokenStore>,
}

impl HttpTodoGateway {
    pub fn new(client: ApiClient, tokens: Rc<dyn TokenStore>) -> Self {
        Self { client, tokens }
    }

    fn authed(
        &self,
        method: Method,
        path: &str,
    ) -> Result<reqwest::blocking::RequestBuilder, ApiError> {
        let token = self.tokens.load().ok_or(ApiError::MissingCredential)?;
        Ok(self.client.request(method, path).bearer_auth(token))
    }
}

/// Identifiers are opaque; keep them from breaking out of their path segment.
fn item_path(id: &str) -> String {
    format!("/api/todos/{}", urlencoding::encode(id))
}

impl TodoGateway for HttpTodoGateway {
    fn list(&self, completed: Option<bool>) -> Result<Vec<Todo>, ApiError> {
        let path = "/api/todos";
        let mut builder = self.authed(Method::GET, path)?;
        if let Some(completed) = completed {
            builder = builder.query(&[("completed", completed)]);
        }
        self.client.send_json(&Method::GET, path, builder)
    }

    fn get(&self, id: &str) -> Result<Todo, ApiError> {
        let path = item_path(id);
        let builder = self.authed(Method::GET, &path)?;
        self.client.send_json(&Method::GET, &path, builder)
    }

    fn create(&self, request: &TodoRequest) -> Result<Todo, ApiError> {
        let path = "/api/todos";
        let builder = self.authed(Method::POST, path)?.json(request);
        self.client.send_json(&Method::POST, path, builder)
    }

    fn update(&self, id: &str, request: &TodoRequest) -> Result<Todo, ApiError> {
        let path = item_path(id);
        let builder = self.authed(Method::PUT, &path)?.json(request);
        self.client.send_json(&Method::PUT, &path, builder)
    }

    fn toggle(&self, id: &str) -> Result<Todo, ApiError> {
        let path = format!("{}/toggle", item_path(id));
        let builder = self.authed(Method::PATCH, &path)?;
        self.client.send_json(&Method::PATCH, &path, builder)
    }

    fn delete(&self, id: &str) -> Result<(), ApiError> {
        let path = item_path(id);
        let builder = self.authed(Method::DELETE, &path)?;
        self.client.send(&Method::DELETE, &path, builder)?;
        Ok(())
    }
}
