use super::{ApiClient, ApiError};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use reqwest::Method;

pub trait AuthGateway {
    fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError>;
    fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, ApiError>;
}

/// `POST /auth/login` and `POST /auth/register`. Neither carries a credential.
pub struct HttpAuthGateway {
    client: ApiClient,
}

impl HttpAuthGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn post<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<AuthResponse, ApiError> {
        let builder = self.client.request(Method::POST, path).json(body);
        self.client.send_json(&Method::POST, path, builder)
    }
}

impl AuthGateway for HttpAuthGateway {
    fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login", credentials)
    }

    fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.post("/auth/register", data)
    }
}
