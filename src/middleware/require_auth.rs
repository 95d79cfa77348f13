/// Request Authentication Gate
///
/// Validates the access-token cookie and injects the resolved identity into
/// request extensions for route handlers. Unauthenticated requests are
/// rejected before any downstream handler runs, with a body that does not
/// reveal why the token was rejected.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::validate_access_token;
use crate::configuration::JwtSettings;

/// Per-request identity of the verified caller.
/// Created here, read by handlers via `web::ReqData`, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Gate middleware for protecting routes.
///
/// Must be applied to routes that require authentication. Extracts and
/// validates the JWT from the `access_token` cookie.
pub struct RequireAuth {
    jwt_config: JwtSettings,
}

impl RequireAuth {
    pub fn new(jwt_config: JwtSettings) -> Self {
        Self { jwt_config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireAuthService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
        }))
    }
}

pub struct RequireAuthService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "error": "Unauthorized",
        "code": "UNAUTHORIZED"
    }))
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req.cookie("access_token").map(|c| c.value().to_string());

        match token {
            None => {
                tracing::warn!(path = %req.path(), "Missing access token cookie");
                Box::pin(async move {
                    Err(actix_web::error::InternalError::from_response(
                        "Unauthorized",
                        unauthorized(),
                    )
                    .into())
                })
            }
            Some(token) => match validate_access_token(&token, &self.jwt_config) {
                Ok(user_id) => {
                    req.extensions_mut().insert(AuthenticatedUser { user_id });

                    tracing::debug!(user_id = %user_id, "Access token validated");

                    let service = self.service.clone();
                    Box::pin(async move { service.call(req).await })
                }
                Err(e) => {
                    tracing::warn!(path = %req.path(), error = %e, "Access token rejected");
                    Box::pin(async move {
                        Err(actix_web::error::InternalError::from_response(
                            "Unauthorized",
                            unauthorized(),
                        )
                        .into())
                    })
                }
            },
        }
    }
}
