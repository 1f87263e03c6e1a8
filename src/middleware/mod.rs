/// JWT authentication middleware for Bearer token validation.
/// Extracts the authenticated identity from JWT claims and adds it to the
/// request extensions; protected handlers receive it via the
/// [`AuthenticatedUser`] extractor and trust it as handed (the identity
/// provider is an external collaborator).
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::UserRole;
use crate::security::jwt;

/// Identity extracted from a validated token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn ensure_admin(&self) -> AppResult<()> {
        if self.role == UserRole::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "this action requires an admin account".into(),
            ))
        }
    }
}

/// JWT authentication middleware factory.
pub struct JwtAuthMiddleware {
    secret: Rc<String>,
}

impl JwtAuthMiddleware {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Rc::new(secret.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            secret: self.secret.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    secret: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
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
        let service = self.service.clone();
        let secret = self.secret.clone();

        Box::pin(async move {
            // Extract headers before any mutable access to the extensions.
            let auth_header = match req.headers().get("Authorization") {
                Some(header) => match header.to_str() {
                    Ok(h) => h.to_string(),
                    Err(_) => return Err(ErrorUnauthorized("Invalid Authorization header")),
                },
                None => return Err(ErrorUnauthorized("Missing Authorization header")),
            };

            let token = match auth_header.strip_prefix("Bearer ") {
                Some(t) => t,
                None => {
                    return Err(ErrorUnauthorized(
                        "Invalid Authorization scheme, expected Bearer",
                    ))
                }
            };

            let user = match jwt::validate_token(&secret, token) {
                Ok(data) => {
                    let id = match Uuid::parse_str(&data.claims.sub) {
                        Ok(id) => id,
                        Err(_) => return Err(ErrorUnauthorized("Invalid user ID in token")),
                    };
                    AuthenticatedUser {
                        id,
                        name: data.claims.name,
                        email: data.claims.email,
                        role: UserRole::from_db(&data.claims.role),
                    }
                }
                Err(e) => {
                    tracing::debug!("token validation failed: {e}");
                    return Err(ErrorUnauthorized("Invalid or expired token"));
                }
            };

            req.extensions_mut().insert(user);

            let res = service.call(req).await?;
            Ok(res)
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => ready(Err(ErrorUnauthorized(
                "authenticated identity missing in request extensions",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_check_rejects_plain_users() {
        let user = AuthenticatedUser {
            id: Uuid::new_v4(),
            name: "u".into(),
            email: "u@example.com".into(),
            role: UserRole::User,
        };
        assert!(user.ensure_admin().is_err());

        let admin = AuthenticatedUser {
            role: UserRole::Admin,
            ..user
        };
        assert!(admin.ensure_admin().is_ok());
    }
}
