use actix_session::{Session, SessionExt};
use actix_web::{
    body::EitherBody,
    dev::{self, forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    guard, Error, FromRequest, HttpRequest, HttpResponse,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use serde::Serialize;
use serde_json::json;
use std::env;
use std::future::{ready, Ready as StdReady};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Serialize)]
pub struct AuthenticatedAdmin {
    pub username: String,
}

impl FromRequest for AuthenticatedAdmin {
    type Error = actix_web::Error;
    type Future = StdReady<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let session = req.get_session();
        match (session.get::<String>("username"), session.get::<String>("role")) {
            (Ok(Some(username)), Ok(Some(role))) if role == ADMIN_ROLE => {
                ready(Ok(AuthenticatedAdmin { username }))
            }
            _ => ready(Err(actix_web::error::ErrorUnauthorized("Not logged in."))),
        }
    }
}

pub fn admin_guard(session: &Session) -> bool {
    session.get::<String>("role").unwrap_or(None).as_deref() == Some(ADMIN_ROLE)
}

pub fn ip_guard(ctx: &guard::GuardContext) -> bool {
    let allowed_ips_str = match env::var("ADMIN_LOGIN_ACCEPT_IP") {
        Ok(val) => val,
        Err(_) => {
            log::warn!("ADMIN_LOGIN_ACCEPT_IP is not set. Denying all admin access.");
            return false;
        }
    };

    if allowed_ips_str.trim() == "*" {
        return true;
    }

    // Behind a reverse proxy the client is the first X-Forwarded-For entry.
    let request_ip = ctx
        .head()
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| ctx.head().peer_addr.map(|addr| addr.ip().to_string()));

    let peer_addr = match request_ip {
        Some(ip) => ip,
        None => {
            log::warn!("Could not determine peer IP address for admin request.");
            return false;
        }
    };

    let is_allowed = allowed_ips_str.split(',').any(|ip| ip.trim() == peer_addr);

    if !is_allowed {
        log::warn!("Blocked admin request from unauthorized IP: {}", peer_addr);
    }

    is_allowed
}

/// Rejects admin API calls without an admin session with a JSON 401, so
/// the editor can tell an expired login apart from a missing route.
pub struct RequireAdminSession;

impl<S, B> Transform<S, ServiceRequest> for RequireAdminSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAdminSessionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequireAdminSessionMiddleware { service })
    }
}

pub struct RequireAdminSessionMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequireAdminSessionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if admin_guard(&req.get_session()) {
            let fut = self.service.call(req);
            Box::pin(async move {
                let res = fut.await?;
                Ok(res.map_into_left_body())
            })
        } else {
            Box::pin(async move {
                let (http_req, _payload) = req.into_parts();
                let res = HttpResponse::Unauthorized()
                    .json(json!({"success": false, "error": "Not logged in."}))
                    .map_into_right_body();
                Ok(ServiceResponse::new(http_req, res))
            })
        }
    }
}
