//! Caller identity.
//!
//! Sessions are handled by the gateway in front of this service, which
//! forwards the authenticated user's id in the `X-User-Id` header. Handlers
//! take an `Actor` argument to require an authenticated caller; requests
//! without a valid id are rejected with `Forbidden` before the handler runs.

use crate::error::ReportError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};

pub const USER_ID_HEADER: &str = "X-User-Id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
}

impl FromRequest for Actor {
    type Error = ReportError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok());
        ready(user_id.map(|user_id| Actor { user_id }).ok_or(ReportError::Forbidden))
    }
}
