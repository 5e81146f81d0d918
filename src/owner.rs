//! The owner identifier that scopes every query, and the middleware that extracts it.

use std::fmt::Display;

use axum::{
    extract::{FromRequestParts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// An opaque token identifying the user that rows belong to.
///
/// The token is taken as-is from the bearer token of the request; verifying
/// it is the job of whatever sits in front of this service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create a new owner ID.
    pub fn new(id: &str) -> Self {
        Self(id.to_owned())
    }

    /// The owner ID as a string slice, e.g. for query parameters.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Middleware function that reads the owner from the `Authorization: Bearer` header.
///
/// The owner ID is placed into the request extensions and the request executed normally,
/// otherwise a 401 response is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(owner): Extension<OwnerId>` to receive the owner ID.
pub async fn owner_guard(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let owner =
        match TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &()).await {
            Ok(TypedHeader(Authorization(bearer))) if !bearer.token().trim().is_empty() => {
                OwnerId::new(bearer.token().trim())
            }
            Ok(_) => return Error::MissingOwner.into_response(),
            Err(rejection) => {
                tracing::debug!("Rejecting request without an owner: {rejection}");
                return Error::MissingOwner.into_response();
            }
        };

    parts.extensions.insert(owner);
    next.run(Request::from_parts(parts, body)).await
}
