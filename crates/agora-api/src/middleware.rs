use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;

/// The raw bearer token of the current request. Validation happens in
/// `Messaging`, which also checks that the user still exists.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Extract the bearer token from the Authorization header.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?
        .to_string();

    req.extensions_mut().insert(SessionToken(token));
    Ok(next.run(req).await)
}
