use crate::auth::token_service::{Claims, TokenService};
use crate::error::{Error, Result};
use crate::helpers::thing_helpers::validate_object_id;
use crate::services::user_service::UserService;
use crate::{models::user::UserRecord, AppState};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

#[derive(Debug, Clone)]
pub struct Ctx {
    pub user_id: String,
    pub user: UserRecord,
}

impl Ctx {
    pub fn new(user_id: String, user: UserRecord) -> Self {
        Self { user_id, user }
    }
}

pub async fn mw_auth(
    State(app_state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response> {
    let ctx = authenticate(&app_state, req.headers()).await?;
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

/// Resolves the bearer token to an existing user
pub async fn authenticate(app_state: &AppState, headers: &HeaderMap) -> Result<Ctx> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|str| str.strip_prefix("Bearer "))
        .ok_or(Error::AuthFailNoAuthToken)?;

    let claims: Claims = TokenService::validate_token(token, &app_state.auth_config)?;

    let user_id = validate_object_id(&claims.sub)
        .map_err(|_| Error::AuthFailTokenWrongFormat)?
        .to_string();

    let user = UserService::get_user(&app_state.db, &user_id)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: user_id.clone(),
        })?;

    Ok(Ctx::new(user_id, user))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::auth::token_service::testing::create_token;
    use crate::database::testing::insert_user;
    use crate::test_state;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_authenticate() {
        let state = test_state().await;
        let user_id = insert_user(&state.db).await;
        let token = create_token(&user_id, &state.auth_config);

        let ctx = authenticate(&state, &bearer(&token)).await.unwrap();
        assert_eq!(ctx.user_id, user_id);
    }

    #[tokio::test]
    async fn test_authenticate_failures() {
        let state = test_state().await;

        let missing = authenticate(&state, &HeaderMap::new()).await;
        assert!(matches!(missing, Err(Error::AuthFailNoAuthToken)));

        let garbage = authenticate(&state, &bearer("not.a.token")).await;
        assert!(matches!(garbage, Err(Error::AuthFailTokenWrongFormat)));

        let malformed_sub = create_token("user-42", &state.auth_config);
        let result = authenticate(&state, &bearer(&malformed_sub)).await;
        assert!(matches!(result, Err(Error::AuthFailTokenWrongFormat)));

        let unknown = create_token("65f0a1b2c3d4e5f6a7b8c9d0", &state.auth_config);
        let result = authenticate(&state, &bearer(&unknown)).await;
        assert!(matches!(result, Err(Error::UserNotFound { .. })));
    }
}
