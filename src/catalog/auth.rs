use reqwest::{Client, StatusCode};

use crate::{
    catalog::{API_BASE_URL, CatalogError, Session},
    types::AuthResponse,
};

/// Signs in against the production backend.
pub async fn login(client: Client, email: &str, password: &str) -> Result<Session, CatalogError> {
    login_at(client, API_BASE_URL, email, password).await
}

/// Exchanges credentials for a [`Session`].
///
/// The backend answers with a JSON document that has to be echoed back on
/// every album request, so the whole response is kept as the session's
/// `userData`.
///
/// # Errors
///
/// - [`CatalogError::BadStatus`] for anything but `200 OK`
/// - [`CatalogError::BadResponse`] when `response_status` isn't `"OK"`
/// - [`CatalogError::SubscriptionRequired`] for accounts without a plan
pub async fn login_at(
    client: Client,
    api_base: &str,
    email: &str,
    password: &str,
) -> Result<Session, CatalogError> {
    let url = format!("{base}/user/login", base = api_base.trim_end_matches('/'));
    let res = client
        .get(&url)
        .query(&[("username", email), ("password", password)])
        .send()
        .await?;

    if res.status() != StatusCode::OK {
        return Err(CatalogError::BadStatus(res.status()));
    }

    let auth: AuthResponse = res.json().await?;
    if auth.response_status != "OK" {
        return Err(CatalogError::BadResponse(auth.response_status));
    }
    if !auth.has_subscription {
        return Err(CatalogError::SubscriptionRequired);
    }

    let user_data = serde_json::to_string(&auth)?;
    Ok(Session::new(client, user_data).with_api_base(api_base))
}
