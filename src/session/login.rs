//! Credential login flow
//!
//! The login page is itself a WebForms postback: GET it for the state
//! tokens, then echo them back together with the credentials. Success is a
//! redirect away from the login page plus a session cookie in the jar.

use super::validator::is_login_url;
use crate::document::{element_text, extract_form_state};
use crate::error::{Error, Result};
use crate::http::{HttpClient, Transport};
use crate::pagination::postback_body;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use tracing::info;
use url::Url;

static ERROR_SPAN_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span[id]").expect("static selector"));

/// Settings for the credential login flow
#[derive(Debug, Clone)]
pub struct LoginConfig {
    /// URL of the login page
    pub login_url: String,
    /// Login username
    pub username: String,
    /// Login password
    pub password: String,
    /// Value of the `ReturnUrl` form field
    pub return_url: String,
    /// Form field carrying the username
    pub username_field: String,
    /// Form field carrying the password
    pub password_field: String,
    /// Name of the submit button field
    pub submit_field: String,
    /// Value of the submit button field
    pub submit_label: String,
    /// Name of the session cookie issued on success
    pub session_cookie: String,
    /// Additional cookies to carry alongside the session cookie
    pub extra_cookies: BTreeMap<String, String>,
}

impl LoginConfig {
    /// Create a login config with the portal's default control names
    pub fn new(
        login_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut extra_cookies = BTreeMap::new();
        extra_cookies.insert(
            "OrbitLivePresentationTypeByCookie".to_string(),
            "GridView".to_string(),
        );
        Self {
            login_url: login_url.into(),
            username: username.into(),
            password: password.into(),
            return_url: "/Main.aspx".to_string(),
            username_field: "ctl00$ContentPlaceHolder1$edtUsername".to_string(),
            password_field: "ctl00$ContentPlaceHolder1$edtPassword".to_string(),
            submit_field: "ctl00$ContentPlaceHolder1$btnLogin".to_string(),
            submit_label: "כניסה".to_string(),
            session_cookie: "BCI_OL_KEY".to_string(),
            extra_cookies,
        }
    }
}

/// Log in and return the cookies a scrape run needs
///
/// The returned map holds the freshly issued session cookie plus the
/// configured extras, ready to persist or to seed another client with.
pub async fn login(client: &HttpClient, config: &LoginConfig) -> Result<BTreeMap<String, String>> {
    info!(url = %config.login_url, "fetching login page");
    let login_page = client.get(&config.login_url).await?;

    let state = extract_form_state(&login_page.body);
    if !state.has_view_state() || state.get("__EVENTVALIDATION").is_none() {
        return Err(Error::malformed(
            "login page carries no view-state/event-validation tokens",
        ));
    }

    let mut credentials = BTreeMap::new();
    credentials.insert("ReturnUrl".to_string(), config.return_url.clone());
    credentials.insert(config.username_field.clone(), config.username.clone());
    credentials.insert(config.password_field.clone(), config.password.clone());
    credentials.insert(config.submit_field.clone(), config.submit_label.clone());

    let body = postback_body("", "", &state, Some(&credentials));

    info!("submitting credentials");
    let resp = client.post_form(&config.login_url, &body).await?;

    if is_login_url(&resp.final_url)? {
        let message =
            login_error_text(&resp.body).unwrap_or_else(|| "still on login page".to_string());
        return Err(Error::login(message));
    }

    let final_url = Url::parse(&resp.final_url)?;
    let session = client
        .cookie_value(&final_url, &config.session_cookie)
        .ok_or_else(|| {
            Error::login(format!(
                "session cookie '{}' not issued after login",
                config.session_cookie
            ))
        })?;

    info!("login succeeded");
    let mut cookies = BTreeMap::new();
    cookies.insert(config.session_cookie.clone(), session);
    for (name, value) in &config.extra_cookies {
        cookies.insert(name.clone(), value.clone());
    }
    Ok(cookies)
}

/// Pull the server's own error message off the login page, if it rendered one
fn login_error_text(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.select(&ERROR_SPAN_SELECTOR)
        .find(|span| {
            span.value()
                .attr("id")
                .is_some_and(|id| id.to_ascii_lowercase().contains("error"))
        })
        .map(element_text)
        .filter(|text| !text.is_empty())
}
