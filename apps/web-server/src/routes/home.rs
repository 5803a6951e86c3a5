//! Home page.

use auth::TokenRecord;
use axum::response::Html;
use axum_extra::extract::SignedCookieJar;
use html_escape::encode_text;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::{ServerError, ServerResult};
use crate::session::{CookieSession, SessionStore};

/// Renders the current session.
pub async fn home(jar: SignedCookieJar) -> ServerResult<Html<String>> {
    let user = CookieSession::new(jar).user();
    let pretty = pretty_json(&user).map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(Html(render(user.as_ref(), &pretty)))
}

/// Serializes `value` as JSON indented by four spaces.
fn pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn render(user: Option<&TokenRecord>, pretty: &str) -> String {
    let greeting = match user {
        Some(user) => format!(
            r#"<h1 id="profileDropDown">Welcome {}!</h1>
    <p><a href="/logout" id="qsLogoutBtn">Logout</a></p>"#,
            encode_text(user.display_name().unwrap_or("back"))
        ),
        None => r#"<h1 id="profileDropDown">Welcome Guest</h1>
    <p id="sessionState">You are not logged in.</p>
    <p><a href="/login" id="qsLoginBtn">Login</a></p>"#
            .to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Auth0 Example</title>
  </head>
  <body>
    {}
    <div><pre id="session">{}</pre></div>
  </body>
</html>
"#,
        greeting,
        encode_text(pretty)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(name: &str) -> TokenRecord {
        serde_json::from_value(json!({
            "access_token": "at-123",
            "token_type": "Bearer",
            "userinfo": {"sub": "auth0|42", "name": name}
        }))
        .unwrap()
    }

    #[test]
    fn test_pretty_json_indents_four_spaces() {
        let pretty = pretty_json(&json!({"a": [1]})).unwrap();
        assert_eq!(pretty, "{\n    \"a\": [\n        1\n    ]\n}");

        assert_eq!(pretty_json(&None::<TokenRecord>).unwrap(), "null");
    }

    #[test]
    fn test_render_guest() {
        let page = render(None, "null");

        assert!(page.contains("Welcome Guest"));
        assert!(page.contains(r#"href="/login""#));
        assert!(page.contains(r#"<pre id="session">null</pre>"#));
    }

    #[test]
    fn test_render_user() {
        let user = token("Jane Doe");
        let pretty = pretty_json(&Some(&user)).unwrap();
        let page = render(Some(&user), &pretty);

        assert!(page.contains("Welcome Jane Doe!"));
        assert!(page.contains(r#"href="/logout""#));
        assert!(page.contains(r#""access_token": "at-123""#));
    }

    #[test]
    fn test_render_escapes_claims() {
        let user = token("<script>alert(1)</script>");
        let pretty = pretty_json(&Some(&user)).unwrap();
        let page = render(Some(&user), &pretty);

        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
