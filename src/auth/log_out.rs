//! Log-out route handler that invalidates authentication cookies and redirects users.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Invalidate the auth cookies and redirect the client to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    (invalidate_auth_cookie(jar), Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::http::{StatusCode, header::SET_COOKIE};
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use time::OffsetDateTime;

    use crate::{
        app_state::create_cookie_key,
        auth::{
            DEFAULT_COOKIE_DURATION, UserID,
            cookie::{COOKIE_EXPIRY, COOKIE_USER_ID},
            set_auth_cookie,
        },
        endpoints,
    };

    use super::get_log_out;

    #[tokio::test]
    async fn log_out_expires_auth_cookies_and_redirects() {
        let jar = PrivateCookieJar::new(create_cookie_key("42"));
        let jar = set_auth_cookie(jar, UserID::new(123), DEFAULT_COOKIE_DURATION).unwrap();

        let response = get_log_out(jar).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_IN_VIEW
        );

        let mut expired_cookies = Vec::new();
        for header in response.headers().get_all(SET_COOKIE) {
            let cookie = Cookie::parse(header.to_str().unwrap()).unwrap();
            assert_eq!(
                cookie.expires_datetime(),
                Some(OffsetDateTime::UNIX_EPOCH),
                "want cookie {} to be expired",
                cookie.name()
            );
            expired_cookies.push(cookie.name().to_owned());
        }

        expired_cookies.sort();
        assert_eq!(expired_cookies, vec![COOKIE_EXPIRY, COOKIE_USER_ID]);
    }
}
