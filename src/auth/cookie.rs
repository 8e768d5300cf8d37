//! Defines functions for handling user authentication with cookies.
//!
//! A logged in user has two private cookies: one with their user ID and one
//! with the time the session expires. Both are encrypted and signed by
//! [PrivateCookieJar], so their values can be trusted once decoded.

use std::{cmp::max, num::ParseIntError};

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{
    Duration, OffsetDateTime, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{Error, auth::UserID};

pub(crate) const COOKIE_USER_ID: &str = "user_id";
pub(crate) const COOKIE_EXPIRY: &str = "expiry";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

/// Date time format for the cookie expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
         sign:mandatory]:[offset_minute]:[offset_second]"
);

fn auth_cookie<'c>(name: &'static str, value: String, expiry: OffsetDateTime) -> Cookie<'c> {
    Cookie::build((name, value))
        .expires(expiry)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Add the auth cookies for `user_id` to `jar`, valid for `duration` from now.
///
/// # Errors
///
/// Returns [Error::InvalidDateFormat] if the expiry cannot be formatted.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expiry = OffsetDateTime::now_utc() + duration;
    // format pads the hour to two digits, to_string does not.
    let expiry_string = expiry
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), expiry.to_string()))?;

    Ok(jar
        .add(auth_cookie(
            COOKIE_USER_ID,
            user_id.as_i64().to_string(),
            expiry,
        ))
        .add(auth_cookie(COOKIE_EXPIRY, expiry_string, expiry)))
}

/// Overwrite the auth cookies with expired ones so the browser deletes them.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let expired = |name: &'static str| {
        let mut cookie = auth_cookie(name, "deleted".to_owned(), OffsetDateTime::UNIX_EPOCH);
        cookie.set_max_age(Duration::ZERO);
        cookie
    };

    jar.add(expired(COOKIE_USER_ID)).add(expired(COOKIE_EXPIRY))
}

/// Push the expiry of the auth cookies out to `duration` from now, unless they
/// already expire later than that.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns:
/// - [Error::CookieMissing] if the auth cookies are not in the cookie jar.
/// - [Error::InvalidDateFormat] if the expiry cookie cannot be parsed, or the new expiry
///   overflows or cannot be formatted.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let current_expiry = get_expiry_from_auth_cookie(&jar)?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| {
            Error::InvalidDateFormat(
                "expiry overflowed".to_owned(),
                format!("now + {duration}"),
            )
        })?;

    set_auth_cookie_expiry(jar, max(current_expiry, new_expiry))
}

/// Set the expiry of both auth cookies, and the value of the expiry cookie, to `expiry`.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns a:
/// - [Error::CookieMissing] if the auth cookies are not in the cookie jar.
/// - [Error::InvalidDateFormat] if `expiry` cannot be formatted.
pub(crate) fn set_auth_cookie_expiry(
    jar: PrivateCookieJar,
    expiry: OffsetDateTime,
) -> Result<PrivateCookieJar, Error> {
    let expiry_string = expiry
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), expiry.to_string()))?;

    let mut user_id_cookie = jar.get(COOKIE_USER_ID).ok_or(Error::CookieMissing)?;
    let mut expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::CookieMissing)?;

    user_id_cookie.set_expires(expiry);
    expiry_cookie.set_expires(expiry);
    expiry_cookie.set_value(expiry_string);

    Ok(jar.add(user_id_cookie).add(expiry_cookie))
}

/// Get the ID of the logged in user.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the cookie is missing or does not hold a user ID.
pub(crate) fn get_user_id_from_auth_cookie(jar: &PrivateCookieJar) -> Result<UserID, Error> {
    jar.get(COOKIE_USER_ID)
        .ok_or(Error::InvalidCredentials)
        .and_then(|cookie| extract_user_id(&cookie).map_err(|_| Error::InvalidCredentials))
}

/// Get the time the session expires.
///
/// # Errors
///
/// Returns [Error::CookieMissing] if there is no expiry cookie, or
/// [Error::InvalidDateFormat] if the cookie does not hold a date time.
pub(crate) fn get_expiry_from_auth_cookie(jar: &PrivateCookieJar) -> Result<OffsetDateTime, Error> {
    let expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::CookieMissing)?;

    extract_date_time(&expiry_cookie).map_err(|error| {
        Error::InvalidDateFormat(error.to_string(), expiry_cookie.value_trimmed().to_owned())
    })
}

fn extract_date_time(cookie: &Cookie) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(cookie.value_trimmed(), DATE_TIME_FORMAT)
}

fn extract_user_id(cookie: &Cookie) -> Result<UserID, ParseIntError> {
    let id: i64 = cookie.value_trimmed().parse()?;

    Ok(UserID::new(id))
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime, UtcOffset, macros::datetime};

    use crate::{Error, auth::UserID};

    use super::{
        COOKIE_EXPIRY, COOKIE_USER_ID, DATE_TIME_FORMAT, DEFAULT_COOKIE_DURATION,
        extend_auth_cookie_duration_if_needed, extract_date_time, extract_user_id,
        get_expiry_from_auth_cookie, get_user_id_from_auth_cookie, invalidate_auth_cookie,
        set_auth_cookie, set_auth_cookie_expiry,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_extract_date_time_at_midnight() {
        let want = datetime!(2021-01-01 00:00:00).assume_offset(UtcOffset::UTC);
        let date_time_string = want.format(DATE_TIME_FORMAT).unwrap();
        let cookie = Cookie::build((COOKIE_EXPIRY, date_time_string)).build();

        let got = extract_date_time(&cookie).unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn can_extract_user_id() {
        let user_id = UserID::new(1);
        let cookie = Cookie::build((COOKIE_USER_ID, user_id.as_i64().to_string())).build();

        let got = extract_user_id(&cookie).unwrap();

        assert_eq!(got, user_id);
    }

    #[test]
    fn set_cookie_stores_user_id_and_expiry() {
        let user_id = UserID::new(1);

        let jar = set_auth_cookie(get_jar(), user_id, DEFAULT_COOKIE_DURATION).unwrap();

        assert_eq!(get_user_id_from_auth_cookie(&jar), Ok(user_id));
        assert_date_time_close!(
            get_expiry_from_auth_cookie(&jar).unwrap(),
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION
        );

        let cookie = jar.get(COOKIE_USER_ID).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn can_set_cookie_expires() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), DEFAULT_COOKIE_DURATION).unwrap();
        let want = OffsetDateTime::now_utc() + Duration::days(10);

        let jar = set_auth_cookie_expiry(jar, want).unwrap();

        let id_cookie = jar.get(COOKIE_USER_ID).unwrap();
        let expiry_cookie = jar.get(COOKIE_EXPIRY).unwrap();
        assert_eq!(id_cookie.expires_datetime(), Some(want));
        assert_eq!(expiry_cookie.expires_datetime(), Some(want));
        assert_eq!(extract_date_time(&expiry_cookie).unwrap(), want);
    }

    #[test]
    fn extend_pushes_out_expiry() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), DEFAULT_COOKIE_DURATION).unwrap();

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::minutes(10)).unwrap();

        let want = OffsetDateTime::now_utc() + Duration::minutes(10);
        assert_date_time_close!(get_expiry_from_auth_cookie(&jar).unwrap(), want);
        assert_date_time_close!(
            jar.get(COOKIE_USER_ID).unwrap().expires_datetime().unwrap(),
            want
        );
    }

    #[test]
    fn extend_keeps_later_expiry() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), Duration::days(7)).unwrap();
        let want = get_expiry_from_auth_cookie(&jar).unwrap();

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::seconds(5)).unwrap();

        assert_eq!(get_expiry_from_auth_cookie(&jar), Ok(want));
    }

    #[test]
    fn extend_fails_without_cookies() {
        let result = extend_auth_cookie_duration_if_needed(get_jar(), DEFAULT_COOKIE_DURATION);

        assert!(matches!(result, Err(Error::CookieMissing)));
    }

    #[test]
    fn invalidate_auth_cookie_succeeds() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), DEFAULT_COOKIE_DURATION).unwrap();

        let jar = invalidate_auth_cookie(jar);

        let cookie = jar.get(COOKIE_USER_ID).unwrap();
        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(
            get_user_id_from_auth_cookie(&jar),
            Err(Error::InvalidCredentials)
        );
    }
}
