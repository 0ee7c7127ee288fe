//! Defines functions for storing the session token in a private cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

/// The name of the cookie holding the session token.
pub(crate) const COOKIE_TOKEN: &str = "session_token";
/// The default duration for which sessions and their cookies are valid.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::hours(24);

/// Add the session cookie to the cookie jar, expiring `duration` from now.
///
/// Returns the cookie jar with the cookie added.
pub(crate) fn set_session_cookie(
    jar: PrivateCookieJar,
    token: &str,
    duration: Duration,
) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, token.to_owned()))
            .expires(OffsetDateTime::now_utc() + duration)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub(crate) fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the session token from `jar`, if any.
pub(crate) fn get_session_token(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(COOKIE_TOKEN)
        .map(|cookie| cookie.value_trimmed().to_owned())
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Key, SameSite},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use super::{
        COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, get_session_token, invalidate_session_cookie,
        set_session_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    #[test]
    fn can_set_cookie() {
        let jar = set_session_cookie(get_jar(), "token", DEFAULT_COOKIE_DURATION);
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        let want_expiry = OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION;
        let got_expiry = cookie.expires_datetime().unwrap();
        assert!(
            (got_expiry - want_expiry).abs() < Duration::seconds(1),
            "got expiry {got_expiry:?}, want {want_expiry:?}"
        );
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(get_session_token(&jar), Some("token".to_owned()));
    }

    #[test]
    fn empty_jar_has_no_token() {
        assert_eq!(get_session_token(&get_jar()), None);
    }

    #[test]
    fn invalidate_cookie_succeeds() {
        let jar = set_session_cookie(get_jar(), "token", DEFAULT_COOKIE_DURATION);

        let jar = invalidate_session_cookie(jar);
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
