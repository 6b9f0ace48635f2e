use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::{Duration, OffsetDateTime};
use tower_cookies::{Cookie, Cookies};

/// Attributes applied to a cookie when it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    pub max_age_secs: i64,
    pub http_only: bool,
    pub secure: bool,
    pub same_site_strict: bool,
    pub path: &'static str,
}

/// The request/response cookie transport the session store writes through.
pub trait CookieJar: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: String, attrs: &CookieAttributes);
    /// Replaces the cookie with an empty, already-expired one.
    fn clear(&self, name: &str, path: &'static str);
}

impl CookieJar for Cookies {
    fn get(&self, name: &str) -> Option<String> {
        Cookies::get(self, name).map(|c| c.value().to_string())
    }

    fn set(&self, name: &str, value: String, attrs: &CookieAttributes) {
        let mut cookie = Cookie::new(name.to_string(), value);
        cookie.set_http_only(attrs.http_only);
        cookie.set_secure(attrs.secure);
        cookie.set_same_site(if attrs.same_site_strict {
            SameSite::Strict
        } else {
            SameSite::Lax
        });
        cookie.set_max_age(Duration::seconds(attrs.max_age_secs));
        cookie.set_path(attrs.path);
        self.add(cookie);
    }

    fn clear(&self, name: &str, path: &'static str) {
        let mut cookie = Cookie::new(name.to_string(), "");
        cookie.set_max_age(Duration::seconds(0));
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie.set_path(path);
        self.add(cookie);
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::{CookieAttributes, CookieJar};

    /// A cookie jar that behaves like a browser for a single site.
    #[derive(Default)]
    pub struct MemoryCookieJar {
        cookies: Mutex<HashMap<String, (String, CookieAttributes)>>,
    }

    impl MemoryCookieJar {
        pub fn attributes(&self, name: &str) -> Option<CookieAttributes> {
            self.cookies.lock().unwrap().get(name).map(|(_, a)| a.clone())
        }

        pub fn insert_raw(&self, name: &str, value: &str) {
            let attrs = CookieAttributes {
                max_age_secs: 60,
                http_only: true,
                secure: true,
                same_site_strict: true,
                path: "/",
            };
            self.cookies
                .lock()
                .unwrap()
                .insert(name.to_string(), (value.to_string(), attrs));
        }
    }

    impl CookieJar for MemoryCookieJar {
        fn get(&self, name: &str) -> Option<String> {
            self.cookies.lock().unwrap().get(name).map(|(v, _)| v.clone())
        }

        fn set(&self, name: &str, value: String, attrs: &CookieAttributes) {
            self.cookies
                .lock()
                .unwrap()
                .insert(name.to_string(), (value, attrs.clone()));
        }

        fn clear(&self, name: &str, _path: &'static str) {
            self.cookies.lock().unwrap().remove(name);
        }
    }
}
