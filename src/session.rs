//! Anonymous visitor sessions.
//!
//! A visitor's cart is keyed by an opaque session key carried in the
//! `sessionid` cookie. Requests without a usable cookie get a fresh key.
//! The extractor stores the resolved session in the request extensions and
//! `attach_new_session` sets the cookie on the outgoing response, error
//! responses included, so the next request lands on the same cart.

use std::future::{ready, Ready};

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::{Payload, ServiceResponse};
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "sessionid";

/// Longest key the `carts.cart_key` column accepts.
const MAX_KEY_LEN: usize = 250;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSession {
    key: String,
    is_new: bool,
}

impl CartSession {
    /// Reuse the request's session key, or mint a new one.
    pub fn resolve(req: &HttpRequest) -> Self {
        match req.cookie(SESSION_COOKIE) {
            Some(cookie) if is_valid_key(cookie.value()) => Self {
                key: cookie.value().to_string(),
                is_new: false,
            },
            _ => Self::create(),
        }
    }

    pub fn create() -> Self {
        let key = Uuid::new_v4().simple().to_string();
        log::debug!("created session {}", key);
        Self { key, is_new: true }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// The cookie to send back, only when the key was just created.
    pub fn cookie(&self) -> Option<Cookie<'static>> {
        self.is_new.then(|| {
            Cookie::build(SESSION_COOKIE, self.key.clone())
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .finish()
        })
    }
}

/// Set the cookie for a session created while handling this request.
pub fn attach_new_session<B>(res: &mut ServiceResponse<B>) {
    let session = res.request().extensions().get::<CartSession>().cloned();
    let Some(cookie) = session.and_then(|s| s.cookie()) else {
        return;
    };
    if let Err(e) = res.response_mut().add_cookie(&cookie) {
        log::warn!("could not set session cookie: {}", e);
    }
}

fn is_valid_key(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_KEY_LEN
        && value.chars().all(|c| c.is_ascii_alphanumeric())
}

impl FromRequest for CartSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let existing = req.extensions().get::<CartSession>().cloned();
        if let Some(session) = existing {
            return ready(Ok(session));
        }
        let session = Self::resolve(req);
        req.extensions_mut().insert(session.clone());
        ready(Ok(session))
    }
}
