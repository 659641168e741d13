use axum::http::{HeaderMap, header};

/// Headers mirrored to the browser on every proxied response: the origin's
/// Set-Cookie values, including an explicit empty value (which the browser
/// needs to see for cookie clearing).
pub fn session_headers(origin: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::new();
    for value in origin.get_all(header::SET_COOKIE) {
        relayed.append(header::SET_COOKIE, value.clone());
    }
    relayed
}

/// Login variant: additionally mirror content-type and any `x-*` header, so
/// the origin can push custom session metadata to the browser without this
/// layer knowing its shape.
pub fn login_headers(origin: &HeaderMap) -> HeaderMap {
    let mut relayed = session_headers(origin);
    for (name, value) in origin {
        if name == header::CONTENT_TYPE || name.as_str().starts_with("x-") {
            relayed.append(name.clone(), value.clone());
        }
    }
    relayed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_headers_copy_set_cookie_only() {
        let mut origin = HeaderMap::new();
        origin.append(header::SET_COOKIE, "SID=abc; HttpOnly".parse().unwrap());
        origin.append(header::SET_COOKIE, "XSRF=1".parse().unwrap());
        origin.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        origin.insert("x-session-meta", "42".parse().unwrap());

        let relayed = session_headers(&origin);
        let cookies: Vec<_> = relayed.get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
        assert!(relayed.get(header::CONTENT_TYPE).is_none());
        assert!(relayed.get("x-session-meta").is_none());
    }

    #[test]
    fn test_empty_set_cookie_is_relayed() {
        // An explicit empty Set-Cookie still has to reach the browser.
        let mut origin = HeaderMap::new();
        origin.insert(header::SET_COOKIE, "".parse().unwrap());
        let relayed = session_headers(&origin);
        assert_eq!(relayed.get(header::SET_COOKIE).unwrap(), "");
    }

    #[test]
    fn test_login_headers_pass_custom_metadata() {
        let mut origin = HeaderMap::new();
        origin.insert(header::SET_COOKIE, "SID=abc".parse().unwrap());
        origin.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        origin.insert("x-session-meta", "42".parse().unwrap());
        origin.insert(header::CONTENT_LENGTH, "10".parse().unwrap());

        let relayed = login_headers(&origin);
        assert_eq!(relayed.get(header::SET_COOKIE).unwrap(), "SID=abc");
        assert_eq!(relayed.get("x-session-meta").unwrap(), "42");
        assert_eq!(
            relayed.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(relayed.get(header::CONTENT_LENGTH).is_none());
    }
}
