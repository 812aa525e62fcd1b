//! Authorization decision core.
//!
//! One pass over an ordered decision table, before any business logic runs.
//! The verdict is a plain value so the table stays unit-testable without a
//! router; the middleware in `middleware::access` owns the HTTP wiring.
//!
//! Branch order matters and must not be shuffled: an expired token on an
//! anonymous route still yields 401 because branch 1 runs before branch 6.

use axum::http::{Method, StatusCode};

use crate::services::auth::claims::Claim;
use crate::services::auth::delegated::{DelegatedAuthorizer, DelegatedError};
use crate::services::auth::token::TokenCodec;

/// Static per-route authorization policy, attached at registration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoutePolicy {
    pub requires_login: bool,
    pub requires_sudo: bool,
}

impl RoutePolicy {
    /// Anyone may call; a claim is attached if one is presented.
    pub const PUBLIC: Self = Self {
        requires_login: false,
        requires_sudo: false,
    };
    /// Logged-in end users (non-keeper types).
    pub const LOGIN: Self = Self {
        requires_login: true,
        requires_sudo: false,
    };
    /// Keeper staff, subject to the delegated authorization check.
    pub const SUDO: Self = Self {
        requires_login: true,
        requires_sudo: true,
    };
    /// Service-to-service: no end-user login, `internal` type only.
    pub const INTERNAL: Self = Self {
        requires_login: false,
        requires_sudo: true,
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny { status: StatusCode, message: String },
}

impl Verdict {
    fn deny(status: StatusCode, message: &str) -> Self {
        Self::Deny {
            status,
            message: message.to_string(),
        }
    }
}

/// Everything the decision needs from the request line, for the delegated
/// check on sudo routes.
#[derive(Clone, Copy, Debug)]
pub struct RequestLine<'a> {
    pub method: &'a Method,
    pub host: &'a str,
    pub uri: &'a str,
}

/// Evaluate the decision table, top to bottom, first match wins.
///
/// Returns the resolved claim alongside the verdict so the caller can attach
/// it to the request on `Allow`. A `Deny` is terminal: the wrapped handler
/// must never execute.
pub async fn authorize(
    codec: &TokenCodec,
    bearer: Option<&str>,
    policy: RoutePolicy,
    delegated_cookie: Option<&str>,
    request_line: RequestLine<'_>,
    delegated: &dyn DelegatedAuthorizer,
) -> (Option<Claim>, Verdict) {
    // 1. A presented token must verify, whatever the route policy says.
    let claim = match bearer {
        Some(token) => match codec.verify(token) {
            Ok(claim) => Some(claim),
            Err(_) => {
                return (
                    None,
                    Verdict::deny(StatusCode::UNAUTHORIZED, "invalid or expired auth token"),
                );
            }
        },
        None => None,
    };

    // 2. Login-required routes need a claim.
    if policy.requires_login && claim.is_none() {
        return (
            claim,
            Verdict::deny(StatusCode::UNAUTHORIZED, "auth token required"),
        );
    }

    if policy.requires_login && policy.requires_sudo {
        // 3. Sudo + login: keepers only, then the delegated service decides.
        // Branch 2 guarantees a claim is present here.
        if !claim.as_ref().is_some_and(Claim::is_keeper) {
            return (
                claim,
                Verdict::deny(StatusCode::FORBIDDEN, "required keeper user type"),
            );
        }

        // An absent or empty delegated cookie skips the remote check
        // entirely. Faithful to the reference behavior; see DESIGN.md.
        if let Some(cookie) = delegated_cookie.filter(|c| !c.is_empty()) {
            if let Err(err) = delegated
                .check(
                    request_line.method,
                    request_line.host,
                    request_line.uri,
                    cookie,
                )
                .await
            {
                return (claim, verdict_from_delegated(err));
            }
        }

        return (claim, Verdict::Allow);
    }

    if policy.requires_login {
        // 4. Plain logged-in routes are customer-facing; keepers are barred.
        if claim.as_ref().is_some_and(Claim::is_keeper) {
            return (
                claim,
                Verdict::deny(StatusCode::FORBIDDEN, "required customer type"),
            );
        }
        return (claim, Verdict::Allow);
    }

    if policy.requires_sudo {
        // 5. Anonymous-but-privileged: service-to-service callers only.
        let Some(ref c) = claim else {
            return (
                claim,
                Verdict::deny(StatusCode::UNAUTHORIZED, "auth token required"),
            );
        };
        if !c.is_internal() {
            return (
                claim,
                Verdict::deny(StatusCode::FORBIDDEN, "must be internal-user"),
            );
        }
        return (claim, Verdict::Allow);
    }

    // 6. Fully public. The claim, if any, rides along for personalization.
    (claim, Verdict::Allow)
}

fn verdict_from_delegated(err: DelegatedError) -> Verdict {
    match err {
        // The external service's own status/message surface verbatim.
        DelegatedError::Denied { status, message } => Verdict::Deny { status, message },
        DelegatedError::Transport(detail) => {
            tracing::warn!(error = %detail, "delegated authorization unreachable");
            Verdict::deny(
                StatusCode::INTERNAL_SERVER_ERROR,
                "authorization check failed",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::claims::{Claim, ClaimType, Role};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted delegated authorizer that records whether it was called.
    struct StubDelegated {
        result: Option<DelegatedError>,
        called: Mutex<bool>,
    }

    impl StubDelegated {
        fn allowing() -> Self {
            Self {
                result: None,
                called: Mutex::new(false),
            }
        }

        fn denying(status: StatusCode, message: &str) -> Self {
            Self {
                result: Some(DelegatedError::Denied {
                    status,
                    message: message.to_string(),
                }),
                called: Mutex::new(false),
            }
        }

        fn unreachable_service() -> Self {
            Self {
                result: Some(DelegatedError::Transport("connect refused".into())),
                called: Mutex::new(false),
            }
        }

        fn was_called(&self) -> bool {
            *self.called.lock().unwrap()
        }
    }

    #[async_trait]
    impl DelegatedAuthorizer for StubDelegated {
        async fn check(
            &self,
            _method: &Method,
            _host: &str,
            _uri: &str,
            _cookie: &str,
        ) -> Result<(), DelegatedError> {
            *self.called.lock().unwrap() = true;
            match &self.result {
                None => Ok(()),
                Some(DelegatedError::Denied { status, message }) => Err(DelegatedError::Denied {
                    status: *status,
                    message: message.clone(),
                }),
                Some(DelegatedError::Transport(d)) => Err(DelegatedError::Transport(d.clone())),
            }
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new("gate-test-secret", 0, 0)
    }

    fn claim_of(claim_type: ClaimType) -> Claim {
        Claim {
            id: "u-1".into(),
            customer_id: None,
            cart_id: None,
            keeper_user_id: None,
            claim_type,
            role: Role::User,
            full_name: "Test User".into(),
            email: "t@example.com".into(),
            phone_no: "".into(),
            gender: "".into(),
            dob: "".into(),
            profile_image: "".into(),
            email_verified: false,
            phone_verified: false,
            exp: None,
            iat: None,
            nbf: None,
        }
    }

    fn token_of(codec: &TokenCodec, claim_type: ClaimType) -> String {
        codec.sign(&mut claim_of(claim_type)).unwrap()
    }

    fn line(method: &Method) -> RequestLine<'_> {
        RequestLine {
            method,
            host: "shop.example.com",
            uri: "/api/v1/admin/overview",
        }
    }

    async fn decide(
        codec: &TokenCodec,
        bearer: Option<&str>,
        policy: RoutePolicy,
        cookie: Option<&str>,
        delegated: &StubDelegated,
    ) -> Verdict {
        let method = Method::GET;
        let (_, verdict) =
            authorize(codec, bearer, policy, cookie, line(&method), delegated).await;
        verdict
    }

    fn deny_status(verdict: &Verdict) -> StatusCode {
        match verdict {
            Verdict::Deny { status, .. } => *status,
            Verdict::Allow => panic!("expected deny, got allow"),
        }
    }

    #[tokio::test]
    async fn garbage_token_denies_even_on_public_routes() {
        let codec = codec();
        let delegated = StubDelegated::allowing();
        let verdict = decide(
            &codec,
            Some("not-a-token"),
            RoutePolicy::PUBLIC,
            None,
            &delegated,
        )
        .await;
        assert_eq!(deny_status(&verdict), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_route_without_token_is_401() {
        let codec = codec();
        let delegated = StubDelegated::allowing();
        let verdict = decide(&codec, None, RoutePolicy::LOGIN, None, &delegated).await;
        assert_eq!(deny_status(&verdict), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_route_with_customer_claim_allows() {
        let codec = codec();
        let token = token_of(&codec, ClaimType::Customer);
        let delegated = StubDelegated::allowing();
        let verdict = decide(&codec, Some(&token), RoutePolicy::LOGIN, None, &delegated).await;
        assert_eq!(verdict, Verdict::Allow);
    }

    #[tokio::test]
    async fn keeper_is_barred_from_customer_routes() {
        let codec = codec();
        let token = token_of(&codec, ClaimType::Keeper);
        let delegated = StubDelegated::allowing();
        let verdict = decide(&codec, Some(&token), RoutePolicy::LOGIN, None, &delegated).await;
        assert_eq!(deny_status(&verdict), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn sudo_route_requires_keeper_type() {
        let codec = codec();
        let token = token_of(&codec, ClaimType::Customer);
        let delegated = StubDelegated::allowing();
        let verdict = decide(
            &codec,
            Some(&token),
            RoutePolicy::SUDO,
            Some("cookie"),
            &delegated,
        )
        .await;
        assert_eq!(deny_status(&verdict), StatusCode::FORBIDDEN);
        assert!(!delegated.was_called());
    }

    #[tokio::test]
    async fn sudo_route_with_keeper_and_cookie_consults_delegated_service() {
        let codec = codec();
        let token = token_of(&codec, ClaimType::Keeper);
        let delegated = StubDelegated::allowing();
        let verdict = decide(
            &codec,
            Some(&token),
            RoutePolicy::SUDO,
            Some("valid-cookie"),
            &delegated,
        )
        .await;
        assert_eq!(verdict, Verdict::Allow);
        assert!(delegated.was_called());
    }

    #[tokio::test]
    async fn delegated_denial_propagates_status_and_message() {
        let codec = codec();
        let token = token_of(&codec, ClaimType::Keeper);
        let delegated = StubDelegated::denying(StatusCode::FORBIDDEN, "policy says no");
        let verdict = decide(
            &codec,
            Some(&token),
            RoutePolicy::SUDO,
            Some("cookie"),
            &delegated,
        )
        .await;
        assert_eq!(
            verdict,
            Verdict::Deny {
                status: StatusCode::FORBIDDEN,
                message: "policy says no".into()
            }
        );
    }

    #[tokio::test]
    async fn delegated_transport_failure_is_never_silent_success() {
        let codec = codec();
        let token = token_of(&codec, ClaimType::Keeper);
        let delegated = StubDelegated::unreachable_service();
        let verdict = decide(
            &codec,
            Some(&token),
            RoutePolicy::SUDO,
            Some("cookie"),
            &delegated,
        )
        .await;
        assert_eq!(deny_status(&verdict), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn empty_delegated_cookie_bypasses_the_remote_check() {
        let codec = codec();
        let token = token_of(&codec, ClaimType::Keeper);

        for cookie in [None, Some("")] {
            let delegated = StubDelegated::denying(StatusCode::FORBIDDEN, "would deny");
            let verdict = decide(&codec, Some(&token), RoutePolicy::SUDO, cookie, &delegated).await;
            assert_eq!(verdict, Verdict::Allow);
            assert!(!delegated.was_called());
        }
    }

    #[tokio::test]
    async fn internal_route_without_token_is_401() {
        let codec = codec();
        let delegated = StubDelegated::allowing();
        let verdict = decide(&codec, None, RoutePolicy::INTERNAL, None, &delegated).await;
        assert_eq!(deny_status(&verdict), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn internal_route_rejects_customer_claims() {
        let codec = codec();
        let token = token_of(&codec, ClaimType::Customer);
        let delegated = StubDelegated::allowing();
        let verdict = decide(&codec, Some(&token), RoutePolicy::INTERNAL, None, &delegated).await;
        assert_eq!(deny_status(&verdict), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn internal_route_allows_internal_claims() {
        let codec = codec();
        let token = token_of(&codec, ClaimType::Internal);
        let delegated = StubDelegated::allowing();
        let verdict = decide(&codec, Some(&token), RoutePolicy::INTERNAL, None, &delegated).await;
        assert_eq!(verdict, Verdict::Allow);
    }

    #[tokio::test]
    async fn public_route_allows_anonymous_and_keeps_optional_claim() {
        let codec = codec();
        let delegated = StubDelegated::allowing();

        let verdict = decide(&codec, None, RoutePolicy::PUBLIC, None, &delegated).await;
        assert_eq!(verdict, Verdict::Allow);

        let token = token_of(&codec, ClaimType::Customer);
        let method = Method::GET;
        let (claim, verdict) = authorize(
            &codec,
            Some(&token),
            RoutePolicy::PUBLIC,
            None,
            line(&method),
            &delegated,
        )
        .await;
        assert_eq!(verdict, Verdict::Allow);
        assert_eq!(claim.unwrap().claim_type, ClaimType::Customer);
    }
}
