use crate::session::AuthState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    OtpVerify { email: String },
    ForgotPassword,
    ResetPassword { email: String },
    Home,
    Scan,
    Payout,
    Coupons,
}

impl Route {
    /// Views that need a signed-in user.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Home | Route::Scan | Route::Payout | Route::Coupons
        )
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::OtpVerify { .. } => "/otp-verify",
            Route::ForgotPassword => "/forgot-password",
            Route::ResetPassword { .. } => "/reset-password",
            Route::Home => "/",
            Route::Scan => "/scan",
            Route::Payout => "/payout",
            Route::Coupons => "/coupons",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Route),
    /// Auth has not been resolved yet.
    Loading,
    Redirect(Route),
}

pub fn guard(route: Route, auth: &AuthState) -> RouteDecision {
    if !route.is_protected() {
        return RouteDecision::Render(route);
    }
    match auth {
        AuthState::Unknown => RouteDecision::Loading,
        AuthState::Unauthenticated => RouteDecision::Redirect(Route::Login),
        AuthState::Authenticated(_) => RouteDecision::Render(route),
    }
}

/// Successful actions that move the user to another view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SignedUp { email: String },
    OtpVerified,
    PasswordResetRequested { email: String },
    PasswordReset,
    SignedIn,
    CouponSaved,
    LoggedOut,
}

pub fn destination(action: Action) -> Route {
    match action {
        Action::SignedUp { email } => Route::OtpVerify { email },
        Action::OtpVerified => Route::Login,
        Action::PasswordResetRequested { email } => Route::ResetPassword { email },
        Action::PasswordReset => Route::Login,
        Action::SignedIn => Route::Home,
        Action::CouponSaved => Route::Home,
        Action::LoggedOut => Route::Login,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{User, UserId};
    use uuid::Uuid;

    fn alice() -> User {
        User {
            id: UserId(Uuid::nil()),
            email: "alice@example.com".into(),
            name: Some("Alice".into()),
            profile_picture: None,
            is_verified: true,
            last_login: None,
        }
    }

    #[test]
    fn public_routes_render_regardless_of_auth() {
        for auth in [AuthState::Unknown, AuthState::Unauthenticated] {
            assert_eq!(
                guard(Route::Signup, &auth),
                RouteDecision::Render(Route::Signup)
            );
        }
    }

    #[test]
    fn protected_route_waits_while_auth_unknown() {
        assert_eq!(guard(Route::Payout, &AuthState::Unknown), RouteDecision::Loading);
    }

    #[test]
    fn protected_route_redirects_to_login_when_signed_out() {
        assert_eq!(
            guard(Route::Coupons, &AuthState::Unauthenticated),
            RouteDecision::Redirect(Route::Login)
        );
    }

    #[test]
    fn protected_route_renders_for_signed_in_user() {
        assert_eq!(
            guard(Route::Scan, &AuthState::Authenticated(alice())),
            RouteDecision::Render(Route::Scan)
        );
    }

    #[test]
    fn signup_leads_to_otp_verification_for_same_email() {
        assert_eq!(
            destination(Action::SignedUp {
                email: "bob@example.com".into()
            }),
            Route::OtpVerify {
                email: "bob@example.com".into()
            }
        );
        assert_eq!(destination(Action::OtpVerified).path(), "/login");
        assert_eq!(destination(Action::CouponSaved), Route::Home);
    }
}
