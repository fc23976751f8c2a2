// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ordered route policy.
//!
//! A `RoutePolicy` is a list of `(method, path pattern, requirement)` entries
//! evaluated first-match-wins, plus a fallback for requests no entry
//! matches. The table is built once at startup and read concurrently by
//! every request.
//!
//! ## Pattern syntax
//!
//! | Segment | Matches |
//! |---------|---------|
//! | `users` | exactly that segment |
//! | `*` | any one non-empty segment |
//! | `{id}` | one segment of ASCII digits only |
//! | `**` | zero or more segments (last position only) |
//!
//! Matching is segment-wise, never by string prefix: `/api/users/{id}`
//! does not match `/api/users/me`, and `/api/users` does not match
//! `/api/users-export`.
//!
//! Building the table rejects an entry that an earlier entry fully covers,
//! since it could never be selected. This is what keeps literal routes such
//! as `/api/restaurants/my` ahead of the `/api/restaurants/*` rule that
//! would otherwise capture them.

use axum::http::Method;

use super::{claims::Authority, roles::Role, AuthError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid path pattern {pattern:?}: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    #[error("entry {index} ({pattern}) requires an empty role set")]
    EmptyRoleSet { index: usize, pattern: String },

    #[error("entry {index} ({pattern}) is unreachable: entry {by_index} ({by_pattern}) matches first")]
    Shadowed {
        index: usize,
        pattern: String,
        by_index: usize,
        by_pattern: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    Numeric,
    Rest,
}

impl Segment {
    fn matches(&self, part: &str) -> bool {
        match self {
            Segment::Literal(literal) => literal == part,
            Segment::Any => !part.is_empty(),
            Segment::Numeric => is_numeric(part),
            Segment::Rest => true,
        }
    }

    /// Every segment `other` accepts, `self` accepts too.
    fn covers(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Rest, _) => true,
            (Segment::Any, Segment::Literal(_) | Segment::Any | Segment::Numeric) => true,
            (Segment::Numeric, Segment::Numeric) => true,
            (Segment::Numeric, Segment::Literal(literal)) => is_numeric(literal),
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            _ => false,
        }
    }
}

fn is_numeric(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// A parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PolicyError> {
        let invalid = |reason| PolicyError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let body = pattern
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;

        let mut segments = Vec::new();
        if !body.is_empty() {
            let parts: Vec<&str> = body.split('/').collect();
            let last = parts.len() - 1;
            for (i, part) in parts.into_iter().enumerate() {
                let segment = match part {
                    "" => return Err(invalid("empty segment")),
                    "**" if i == last => Segment::Rest,
                    "**" => return Err(invalid("'**' is only allowed as the last segment")),
                    "*" => Segment::Any,
                    p if p.starts_with('{') && p.ends_with('}') => {
                        let name = &p[1..p.len() - 1];
                        if name.is_empty()
                            || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
                        {
                            return Err(invalid("parameter name must be alphanumeric"));
                        }
                        Segment::Numeric
                    }
                    p if p.contains(['*', '{', '}']) => {
                        return Err(invalid("wildcards must fill a whole segment"))
                    }
                    p => Segment::Literal(p.to_string()),
                };
                segments.push(segment);
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path (no query string).
    pub fn matches(&self, path: &str) -> bool {
        let Some(body) = path.strip_prefix('/') else {
            return false;
        };
        let parts: Vec<&str> = if body.is_empty() {
            Vec::new()
        } else {
            body.split('/').collect()
        };
        match_segments(&self.segments, &parts)
    }

    /// Whether every path `other` matches is also matched by `self`.
    ///
    /// Conservative: `false` means "not provably covered".
    pub fn covers(&self, other: &PathPattern) -> bool {
        cover_segments(&self.segments, &other.segments)
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match (pattern.split_first(), path.split_first()) {
        (None, None) => true,
        (Some((Segment::Rest, _)), _) => true,
        (Some((segment, rest)), Some((part, tail))) => {
            segment.matches(part) && match_segments(rest, tail)
        }
        _ => false,
    }
}

fn cover_segments(a: &[Segment], b: &[Segment]) -> bool {
    match (a.split_first(), b.split_first()) {
        (Some((Segment::Rest, _)), _) => true,
        (None, None) => true,
        (Some(_), Some((Segment::Rest, _))) => false,
        (Some((sa, ra)), Some((sb, rb))) => sa.covers(sb) && cover_segments(ra, rb),
        _ => false,
    }
}

/// What a matched entry demands of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone, authenticated or not
    Public,
    /// Any authenticated principal
    Authenticated,
    /// A principal whose role satisfies one of these; `ADMIN` always does
    RoleIn(Vec<Role>),
}

impl Requirement {
    pub fn role_in(roles: impl IntoIterator<Item = Role>) -> Self {
        Requirement::RoleIn(roles.into_iter().collect())
    }

    pub fn check<A: Authority>(&self, who: Option<&A>) -> Result<(), AuthError> {
        match self {
            Requirement::Public => Ok(()),
            Requirement::Authenticated => who.map(|_| ()).ok_or(AuthError::Unauthenticated),
            Requirement::RoleIn(roles) => {
                let principal = who.ok_or(AuthError::Unauthenticated)?;
                let role = principal.role();
                if roles.iter().any(|required| role.has_privilege(*required)) {
                    Ok(())
                } else {
                    Err(AuthError::InsufficientRole)
                }
            }
        }
    }
}

/// Decision for requests that match no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Reject everyone: 401 when anonymous, 403 otherwise
    DenyAll,
    /// Allow any authenticated principal
    Authenticated,
}

/// One row of the policy table.
#[derive(Debug, Clone)]
pub struct PolicyEntry {
    method: Option<Method>,
    pattern: PathPattern,
    requirement: Requirement,
}

impl PolicyEntry {
    /// `None` means any method.
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && self.pattern.matches(path)
    }

    fn covers(&self, other: &PolicyEntry) -> bool {
        let method_covers = match (&self.method, &other.method) {
            (None, _) => true,
            (Some(a), Some(b)) => a == b,
            (Some(_), None) => false,
        };
        method_covers && self.pattern.covers(&other.pattern)
    }

    fn describe(&self) -> String {
        match &self.method {
            Some(method) => format!("{method} {}", self.pattern.as_str()),
            None => format!("* {}", self.pattern.as_str()),
        }
    }
}

/// Immutable, ordered route policy.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    entries: Vec<PolicyEntry>,
    fallback: Fallback,
}

impl RoutePolicy {
    pub fn builder() -> RoutePolicyBuilder {
        RoutePolicyBuilder::default()
    }

    pub fn entries(&self) -> &[PolicyEntry] {
        &self.entries
    }

    pub fn fallback(&self) -> Fallback {
        self.fallback
    }

    /// Index of the first entry matching the request, if any.
    pub fn matching_index(&self, method: &Method, path: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.matches(method, path))
    }

    pub fn matching_entry(&self, method: &Method, path: &str) -> Option<&PolicyEntry> {
        self.matching_index(method, path).map(|i| &self.entries[i])
    }

    /// Decide whether `who` may call `method path`.
    ///
    /// Inactive principals are treated as anonymous.
    pub fn authorize<A: Authority>(
        &self,
        method: &Method,
        path: &str,
        who: Option<&A>,
    ) -> Result<(), AuthError> {
        let who = who.filter(|p| p.is_active());

        match self.matching_entry(method, path) {
            Some(entry) => entry.requirement.check(who),
            None => match self.fallback {
                Fallback::Authenticated => Requirement::Authenticated.check(who),
                Fallback::DenyAll if who.is_some() => Err(AuthError::InsufficientRole),
                Fallback::DenyAll => Err(AuthError::Unauthenticated),
            },
        }
    }

    /// Policy of the restaurant API.
    pub fn restaurant_api() -> Result<Self, PolicyError> {
        let verified = || Requirement::role_in([Role::VerifiedUser, Role::Admin]);
        let admin = || Requirement::role_in([Role::Admin]);

        RoutePolicy::builder()
            .route(Method::OPTIONS, "/**", Requirement::Public)
            .any_method("/api/auth/**", Requirement::Public)
            .route(Method::GET, "/health/**", Requirement::Public)
            .route(Method::GET, "/docs/**", Requirement::Public)
            .route(Method::GET, "/api-doc/**", Requirement::Public)
            // Literal "me"/"my" routes ahead of the parametric ones below.
            .any_method("/api/restaurants/my", Requirement::Authenticated)
            .any_method("/api/users/me/**", Requirement::Authenticated)
            .route(Method::GET, "/api/restaurants", Requirement::Public)
            .route(Method::GET, "/api/restaurants/*", Requirement::Public)
            .route(Method::GET, "/api/restaurants/*/menu", Requirement::Public)
            .route(Method::GET, "/api/dishes/*", Requirement::Public)
            .route(Method::GET, "/api/allergens", Requirement::Public)
            .any_method("/api/admin/**", admin())
            .route(Method::DELETE, "/api/users/{id}", admin())
            .route(Method::GET, "/api/users/{id}", admin())
            .route(Method::POST, "/api/restaurants", verified())
            .route(Method::PUT, "/api/restaurants/*", verified())
            .route(Method::DELETE, "/api/restaurants/*", verified())
            .route(Method::POST, "/api/restaurants/*/dishes", verified())
            .route(Method::PUT, "/api/dishes/*", verified())
            .route(Method::DELETE, "/api/dishes/*", verified())
            .any_method("/api/upload/**", Requirement::Authenticated)
            .fallback(Fallback::Authenticated)
            .build()
    }
}

/// Builder validating a policy table before it is used.
#[derive(Debug)]
pub struct RoutePolicyBuilder {
    rules: Vec<(Option<Method>, String, Requirement)>,
    fallback: Fallback,
}

impl Default for RoutePolicyBuilder {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            fallback: Fallback::DenyAll,
        }
    }
}

impl RoutePolicyBuilder {
    pub fn route(mut self, method: Method, pattern: &str, requirement: Requirement) -> Self {
        self.rules.push((Some(method), pattern.to_string(), requirement));
        self
    }

    pub fn any_method(mut self, pattern: &str, requirement: Requirement) -> Self {
        self.rules.push((None, pattern.to_string(), requirement));
        self
    }

    /// Defaults to `Fallback::DenyAll`.
    pub fn fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn build(self) -> Result<RoutePolicy, PolicyError> {
        let mut entries: Vec<PolicyEntry> = Vec::with_capacity(self.rules.len());

        for (index, (method, pattern, requirement)) in self.rules.into_iter().enumerate() {
            let entry = PolicyEntry {
                method,
                pattern: PathPattern::parse(&pattern)?,
                requirement,
            };

            if matches!(&entry.requirement, Requirement::RoleIn(roles) if roles.is_empty()) {
                return Err(PolicyError::EmptyRoleSet {
                    index,
                    pattern: entry.describe(),
                });
            }

            if let Some(by_index) = entries.iter().position(|earlier| earlier.covers(&entry)) {
                return Err(PolicyError::Shadowed {
                    index,
                    pattern: entry.describe(),
                    by_index,
                    by_pattern: entries[by_index].describe(),
                });
            }

            entries.push(entry);
        }

        Ok(RoutePolicy {
            entries,
            fallback: self.fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;

    fn principal(role: Role) -> Principal {
        Principal {
            id: 42,
            email: "a@x.com".to_string(),
            role,
            active: true,
        }
    }

    fn pattern(raw: &str) -> PathPattern {
        PathPattern::parse(raw).unwrap()
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Outcome {
        Allow,
        Unauthorized,
        Forbidden,
    }

    fn outcome(result: Result<(), AuthError>) -> Outcome {
        match result {
            Ok(()) => Outcome::Allow,
            Err(AuthError::Unauthenticated) => Outcome::Unauthorized,
            Err(AuthError::InsufficientRole) => Outcome::Forbidden,
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    fn evaluate(policy: &RoutePolicy, method: &Method, path: &str, role: Option<Role>) -> Outcome {
        let who = role.map(principal);
        outcome(policy.authorize(method, path, who.as_ref()))
    }

    // ---------------------------------------------------------------------
    // Patterns
    // ---------------------------------------------------------------------

    #[test]
    fn literal_patterns_match_whole_segments() {
        let p = pattern("/api/users");
        assert!(p.matches("/api/users"));
        assert!(!p.matches("/api/users/"));
        assert!(!p.matches("/api/users-export"));
        assert!(!p.matches("/api/users/1"));
        assert!(!p.matches("/api"));
        assert!(!p.matches("api/users"));
    }

    #[test]
    fn numeric_parameter_only_matches_digits() {
        let p = pattern("/api/users/{id}");
        assert!(p.matches("/api/users/1"));
        assert!(p.matches("/api/users/00042"));
        assert!(!p.matches("/api/users/me"));
        assert!(!p.matches("/api/users/12a"));
        assert!(!p.matches("/api/users/-1"));
        assert!(!p.matches("/api/users/"));
        assert!(!p.matches("/api/users/1/extra"));
    }

    #[test]
    fn star_matches_exactly_one_segment() {
        let p = pattern("/api/restaurants/*/menu");
        assert!(p.matches("/api/restaurants/7/menu"));
        assert!(p.matches("/api/restaurants/my/menu"));
        assert!(!p.matches("/api/restaurants//menu"));
        assert!(!p.matches("/api/restaurants/7/8/menu"));
    }

    #[test]
    fn double_star_matches_zero_or_more_segments() {
        let p = pattern("/api/users/me/**");
        assert!(p.matches("/api/users/me"));
        assert!(p.matches("/api/users/me/"));
        assert!(p.matches("/api/users/me/change-password"));
        assert!(p.matches("/api/users/me/a/b/c"));
        assert!(!p.matches("/api/users/meh"));
        assert!(!p.matches("/api/users"));

        let all = pattern("/**");
        assert!(all.matches("/"));
        assert!(all.matches("/anything/at/all"));
    }

    #[test]
    fn root_pattern_matches_only_root() {
        let p = pattern("/");
        assert!(p.matches("/"));
        assert!(!p.matches("/x"));
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        for raw in [
            "api/users",
            "/api//users",
            "/api/**/users",
            "/api/user*",
            "/api/{}",
            "/api/{id-x}",
            "/api/x{id}",
        ] {
            assert!(
                matches!(PathPattern::parse(raw), Err(PolicyError::InvalidPattern { .. })),
                "{raw}"
            );
        }
    }

    #[test]
    fn coverage_between_patterns() {
        assert!(pattern("/a/*").covers(&pattern("/a/me")));
        assert!(pattern("/a/*").covers(&pattern("/a/{id}")));
        assert!(pattern("/a/{id}").covers(&pattern("/a/7")));
        assert!(!pattern("/a/{id}").covers(&pattern("/a/me")));
        assert!(!pattern("/a/{id}").covers(&pattern("/a/*")));
        assert!(pattern("/a/**").covers(&pattern("/a")));
        assert!(pattern("/a/**").covers(&pattern("/a/b/**")));
        assert!(!pattern("/a/b/**").covers(&pattern("/a/**")));
        assert!(!pattern("/a/*").covers(&pattern("/a/**")));
        assert!(!pattern("/a/me").covers(&pattern("/a/*")));
    }

    // ---------------------------------------------------------------------
    // Builder
    // ---------------------------------------------------------------------

    #[test]
    fn parametric_rule_before_literal_is_rejected() {
        let result = RoutePolicy::builder()
            .route(Method::GET, "/api/restaurants/*", Requirement::Public)
            .any_method("/api/restaurants/my", Requirement::Authenticated)
            .build();

        assert!(matches!(
            result,
            Err(PolicyError::Shadowed {
                index: 1,
                by_index: 0,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let result = RoutePolicy::builder()
            .route(Method::GET, "/api/allergens", Requirement::Public)
            .route(Method::GET, "/api/allergens", Requirement::Public)
            .build();
        assert!(matches!(result, Err(PolicyError::Shadowed { index: 1, .. })));
    }

    #[test]
    fn method_specific_rule_does_not_shadow_other_methods() {
        let policy = RoutePolicy::builder()
            .route(Method::GET, "/api/restaurants/*", Requirement::Public)
            .route(Method::PUT, "/api/restaurants/*", Requirement::Authenticated)
            .build();
        assert!(policy.is_ok());
    }

    #[test]
    fn empty_role_set_is_rejected() {
        let result = RoutePolicy::builder()
            .any_method("/x", Requirement::RoleIn(Vec::new()))
            .build();
        assert!(matches!(result, Err(PolicyError::EmptyRoleSet { index: 0, .. })));
    }

    #[test]
    fn restaurant_api_policy_builds() {
        let policy = RoutePolicy::restaurant_api().unwrap();
        assert_eq!(policy.fallback(), Fallback::Authenticated);
        assert!(!policy.entries().is_empty());
    }

    // ---------------------------------------------------------------------
    // Evaluation
    // ---------------------------------------------------------------------

    #[test]
    fn first_matching_entry_wins() {
        // Neither pattern covers the other, but both match /a/1/x.
        let policy = RoutePolicy::builder()
            .route(Method::GET, "/a/*/x", Requirement::Public)
            .route(Method::GET, "/a/{id}/*", Requirement::role_in([Role::Admin]))
            .build()
            .unwrap();

        assert_eq!(policy.matching_index(&Method::GET, "/a/1/x"), Some(0));
        assert_eq!(evaluate(&policy, &Method::GET, "/a/1/x", None), Outcome::Allow);
        assert_eq!(
            evaluate(&policy, &Method::GET, "/a/1/y", None),
            Outcome::Unauthorized
        );
    }

    #[test]
    fn literal_me_route_wins_over_numeric_rule() {
        let policy = RoutePolicy::restaurant_api().unwrap();

        for method in [Method::GET, Method::DELETE] {
            let entry = policy.matching_entry(&method, "/api/users/me").unwrap();
            assert_eq!(entry.pattern().as_str(), "/api/users/me/**");
            assert_eq!(entry.requirement(), &Requirement::Authenticated);

            let entry = policy.matching_entry(&method, "/api/users/42").unwrap();
            assert_eq!(entry.pattern().as_str(), "/api/users/{id}");
        }

        assert_eq!(
            evaluate(&policy, &Method::DELETE, "/api/users/me", Some(Role::User)),
            Outcome::Allow
        );
        assert_eq!(
            evaluate(&policy, &Method::DELETE, "/api/users/42", Some(Role::User)),
            Outcome::Forbidden
        );

        let entry = policy
            .matching_entry(&Method::GET, "/api/restaurants/my")
            .unwrap();
        assert_eq!(entry.pattern().as_str(), "/api/restaurants/my");
        assert_eq!(
            evaluate(&policy, &Method::GET, "/api/restaurants/my", None),
            Outcome::Unauthorized
        );
    }

    #[test]
    fn restaurant_api_role_matrix() {
        use Outcome::{Allow as A, Forbidden as F, Unauthorized as U};

        let policy = RoutePolicy::restaurant_api().unwrap();
        // Columns: anonymous, USER, VERIFIED_USER, ADMIN.
        let matrix: &[(Method, &str, [Outcome; 4])] = &[
            (Method::OPTIONS, "/api/admin/users", [A, A, A, A]),
            (Method::POST, "/api/auth/login", [A, A, A, A]),
            (Method::POST, "/api/auth/register", [A, A, A, A]),
            (Method::GET, "/health", [A, A, A, A]),
            (Method::GET, "/health/live", [A, A, A, A]),
            (Method::GET, "/docs/", [A, A, A, A]),
            (Method::GET, "/api-doc/openapi.json", [A, A, A, A]),
            (Method::GET, "/api/restaurants/my", [U, A, A, A]),
            (Method::GET, "/api/users/me", [U, A, A, A]),
            (Method::PUT, "/api/users/me", [U, A, A, A]),
            (Method::PUT, "/api/users/me/change-password", [U, A, A, A]),
            (Method::DELETE, "/api/users/me", [U, A, A, A]),
            (Method::GET, "/api/restaurants", [A, A, A, A]),
            (Method::GET, "/api/restaurants/17", [A, A, A, A]),
            (Method::GET, "/api/restaurants/17/menu", [A, A, A, A]),
            (Method::GET, "/api/dishes/3", [A, A, A, A]),
            (Method::GET, "/api/allergens", [A, A, A, A]),
            (Method::GET, "/api/admin/stats", [U, F, F, A]),
            (Method::PUT, "/api/admin/users/5/verify", [U, F, F, A]),
            (Method::GET, "/api/users/5", [U, F, F, A]),
            (Method::DELETE, "/api/users/5", [U, F, F, A]),
            (Method::POST, "/api/restaurants", [U, F, A, A]),
            (Method::PUT, "/api/restaurants/5", [U, F, A, A]),
            (Method::DELETE, "/api/restaurants/5", [U, F, A, A]),
            (Method::POST, "/api/restaurants/5/dishes", [U, F, A, A]),
            (Method::PUT, "/api/dishes/5", [U, F, A, A]),
            (Method::DELETE, "/api/dishes/5", [U, F, A, A]),
            (Method::POST, "/api/upload/image", [U, A, A, A]),
            // No entry: fallback requires authentication.
            (Method::GET, "/api/users/abc", [U, A, A, A]),
            (Method::POST, "/api/reviews", [U, A, A, A]),
            (Method::GET, "/", [U, A, A, A]),
        ];

        let callers = [None, Some(Role::User), Some(Role::VerifiedUser), Some(Role::Admin)];
        for (method, path, expected) in matrix {
            for (caller, want) in callers.iter().zip(expected) {
                assert_eq!(
                    evaluate(&policy, method, path, *caller),
                    *want,
                    "{method} {path} as {caller:?}"
                );
            }
        }
    }

    #[test]
    fn admin_is_allowed_wherever_verified_user_is() {
        let policy = RoutePolicy::restaurant_api().unwrap();
        for entry in policy.entries() {
            if let Requirement::RoleIn(_) = entry.requirement() {
                let verified = entry.requirement().check(Some(&principal(Role::VerifiedUser)));
                let admin = entry.requirement().check(Some(&principal(Role::Admin)));
                if verified.is_ok() {
                    assert!(admin.is_ok(), "{}", entry.describe());
                }
            }
        }

        // Even a set that names only VERIFIED_USER admits ADMIN.
        let only_verified = Requirement::role_in([Role::VerifiedUser]);
        assert!(only_verified.check(Some(&principal(Role::Admin))).is_ok());
        assert!(matches!(
            only_verified.check(Some(&principal(Role::User))),
            Err(AuthError::InsufficientRole)
        ));
    }

    #[test]
    fn deny_all_fallback_fails_closed() {
        let policy = RoutePolicy::builder()
            .route(Method::GET, "/open", Requirement::Public)
            .build()
            .unwrap();

        assert_eq!(evaluate(&policy, &Method::GET, "/open", None), Outcome::Allow);
        assert_eq!(
            evaluate(&policy, &Method::GET, "/other", None),
            Outcome::Unauthorized
        );
        assert_eq!(
            evaluate(&policy, &Method::GET, "/other", Some(Role::Admin)),
            Outcome::Forbidden
        );
        assert_eq!(
            evaluate(&policy, &Method::POST, "/open", Some(Role::User)),
            Outcome::Forbidden
        );
    }

    #[test]
    fn inactive_principal_counts_as_anonymous() {
        let policy = RoutePolicy::restaurant_api().unwrap();
        let mut inactive = principal(Role::Admin);
        inactive.active = false;

        assert!(matches!(
            policy.authorize(&Method::GET, "/api/admin/users", Some(&inactive)),
            Err(AuthError::Unauthenticated)
        ));
        assert!(policy
            .authorize(&Method::GET, "/api/allergens", Some(&inactive))
            .is_ok());
    }

    #[test]
    fn example_scenario_verified_user() {
        let policy = RoutePolicy::builder()
            .route(Method::GET, "/public", Requirement::Public)
            .route(Method::GET, "/members", Requirement::Authenticated)
            .route(
                Method::POST,
                "/contributions",
                Requirement::role_in([Role::VerifiedUser, Role::Admin]),
            )
            .route(Method::POST, "/moderation", Requirement::role_in([Role::Admin]))
            .build()
            .unwrap();

        let caller = Some(Role::VerifiedUser);
        assert_eq!(
            evaluate(&policy, &Method::POST, "/contributions", caller),
            Outcome::Allow
        );
        assert_eq!(
            evaluate(&policy, &Method::POST, "/moderation", caller),
            Outcome::Forbidden
        );
        assert_eq!(evaluate(&policy, &Method::GET, "/public", None), Outcome::Allow);
        assert_eq!(
            evaluate(&policy, &Method::GET, "/members", None),
            Outcome::Unauthorized
        );
    }
}
