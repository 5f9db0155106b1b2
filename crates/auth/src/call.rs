//! Transport-neutral view of an inbound call and its per-call identity slots.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::claims::JwtPrincipal;
use crate::error::AuthError;
use crate::identity::CallerIdentity;
use crate::routes::RouteId;
use crate::strategies::oauth::OAuthPrincipal;
use crate::strategies::passkey::PasskeyPayload;

/// Raw principal attached by whichever strategy authenticated the call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", content = "principal", rename_all = "snake_case")]
pub enum Authentication {
    Jwt(JwtPrincipal),
    #[serde(rename = "oauth")]
    OAuth(OAuthPrincipal),
    Passkey(PasskeyPayload),
}

/// One inbound call as the guards see it.
///
/// Header names are stored lower-cased. `authentication` and `current_user`
/// are write-once slots filled by the guards.
#[derive(Debug, Clone)]
pub struct InboundCall {
    route: RouteId,
    headers: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    body: Option<Value>,
    authentication: Option<Authentication>,
    current_user: Option<CallerIdentity>,
}

impl InboundCall {
    pub fn new(route: RouteId) -> Self {
        Self {
            route,
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            body: None,
            authentication: None,
            current_user: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn route(&self) -> &RouteId {
        &self.route
    }

    /// Header value; empty values are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Token of an `Authorization: Bearer <token>` header.
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.header("authorization")?;
        let (scheme, token) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    pub fn current_user(&self) -> Option<&CallerIdentity> {
        self.current_user.as_ref()
    }

    pub fn attach_authentication(&mut self, authentication: Authentication) -> Result<(), AuthError> {
        if self.authentication.is_some() {
            return Err(AuthError::unauthorized("call already carries an authentication"));
        }
        self.authentication = Some(authentication);
        Ok(())
    }

    pub fn attach_current_user(&mut self, identity: CallerIdentity) -> Result<(), AuthError> {
        if self.current_user.is_some() {
            return Err(AuthError::unauthorized("call already carries a current user"));
        }
        self.current_user = Some(identity);
        Ok(())
    }

    /// Hand the filled slots over to the transport.
    pub fn into_slots(self) -> (Option<Authentication>, Option<CallerIdentity>) {
        (self.authentication, self.current_user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caregate_core::SubjectId;

    fn call() -> InboundCall {
        InboundCall::new(RouteId::new("GET", "/whoami"))
    }

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        assert_eq!(call().with_header("Authorization", "Bearer abc").bearer_token(), Some("abc"));
        assert_eq!(call().with_header("authorization", "bearer abc").bearer_token(), Some("abc"));
        assert_eq!(call().with_header("authorization", "Bearer ").bearer_token(), None);
        assert_eq!(call().with_header("authorization", "Basic abc").bearer_token(), None);
        assert_eq!(call().bearer_token(), None);
    }

    #[test]
    fn empty_headers_count_as_absent() {
        let call = call().with_header("X-Custom-Token", "");
        assert_eq!(call.header("x-custom-token"), None);
    }

    #[test]
    fn authentication_slot_is_write_once() {
        let mut call = call();
        let principal = Authentication::Jwt(JwtPrincipal {
            sub: SubjectId::new(),
            user_type: None,
        });
        call.attach_authentication(principal.clone()).unwrap();
        assert!(call.attach_authentication(principal.clone()).is_err());
        assert_eq!(call.authentication(), Some(&principal));
    }

    #[test]
    fn authentication_serialises_with_strategy_tag() {
        let sub = SubjectId::new();
        let json = serde_json::to_value(Authentication::Jwt(JwtPrincipal { sub, user_type: None })).unwrap();
        assert_eq!(json["strategy"], "jwt");
        assert_eq!(json["principal"]["sub"], sub.to_string());
    }
}
