use std::fmt;

/// An authenticated principal and the authorities granted to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authentication {
    principal: String,
    authorities: Vec<String>,
}

impl Authentication {
    pub fn new(principal: impl Into<String>, authorities: Vec<String>) -> Self {
        Self {
            principal: principal.into(),
            authorities,
        }
    }

    #[must_use]
    pub fn principal(&self) -> &str {
        &self.principal
    }

    #[must_use]
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|granted| granted == authority)
    }
}

/// The identity a thread is acting as.
///
/// `SecurityContext::default()` carries no authentication and is the empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
}

impl SecurityContext {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn authenticated(authentication: Authentication) -> Self {
        Self {
            authentication: Some(authentication),
        }
    }

    /// Shorthand for a principal with no authorities.
    pub fn for_principal(principal: impl Into<String>) -> Self {
        Self::authenticated(Authentication::new(principal, Vec::new()))
    }

    #[must_use]
    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    #[must_use]
    pub fn principal(&self) -> Option<&str> {
        self.authentication.as_ref().map(Authentication::principal)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }
}

impl fmt::Display for SecurityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.principal() {
            Some(principal) => write!(f, "{principal}"),
            None => f.write_str("<anonymous>"),
        }
    }
}
