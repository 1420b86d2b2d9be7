use serde::{Deserialize, Serialize};

/// Type of JWT: access or email confirmation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Confirmation,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Confirmation => "confirmation",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT payload as issued.
#[derive(Debug, Clone, Serialize)]
pub struct Claims<'a> {
    pub sub: &'a str,      // user email
    pub exp: i64,          // expires at (unix timestamp)
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// JWT payload as received. Fields are optional so that a token with a
/// valid signature but missing claims maps to a precise error.
#[derive(Debug, Deserialize)]
pub struct ReceivedClaims {
    pub sub: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}
