//! Token allow-list.
//!
//! A token is usable in new circles only while its flag is set. Unknown
//! tokens are disallowed. Clearing a flag does not affect circles that
//! already use the token.

use std::collections::HashMap;

use rosca_types::TokenId;

/// Administrator-controlled allow-list of token types.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    allowed: HashMap<TokenId, bool>,
}

impl TokenRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the flag. Returns the previous value.
    pub fn set_allowed(&mut self, token: TokenId, allowed: bool) -> bool {
        self.allowed.insert(token, allowed).unwrap_or(false)
    }

    #[must_use]
    pub fn is_allowed(&self, token: &TokenId) -> bool {
        self.allowed.get(token).copied().unwrap_or(false)
    }

    /// Every token currently allowed, sorted.
    #[must_use]
    pub fn allowed_tokens(&self) -> Vec<TokenId> {
        let mut tokens: Vec<TokenId> = self
            .allowed
            .iter()
            .filter(|(_, allowed)| **allowed)
            .map(|(token, _)| *token)
            .collect();
        tokens.sort();
        tokens
    }
}
