//! The fungible-token boundary.
//!
//! The engine never moves funds itself. It asks a [`TokenTransfer`]
//! implementation to do so and treats a `false` return exactly like a
//! failure: the enclosing operation is aborted.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{Address, TokenId};

/// Synchronous token transfer capability supplied by the host.
pub trait TokenTransfer: Send + Sync {
    /// Move `amount` of `token` from the pool to `to`.
    fn transfer(&self, token: &TokenId, to: Address, amount: Decimal) -> bool;

    /// Move `amount` of `token` from `from` to `to`, on the pool's
    /// authority.
    fn transfer_from(&self, token: &TokenId, from: Address, to: Address, amount: Decimal) -> bool;
}

impl<T: TokenTransfer + ?Sized> TokenTransfer for Arc<T> {
    fn transfer(&self, token: &TokenId, to: Address, amount: Decimal) -> bool {
        (**self).transfer(token, to, amount)
    }

    fn transfer_from(&self, token: &TokenId, from: Address, to: Address, amount: Decimal) -> bool {
        (**self).transfer_from(token, from, to, amount)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use mock::InMemoryToken;

#[cfg(any(test, feature = "test-helpers"))]
mod mock {
    use std::{
        collections::HashMap,
        sync::{
            Mutex, PoisonError,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
    };

    use rust_decimal::Decimal;

    use super::TokenTransfer;
    use crate::{Address, TokenId};

    /// In-memory multi-token balance sheet with failure injection.
    ///
    /// **Never use in production.**
    #[derive(Debug)]
    pub struct InMemoryToken {
        pool: Address,
        balances: Mutex<HashMap<(TokenId, Address), Decimal>>,
        failing: AtomicBool,
        /// Transfers left before `failing` flips on. `usize::MAX` = never.
        fail_after: AtomicUsize,
    }

    impl InMemoryToken {
        pub fn new(pool: Address) -> Self {
            Self {
                pool,
                balances: Mutex::new(HashMap::new()),
                failing: AtomicBool::new(false),
                fail_after: AtomicUsize::new(usize::MAX),
            }
        }

        pub fn mint(&self, token: TokenId, holder: Address, amount: Decimal) {
            let mut balances = self.balances.lock().unwrap_or_else(PoisonError::into_inner);
            *balances.entry((token, holder)).or_default() += amount;
        }

        pub fn balance_of(&self, token: TokenId, holder: Address) -> Decimal {
            let balances = self.balances.lock().unwrap_or_else(PoisonError::into_inner);
            balances.get(&(token, holder)).copied().unwrap_or_default()
        }

        /// Make every subsequent transfer return `false`.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
            self.fail_after.store(usize::MAX, Ordering::SeqCst);
        }

        /// Let `n` more transfers succeed, then fail the rest.
        pub fn fail_after(&self, n: usize) {
            self.failing.store(false, Ordering::SeqCst);
            self.fail_after.store(n, Ordering::SeqCst);
        }

        fn should_fail(&self) -> bool {
            if self.failing.load(Ordering::SeqCst) {
                return true;
            }
            let left = self.fail_after.load(Ordering::SeqCst);
            if left == usize::MAX {
                return false;
            }
            if left == 0 {
                self.failing.store(true, Ordering::SeqCst);
                return true;
            }
            self.fail_after.store(left - 1, Ordering::SeqCst);
            false
        }

        fn move_funds(&self, token: TokenId, from: Address, to: Address, amount: Decimal) -> bool {
            if amount.is_sign_negative() || self.should_fail() {
                return false;
            }
            let mut balances = self.balances.lock().unwrap_or_else(PoisonError::into_inner);
            let available = balances.get(&(token, from)).copied().unwrap_or_default();
            if available < amount {
                return false;
            }
            *balances.entry((token, from)).or_default() -= amount;
            *balances.entry((token, to)).or_default() += amount;
            true
        }
    }

    impl TokenTransfer for InMemoryToken {
        fn transfer(&self, token: &TokenId, to: Address, amount: Decimal) -> bool {
            self.move_funds(*token, self.pool, to, amount)
        }

        fn transfer_from(
            &self,
            token: &TokenId,
            from: Address,
            to: Address,
            amount: Decimal,
        ) -> bool {
            self.move_funds(*token, from, to, amount)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> TokenId {
        TokenId(Address::from_low_u64(0xdead))
    }

    #[test]
    fn transfer_from_moves_funds() {
        let pool = Address::from_low_u64(1);
        let alice = Address::from_low_u64(2);
        let token = InMemoryToken::new(pool);
        token.mint(usd(), alice, Decimal::new(100, 0));

        assert!(token.transfer_from(&usd(), alice, pool, Decimal::new(40, 0)));
        assert_eq!(token.balance_of(usd(), alice), Decimal::new(60, 0));
        assert_eq!(token.balance_of(usd(), pool), Decimal::new(40, 0));

        assert!(token.transfer(&usd(), alice, Decimal::new(40, 0)));
        assert_eq!(token.balance_of(usd(), alice), Decimal::new(100, 0));
        assert!(token.balance_of(usd(), pool).is_zero());
    }

    #[test]
    fn insufficient_balance_returns_false() {
        let pool = Address::from_low_u64(1);
        let token = InMemoryToken::new(pool);
        assert!(!token.transfer(&usd(), Address::from_low_u64(2), Decimal::ONE));
    }

    #[test]
    fn failure_injection() {
        let pool = Address::from_low_u64(1);
        let alice = Address::from_low_u64(2);
        let token = InMemoryToken::new(pool);
        token.mint(usd(), alice, Decimal::new(10, 0));

        token.set_failing(true);
        assert!(!token.transfer_from(&usd(), alice, pool, Decimal::ONE));
        token.set_failing(false);

        token.fail_after(1);
        assert!(token.transfer_from(&usd(), alice, pool, Decimal::ONE));
        assert!(!token.transfer_from(&usd(), alice, pool, Decimal::ONE));
        assert_eq!(token.balance_of(usd(), alice), Decimal::new(9, 0));
    }

    #[test]
    fn arc_token_delegates() {
        let pool = Address::from_low_u64(1);
        let token = Arc::new(InMemoryToken::new(pool));
        token.mint(usd(), pool, Decimal::ONE);
        let shared: Arc<InMemoryToken> = Arc::clone(&token);
        assert!(shared.transfer(&usd(), Address::from_low_u64(3), Decimal::ONE));
        assert_eq!(token.balance_of(usd(), Address::from_low_u64(3)), Decimal::ONE);
    }
}
