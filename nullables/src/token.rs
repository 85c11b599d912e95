//! Nullable token ledger: in-memory balances with optional history.

use claw_governance::{SourceError, TokenLedger};
use claw_types::Address;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory token ledger for testing.
///
/// Total supply is the sum of live balances unless pinned with
/// [`NullToken::set_total_supply`]. Historical balances are only known where
/// recorded with [`NullToken::set_balance_at`].
pub struct NullToken {
    balances: Mutex<HashMap<Address, u128>>,
    history: Mutex<HashMap<Address, BTreeMap<u64, u128>>>,
    total_supply: Mutex<Option<u128>>,
    unavailable: AtomicBool,
}

impl NullToken {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            history: Mutex::new(HashMap::new()),
            total_supply: Mutex::new(None),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn set_balance(&self, account: Address, balance: u128) {
        self.balances.lock().unwrap().insert(account, balance);
    }

    /// Record `balance` as the holding of `account` from `height` onward.
    pub fn set_balance_at(&self, account: Address, height: u64, balance: u128) {
        self.history
            .lock()
            .unwrap()
            .entry(account)
            .or_default()
            .insert(height, balance);
    }

    pub fn set_total_supply(&self, supply: u128) {
        *self.total_supply.lock().unwrap() = Some(supply);
    }

    /// Make every call fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), SourceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("token"));
        }
        Ok(())
    }
}

impl Default for NullToken {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenLedger for NullToken {
    fn balance_of(&self, account: &Address) -> Result<u128, SourceError> {
        self.check_available()?;
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .unwrap_or(0))
    }

    fn balance_of_at(&self, account: &Address, height: u64) -> Result<u128, SourceError> {
        self.check_available()?;
        Ok(self
            .history
            .lock()
            .unwrap()
            .get(account)
            .and_then(|checkpoints| checkpoints.range(..=height).next_back())
            .map(|(_, balance)| *balance)
            .unwrap_or(0))
    }

    fn total_supply(&self) -> Result<u128, SourceError> {
        self.check_available()?;
        if let Some(supply) = *self.total_supply.lock().unwrap() {
            return Ok(supply);
        }
        Ok(self.balances.lock().unwrap().values().sum())
    }
}
