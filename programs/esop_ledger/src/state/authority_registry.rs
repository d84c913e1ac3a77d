use anchor_lang::prelude::*;

use crate::error::{LedgerError, LedgerResult};

/// Stable pointer to the active ledger instance. Seeds: [b"authority_registry"]
#[account]
#[derive(Default)]
pub struct AuthorityRegistry {
    /// Only key allowed to repoint or shut down the registry.
    pub principal: Pubkey,
    pub current_ledger: Pubkey,
    pub shut_down: bool,
    /// Number of successful `set_ledger` calls.
    pub change_count: u64,
    pub bump: u8,
}

impl AuthorityRegistry {
    pub const SIZE: usize =
        32 + // principal
        32 + // current_ledger
        1 +  // shut_down
        8 +  // change_count
        1;   // bump

    pub fn initialize(&mut self, principal: Pubkey, ledger: Pubkey) -> LedgerResult<()> {
        if principal == Pubkey::default() || ledger == Pubkey::default() {
            return Err(LedgerError::InvalidPubkey);
        }
        self.principal = principal;
        self.current_ledger = ledger;
        self.shut_down = false;
        self.change_count = 0;
        Ok(())
    }

    fn ensure_live(&self) -> LedgerResult<()> {
        if self.shut_down {
            return Err(LedgerError::RegistryShutDown);
        }
        Ok(())
    }

    fn ensure_principal(&self, caller: &Pubkey) -> LedgerResult<()> {
        self.ensure_live()?;
        if *caller != self.principal {
            return Err(LedgerError::UnauthorizedPrincipal);
        }
        Ok(())
    }

    pub fn current_ledger(&self) -> LedgerResult<Pubkey> {
        self.ensure_live()?;
        Ok(self.current_ledger)
    }

    /// Repoints the registry. `expected_principal` guards against a principal rotated
    /// between building and landing the transaction. Returns the previous ledger.
    pub fn set_ledger(
        &mut self,
        caller: &Pubkey,
        new_ledger: Pubkey,
        expected_principal: &Pubkey,
    ) -> LedgerResult<Pubkey> {
        self.ensure_principal(caller)?;
        if *expected_principal != self.principal {
            return Err(LedgerError::UnauthorizedPrincipal);
        }
        if new_ledger == Pubkey::default() {
            return Err(LedgerError::InvalidPubkey);
        }
        let change_count = self
            .change_count
            .checked_add(1)
            .ok_or(LedgerError::MathOverflow)?;
        let old = self.current_ledger;
        self.current_ledger = new_ledger;
        self.change_count = change_count;
        Ok(old)
    }

    pub fn transfer_principal(&mut self, caller: &Pubkey, new_principal: Pubkey) -> LedgerResult<Pubkey> {
        self.ensure_principal(caller)?;
        if new_principal == Pubkey::default() {
            return Err(LedgerError::InvalidPubkey);
        }
        let old = self.principal;
        self.principal = new_principal;
        Ok(old)
    }

    pub fn shutdown(&mut self, caller: &Pubkey) -> LedgerResult<()> {
        self.ensure_principal(caller)?;
        self.shut_down = true;
        Ok(())
    }
}
