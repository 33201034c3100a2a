//! Unit-of-work boundaries around script execution.
//!
//! A [`TransactionScope`] binds one live connection for an engine
//! invocation and hands it to work items through
//! [`TransactionScope::with_connection`]. Depending on the
//! [`TransactionMode`] the scope opens no transaction, one per work item,
//! or one for the whole run. An open transaction is rolled back whenever it
//! is dropped without being committed, so every exit path releases it.

use crate::error::{EngineError, EngineResult};
use wp_core::TransactionMode;
use wp_db::Connection;

/// An open transaction, rolled back on drop unless committed
struct TransactionGuard<'c> {
    conn: &'c dyn Connection,
    open: bool,
}

impl<'c> TransactionGuard<'c> {
    fn begin(conn: &'c dyn Connection) -> EngineResult<Self> {
        conn.begin().map_err(EngineError::transaction)?;
        Ok(Self { conn, open: true })
    }

    fn commit(mut self) -> EngineResult<()> {
        self.open = false;
        if let Err(err) = self.conn.commit() {
            if let Err(rollback_err) = self.conn.rollback() {
                log::warn!("Rollback after failed commit also failed: {rollback_err}");
            }
            return Err(EngineError::transaction(err));
        }
        Ok(())
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if self.open {
            log::debug!("Rolling back transaction");
            if let Err(err) = self.conn.rollback() {
                log::warn!("Rollback failed: {err}");
            }
        }
    }
}

/// Transaction strategy bound to one connection
pub struct TransactionScope<'c> {
    conn: &'c dyn Connection,
    mode: TransactionMode,
    run: Option<TransactionGuard<'c>>,
}

impl<'c> TransactionScope<'c> {
    /// Bind `conn`; in per-run mode the run transaction starts here
    pub fn begin(conn: &'c dyn Connection, mode: TransactionMode) -> EngineResult<Self> {
        let run = match mode {
            TransactionMode::PerRun => Some(TransactionGuard::begin(conn)?),
            TransactionMode::None | TransactionMode::PerScript => None,
        };
        Ok(Self { conn, mode, run })
    }

    /// Run `action` against the bound connection.
    ///
    /// In per-script mode `action` gets its own transaction, committed when
    /// it returns `Ok` and rolled back otherwise.
    pub fn with_connection<T, F>(&mut self, action: F) -> EngineResult<T>
    where
        F: FnOnce(&dyn Connection) -> EngineResult<T>,
    {
        match self.mode {
            TransactionMode::PerScript => {
                let guard = TransactionGuard::begin(self.conn)?;
                let value = action(self.conn)?;
                guard.commit()?;
                Ok(value)
            }
            TransactionMode::None | TransactionMode::PerRun => action(self.conn),
        }
    }

    /// Finish the scope, committing the run transaction if there is one
    pub fn complete(mut self) -> EngineResult<()> {
        match self.run.take() {
            Some(guard) => guard.commit(),
            None => Ok(()),
        }
    }
}
