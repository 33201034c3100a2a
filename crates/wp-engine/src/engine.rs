//! Upgrade orchestration.
//!
//! [`UpgradeEngine`] discovers scripts, reads the journal, filters and
//! sorts the due scripts into a plan, then executes the plan one script at
//! a time. Each script is journaled through the same connection, inside the
//! same transaction scope, right after it runs.

use crate::error::{EngineError, EngineResult};
use crate::executor::ScriptExecutor;
use crate::filter::{DefaultScriptFilter, ScriptFilter};
use crate::journal::Journal;
use crate::prepared::{PreparedScript, Preprocessing};
use crate::result::{ExecutedScript, UpgradeResult};
use crate::sorter::{DefaultScriptSorter, ScriptSorter};
use crate::transaction::TransactionScope;
use std::rc::Rc;
use wp_core::{AppliedRecord, NameComparison, ScriptProvider, TransactionMode};
use wp_db::{Connection, ConnectionFactory};

type ScriptObserver = Box<dyn Fn(&PreparedScript)>;

/// Progress of a run, kept so a failure can report it
#[derive(Default)]
struct Progress {
    executed: Vec<ExecutedScript>,
    current: Option<ExecutedScript>,
}

impl Progress {
    fn start(&mut self, script: &PreparedScript) {
        self.current = Some(ExecutedScript::from(script));
    }

    fn finish(&mut self) {
        if let Some(done) = self.current.take() {
            self.executed.push(done);
        }
    }
}

/// Applies pending scripts to a store
pub struct UpgradeEngine {
    connections: Box<dyn ConnectionFactory>,
    providers: Vec<Box<dyn ScriptProvider>>,
    journal: Box<dyn Journal>,
    executor: ScriptExecutor,
    filter: Box<dyn ScriptFilter>,
    sorter: Box<dyn ScriptSorter>,
    preprocessing: Rc<Preprocessing>,
    transaction: TransactionMode,
    comparison: NameComparison,
    observers: Vec<ScriptObserver>,
}

impl UpgradeEngine {
    pub fn new(
        connections: impl ConnectionFactory + 'static,
        journal: impl Journal + 'static,
        executor: ScriptExecutor,
    ) -> Self {
        Self {
            connections: Box::new(connections),
            providers: Vec::new(),
            journal: Box::new(journal),
            executor,
            filter: Box::new(DefaultScriptFilter),
            sorter: Box::new(DefaultScriptSorter),
            preprocessing: Rc::new(Preprocessing::new()),
            transaction: TransactionMode::default(),
            comparison: NameComparison::default(),
            observers: Vec::new(),
        }
    }

    pub fn with_provider(mut self, provider: impl ScriptProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn with_filter(mut self, filter: impl ScriptFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn with_sorter(mut self, sorter: impl ScriptSorter + 'static) -> Self {
        self.sorter = Box::new(sorter);
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: Preprocessing) -> Self {
        self.preprocessing = Rc::new(preprocessing);
        self
    }

    pub fn with_transaction_mode(mut self, mode: TransactionMode) -> Self {
        self.transaction = mode;
        self
    }

    /// Name policy shared by filtering, sorting and journal grouping
    pub fn with_name_comparison(mut self, comparison: NameComparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// Call `observer` after each script is executed and journaled
    pub fn on_script_executed(mut self, observer: impl Fn(&PreparedScript) + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn transaction_mode(&self) -> TransactionMode {
        self.transaction
    }

    pub fn name_comparison(&self) -> NameComparison {
        self.comparison
    }

    /// Execute every pending script
    pub fn perform_upgrade(&self) -> UpgradeResult {
        log::info!("Beginning database upgrade");
        let mut progress = Progress::default();
        match self.upgrade(&mut progress) {
            Ok(()) => UpgradeResult::success(progress.executed),
            Err(err) => self.fail(progress, err),
        }
    }

    /// Journal pending scripts without executing them, stopping after
    /// `up_to` (inclusive) when given
    pub fn mark_as_executed(&self, up_to: Option<&str>) -> UpgradeResult {
        let mut progress = Progress::default();
        match self.mark(up_to, &mut progress) {
            Ok(()) => {
                log::info!("Script marking successful");
                UpgradeResult::success(progress.executed)
            }
            Err(err) => self.fail(progress, err),
        }
    }

    /// The scripts an upgrade would execute, in order
    pub fn scripts_to_execute(&self) -> EngineResult<Vec<PreparedScript>> {
        self.ensure_configured()?;
        self.with_connection(|conn| self.plan(conn))
    }

    pub fn is_upgrade_required(&self) -> EngineResult<bool> {
        Ok(!self.scripts_to_execute()?.is_empty())
    }

    /// Every script the providers supply, in discovery order
    pub fn discovered_scripts(&self) -> EngineResult<Vec<PreparedScript>> {
        self.ensure_configured()?;
        self.discover()
    }

    /// Latest journal record per script name
    pub fn executed_scripts(&self) -> EngineResult<Vec<AppliedRecord>> {
        let applied =
            self.with_connection(|conn| self.journal.read_applied(conn, self.comparison))?;
        Ok(applied.records().into_iter().cloned().collect())
    }

    /// Every journal record, oldest first
    pub fn history(&self) -> EngineResult<Vec<AppliedRecord>> {
        self.with_connection(|conn| self.journal.read_history(conn))
    }

    /// Names in the journal that no provider supplies any more
    pub fn executed_but_not_discovered(&self) -> EngineResult<Vec<String>> {
        let discovered = self.discovered_scripts()?;
        let applied =
            self.with_connection(|conn| self.journal.read_applied(conn, self.comparison))?;
        Ok(applied
            .records()
            .into_iter()
            .filter(|record| {
                !discovered
                    .iter()
                    .any(|script| self.comparison.equals(script.name(), &record.name))
            })
            .map(|record| record.name.clone())
            .collect())
    }

    /// Check the store is reachable, returning the failure message if not
    pub fn try_connect(&self) -> Result<(), String> {
        let conn = self.connections.open().map_err(|e| e.to_string())?;
        conn.query_scalar("SELECT 1", &[])
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    /// Open a connection to the target store
    pub fn open_connection(&self) -> EngineResult<Box<dyn Connection>> {
        Ok(self.connections.open()?)
    }

    fn ensure_configured(&self) -> EngineResult<()> {
        if self.providers.is_empty() {
            return Err(EngineError::Configuration {
                message: "no script providers were added".to_string(),
            });
        }
        Ok(())
    }

    fn with_connection<T>(
        &self,
        action: impl FnOnce(&dyn Connection) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let connection = self.connections.open()?;
        action(connection.as_ref())
    }

    fn discover(&self) -> EngineResult<Vec<PreparedScript>> {
        let mut scripts = Vec::new();
        for provider in &self.providers {
            for script in provider.get_scripts()? {
                scripts.push(PreparedScript::new(script, Rc::clone(&self.preprocessing)));
            }
        }
        log::debug!("Discovered {} scripts", scripts.len());
        Ok(scripts)
    }

    fn plan(&self, conn: &dyn Connection) -> EngineResult<Vec<PreparedScript>> {
        let discovered = self.discover()?;
        log::info!("Fetching list of already executed scripts.");
        let applied = self.journal.read_applied(conn, self.comparison)?;
        let due = self.filter.filter(discovered, &applied)?;
        Ok(self.sorter.sort(due, self.comparison))
    }

    fn upgrade(&self, progress: &mut Progress) -> EngineResult<()> {
        self.ensure_configured()?;
        let connection = self.connections.open()?;
        let conn = connection.as_ref();

        let plan = self.plan(conn)?;
        if plan.is_empty() {
            log::info!("No new scripts need to be executed - completing.");
            return Ok(());
        }

        // Freeze every script's contents before touching the store
        for script in &plan {
            progress.start(script);
            script.contents()?;
        }
        progress.current = None;

        self.executor.verify_schema(conn)?;

        self.run_plan(conn, &plan, progress, |scope, script| {
            scope.with_connection(|conn| {
                self.executor.execute(conn, script)?;
                self.journal.write_applied(conn, script)
            })?;
            for observer in &self.observers {
                observer(script);
            }
            Ok(true)
        })?;

        log::info!("Upgrade successful");
        Ok(())
    }

    fn mark(&self, up_to: Option<&str>, progress: &mut Progress) -> EngineResult<()> {
        self.ensure_configured()?;
        let connection = self.connections.open()?;
        let conn = connection.as_ref();

        let plan = self.plan(conn)?;
        self.run_plan(conn, &plan, progress, |scope, script| {
            scope.with_connection(|conn| self.journal.write_applied(conn, script))?;
            log::info!("Marking script {} as executed", script.name());
            Ok(!up_to.is_some_and(|target| self.comparison.equals(script.name(), target)))
        })
    }

    /// Apply `step` to each script of `plan` inside one transaction scope.
    ///
    /// `step` returns whether to continue with the next script. When the
    /// run transaction is rolled back the scripts it covered are no longer
    /// applied, so they are dropped from `progress`.
    fn run_plan<'c>(
        &self,
        conn: &'c dyn Connection,
        plan: &[PreparedScript],
        progress: &mut Progress,
        mut step: impl FnMut(&mut TransactionScope<'c>, &PreparedScript) -> EngineResult<bool>,
    ) -> EngineResult<()> {
        let mut scope = TransactionScope::begin(conn, self.transaction)?;
        let mut outcome = Ok(());
        for script in plan {
            progress.start(script);
            match step(&mut scope, script) {
                Ok(more) => {
                    progress.finish();
                    if !more {
                        break;
                    }
                }
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }

        let outcome = outcome.and_then(|()| scope.complete());
        if outcome.is_err() && self.transaction == TransactionMode::PerRun {
            progress.executed.clear();
        }
        outcome
    }

    fn fail(&self, progress: Progress, err: EngineError) -> UpgradeResult {
        match &progress.current {
            Some(script) => log::error!("Upgrade failed in script {}: {err}", script.name),
            None => log::error!("Upgrade failed due to an unexpected exception:\n{err}"),
        }
        // a rolled back transaction may have taken the journal table with it
        self.journal.reset();
        UpgradeResult::failure(progress.executed, err, progress.current)
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
