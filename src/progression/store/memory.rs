//! In-memory store
//!
//! Used by tests and by callers embedding the engine without a database.
//! Failure switches let tests simulate an unreachable backend or lost races.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{ProgressionStore, Versioned};
use crate::progression::error::StoreError;
use crate::progression::models::ProgressionRecord;
use crate::progression::tasks::{PeriodKind, TaskState};

#[derive(Default)]
struct Tables {
    progression: HashMap<String, Versioned<ProgressionRecord>>,
    tasks: HashMap<(String, PeriodKind), Versioned<TaskState>>,
    /// Progression writes left before they start failing; `None` means unlimited
    write_budget: Option<u32>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
    tasks_unavailable: AtomicBool,
    injected_conflicts: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`StoreError::Unavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make task board calls fail while progression calls keep working
    pub fn set_tasks_unavailable(&self, unavailable: bool) {
        self.tasks_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Reject the next `count` progression writes as if another writer won the race
    pub fn inject_conflicts(&self, count: u32) {
        self.injected_conflicts.store(count, Ordering::SeqCst);
    }

    /// Let the next `allowed` progression writes through, then fail the rest as unavailable
    pub fn fail_progression_writes_after(&self, allowed: u32) -> Result<(), StoreError> {
        self.lock()?.write_budget = Some(allowed);
        Ok(())
    }

    /// Lift a limit set by [`fail_progression_writes_after`](Self::fail_progression_writes_after)
    pub fn allow_progression_writes(&self) -> Result<(), StoreError> {
        self.lock()?.write_budget = None;
        Ok(())
    }

    /// Overwrite a record without version checks
    pub fn seed_progression(&self, record: ProgressionRecord) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let version = tables
            .progression
            .get(&record.user_id)
            .map_or(1, |v| v.version + 1);
        tables
            .progression
            .insert(record.user_id.clone(), Versioned { value: record, version });
        Ok(())
    }

    /// Overwrite a task board without version checks
    pub fn seed_tasks(&self, user_id: &str, state: TaskState) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let key = (user_id.to_string(), state.period);
        let version = tables.tasks.get(&key).map_or(1, |v| v.version + 1);
        tables.tasks.insert(key, Versioned { value: state, version });
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn check_tasks_available(&self) -> Result<(), StoreError> {
        if self.tasks_unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("task boards switched off".into()));
        }
        Ok(())
    }

    fn take_injected_conflict(&self) -> bool {
        self.injected_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn compare_and_set<K, T>(
    table: &mut HashMap<K, Versioned<T>>,
    key: K,
    value: T,
    expected: Option<u64>,
) -> Result<u64, StoreError>
where
    K: std::hash::Hash + Eq,
{
    let found = table.get(&key).map(|v| v.version);
    if found != expected {
        return Err(StoreError::Conflict { expected, found });
    }
    let version = found.map_or(1, |v| v + 1);
    table.insert(key, Versioned { value, version });
    Ok(version)
}

impl ProgressionStore for MemoryStore {
    fn load_progression(
        &self,
        user_id: &str,
    ) -> Result<Option<Versioned<ProgressionRecord>>, StoreError> {
        Ok(self.lock()?.progression.get(user_id).cloned())
    }

    fn save_progression(
        &self,
        record: &ProgressionRecord,
        expected: Option<u64>,
    ) -> Result<u64, StoreError> {
        let mut tables = self.lock()?;
        if let Some(budget) = tables.write_budget.as_mut() {
            if *budget == 0 {
                return Err(StoreError::Unavailable("progression writes switched off".into()));
            }
            *budget -= 1;
        }
        if self.take_injected_conflict() {
            let found = tables.progression.get(&record.user_id).map(|v| v.version);
            return Err(StoreError::Conflict { expected, found });
        }
        compare_and_set(
            &mut tables.progression,
            record.user_id.clone(),
            record.clone(),
            expected,
        )
    }

    fn load_tasks(
        &self,
        user_id: &str,
        period: PeriodKind,
    ) -> Result<Option<Versioned<TaskState>>, StoreError> {
        self.check_tasks_available()?;
        Ok(self
            .lock()?
            .tasks
            .get(&(user_id.to_string(), period))
            .cloned())
    }

    fn save_tasks(
        &self,
        user_id: &str,
        state: &TaskState,
        expected: Option<u64>,
    ) -> Result<u64, StoreError> {
        self.check_tasks_available()?;
        let mut tables = self.lock()?;
        compare_and_set(
            &mut tables.tasks,
            (user_id.to_string(), state.period),
            state.clone(),
            expected,
        )
    }

    fn top_by_xp(&self, limit: usize) -> Result<Vec<ProgressionRecord>, StoreError> {
        let tables = self.lock()?;
        let mut records: Vec<ProgressionRecord> = tables
            .progression
            .values()
            .map(|v| v.value.clone())
            .collect();
        records.sort_by(|a, b| {
            b.total_xp
                .cmp(&a.total_xp)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        records.truncate(limit);
        Ok(records)
    }
}
