//! Locking layer.
//!
//! A lock pins one (worker, day) cell to forced rest or to a specific
//! (shift, area) combination. Requested off-days and fixed overrides are
//! both resolved into locks. Both engines honor locks unconditionally.

use serde::{Deserialize, Serialize};

use crate::models::{FixedOverride, Worker};

/// A forced value for one (worker, day) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lock {
    /// Forced rest.
    Rest,
    /// Forced work in combination `combo` (dense shift × area index).
    Work {
        /// Combination index.
        combo: usize,
    },
}

impl Lock {
    /// Whether the lock forces the worker to work.
    #[inline]
    pub fn is_work(&self) -> bool {
        matches!(self, Self::Work { .. })
    }

    /// The forced combination, if working.
    #[inline]
    pub fn combo(&self) -> Option<usize> {
        match self {
            Self::Rest => None,
            Self::Work { combo } => Some(*combo),
        }
    }
}

/// Dense worker × day lock table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockTable {
    days: usize,
    cells: Vec<Option<Lock>>,
}

impl LockTable {
    /// Creates a table with no locks.
    pub fn new(workers: usize, days: usize) -> Self {
        Self {
            days,
            cells: vec![None; workers * days],
        }
    }

    /// Builds the table from validated workers.
    ///
    /// `combo_of(shift_id, area_id)` resolves a working override to its
    /// combination index. Off-days become forced rest; a fixed override
    /// on the same day takes precedence (validation rejects work-on-off-day).
    pub fn from_workers<F>(workers: &[Worker], days: usize, combo_of: F) -> Self
    where
        F: Fn(&str, &str) -> Option<usize>,
    {
        let mut table = Self::new(workers.len(), days);
        for (w, worker) in workers.iter().enumerate() {
            for &d in &worker.off_days {
                table.set(w, d as usize, Lock::Rest);
            }
            for (&d, fixed) in &worker.fixed {
                let lock = match fixed {
                    FixedOverride::Rest => Lock::Rest,
                    FixedOverride::Work { shift, area } => match combo_of(shift, area) {
                        Some(combo) => Lock::Work { combo },
                        None => continue,
                    },
                };
                table.set(w, d as usize, lock);
            }
        }
        table
    }

    /// Sets a lock. Out-of-range cells are ignored.
    pub fn set(&mut self, worker: usize, day: usize, lock: Lock) {
        if day < self.days {
            if let Some(cell) = self.cells.get_mut(worker * self.days + day) {
                *cell = Some(lock);
            }
        }
    }

    /// The lock on a cell, if any.
    #[inline]
    pub fn get(&self, worker: usize, day: usize) -> Option<Lock> {
        if day >= self.days {
            return None;
        }
        self.cells.get(worker * self.days + day).copied().flatten()
    }

    /// Whether a cell is locked.
    #[inline]
    pub fn is_locked(&self, worker: usize, day: usize) -> bool {
        self.get(worker, day).is_some()
    }

    /// Whether a cell is locked to work.
    #[inline]
    pub fn is_locked_work(&self, worker: usize, day: usize) -> bool {
        self.get(worker, day).is_some_and(|l| l.is_work())
    }

    /// Number of days a worker is locked to work.
    pub fn locked_work_days(&self, worker: usize) -> usize {
        (0..self.days)
            .filter(|&d| self.is_locked_work(worker, d))
            .count()
    }

    /// Number of locked-work days of `worker` in `[start, start + len)`.
    pub fn locked_work_in_window(&self, worker: usize, start: usize, len: usize) -> usize {
        (start..(start + len).min(self.days))
            .filter(|&d| self.is_locked_work(worker, d))
            .count()
    }

    /// Total number of locked cells.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Whether no cell is locked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
