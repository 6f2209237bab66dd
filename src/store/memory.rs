//! In-memory storage.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock};

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, DateRange, ExtraPayment, NewExtraPayment, Worker, WorkerId};

use super::{AttendanceStore, NewWorkerRecord, PaymentStore, WorkerStore};

/// Process-local implementation of every store trait.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<(WorkerId, NaiveDate), AttendanceRecord>>,
    payments: Mutex<Vec<ExtraPayment>>,
    workers: RwLock<BTreeMap<WorkerId, Worker>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(what: &str) -> EngineError {
    EngineError::storage(format!("{} lock poisoned", what))
}

impl AttendanceStore for InMemoryStore {
    fn get(&self, worker_id: WorkerId, date: NaiveDate) -> EngineResult<Option<AttendanceRecord>> {
        let records = self.records.read().map_err(|_| poisoned("records"))?;
        Ok(records.get(&(worker_id, date)).cloned())
    }

    fn put(&self, record: AttendanceRecord) -> EngineResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned("records"))?;
        records.insert((record.worker_id(), record.date()), record);
        Ok(())
    }

    fn list(
        &self,
        worker_id: Option<WorkerId>,
        range: Option<DateRange>,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let records = self.records.read().map_err(|_| poisoned("records"))?;
        Ok(records
            .values()
            .filter(|r| worker_id.is_none_or(|id| id == r.worker_id()))
            .filter(|r| range.is_none_or(|range| range.contains(r.date())))
            .cloned()
            .collect())
    }
}

impl PaymentStore for InMemoryStore {
    fn append(&self, payment: NewExtraPayment) -> EngineResult<ExtraPayment> {
        let mut payments = self.payments.lock().map_err(|_| poisoned("payments"))?;
        let id = payments.last().map_or(1, |p| p.id + 1);
        let stored = payment.with_id(id);
        payments.push(stored.clone());
        Ok(stored)
    }

    fn list(&self) -> EngineResult<Vec<ExtraPayment>> {
        let payments = self.payments.lock().map_err(|_| poisoned("payments"))?;
        Ok(payments.clone())
    }
}

impl WorkerStore for InMemoryStore {
    fn insert(&self, worker: NewWorkerRecord) -> EngineResult<Worker> {
        let mut workers = self.workers.write().map_err(|_| poisoned("workers"))?;
        let id = workers
            .last_key_value()
            .map_or(WorkerId(1), |(id, _)| WorkerId(id.0 + 1));
        let stored = Worker {
            id,
            username: worker.username,
            identity: worker.identity,
            pay_policy: worker.pay_policy,
            active: true,
            created_at: worker.created_at,
        };
        workers.insert(id, stored.clone());
        Ok(stored)
    }

    fn get(&self, worker_id: WorkerId) -> EngineResult<Option<Worker>> {
        let workers = self.workers.read().map_err(|_| poisoned("workers"))?;
        Ok(workers.get(&worker_id).cloned())
    }

    fn update(&self, worker: Worker) -> EngineResult<()> {
        let mut workers = self.workers.write().map_err(|_| poisoned("workers"))?;
        match workers.get_mut(&worker.id) {
            Some(slot) => {
                *slot = worker;
                Ok(())
            }
            None => Err(EngineError::not_found("worker", worker.id)),
        }
    }

    fn list(&self) -> EngineResult<Vec<Worker>> {
        let workers = self.workers.read().map_err(|_| poisoned("workers"))?;
        Ok(workers.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identity, PayPolicy, PaymentType};
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;

    fn make_date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        make_date(day).and_hms_opt(hour, 0, 0).unwrap()
    }

    fn new_worker(name: &str) -> NewWorkerRecord {
        NewWorkerRecord {
            username: name.to_string(),
            identity: Identity::Email {
                email: format!("{}@example.com", name),
            },
            pay_policy: PayPolicy::Hourly {
                hourly_rate: Decimal::new(20, 0),
            },
            created_at: at(1, 8),
        }
    }

    fn new_payment(worker: u64, day: u32) -> NewExtraPayment {
        NewExtraPayment {
            worker_id: WorkerId(worker),
            date: make_date(day),
            amount: Decimal::new(100, 0),
            payment_type: PaymentType::Bonus,
            description: "bonus".to_string(),
            notes: None,
            recorded_at: at(day, 12),
        }
    }

    #[test]
    fn test_record_put_get_and_replace() {
        let store = InMemoryStore::new();
        let record = AttendanceRecord::open(WorkerId(1), make_date(2), at(2, 9));
        store.put(record.clone()).unwrap();

        assert_eq!(AttendanceStore::get(&store, WorkerId(1), make_date(2)).unwrap(), Some(record.clone()));
        assert_eq!(AttendanceStore::get(&store, WorkerId(1), make_date(3)).unwrap(), None);

        let done = record.completed(
            at(2, 17),
            crate::models::DayEarnings::ZERO,
            PayPolicy::Hourly {
                hourly_rate: Decimal::new(20, 0),
            },
        );
        store.put(done.clone()).unwrap();
        assert_eq!(AttendanceStore::get(&store, WorkerId(1), make_date(2)).unwrap(), Some(done));
        assert_eq!(AttendanceStore::list(&store, None, None).unwrap().len(), 1);
    }

    #[test]
    fn test_record_list_filters() {
        let store = InMemoryStore::new();
        for (worker, day) in [(1, 2), (1, 3), (2, 3), (1, 9)] {
            store
                .put(AttendanceRecord::open(WorkerId(worker), make_date(day), at(day, 9)))
                .unwrap();
        }

        let range = DateRange::new(make_date(2), make_date(9)).unwrap();
        let worker_one = AttendanceStore::list(&store, Some(WorkerId(1)), Some(range)).unwrap();
        assert_eq!(worker_one.len(), 2);
        assert!(worker_one.iter().all(|r| r.worker_id() == WorkerId(1)));

        let everyone = AttendanceStore::list(&store, None, Some(range)).unwrap();
        assert_eq!(everyone.len(), 3);
    }

    #[test]
    fn test_payments_get_sequential_ids_in_order() {
        let store = InMemoryStore::new();
        let first = store.append(new_payment(1, 2)).unwrap();
        let second = store.append(new_payment(2, 1)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let listed = PaymentStore::list(&store).unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[test]
    fn test_workers_get_sequential_ids() {
        let store = InMemoryStore::new();
        let a = store.insert(new_worker("asha")).unwrap();
        let b = store.insert(new_worker("bala")).unwrap();
        assert_eq!(a.id, WorkerId(1));
        assert_eq!(b.id, WorkerId(2));
        assert!(a.active);

        let listed = WorkerStore::list(&store).unwrap();
        assert_eq!(listed.iter().map(|w| w.id).collect::<Vec<_>>(), vec![WorkerId(1), WorkerId(2)]);
    }

    #[test]
    fn test_worker_update_requires_existing() {
        let store = InMemoryStore::new();
        let mut worker = store.insert(new_worker("asha")).unwrap();
        worker.active = false;
        store.update(worker.clone()).unwrap();
        assert_eq!(WorkerStore::get(&store, worker.id).unwrap(), Some(worker.clone()));

        worker.id = WorkerId(99);
        assert!(matches!(store.update(worker), Err(EngineError::NotFound { .. })));
    }
}
