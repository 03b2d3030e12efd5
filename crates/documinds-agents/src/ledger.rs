//! Interaction ledger
//!
//! Append-only provenance trail owned by a single agent instance. Entries
//! are never edited or removed. Ids and timestamps come from injected
//! sources and are assigned under the write lock, so insertion order and
//! timestamp order agree.

use std::sync::Arc;

use documinds_common::{Clock, IdGenerator, InteractionRecord, SystemClock, UuidGenerator};
use parking_lot::RwLock;
use tracing::debug;

pub struct InteractionLedger {
    owner: String,
    entries: RwLock<Vec<InteractionRecord>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl InteractionLedger {
    /// Ledger using the wall clock and random UUIDs
    pub fn new(owner: impl Into<String>) -> Self {
        Self::with_sources(owner, Arc::new(SystemClock), Arc::new(UuidGenerator))
    }

    pub fn with_sources(
        owner: impl Into<String>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            owner: owner.into(),
            entries: RwLock::new(Vec::new()),
            clock,
            ids,
        }
    }

    /// Record an interaction and return the stored entry
    pub fn append(
        &self,
        from_agent: impl Into<String>,
        to_agent: impl Into<String>,
        task: impl Into<String>,
        reasoning: impl Into<String>,
    ) -> InteractionRecord {
        let from_agent = from_agent.into();
        let to_agent = to_agent.into();
        let task = task.into();
        let reasoning = reasoning.into();

        let mut entries = self.entries.write();
        let record = InteractionRecord {
            interaction_id: self.ids.next_id(),
            timestamp: self.clock.now(),
            from_agent,
            to_agent,
            task,
            reasoning,
        };
        entries.push(record.clone());

        debug!(
            owner = %self.owner,
            interaction_id = %record.interaction_id,
            from = %record.from_agent,
            to = %record.to_agent,
            "Logged interaction"
        );
        record
    }

    /// Copy of the full history in append order
    pub fn snapshot(&self) -> Vec<InteractionRecord> {
        self.entries.read().clone()
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl std::fmt::Debug for InteractionLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionLedger")
            .field("owner", &self.owner)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use mockall::mock;
    use std::collections::HashSet;
    use uuid::Uuid;

    mock! {
        pub TimeSource {}
        impl Clock for TimeSource {
            fn now(&self) -> DateTime<Utc>;
        }
    }

    mock! {
        pub Ids {}
        impl IdGenerator for Ids {
            fn next_id(&self) -> Uuid;
        }
    }

    #[test]
    fn test_append_uses_injected_sources() {
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();

        let mut clock = MockTimeSource::new();
        let mut tick = 0;
        clock.expect_now().times(3).returning(move || {
            tick += 1;
            start + Duration::seconds(tick)
        });

        let mut ids = MockIds::new();
        let mut next = 0u128;
        ids.expect_next_id().times(3).returning(move || {
            next += 1;
            Uuid::from_u128(next)
        });

        let ledger = InteractionLedger::with_sources("router", Arc::new(clock), Arc::new(ids));
        ledger.append("api", "router", "route invoice", "new upload");
        ledger.append("router", "extractor", "extract fields", "invoice needs structure");
        let last = ledger.append("router", "validator", "check totals", "compliance requested");

        assert_eq!(last.interaction_id, Uuid::from_u128(3));
        assert_eq!(last.timestamp, start + Duration::seconds(3));

        let history = ledger.snapshot();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].to_agent, "router");
        assert_eq!(history[1].to_agent, "extractor");
        assert_eq!(history[2].to_agent, "validator");
        assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let ledger = InteractionLedger::new("orchestrator");
        for i in 0..5 {
            ledger.append("orchestrator", "analyzer", format!("step {}", i), "plan");
        }

        let mut first = ledger.snapshot();
        let second = ledger.snapshot();
        assert_eq!(first, second);

        // Mutating a snapshot leaves the ledger untouched
        first.clear();
        assert_eq!(ledger.len(), 5);

        let ids: HashSet<Uuid> = second.iter().map(|r| r.interaction_id).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let ledger = Arc::new(InteractionLedger::new("orchestrator"));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        ledger.append(format!("caller-{}", t), "orchestrator", format!("task {}", i), "load");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let history = ledger.snapshot();
        assert_eq!(history.len(), 2_000);

        let ids: HashSet<Uuid> = history.iter().map(|r| r.interaction_id).collect();
        assert_eq!(ids.len(), 2_000);

        // Per-caller order is preserved
        for t in 0..8 {
            let caller = format!("caller-{}", t);
            let tasks: Vec<&str> = history
                .iter()
                .filter(|r| r.from_agent == caller)
                .map(|r| r.task.as_str())
                .collect();
            let expected: Vec<String> = (0..250).map(|i| format!("task {}", i)).collect();
            assert_eq!(tasks, expected);
        }
    }
}
