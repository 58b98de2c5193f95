use crate::domain::ports::{StageEvent, StageLog};
use std::sync::Mutex;

/// Forwards stage events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStageLog;

impl StageLog for TracingStageLog {
    fn record(&self, event: &StageEvent) {
        match event {
            StageEvent::StoreFailed {
                kind,
                collection,
                message,
            } => tracing::warn!(%kind, collection = %collection, "store read failed: {}", message),
            StageEvent::Loaded {
                kind,
                dropped_missing_id,
                unparsable_timestamps,
                ..
            } if *dropped_missing_id > 0 || *unparsable_timestamps > 0 => {
                tracing::warn!(?event, %kind, "records needed cleaning")
            }
            other => tracing::debug!(event = ?other, "stage boundary"),
        }
    }
}

/// Keeps every event in memory, for callers that want to inspect a run afterwards.
#[derive(Debug, Default)]
pub struct MemoryStageLog {
    events: Mutex<Vec<StageEvent>>,
}

impl MemoryStageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StageEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl StageLog for MemoryStageLog {
    fn record(&self, event: &StageEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::EntityKind;

    #[test]
    fn test_memory_log_keeps_order() {
        let log = MemoryStageLog::new();
        log.record(&StageEvent::RunStarted);
        log.record(&StageEvent::Finalized { rows: 3 });

        assert_eq!(
            log.events(),
            vec![StageEvent::RunStarted, StageEvent::Finalized { rows: 3 }]
        );
    }

    #[test]
    fn test_tracing_log_accepts_every_event() {
        let log = TracingStageLog;
        log.record(&StageEvent::StoreFailed {
            kind: EntityKind::Intake,
            collection: "intakes".to_string(),
            message: "timeout".to_string(),
        });
        log.record(&StageEvent::Loaded {
            kind: EntityKind::Outcome,
            rows: 1,
            dropped_missing_id: 2,
            unparsable_timestamps: 0,
        });
        log.record(&StageEvent::Merged { rows: 1, matched: 1 });
    }
}
