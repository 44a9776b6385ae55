use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{NotificationPlatform, PermissionStatus, TriggerId, TriggerRequest};

/// In-memory stand-in for the OS scheduler that records every call.
pub(crate) struct RecordingPlatform {
    permission: PermissionStatus,
    live: Mutex<HashMap<TriggerId, TriggerRequest>>,
    failing_schedule: Mutex<HashSet<u8>>,
    failing_cancel: Mutex<HashSet<u8>>,
    next_id: AtomicUsize,
    permission_requests: AtomicUsize,
    schedule_calls: AtomicUsize,
    cancelled: AtomicUsize,
}

impl RecordingPlatform {
    pub(crate) fn new(permission: PermissionStatus) -> Self {
        Self {
            permission,
            live: Mutex::new(HashMap::new()),
            failing_schedule: Mutex::new(HashSet::new()),
            failing_cancel: Mutex::new(HashSet::new()),
            next_id: AtomicUsize::new(1),
            permission_requests: AtomicUsize::new(0),
            schedule_calls: AtomicUsize::new(0),
            cancelled: AtomicUsize::new(0),
        }
    }

    pub(crate) fn granted() -> Self {
        Self::new(PermissionStatus::Granted)
    }

    pub(crate) fn fail_schedule_for(&self, weekday_index: u8) {
        self.failing_schedule.lock().unwrap().insert(weekday_index);
    }

    pub(crate) fn fail_cancel_for(&self, weekday_index: u8) {
        self.failing_cancel.lock().unwrap().insert(weekday_index);
    }

    pub(crate) fn clear_failures(&self) {
        self.failing_schedule.lock().unwrap().clear();
        self.failing_cancel.lock().unwrap().clear();
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub(crate) fn is_live(&self, trigger_id: &TriggerId) -> bool {
        self.live.lock().unwrap().contains_key(trigger_id)
    }

    pub(crate) fn live_request_for(&self, weekday_index: u8) -> Option<TriggerRequest> {
        self.live
            .lock()
            .unwrap()
            .values()
            .find(|r| r.weekday_index == weekday_index)
            .cloned()
    }

    pub(crate) fn permission_requests(&self) -> usize {
        self.permission_requests.load(Ordering::SeqCst)
    }

    pub(crate) fn schedule_calls(&self) -> usize {
        self.schedule_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn cancelled_count(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationPlatform for RecordingPlatform {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.permission)
    }

    async fn schedule(&self, request: &TriggerRequest) -> Result<TriggerId> {
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .failing_schedule
            .lock()
            .unwrap()
            .contains(&request.weekday_index)
        {
            bail!("platform rejected trigger for weekday {}", request.weekday_index);
        }
        let id = TriggerId::new(format!(
            "trigger-{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        ));
        self.live.lock().unwrap().insert(id.clone(), request.clone());
        Ok(id)
    }

    async fn cancel(&self, trigger_id: &TriggerId) -> Result<()> {
        let mut live = self.live.lock().unwrap();
        let weekday = live.get(trigger_id).map(|r| r.weekday_index);
        if let Some(weekday) = weekday {
            if self.failing_cancel.lock().unwrap().contains(&weekday) {
                bail!("platform could not cancel {}", trigger_id);
            }
        }
        if live.remove(trigger_id).is_some() {
            self.cancelled.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
