//! Shared helpers for the event-flags integration tests

#![allow(dead_code)]

use rtos_evflags::{EventRecorder, OsError, Record};
use std::sync::Mutex;

/// Recorder that keeps record ids and reported errors.
#[derive(Default)]
pub struct Capture {
    ids: Mutex<Vec<u8>>,
    errors: Mutex<Vec<OsError>>,
}

impl Capture {
    pub fn ids(&self) -> Vec<u8> {
        self.ids.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<OsError> {
        self.errors.lock().unwrap().clone()
    }

    pub fn count(&self, id: u8) -> usize {
        self.ids.lock().unwrap().iter().filter(|&&r| r == id).count()
    }

    pub fn reset(&self) {
        self.ids.lock().unwrap().clear();
        self.errors.lock().unwrap().clear();
    }
}

impl EventRecorder for Capture {
    fn record(&self, record: &Record<'_>) {
        self.ids.lock().unwrap().push(record.id());
        if let Record::Error { error, .. } = record {
            self.errors.lock().unwrap().push(*error);
        }
    }
}
