//! Fixtures and a recording [`crate::backend::Backend`] for exercising the
//! rest of the crate without a real transport.
//!
//! Shaped after the teacher crate's own `testing` module: small, composable
//! builders plus a fake collaborator that records what it was called with so
//! assertions can inspect it afterward, rather than a mocking framework.

use crate::backend::Backend;
use crate::commmatrix::CommMatrix;
use crate::instance::Group;
use std::sync::Mutex;

/// A [`Backend`] that records every call instead of doing anything, for
/// assertions in tests that exercise code calling out through `Backend`.
#[derive(Default)]
pub struct RecordingBackend {
    matsync_calls: Mutex<Vec<usize>>,
    update_group_calls: Mutex<Vec<Group>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        RecordingBackend::default()
    }

    pub fn matsync_count(&self) -> usize {
        self.matsync_calls.lock().unwrap().len()
    }

    pub fn update_group_calls(&self) -> Vec<Group> {
        self.update_group_calls.lock().unwrap().clone()
    }
}

impl Backend for RecordingBackend {
    fn matsync(&self, cm: &mut CommMatrix) {
        self.matsync_calls.lock().unwrap().push(cm.nodecount());
    }

    fn update_group(&self, group: &Group) {
        self.update_group_calls.lock().unwrap().push(*group);
    }
}

/// A small 1-D space extent, handy as a default in tests that don't care
/// about the exact size.
pub fn small_1d_extent() -> [u64; 3] {
    [64, 0, 0]
}

/// A small 2-D space extent.
pub fn small_2d_extent() -> [u64; 3] {
    [16, 16, 0]
}
