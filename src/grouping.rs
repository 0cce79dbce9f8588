//! Pass Grouping - Traversal Batch Formation

use crate::config::{PluginBatch, PluginSpec};

/// Partition an ordered pass sequence into contiguous batches of identical
/// traversal kind. A batch boundary sits exactly where two adjacent passes
/// differ in kind; nothing is reordered - pipeline order encodes data
/// dependencies between passes. The engine performs one document traversal
/// per batch.
pub fn group_passes(specs: Vec<PluginSpec>) -> Vec<PluginBatch> {
    let mut batches: Vec<PluginBatch> = Vec::new();
    for spec in specs {
        match batches.last_mut() {
            Some(batch) if batch.kind() == spec.kind => batch.push(spec),
            _ => batches.push(PluginBatch::new(spec)),
        }
    }
    batches
}
