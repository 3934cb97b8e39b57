//! Off-thread store mutation.
//!
//! Criteria may be produced away from the render thread (a background rule
//! import, a settings dialog on another thread). Producers hold a cloneable
//! [`StoreHandle`] and enqueue commands; the render thread drains them into
//! its [`CriterionStore`] between frames with [`PendingCommands::apply`].
//!
//! ```text
//! [producer] --StoreHandle--> mpsc --PendingCommands::apply--> [CriterionStore]
//! ```

use std::sync::mpsc::{self, Receiver, Sender};

use super::{CriterionStore, SharedTable};
use crate::criteria::{CriterionId, HeatMapCriterion, HighlightCriterion};
use crate::error::StyleError;

/// One queued store mutation.
#[derive(Debug)]
pub enum CriterionCommand {
    AddHighlight(HighlightCriterion),
    RemoveHighlight(CriterionId),
    ClearHighlights,
    AddHeatMap(HeatMapCriterion),
    RemoveHeatMap(String),
    ClearHeatMaps,
    ReplaceDataset(SharedTable),
}

/// Producer side of the command channel.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    sender: Sender<CriterionCommand>,
}

impl StoreHandle {
    /// Queue a command. Returns false once the render side has gone away.
    pub fn send(&self, command: CriterionCommand) -> bool {
        match self.sender.send(command) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(command = ?e.0, "store command dropped: receiver closed");
                false
            }
        }
    }

    pub fn add_highlight(&self, criterion: HighlightCriterion) -> bool {
        self.send(CriterionCommand::AddHighlight(criterion))
    }

    pub fn add_heat_map(&self, criterion: HeatMapCriterion) -> bool {
        self.send(CriterionCommand::AddHeatMap(criterion))
    }

    pub fn replace_dataset(&self, source: SharedTable) -> bool {
        self.send(CriterionCommand::ReplaceDataset(source))
    }
}

/// Render-thread side of the command channel.
#[derive(Debug)]
pub struct PendingCommands {
    receiver: Receiver<CriterionCommand>,
}

impl PendingCommands {
    /// Apply every queued command in send order without blocking. Failed
    /// commands are logged and returned; the rest still apply.
    pub fn apply(&self, store: &mut CriterionStore) -> Vec<StyleError> {
        let mut failures = Vec::new();
        for command in self.receiver.try_iter() {
            let outcome = match command {
                CriterionCommand::AddHighlight(c) => store.add_highlight(c).map(drop),
                CriterionCommand::RemoveHighlight(id) => {
                    if !store.remove_highlight(id) {
                        tracing::debug!(%id, "highlight already removed");
                    }
                    Ok(())
                }
                CriterionCommand::ClearHighlights => {
                    store.clear_highlights();
                    Ok(())
                }
                CriterionCommand::AddHeatMap(c) => store.add_heat_map(c),
                CriterionCommand::RemoveHeatMap(name) => {
                    store.remove_heat_map(&name);
                    Ok(())
                }
                CriterionCommand::ClearHeatMaps => {
                    store.clear_heat_maps();
                    Ok(())
                }
                CriterionCommand::ReplaceDataset(source) => store.replace_dataset(source),
            };
            if let Err(e) = outcome {
                tracing::warn!(error = %e, "queued store command rejected");
                failures.push(e);
            }
        }
        failures
    }
}

/// Create a connected handle/receiver pair.
pub fn criterion_channel() -> (StoreHandle, PendingCommands) {
    let (sender, receiver) = mpsc::channel();
    (StoreHandle { sender }, PendingCommands { receiver })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::predicate::{ComparisonOperator, Predicate};
    use crate::types::{Field, FieldType};
    use std::thread;

    #[test]
    fn test_commands_cross_threads() {
        let (handle, pending) = criterion_channel();
        let producer = handle.clone();
        thread::spawn(move || {
            let depth = Field::new("depth", FieldType::Integer);
            producer.add_highlight(HighlightCriterion::cell(
                depth.clone(),
                Predicate::compare(ComparisonOperator::Greater, ["10"]),
            ));
            producer.add_highlight(HighlightCriterion::cell(
                depth,
                Predicate::compare(ComparisonOperator::Greater, ["ten"]),
            ));
        })
        .join()
        .unwrap();

        let mut store = CriterionStore::new();
        let failures = pending.apply(&mut store);
        assert_eq!(store.highlights().len(), 1);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].is_registration_error());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (handle, pending) = criterion_channel();
        drop(pending);
        assert!(!handle.send(CriterionCommand::ClearHeatMaps));
    }
}
