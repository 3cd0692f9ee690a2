use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::api::PredictApi;
use crate::directory::is_all;
use crate::state::{Delta, ProviderCommand};

/// Runs provider commands off the UI thread.
///
/// Each command gets its own worker, so deltas come back in completion order
/// rather than submission order. The UI side rejects stale ones.
pub fn spawn_provider(
    api: Arc<dyn PredictApi>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            debug!(?cmd, "provider command");
            let api = Arc::clone(&api);
            let tx = tx.clone();
            thread::spawn(move || {
                let delta = run_command(api.as_ref(), cmd);
                let _ = tx.send(delta);
            });
        }
        debug!("provider channel closed");
    })
}

pub fn run_command(api: &dyn PredictApi, cmd: ProviderCommand) -> Delta {
    match cmd {
        ProviderCommand::FetchCategories => Delta::SetCategories(api.weight_classes()),
        ProviderCommand::FetchNames(ticket) => {
            let filter = (!is_all(&ticket.category)).then_some(ticket.category.as_str());
            let result = api.fighters(filter);
            Delta::SetNames { ticket, result }
        }
        ProviderCommand::LookupFighter(ticket) => {
            let result = api.fighter_weight_classes(&ticket.name);
            Delta::SetMetadata { ticket, result }
        }
        ProviderCommand::Predict(pending) => Delta::PredictionFinished {
            seq: pending.seq,
            outcome: api.predict(&pending.request),
        },
    }
}
