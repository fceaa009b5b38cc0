//! Async front end for a [`Dashboard`].
//!
//! Each view runs as one task that owns its [`Dashboard`] and handles
//! [`Command`]s from an `mpsc` channel strictly in arrival order. Dataset
//! loads run in their own task and report back as a command tagged with
//! their generation. Snapshots are published on a `watch` channel, and a
//! snapshot is only published if its sequence number is newer than the one
//! already there.

use std::sync::Arc;

use game_viz_dataset::{DataRoot, DatasetLoader, LoadError};
use game_viz_dataset_models::Dataset;
use game_viz_view::ViewDefinition;
use tokio::sync::{mpsc, oneshot, watch};

use crate::DashboardError;
use crate::event::DashboardEvent;
use crate::snapshot::{LoadStatus, Snapshot};
use crate::state::Dashboard;

/// Pending commands per view before senders wait.
const COMMAND_BUFFER: usize = 64;

enum Command {
    Apply {
        event: DashboardEvent,
        reply: oneshot::Sender<Result<Arc<Snapshot>, DashboardError>>,
    },
    Regions {
        reply: oneshot::Sender<Vec<String>>,
    },
    Reload,
    LoadFinished {
        generation: u64,
        result: Result<Dataset, LoadError>,
    },
}

/// Cloneable handle to a running view task.
///
/// The task stops once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct DashboardHandle {
    view: Arc<ViewDefinition>,
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Arc<Snapshot>>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apply { event, .. } => write!(f, "Apply({event:?})"),
            Self::Regions { .. } => write!(f, "Regions"),
            Self::Reload => write!(f, "Reload"),
            Self::LoadFinished { generation, .. } => write!(f, "LoadFinished({generation})"),
        }
    }
}

impl DashboardHandle {
    /// Spawns the task for `view` and starts loading its dataset from
    /// `root`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(view: ViewDefinition, root: &DataRoot) -> Self {
        let loader = DatasetLoader::new(root.resolve(&view.resource))
            .with_gzip(view.gzip)
            .with_delimiter(view.delimiter_byte());
        let view = Arc::new(view);
        let dashboard = Dashboard::new(Arc::clone(&view));

        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
        let (publisher, snapshots) = watch::channel(dashboard.snapshot());

        let task = ViewTask {
            dashboard,
            loader,
            commands: commands.downgrade(),
            publisher,
        };
        tokio::spawn(task.run(receiver));

        Self {
            view,
            commands,
            snapshots,
        }
    }

    /// The view definition.
    #[must_use]
    pub fn view(&self) -> &ViewDefinition {
        &self.view
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.snapshots.borrow())
    }

    /// A receiver notified on every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshots.clone()
    }

    /// Applies an event and returns the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the event is rejected or the view task
    /// has stopped.
    pub async fn apply(&self, event: DashboardEvent) -> Result<Arc<Snapshot>, DashboardError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Apply { event, reply }).await?;
        response.await.map_err(|_| self.closed())?
    }

    /// Region dropdown values.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Closed`] if the view task has stopped.
    pub async fn regions(&self) -> Result<Vec<String>, DashboardError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Regions { reply }).await?;
        response.await.map_err(|_| self.closed())
    }

    /// Starts a fresh dataset load, superseding any load in flight.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Closed`] if the view task has stopped.
    pub async fn reload(&self) -> Result<(), DashboardError> {
        self.send(Command::Reload).await
    }

    /// Waits until the current load has either succeeded or failed and
    /// returns that snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Closed`] if the view task has stopped.
    pub async fn wait_until_loaded(&self) -> Result<Arc<Snapshot>, DashboardError> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(|s| s.status != LoadStatus::Loading)
            .await
            .map_err(|_| self.closed())?;
        Ok(Arc::clone(&*snapshot))
    }

    async fn send(&self, command: Command) -> Result<(), DashboardError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| self.closed())
    }

    fn closed(&self) -> DashboardError {
        DashboardError::Closed(self.view.id.clone())
    }
}

struct ViewTask {
    dashboard: Dashboard,
    loader: DatasetLoader,
    commands: mpsc::WeakSender<Command>,
    publisher: watch::Sender<Arc<Snapshot>>,
}

impl ViewTask {
    async fn run(mut self, mut receiver: mpsc::Receiver<Command>) {
        let view_id = self.dashboard.view().id.clone();
        log::debug!("[{view_id}] View task started");

        self.start_load();

        while let Some(command) = receiver.recv().await {
            log::trace!("[{view_id}] {command:?}");
            match command {
                Command::Apply { event, reply } => {
                    let result = self.dashboard.apply(event);
                    if let Ok(snapshot) = &result {
                        self.publish(Arc::clone(snapshot));
                    }
                    if reply.send(result).is_err() {
                        log::debug!("[{view_id}] Caller went away before the reply");
                    }
                }
                Command::Regions { reply } => {
                    reply.send(self.dashboard.regions()).ok();
                }
                Command::Reload => self.start_load(),
                Command::LoadFinished { generation, result } => {
                    if let Some(snapshot) = self.dashboard.load_completed(generation, result) {
                        self.publish(snapshot);
                    }
                }
            }
        }

        log::debug!("[{view_id}] View task stopped");
    }

    fn start_load(&mut self) {
        let generation = self.dashboard.begin_load();
        self.publish(self.dashboard.snapshot());

        let loader = self.loader.clone();
        let schema = self.dashboard.view().columns.clone();
        let commands = self.commands.clone();
        log::info!(
            "[{}] Loading {} (generation {generation})",
            self.dashboard.view().id,
            loader.resource()
        );

        tokio::spawn(async move {
            let result = loader.load(&schema).await;
            if let Some(commands) = commands.upgrade() {
                commands
                    .send(Command::LoadFinished { generation, result })
                    .await
                    .ok();
            }
        });
    }

    fn publish(&self, snapshot: Arc<Snapshot>) {
        publish_if_newer(&self.publisher, snapshot);
    }
}

/// Replaces the published snapshot only if `snapshot` has a higher sequence
/// number. Returns whether it was published.
fn publish_if_newer(publisher: &watch::Sender<Arc<Snapshot>>, snapshot: Arc<Snapshot>) -> bool {
    publisher.send_if_modified(|current| {
        if snapshot.sequence > current.sequence {
            *current = snapshot;
            true
        } else {
            log::debug!(
                "Dropping stale snapshot {} (published {})",
                snapshot.sequence,
                current.sequence
            );
            false
        }
    })
}
