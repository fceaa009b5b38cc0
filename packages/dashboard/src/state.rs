//! Per-view selection state machine.
//!
//! [`Dashboard`] owns a view's dataset, filter, and year. Every transition
//! bumps the sequence number and recomputes the snapshot synchronously, so
//! [`Dashboard::snapshot`] always reflects the latest accepted event.

use std::sync::Arc;

use game_viz_dataset::LoadError;
use game_viz_dataset_models::{Dataset, FilterState};
use game_viz_view::ViewDefinition;

use crate::DashboardError;
use crate::event::{ALL_REGIONS, DashboardEvent};
use crate::snapshot::{LoadStatus, Selection, Snapshot, compute_snapshot, empty_snapshot};

/// Dataset availability.
#[derive(Debug, Clone)]
enum DataState {
    Loading,
    Ready(Arc<Dataset>),
    Failed(String),
}

/// Selection state and derived snapshot of one view.
#[derive(Debug)]
pub struct Dashboard {
    view: Arc<ViewDefinition>,
    data: DataState,
    filter: FilterState,
    year: i32,
    sequence: u64,
    generation: u64,
    snapshot: Arc<Snapshot>,
}

impl Dashboard {
    /// Creates a dashboard in the loading state with no filter and the
    /// view's default year.
    #[must_use]
    pub fn new(view: Arc<ViewDefinition>) -> Self {
        let filter = FilterState::All;
        let year = view.year.default;
        let snapshot = Arc::new(empty_snapshot(
            &view,
            Selection {
                filter: &filter,
                year,
                sequence: 0,
            },
            LoadStatus::Loading,
            None,
        ));
        Self {
            view,
            data: DataState::Loading,
            filter,
            year,
            sequence: 0,
            generation: 0,
            snapshot,
        }
    }

    /// The view this dashboard renders.
    #[must_use]
    pub const fn view(&self) -> &Arc<ViewDefinition> {
        &self.view
    }

    /// The latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    /// The active filter.
    #[must_use]
    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// The generation of the load currently in flight or last completed.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Region dropdown values in first-encountered order, excluding the
    /// "All" entry. Empty until the dataset is loaded or when the view has no
    /// region column.
    #[must_use]
    pub fn regions(&self) -> Vec<String> {
        match (&self.data, &self.view.region_column) {
            (DataState::Ready(dataset), Some(column)) => dataset.distinct_text(column),
            _ => Vec::new(),
        }
    }

    /// Starts a new load generation and returns it. Completions for any
    /// earlier generation are ignored from now on.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.data = DataState::Loading;
        self.recompute();
        log::debug!(
            "[{}] Load generation {} started",
            self.view.id,
            self.generation
        );
        self.generation
    }

    /// Applies the outcome of load `generation`.
    ///
    /// Returns the new snapshot, or `None` when the completion belongs to a
    /// superseded generation and was discarded. The active filter and year
    /// are kept, so events that arrived while loading take effect here.
    pub fn load_completed(
        &mut self,
        generation: u64,
        result: Result<Dataset, LoadError>,
    ) -> Option<Arc<Snapshot>> {
        if generation != self.generation {
            log::debug!(
                "[{}] Discarding stale load generation {generation} (current {})",
                self.view.id,
                self.generation
            );
            return None;
        }

        self.data = match result {
            Ok(dataset) => {
                log::info!("[{}] Loaded {} records", self.view.id, dataset.len());
                DataState::Ready(Arc::new(dataset))
            }
            Err(e) => {
                log::error!("[{}] Failed to load dataset: {e}", self.view.id);
                DataState::Failed(e.to_string())
            }
        };
        Some(self.recompute())
    }

    /// Applies a user event and returns the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnknownCell`] if a cell id does not exist in
    /// the current map layer. The state is left unchanged in that case.
    pub fn apply(&mut self, event: DashboardEvent) -> Result<Arc<Snapshot>, DashboardError> {
        match event {
            DashboardEvent::SelectRegion { name } if name == ALL_REGIONS => {
                self.filter = FilterState::All;
            }
            DashboardEvent::SelectRegion { name } => {
                self.filter = FilterState::Region { name };
            }
            DashboardEvent::SelectAll => {
                self.filter = FilterState::All;
            }
            DashboardEvent::SelectCell { record_ids } => {
                self.filter = FilterState::Cell { record_ids };
            }
            DashboardEvent::SelectCellById { cell_id } => {
                let record_ids = self
                    .snapshot
                    .layer
                    .cell_members(&cell_id)
                    .ok_or_else(|| DashboardError::UnknownCell {
                        view: self.view.id.clone(),
                        cell_id: cell_id.clone(),
                    })?
                    .to_vec();
                self.filter = FilterState::Cell { record_ids };
            }
            DashboardEvent::SetYear { year } => {
                self.year = self.view.year.clamp(year);
            }
        }

        log::debug!(
            "[{}] Filter is now {:?}, year {}",
            self.view.id,
            self.filter,
            self.year
        );
        Ok(self.recompute())
    }

    fn recompute(&mut self) -> Arc<Snapshot> {
        self.sequence += 1;
        let selection = Selection {
            filter: &self.filter,
            year: self.year,
            sequence: self.sequence,
        };
        let snapshot = match &self.data {
            DataState::Ready(dataset) => compute_snapshot(&self.view, dataset, selection),
            DataState::Loading => {
                empty_snapshot(&self.view, selection, LoadStatus::Loading, None)
            }
            DataState::Failed(message) => empty_snapshot(
                &self.view,
                selection,
                LoadStatus::Failed,
                Some(message.clone()),
            ),
        };
        self.snapshot = Arc::new(snapshot);
        Arc::clone(&self.snapshot)
    }
}
