pub mod orchestrator;
pub mod reconciler;
pub mod report;

pub use orchestrator::{
    DEFAULT_PLAYLIST_NAME, PlaylistSync, RESULTS_DIR, SyncOptions, print_summary, save_report,
};
pub use reconciler::{PlaylistReconciler, ReconcileStrategy};
pub use report::{ReconcileReport, SyncReport};
