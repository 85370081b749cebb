use std::fmt;

use crate::types::{StateCountRow, TrackTableRow};

/// Lifecycle of one track within a run. Terminal states are never left and
/// nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackState {
    Pending,
    Downloading,
    /// Target file already existed.
    Skipped,
    /// Downloaded and tagged.
    Tagged,
    /// Could not be prepared, or downloaded but tagging failed. A downloaded
    /// file is kept as is.
    Failed,
    /// The transfer itself failed; no file was left behind.
    DownloadFailed,
}

pub const ALL_STATES: [TrackState; 6] = [
    TrackState::Pending,
    TrackState::Downloading,
    TrackState::Skipped,
    TrackState::Tagged,
    TrackState::Failed,
    TrackState::DownloadFailed,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: TrackState,
    pub to: TrackState,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid track state change {} -> {}.", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

impl TrackState {
    pub fn transition(self, next: TrackState) -> Result<TrackState, InvalidTransition> {
        use TrackState::*;

        match (self, next) {
            (Pending, Skipped | Downloading | Failed) => Ok(next),
            (Downloading, Tagged | Failed | DownloadFailed) => Ok(next),
            _ => Err(InvalidTransition {
                from: self,
                to: next,
            }),
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, TrackState::Pending | TrackState::Downloading)
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrackState::Pending => "pending",
            TrackState::Downloading => "downloading",
            TrackState::Skipped => "skipped",
            TrackState::Tagged => "tagged",
            TrackState::Failed => "failed",
            TrackState::DownloadFailed => "download failed",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOutcome {
    pub album: String,
    pub track_num: usize,
    pub track_total: usize,
    pub title: String,
    pub state: TrackState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumFailure {
    pub reference: String,
    pub reason: String,
}

/// In-memory record of everything that happened during one run. Nothing is
/// persisted; reruns infer progress from the files on disk.
#[derive(Debug, Default)]
pub struct RunLedger {
    tracks: Vec<TrackOutcome>,
    albums_failed: Vec<AlbumFailure>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, outcome: TrackOutcome) {
        self.tracks.push(outcome);
    }

    pub fn add_album_failure(&mut self, reference: String, reason: String) {
        self.albums_failed.push(AlbumFailure { reference, reason });
    }

    pub fn tracks(&self) -> &[TrackOutcome] {
        &self.tracks
    }

    pub fn album_failures(&self) -> &[AlbumFailure] {
        &self.albums_failed
    }

    pub fn count(&self, state: TrackState) -> usize {
        self.tracks.iter().filter(|t| t.state == state).count()
    }

    pub fn table_rows(&self) -> Vec<TrackTableRow> {
        self.tracks
            .iter()
            .map(|t| TrackTableRow {
                album: t.album.clone(),
                track: format!("{}/{}", t.track_num, t.track_total),
                title: t.title.clone(),
                state: t.state.to_string(),
            })
            .collect()
    }

    /// Per-state counts, terminal states only.
    pub fn count_rows(&self) -> Vec<StateCountRow> {
        ALL_STATES
            .iter()
            .filter(|s| s.is_terminal())
            .map(|s| StateCountRow {
                state: s.to_string(),
                count: self.count(*s),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        use TrackState::*;

        assert_eq!(Pending.transition(Skipped), Ok(Skipped));
        assert_eq!(Pending.transition(Failed), Ok(Failed));
        let downloading = Pending.transition(Downloading).unwrap();
        assert_eq!(downloading.transition(Tagged), Ok(Tagged));
        assert_eq!(downloading.transition(Failed), Ok(Failed));
        assert_eq!(downloading.transition(DownloadFailed), Ok(DownloadFailed));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for from in ALL_STATES.iter().filter(|s| s.is_terminal()) {
            for to in ALL_STATES {
                assert!(from.transition(to).is_err(), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_invalid_shortcuts() {
        use TrackState::*;

        assert!(Pending.transition(Tagged).is_err());
        assert!(Pending.transition(DownloadFailed).is_err());
        assert!(Downloading.transition(Skipped).is_err());
        assert!(Downloading.transition(Pending).is_err());
    }

    #[test]
    fn test_ledger_counts() {
        let mut ledger = RunLedger::new();
        for (n, state) in [TrackState::Tagged, TrackState::Skipped, TrackState::Tagged]
            .into_iter()
            .enumerate()
        {
            ledger.add(TrackOutcome {
                album: "A - B".to_string(),
                track_num: n + 1,
                track_total: 3,
                title: format!("Track {}", n + 1),
                state,
            });
        }
        ledger.add_album_failure("https://example.com/album/123".into(), "Invalid URL".into());

        assert_eq!(ledger.count(TrackState::Tagged), 2);
        assert_eq!(ledger.count(TrackState::Skipped), 1);
        assert_eq!(ledger.count(TrackState::Failed), 0);
        assert_eq!(ledger.album_failures().len(), 1);

        let rows = ledger.table_rows();
        assert_eq!(rows[1].track, "2/3");
        assert_eq!(rows[1].state, "skipped");
        assert_eq!(ledger.count_rows().len(), 4);
    }
}
