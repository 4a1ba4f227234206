// ── Browse bootstrap ──
//
// Activating the browse view fires two independent fetches: the theater
// list and the profile picture. Neither waits for the other and they may
// finish in any order. Each bootstrap is tagged with a generation; results
// from an older generation are dropped on arrival so a slow earlier fetch
// cannot overwrite a newer one.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::backend::Backend;
use crate::model::Theater;

/// Fetch state of one independently loaded slice of the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Loadable<T> {
    #[default]
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> From<Result<T, String>> for Loadable<T> {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(message) => Self::Failed(message),
        }
    }
}

/// Monotonic tag identifying one bootstrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A finished bootstrap fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseEvent {
    Theaters {
        generation: Generation,
        result: Result<Vec<Theater>, String>,
    },
    ProfilePicture {
        generation: Generation,
        result: Result<Option<String>, String>,
    },
}

impl BrowseEvent {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Theaters { generation, .. } | Self::ProfilePicture { generation, .. } => {
                *generation
            }
        }
    }
}

/// Loaded data behind the browse view.
#[derive(Debug, Clone, Default)]
pub struct BrowseState {
    generation: Generation,
    pub theaters: Loadable<Vec<Theater>>,
    /// `Ready(None)` means the user has no picture.
    pub profile_picture: Loadable<Option<String>>,
}

impl BrowseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Start a new bootstrap: bump the generation and reset both slices.
    pub fn begin(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.theaters = Loadable::Loading;
        self.profile_picture = Loadable::Loading;
        self.generation
    }

    /// Apply a finished fetch. Returns `false` if it was stale and dropped.
    pub fn apply(&mut self, event: BrowseEvent) -> bool {
        if event.generation() != self.generation {
            debug!(
                stale = ?event.generation(),
                current = ?self.generation,
                "dropping stale browse result"
            );
            return false;
        }
        match event {
            BrowseEvent::Theaters { result, .. } => self.theaters = result.into(),
            BrowseEvent::ProfilePicture { result, .. } => self.profile_picture = result.into(),
        }
        true
    }

    /// The one error the view shows in place of the grid.
    ///
    /// Only the theater fetch can produce it; a failed picture just leaves
    /// the picture out.
    pub fn blocking_error(&self) -> Option<&str> {
        self.theaters.error()
    }

    pub fn profile_picture_url(&self) -> Option<&str> {
        self.profile_picture.ready().and_then(|url| url.as_deref())
    }
}

/// Spawn the two bootstrap fetches for `generation`.
///
/// Each task sends exactly one event into `tx` unless `cancel` fires
/// first. The channel's message type only needs a `From<BrowseEvent>`, so
/// a UI can feed these straight into its own action channel.
pub fn spawn_bootstrap<M>(
    backend: &Backend,
    generation: Generation,
    tx: &mpsc::UnboundedSender<M>,
    cancel: &CancellationToken,
) -> [JoinHandle<()>; 2]
where
    M: From<BrowseEvent> + Send + 'static,
{
    let theaters = {
        let backend = backend.clone();
        let tx = tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                result = backend.theaters() => {
                    let result = result.map_err(|e| e.to_string());
                    let _ = tx.send(M::from(BrowseEvent::Theaters { generation, result }));
                }
            }
        })
    };

    let picture = {
        let backend = backend.clone();
        let tx = tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                result = backend.profile_picture() => {
                    if let Err(ref e) = result {
                        debug!(error = %e, "profile picture unavailable");
                    }
                    let result = result.map_err(|e| e.to_string());
                    let _ = tx.send(M::from(BrowseEvent::ProfilePicture { generation, result }));
                }
            }
        })
    };

    [theaters, picture]
}
