//! Clients for manga list tracking services behind one [`TrackerClient`] contract.

pub mod anilist;
pub mod error;
pub mod mal;
pub mod mangaupdates;
pub mod score;
pub mod session;
pub mod traits;

pub use error::TrackerError;
pub use score::{ScoreError, ScoreFormat};
pub use traits::{
    TrackEntry, TrackEntryDraft, TrackStatus, TrackerClient, TrackerId, TrackerMetadata,
    TrackerSeries, UnknownTracker,
};
