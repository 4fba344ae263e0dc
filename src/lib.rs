pub mod audiothek;
pub mod download;
pub mod error;
pub mod feed;
pub mod home;
pub mod http;
pub mod progress;
pub mod sync;

// Re-export main types for convenience
pub use audiothek::search::AudiothekSearcher;
pub use audiothek::{
    CardTarget, ContentCard, HomeSection, Module, PlayableAudio, PodcastSearchResult,
    SectionContent,
};
pub use download::{DownloadRequest, DownloadRequestBuilder, ensure_audiothek_limit, prepare_url};
pub use error::{FeedError, FetchError, PreferencesError, SyncFailure, SyncServiceError};
pub use feed::{
    Enclosure, Episode, Podcast, fetch_feed, is_url, parse_audiothek_json, parse_feed_bytes,
    parse_feed_file,
};
pub use home::{CardWindow, HomePreferences, ModuleWindow, SectionLoader, SectionState, TapAction};
pub use http::{HttpClient, HttpRequest, HttpResponse, ReqwestClient};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use sync::{
    EpisodeAction, EpisodeActionChanges, EpisodeActionKind, NextcloudAccount,
    NextcloudSyncService, SubscriptionChanges, SyncService, UploadChangesResponse,
};
