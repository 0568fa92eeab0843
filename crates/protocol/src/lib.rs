//! Wire types for the campaign feed.
//!
//! Three kinds of data cross the socket: the data-source and channel ids the
//! operator picks ([`DataSourceId`], [`ChannelId`]), the two frames the client
//! sends ([`PreferenceSync`], [`PromptSubmit`]), and the recommendations the
//! service pushes back ([`CampaignRecommendation`]). Field names follow the
//! service's own casing, which is not uniform; see [`recommendation`].

pub mod ids;
pub mod outbound;
pub mod recommendation;

pub use ids::*;
pub use outbound::*;
pub use recommendation::*;
