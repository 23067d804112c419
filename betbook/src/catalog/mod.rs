//! Content catalogs shown in the app.
//!
//! Feed match cards, featured top matches with nested team/odds wire shapes,
//! manual winner cards that expire after a configured duration, and the
//! banner and avatar URL catalogs with per-user avatar selection. Image
//! bytes are hosted elsewhere; only URLs are stored.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{CatalogError, CatalogResult};
pub use manager::CatalogManager;
pub use models::{
    Banner, ManualCard, ManualCardSpec, ManualCardUpdate, MatchCard, MatchSpec, MatchUpdate,
    OddsTriple, ProfileImage, TeamSide, TopMatch, TopMatchSpec, TopMatchUpdate, UserImageView,
};
