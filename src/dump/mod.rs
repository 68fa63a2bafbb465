//! SD dump: copy one day's photos and videos off a card into a collection.
//!
//! | Module    | Step                                                  |
//! |-----------|-------------------------------------------------------|
//! | [`plan`]  | resolve the volume, select the day's media            |
//! | [`stage`] | copy into a staging directory, route into the collection |
//! | [`media`] | photo/video kinds and subcollection rules             |

pub mod media;
pub mod plan;
pub mod stage;

use std::path::{Path, PathBuf};

pub use media::{MediaKind, MediaRules, Subcollection};
pub use plan::DumpPlan;
pub use stage::{RouteReport, StageReport};

/// `<collection>/<staging_dir>`.
pub fn staging_path(collection: &Path, staging_dir: &str) -> PathBuf {
    collection.join(staging_dir)
}
