//! Media classification: photo or video by extension, and the
//! subcollection a file belongs in by its name.

use std::{fmt, path::Path, sync::LazyLock};

use regex::Regex;

use crate::{
    config::DumpConfig,
    fsutil::{has_extension, normalize_extensions},
};

/// Photo naming convention:
/// `YYYYMMDD` + initials + `HHMMSS` `_` camera `_` sequence + affixes + extension.
static PHOTO_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<year>\d{4})(?P<month>\d{2})(?P<day>\d{2})(?P<initials>[A-Za-z]{2})",
        r"(?P<hours>\d{2})(?P<minutes>\d{2})(?P<seconds>\d{2})",
        r"_(?P<camera>.*?)_(?P<seqnum>\d{4,}|\d+-\d|-\d)?",
        r"(?P<affix>(?:-(?:HDR|Pano|Edit|Stack)-*\d*)*)",
        r"(?P<ext>\.[A-Za-z0-9]{3})",
    ))
    .expect("photo naming pattern is valid")
});

/// Video naming convention: like photos, with `_Q<quality><fps>FPS` before
/// the extension.
static VIDEO_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<year>\d{4})(?P<month>\d{2})(?P<day>\d{2})(?P<initials>[A-Za-z]{2})",
        r"(?P<hours>\d{2})(?P<minutes>\d{2})(?P<seconds>\d{2})",
        r"_(?P<camera>.*?)_(?P<seqnum>.*(\d+))",
        r"_(?P<quality>Q\d+(K|P))(?P<fps>\d{2,3}FPS)",
        r"(?P<ext>\.[A-Za-z0-9]{3})",
    ))
    .expect("video naming pattern is valid")
});

/// Camera movie thumbnails (`MVI_0001T01.JPG` and friends).
static THUMBNAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"T\d{2,3}\.").expect("thumbnail pattern is valid"));

static GOPRO_CAMERA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)gopro|hero").expect("gopro pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

/// Subdirectory of the collection a dumped file is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subcollection {
    Photo,
    Video,
    Gopro,
    Drone,
}

impl Subcollection {
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Photo => "Photo",
            Self::Video => "Video",
            Self::Gopro => "Gopro",
            Self::Drone => "Drone",
        }
    }
}

impl fmt::Display for Subcollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl From<MediaKind> for Subcollection {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Photo => Self::Photo,
            MediaKind::Video => Self::Video,
        }
    }
}

/// The camera field of a conventionally named file.
pub fn camera_of(name: &str, kind: MediaKind) -> Option<&str> {
    let re = match kind {
        MediaKind::Photo => &*PHOTO_NAME,
        MediaKind::Video => &*VIDEO_NAME,
    };
    re.captures(name)
        .and_then(|c| c.name("camera"))
        .map(|m| m.as_str())
}

pub fn is_thumbnail(name: &str) -> bool {
    THUMBNAIL.is_match(name)
}

/// Subcollection for a file name of a known kind.
///
/// A GoPro camera field wins over a drone one; names that do not follow the
/// convention stay with their media kind.
pub fn subcollection_for(name: &str, kind: MediaKind) -> Subcollection {
    match camera_of(name, kind) {
        Some(camera) if GOPRO_CAMERA.is_match(camera) => Subcollection::Gopro,
        Some(camera) if camera.contains("FC") => Subcollection::Drone,
        _ => kind.into(),
    }
}

/// Extension lists from `[dump]`, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRules {
    pub photo_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
}

impl MediaRules {
    pub fn from_config(cfg: &DumpConfig) -> Self {
        Self {
            photo_extensions: normalize_extensions(&cfg.photo_extensions),
            video_extensions: normalize_extensions(&cfg.video_extensions),
        }
    }

    /// Photo and video extensions together.
    pub fn all_extensions(&self) -> Vec<String> {
        self.photo_extensions
            .iter()
            .chain(&self.video_extensions)
            .cloned()
            .collect()
    }

    pub fn kind_of(&self, path: &Path) -> Option<MediaKind> {
        if has_extension(path, &self.photo_extensions) {
            Some(MediaKind::Photo)
        } else if has_extension(path, &self.video_extensions) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Subcollection for `path`, or `None` when it is not media at all.
    pub fn classify(&self, path: &Path) -> Option<Subcollection> {
        let kind = self.kind_of(path)?;
        let name = path.file_name()?.to_str()?;
        Some(subcollection_for(name, kind))
    }
}

impl Default for MediaRules {
    fn default() -> Self {
        Self::from_config(&DumpConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_convention_extracts_camera() {
        assert_eq!(
            camera_of("20190930CL143005_A7III_0042.ARW", MediaKind::Photo),
            Some("A7III")
        );
        assert_eq!(
            camera_of("20190930CL143005_X100F_0042-HDR-2.jpg", MediaKind::Photo),
            Some("X100F")
        );
        assert_eq!(camera_of("DSC00042.ARW", MediaKind::Photo), None);
    }

    #[test]
    fn video_convention_extracts_camera() {
        assert_eq!(
            camera_of("20190930CL143005_HERO7_0001_Q4K60FPS.MP4", MediaKind::Video),
            Some("HERO7")
        );
        assert_eq!(
            camera_of("20190930CL143005_FC7203_0001_Q1080P30FPS.mov", MediaKind::Video),
            Some("FC7203")
        );
        assert_eq!(camera_of("C0001.MP4", MediaKind::Video), None);
    }

    #[test]
    fn subcollection_rules() {
        use Subcollection::*;
        let cases = [
            ("20190930CL143005_A7III_0042.ARW", MediaKind::Photo, Photo),
            ("20190930CL143005_GoPro_0042.jpg", MediaKind::Photo, Gopro),
            ("20190930CL143005_FC2204_0042.dng", MediaKind::Photo, Drone),
            ("20190930CL143005_HERO7_0001_Q4K60FPS.MP4", MediaKind::Video, Gopro),
            ("20190930CL143005_FC7203_0001_Q1080P30FPS.mov", MediaKind::Video, Drone),
            ("20190930CL143005_A7III_0001_Q4K25FPS.mp4", MediaKind::Video, Video),
            ("DSC00042.ARW", MediaKind::Photo, Photo),
            ("C0001.MP4", MediaKind::Video, Video),
        ];
        for (name, kind, want) in cases {
            assert_eq!(subcollection_for(name, kind), want, "{name}");
        }
    }

    #[test]
    fn thumbnails_are_recognised() {
        assert!(is_thumbnail("MVI_0001T01.JPG"));
        assert!(is_thumbnail("C0001T001.JPG"));
        assert!(!is_thumbnail("DSC00042.JPG"));
        assert!(!is_thumbnail("T1.JPG"));
    }

    #[test]
    fn rules_classify_by_extension() {
        let rules = MediaRules::default();
        assert_eq!(rules.kind_of(Path::new("a/B.JPG")), Some(MediaKind::Photo));
        assert_eq!(rules.kind_of(Path::new("a/b.mts")), Some(MediaKind::Video));
        assert_eq!(rules.kind_of(Path::new("a/b.xml")), None);
        assert_eq!(rules.classify(Path::new("x/c.txt")), None);
        assert_eq!(
            rules.classify(Path::new("DCIM/20190930CL143005_FC2204_0042.dng")),
            Some(Subcollection::Drone)
        );
    }

    #[test]
    fn display_is_dir_name() {
        assert_eq!(Subcollection::Gopro.to_string(), "Gopro");
    }
}
