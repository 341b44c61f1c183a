//! Sample records and the closed category taxonomy.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Taxonomy category of a sample.
///
/// Labels are exact and case-sensitive; see [`Category::label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Kick drum.
    Kick,
    /// Snare drum.
    Snare,
    /// Hand clap.
    Clap,
    /// Finger snap.
    Snap,
    /// Open or closed hi-hat.
    #[serde(rename = "Hi-Hat")]
    HiHat,
    /// Crash, ride and other cymbals.
    Cymbal,
    /// Tom drum.
    Tom,
    /// 808 bass and booms.
    #[serde(rename = "808")]
    EightOhEight,
    /// Miscellaneous percussion.
    Percussion,
    /// Effects, risers, impacts.
    #[serde(rename = "FX")]
    Fx,
    /// Anything no keyword matched.
    Other,
}

impl Category {
    /// Every category, in picker order.
    pub const ALL: [Self; 11] = [
        Self::Kick,
        Self::Snare,
        Self::Clap,
        Self::Snap,
        Self::HiHat,
        Self::Cymbal,
        Self::Tom,
        Self::EightOhEight,
        Self::Percussion,
        Self::Fx,
        Self::Other,
    ];

    /// Display label, as matched by category filters.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Kick => "Kick",
            Self::Snare => "Snare",
            Self::Clap => "Clap",
            Self::Snap => "Snap",
            Self::HiHat => "Hi-Hat",
            Self::Cymbal => "Cymbal",
            Self::Tom => "Tom",
            Self::EightOhEight => "808",
            Self::Percussion => "Percussion",
            Self::Fx => "FX",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| Error::Configuration(format!("Unknown category: {s}")))
    }
}

/// Category predicate of a query: everything, or one exact category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    /// Wildcard.
    #[default]
    All,
    /// Exactly this category.
    Only(Category),
}

impl CategoryFilter {
    /// Whether `category` passes this filter.
    #[must_use]
    pub fn accepts(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(category) => category.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "All" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        Self::Only(category)
    }
}

/// One audio file in the library.
///
/// Fields are fixed at construction; re-categorizing means re-importing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    file_url: PathBuf,
    name: String,
    category: Category,
    metadata: String,
}

impl Sample {
    /// Build a sample for `file_url`, naming it after the file's base name.
    #[must_use]
    pub fn new(file_url: PathBuf, category: Category) -> Self {
        let name = file_url
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            metadata: describe(category),
            file_url,
            name,
            category,
        }
    }

    /// Location of the backing file; the sample's identity.
    #[must_use]
    pub fn file_url(&self) -> &Path {
        &self.file_url
    }

    /// Base file name, extension included.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assigned category.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Generated description.
    #[must_use]
    pub fn metadata(&self) -> &str {
        &self.metadata
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.category)
    }
}

fn describe(category: Category) -> String {
    format!("This is a {category} sample")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_fields() {
        let sample = Sample::new(PathBuf::from("/kits/hihat_loop.mp3"), Category::HiHat);
        assert_eq!(sample.name(), "hihat_loop.mp3");
        assert_eq!(sample.category(), Category::HiHat);
        assert_eq!(sample.metadata(), "This is a Hi-Hat sample");
        assert_eq!(sample.file_url(), Path::new("/kits/hihat_loop.mp3"));
        assert_eq!(sample.to_string(), "hihat_loop.mp3: Hi-Hat");
    }

    #[test]
    fn test_category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.label().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_category_parse_is_case_sensitive() {
        assert!("kick".parse::<Category>().is_err());
        assert!("hi-hat".parse::<Category>().is_err());
        assert_eq!("808".parse::<Category>().unwrap(), Category::EightOhEight);
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!("All".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "FX".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Fx)
        );
        assert!("all".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn test_category_filter_accepts() {
        assert!(CategoryFilter::All.accepts(Category::Other));
        assert!(CategoryFilter::Only(Category::Tom).accepts(Category::Tom));
        assert!(!CategoryFilter::Only(Category::Tom).accepts(Category::Kick));
    }

    #[test]
    fn test_category_serde_uses_labels() {
        let json = serde_json::to_string(&Category::HiHat).unwrap();
        assert_eq!(json, "\"Hi-Hat\"");
        let back: Category = serde_json::from_str("\"808\"").unwrap();
        assert_eq!(back, Category::EightOhEight);
    }
}
