//! Keyword-based taxonomy classifier.
//!
//! The keyword table is ordered and the order is part of the contract: the
//! first keyword found in the lower-cased file name decides the category,
//! not the longest or most specific one. `kick_hat.wav` is a [`Category::Kick`].

use crate::sample::Category;

/// Lower-case keyword to category table, in match priority order.
pub const KEYWORDS: [(&str, Category); 11] = [
    ("kick", Category::Kick),
    ("snare", Category::Snare),
    ("clap", Category::Clap),
    ("snap", Category::Snap),
    ("hat", Category::HiHat),
    ("hh", Category::HiHat),
    ("cymbal", Category::Cymbal),
    ("tom", Category::Tom),
    ("808", Category::EightOhEight),
    ("perc", Category::Percussion),
    ("fx", Category::Fx),
];

/// Classify a file name. Never fails; unknown names are [`Category::Other`].
#[must_use]
pub fn classify(filename: &str) -> Category {
    let lowered = filename.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map_or(Category::Other, |&(_, category)| category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_maps() {
        for (keyword, category) in KEYWORDS {
            let name = format!("xxx{keyword}yyy");
            assert_eq!(classify(&name), category, "keyword {keyword}");
        }
    }

    #[test]
    fn test_no_match_is_other() {
        assert_eq!(classify("nomatch"), Category::Other);
        assert_eq!(classify(""), Category::Other);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("KICK_01.WAV"), Category::Kick);
        assert_eq!(classify("Big_FX_Riser.aiff"), Category::Fx);
    }

    #[test]
    fn test_first_keyword_in_table_order_wins() {
        assert_eq!(classify("kick_hat.wav"), Category::Kick);
        assert_eq!(classify("hat_kick.wav"), Category::Kick);
        assert_eq!(classify("snare_clap.wav"), Category::Snare);
        assert_eq!(classify("perc_fx.wav"), Category::Percussion);
    }

    #[test]
    fn test_substring_quirks_follow_table() {
        // "tom" hides inside "custom", "hat" inside "chat"
        assert_eq!(classify("custom_loop.wav"), Category::Tom);
        assert_eq!(classify("chatter.wav"), Category::HiHat);
        // "hh" before "808" in table order
        assert_eq!(classify("808_hh.wav"), Category::HiHat);
    }
}
