// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

//
// merge candidate priority tiers, best first. The declaration order is the
// ranking: template partner support outranks overlap strength, no-repeat
// evidence outranks repeat evidence at the same support level, and the
// chimeric / spoilsport tiers sit just above the bare repeat tiers. A chimeric
// or spoilsport read behind a repeat overlap ranks below every bare repeat.
//

use crate::config::AssemblyMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    // both reads of the edge have their template partner placed consistently
    BothMatesStrong,
    BothMatesWeak,
    BothMatesBelowAvg,
    // one side has its template partner placed consistently
    MateStrong,
    MateWeak,
    MateBelowAvg,
    MateUnrated,
    MateNeutral,
    MateViaRepeatEntry,
    MateRepeat,
    // no template information
    StrongWellConnected,
    Strong,
    WeakWellConnected,
    Weak,
    BelowAvg,
    Unrated,
    StrongNeutral,
    WeakNeutral,
    Troublemaker,
    MateInconsistent,
    RepeatWellConnected,
    // reachable, but only once nothing better is left
    LikelyChimeric,
    MaybeSpoilsport,
    RepeatStrong,
    RepeatWeak,
    RepeatMateInconsistent,
    RepeatChimeric,
    RepeatSpoilsport,
    // one more try for a structurally refused merge
    LastChance,
}

impl Tier {
    pub const COUNT: usize = 29;

    pub const ALL: [Tier; Tier::COUNT] = [
        Tier::BothMatesStrong,
        Tier::BothMatesWeak,
        Tier::BothMatesBelowAvg,
        Tier::MateStrong,
        Tier::MateWeak,
        Tier::MateBelowAvg,
        Tier::MateUnrated,
        Tier::MateNeutral,
        Tier::MateViaRepeatEntry,
        Tier::MateRepeat,
        Tier::StrongWellConnected,
        Tier::Strong,
        Tier::WeakWellConnected,
        Tier::Weak,
        Tier::BelowAvg,
        Tier::Unrated,
        Tier::StrongNeutral,
        Tier::WeakNeutral,
        Tier::Troublemaker,
        Tier::MateInconsistent,
        Tier::RepeatWellConnected,
        Tier::LikelyChimeric,
        Tier::MaybeSpoilsport,
        Tier::RepeatStrong,
        Tier::RepeatWeak,
        Tier::RepeatMateInconsistent,
        Tier::RepeatChimeric,
        Tier::RepeatSpoilsport,
        Tier::LastChance,
    ];

    pub const BEST: Tier = Tier::BothMatesStrong;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Tier> {
        Tier::ALL.get(idx).copied()
    }

    /// the edge the read came in through was in a repeat (or of unknown repeat status
    /// in a risky position)
    pub fn is_repeat(self) -> bool {
        matches!(
            self,
            Tier::MateRepeat
                | Tier::RepeatWellConnected
                | Tier::RepeatStrong
                | Tier::RepeatWeak
                | Tier::RepeatMateInconsistent
                | Tier::RepeatChimeric
                | Tier::RepeatSpoilsport
                | Tier::LastChance
        )
    }

    /// the edge was classified as not in a repeat
    pub fn is_non_repeat_entry(self) -> bool {
        matches!(
            self,
            Tier::BothMatesStrong
                | Tier::BothMatesWeak
                | Tier::BothMatesBelowAvg
                | Tier::MateStrong
                | Tier::MateWeak
                | Tier::MateBelowAvg
                | Tier::MateUnrated
                | Tier::MateViaRepeatEntry
                | Tier::StrongWellConnected
                | Tier::Strong
                | Tier::WeakWellConnected
                | Tier::Weak
                | Tier::BelowAvg
                | Tier::Unrated
                | Tier::Troublemaker
                | Tier::MateInconsistent
        )
    }

    pub fn is_mate_supported(self) -> bool {
        self <= Tier::MateRepeat
    }

    /// tiers the classifier can hand out in the given mode
    pub fn reachable(mode: AssemblyMode) -> Vec<Tier> {
        Tier::ALL
            .iter()
            .copied()
            .filter(|t| match mode {
                AssemblyMode::Genome => true,
                AssemblyMode::Mapping => *t != Tier::LastChance,
                AssemblyMode::Est => !matches!(
                    t,
                    Tier::LastChance
                        | Tier::StrongWellConnected
                        | Tier::WeakWellConnected
                        | Tier::RepeatWellConnected
                ),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_declaration_order() {
        for (i, t) in Tier::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
            assert_eq!(Tier::from_index(i), Some(*t));
        }
        assert_eq!(Tier::from_index(Tier::COUNT), None);
    }

    #[test]
    fn ranking_rules() {
        // template support beats overlap strength
        assert!(Tier::MateBelowAvg < Tier::Strong);
        assert!(Tier::MateRepeat < Tier::StrongWellConnected);
        // no repeat beats repeat at equal support
        assert!(Tier::MateStrong < Tier::MateRepeat);
        assert!(Tier::Weak < Tier::RepeatStrong);
        // chimeric and spoilsport are near the bottom but above bare repeats
        assert!(Tier::LikelyChimeric > Tier::RepeatWellConnected);
        assert!(Tier::MaybeSpoilsport < Tier::RepeatStrong);
        // a quality mark never lifts a bare repeat
        assert!(Tier::RepeatChimeric > Tier::RepeatWeak);
        assert!(Tier::RepeatSpoilsport > Tier::RepeatMateInconsistent);
        assert_eq!(*Tier::ALL.last().unwrap(), Tier::LastChance);
    }

    #[test]
    fn tier_counts_per_mode() {
        assert!(Tier::reachable(AssemblyMode::Genome).len() >= 24);
        assert!(Tier::reachable(AssemblyMode::Est).len() >= 20);
        assert!(!Tier::reachable(AssemblyMode::Mapping).contains(&Tier::LastChance));
    }

    #[test]
    fn entry_classes_do_not_overlap() {
        for t in Tier::ALL.iter() {
            assert!(!(t.is_repeat() && t.is_non_repeat_entry()), "{:?}", t);
        }
    }
}
