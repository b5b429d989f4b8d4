// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

//
// rank the overlaps of a placed read toward reads that are still free. Like
// the graph filters of the assembler, it is a stack of heuristic rules: the
// template partners, the repeat marks of the overlap and of the read, and a
// few quality marks decide the tier of each overlap.
//

use crate::bans::EdgeBans;
use crate::blacklist::BlacklistWindow;
use crate::config::AssemblyMode;
use crate::graph::{OverlapEdge, OverlapGraph, RepeatStatus, Strength};
use crate::ledger::UsageLedger;
use crate::reads::ReadPool;
use crate::tier::Tier;
use crate::{ContigId, EdgeId, ReadId};
use rustc_hash::FxHashSet;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Classification {
    pub tier: Tier,
    pub edge: EdgeId,
    pub read: ReadId,
    pub score: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MateStatus {
    NoMate,
    Unplaced,
    /// placed in this contig with the expected strand
    Consistent { non_repeat_entry: bool },
    /// placed in another contig or with the wrong strand
    Inconsistent,
}

pub struct Classifier<'a> {
    pub reads: &'a ReadPool,
    pub graph: &'a OverlapGraph,
    pub ledger: &'a UsageLedger,
    pub bans: &'a EdgeBans,
    pub blacklist: &'a BlacklistWindow,
    /// edges parked in the last chance tier
    pub deferred: &'a FxHashSet<EdgeId>,
    pub contig: ContigId,
    pub mode: AssemblyMode,
    pub est_repeat_level_ceiling: u8,
}

impl<'a> Classifier<'a> {
    /// best candidate overlap out of `anchor`, which must be placed in the contig
    pub fn classify(&self, anchor: ReadId) -> Option<Classification> {
        let placement = self.ledger.placement(anchor)?;
        if placement.contig != self.contig {
            return None;
        }
        let anchor_mate = self.mate_status(anchor, placement.reversed);

        let mut best: Option<Classification> = None;
        for (eid, e) in self.graph.iter_edges_of(anchor) {
            if !self.is_viable(eid, e) {
                continue;
            }
            let new_reversed = placement.reversed ^ e.reversed;
            let tier = self.edge_tier(e, new_reversed, anchor_mate);
            // edges come best score first, so only a strictly better tier replaces
            let better = match best {
                Some(b) => tier < b.tier,
                None => true,
            };
            if better {
                best = Some(Classification {
                    tier,
                    edge: eid,
                    read: e.to,
                    score: e.score,
                });
                if tier == Tier::BEST {
                    break;
                }
            }
        }
        best
    }

    pub fn is_viable(&self, eid: EdgeId, e: &OverlapEdge) -> bool {
        let rid = e.to;
        !(rid == e.from
            || !self.reads.contains(rid)
            || self.bans.is_banned(eid)
            || self.deferred.contains(&eid)
            || self.ledger.is_used(rid)
            || self.blacklist.contains(rid)
            || self.reads.is_rail(rid)
            || self.reads.usable_len(rid) == 0)
    }

    pub fn mate_status(&self, rid: ReadId, reversed: bool) -> MateStatus {
        let mate = match self.reads.mate(rid) {
            Some(m) if self.reads.contains(m) => m,
            _ => return MateStatus::NoMate,
        };
        let p = match self.ledger.placement(mate) {
            Some(p) => p,
            None => return MateStatus::Unplaced,
        };
        let expected = self
            .reads
            .get(rid)
            .map(|r| r.mate_orientation.accepts(reversed, p.reversed))
            .unwrap_or(false);
        if p.contig != self.contig || !expected {
            return MateStatus::Inconsistent;
        }
        let non_repeat_entry = match p.tier {
            Some(t) => t.is_non_repeat_entry(),
            None => !self.reads.is_repeat_flagged(mate),
        };
        MateStatus::Consistent { non_repeat_entry }
    }

    fn repeat_status(&self, e: &OverlapEdge) -> RepeatStatus {
        let rid = e.to;
        let status = e.flags.repeat_status();
        if status == RepeatStatus::Repeat {
            return status;
        }
        if self.mode.uses_repeat_levels() {
            if self.reads.repeat_frequency_level(rid) <= self.est_repeat_level_ceiling {
                return RepeatStatus::NoRepeat;
            }
            return RepeatStatus::Repeat;
        }
        if status == RepeatStatus::Neutral {
            if self.reads.is_repeat_flagged(rid)
                || (self.reads.has_any_repeat_overlap(rid)
                    && !self.reads.has_no_repeat_overlap(rid))
            {
                return RepeatStatus::Repeat;
            }
            if self.reads.has_no_repeat_overlap(rid) {
                return RepeatStatus::NoRepeat;
            }
        }
        status
    }

    pub fn edge_tier(&self, e: &OverlapEdge, new_reversed: bool, anchor_mate: MateStatus) -> Tier {
        let rid = e.to;
        let repeat = self.repeat_status(e);
        let behind_repeat = repeat == RepeatStatus::Repeat;
        if self.reads.is_likely_chimeric(rid) {
            return if behind_repeat {
                Tier::RepeatChimeric
            } else {
                Tier::LikelyChimeric
            };
        }
        if self.reads.is_maybe_spoilsport(rid) {
            return if behind_repeat {
                Tier::RepeatSpoilsport
            } else {
                Tier::MaybeSpoilsport
            };
        }

        let new_mate = self.mate_status(rid, new_reversed);
        let support = [new_mate, anchor_mate]
            .iter()
            .filter(|m| **m == MateStatus::Consistent { non_repeat_entry: true })
            .count();
        let via_repeat = [new_mate, anchor_mate]
            .iter()
            .any(|m| *m == MateStatus::Consistent { non_repeat_entry: false });
        let inconsistent = new_mate == MateStatus::Inconsistent;
        let well_connected = self.reads.is_well_connected(rid) && !self.mode.uses_repeat_levels();
        let strength = e.flags.strength();

        match repeat {
            RepeatStatus::NoRepeat => {
                if support == 2 {
                    match strength {
                        Strength::Strong => Tier::BothMatesStrong,
                        Strength::Weak => Tier::BothMatesWeak,
                        _ => Tier::BothMatesBelowAvg,
                    }
                } else if support == 1 {
                    match strength {
                        Strength::Strong => Tier::MateStrong,
                        Strength::Weak => Tier::MateWeak,
                        Strength::BelowAvg => Tier::MateBelowAvg,
                        Strength::Unrated => Tier::MateUnrated,
                    }
                } else if via_repeat {
                    Tier::MateViaRepeatEntry
                } else if inconsistent {
                    Tier::MateInconsistent
                } else if self.reads.is_troublemaker(rid) {
                    Tier::Troublemaker
                } else {
                    match (strength, well_connected) {
                        (Strength::Strong, true) => Tier::StrongWellConnected,
                        (Strength::Strong, false) => Tier::Strong,
                        (Strength::Weak, true) => Tier::WeakWellConnected,
                        (Strength::Weak, false) => Tier::Weak,
                        (Strength::BelowAvg, _) => Tier::BelowAvg,
                        (Strength::Unrated, _) => Tier::Unrated,
                    }
                }
            }
            RepeatStatus::Neutral => {
                if support > 0 || via_repeat {
                    Tier::MateNeutral
                } else if inconsistent {
                    Tier::MateInconsistent
                } else if self.reads.is_troublemaker(rid) {
                    Tier::Troublemaker
                } else if strength == Strength::Strong {
                    Tier::StrongNeutral
                } else {
                    Tier::WeakNeutral
                }
            }
            RepeatStatus::Repeat => {
                if support > 0 {
                    Tier::MateRepeat
                } else if inconsistent {
                    Tier::RepeatMateInconsistent
                } else if well_connected {
                    Tier::RepeatWellConnected
                } else if strength == Strength::Strong {
                    Tier::RepeatStrong
                } else {
                    Tier::RepeatWeak
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeFlags, OverlapGraphBuilder};
    use crate::ledger::Placement;
    use crate::reads::{MateOrientation, ReadFlags, ReadInfo};

    struct Fixture {
        reads: ReadPool,
        graph: OverlapGraph,
        ledger: UsageLedger,
        bans: EdgeBans,
        blacklist: BlacklistWindow,
        deferred: FxHashSet<EdgeId>,
    }

    impl Fixture {
        fn new(reads: ReadPool, edges: &[(ReadId, ReadId, u32, EdgeFlags)]) -> Self {
            let mut b = OverlapGraphBuilder::new(reads.len());
            for (from, to, score, flags) in edges.iter() {
                b.add_pair(
                    OverlapEdge {
                        from: *from,
                        to: *to,
                        reversed: false,
                        score: *score,
                        ovlp_len: *score,
                        offset: 50,
                        flags: *flags,
                    },
                    100,
                    100,
                );
            }
            let graph = b.build();
            let n = reads.len();
            Fixture {
                bans: EdgeBans::new(graph.n_edges(), 0.5),
                reads,
                graph,
                ledger: UsageLedger::new(n),
                blacklist: BlacklistWindow::new(4, 64),
                deferred: FxHashSet::default(),
            }
        }

        fn place(&mut self, rid: ReadId, tier: Option<Tier>) {
            self.ledger.mark_used(
                rid,
                Placement {
                    contig: 0,
                    tier,
                    reversed: false,
                },
            );
        }

        fn classifier(&self, mode: AssemblyMode) -> Classifier<'_> {
            Classifier {
                reads: &self.reads,
                graph: &self.graph,
                ledger: &self.ledger,
                bans: &self.bans,
                blacklist: &self.blacklist,
                deferred: &self.deferred,
                contig: 0,
                mode,
                est_repeat_level_ceiling: 1,
            }
        }
    }

    fn pool(n: usize) -> ReadPool {
        let mut reads = ReadPool::from_reads(vec![ReadInfo::new(100); n]);
        for rid in 0..n as ReadId {
            if let Some(r) = reads.get(rid).cloned() {
                reads.set(
                    rid,
                    ReadInfo {
                        mate_orientation: MateOrientation::Any,
                        ..r
                    },
                );
            }
        }
        reads
    }

    const STRONG: EdgeFlags = EdgeFlags::STRONG_GOOD;

    #[test]
    fn unplaced_anchor_has_no_candidate() {
        let f = Fixture::new(pool(2), &[(0, 1, 80, STRONG)]);
        assert_eq!(f.classifier(AssemblyMode::Genome).classify(0), None);
    }

    #[test]
    fn mate_corroborated_edge_beats_repeat_edge() {
        // 0 placed; 1 reachable through a higher scoring repeat overlap,
        // 2 through a weaker non repeat overlap but with its mate 3 placed
        let mut reads = pool(4);
        reads.set_mates(2, 3);
        let mut f = Fixture::new(
            reads,
            &[
                (0, 1, 90, EdgeFlags::STRONG_GOOD | EdgeFlags::REPEAT),
                (0, 2, 40, EdgeFlags::WEAK_GOOD | EdgeFlags::NO_REPEAT),
            ],
        );
        f.place(0, None);
        f.place(3, Some(Tier::Strong));
        let c = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!(c.read, 2);
        assert_eq!(c.tier, Tier::MateWeak);
    }

    #[test]
    fn both_mates_strong_is_best() {
        let mut reads = pool(4);
        reads.set_mates(0, 2);
        reads.set_mates(1, 3);
        let mut f = Fixture::new(
            reads,
            &[(0, 1, 90, EdgeFlags::STRONG_GOOD | EdgeFlags::NO_REPEAT)],
        );
        f.place(0, None);
        f.place(2, Some(Tier::Strong));
        f.place(3, Some(Tier::Weak));
        let c = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!(c.tier, Tier::BothMatesStrong);
    }

    #[test]
    fn mate_entered_through_repeat_is_weaker_support() {
        let mut reads = pool(3);
        reads.set_mates(1, 2);
        let mut f = Fixture::new(
            reads,
            &[(0, 1, 90, EdgeFlags::STRONG_GOOD | EdgeFlags::NO_REPEAT)],
        );
        f.place(0, None);
        f.place(2, Some(Tier::RepeatStrong));
        let c = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!(c.tier, Tier::MateViaRepeatEntry);
    }

    #[test]
    fn mate_in_other_contig_is_inconsistent() {
        let mut reads = pool(3);
        reads.set_mates(1, 2);
        let mut f = Fixture::new(
            reads,
            &[(0, 1, 90, EdgeFlags::STRONG_GOOD | EdgeFlags::REPEAT)],
        );
        f.place(0, None);
        f.ledger.mark_used(
            2,
            Placement {
                contig: 7,
                tier: None,
                reversed: false,
            },
        );
        let c = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!(c.tier, Tier::RepeatMateInconsistent);
    }

    #[test]
    fn chimeric_and_spoilsport_are_deprioritised_not_dropped() {
        let mut reads = pool(3);
        reads.set(1, ReadInfo::new(100).with_flags(ReadFlags::CHIMERIC));
        reads.set(2, ReadInfo::new(100).with_flags(ReadFlags::SPOILSPORT));
        let mut f = Fixture::new(
            reads,
            &[
                (0, 1, 90, EdgeFlags::STRONG_GOOD | EdgeFlags::NO_REPEAT),
                (0, 2, 80, EdgeFlags::STRONG_GOOD | EdgeFlags::NO_REPEAT),
            ],
        );
        f.place(0, None);
        let c = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!((c.read, c.tier), (1, Tier::LikelyChimeric));
        f.place(1, Some(c.tier));
        let c = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!((c.read, c.tier), (2, Tier::MaybeSpoilsport));
    }

    #[test]
    fn chimeric_read_behind_repeat_ranks_below_clean_repeat() {
        let mut reads = pool(4);
        reads.set(1, ReadInfo::new(100).with_flags(ReadFlags::CHIMERIC));
        reads.set(3, ReadInfo::new(100).with_flags(ReadFlags::SPOILSPORT));
        let mut f = Fixture::new(
            reads,
            &[
                (0, 1, 30, EdgeFlags::WEAK_GOOD | EdgeFlags::REPEAT),
                (0, 2, 90, EdgeFlags::STRONG_GOOD | EdgeFlags::REPEAT),
                (0, 3, 95, EdgeFlags::STRONG_GOOD | EdgeFlags::REPEAT),
            ],
        );
        f.place(0, None);
        let c = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!((c.read, c.tier), (2, Tier::RepeatStrong));
        f.place(2, Some(c.tier));
        let c = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!((c.read, c.tier), (1, Tier::RepeatChimeric));
        f.place(1, Some(c.tier));
        let c = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!((c.read, c.tier), (3, Tier::RepeatSpoilsport));
    }

    #[test]
    fn banned_blacklisted_rail_and_deferred_edges_are_skipped() {
        let mut reads = pool(5);
        reads.set(4, ReadInfo::new(100).with_flags(ReadFlags::RAIL));
        let mut f = Fixture::new(
            reads,
            &[
                (0, 1, 90, STRONG),
                (0, 2, 80, STRONG),
                (0, 3, 70, STRONG),
                (0, 4, 99, STRONG),
            ],
        );
        f.place(0, None);
        let e01 = f.graph.edges_between(0, 1);
        for e in e01 {
            f.bans.ban(e);
        }
        f.blacklist.add(2);
        let c = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!(c.read, 3);
        f.deferred.insert(c.edge);
        assert_eq!(f.classifier(AssemblyMode::Genome).classify(0), None);
    }

    #[test]
    fn neutral_edge_uses_read_repeat_marks() {
        let mut reads = pool(3);
        reads.set(1, ReadInfo::new(100).with_flags(ReadFlags::REPEAT));
        reads.set(2, ReadInfo::new(100).with_flags(ReadFlags::NO_REPEAT_OVERLAP));
        let mut f = Fixture::new(
            reads,
            &[
                (0, 1, 90, EdgeFlags::STRONG_GOOD),
                (0, 2, 30, EdgeFlags::STRONG_GOOD),
            ],
        );
        f.place(0, None);
        let c = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!((c.read, c.tier), (2, Tier::Strong));
    }

    #[test]
    fn est_mode_uses_repeat_levels() {
        let mut reads = pool(3);
        reads.set(1, ReadInfo::new(100).with_repeat_level(5));
        reads.set(
            2,
            ReadInfo::new(100)
                .with_repeat_level(1)
                .with_flags(ReadFlags::WELL_CONNECTED),
        );
        let mut f = Fixture::new(
            reads,
            &[
                (0, 1, 90, EdgeFlags::STRONG_GOOD),
                (0, 2, 30, EdgeFlags::STRONG_GOOD),
            ],
        );
        f.place(0, None);
        let c = f.classifier(AssemblyMode::Est).classify(0).unwrap();
        // well connected variants are not used for fragment libraries
        assert_eq!((c.read, c.tier), (2, Tier::Strong));
        let g = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!(g.read, 1);
    }

    #[test]
    fn equal_tier_prefers_higher_score_then_lower_id() {
        let mut f = Fixture::new(
            pool(4),
            &[(0, 3, 50, STRONG), (0, 2, 50, STRONG), (0, 1, 20, STRONG)],
        );
        f.place(0, None);
        let c = f.classifier(AssemblyMode::Genome).classify(0).unwrap();
        assert_eq!((c.read, c.score), (2, 50));
    }
}
