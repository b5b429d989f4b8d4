// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

//
// a contig that only tiles reads: each member gets a start coordinate and a
// strand derived from the overlap offsets, and a merge is accepted when the
// new read agrees with every member it overlaps. No consensus is computed.
//

use crate::contig::{ContigBuilder, MergeError, MergeOutcome, MergeRequest};
use crate::graph::{OverlapEdge, OverlapGraph};
use crate::reads::ReadPool;
use crate::tier::Tier;
use crate::ReadId;
use rustc_hash::FxHashMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TilePlacement {
    pub read: ReadId,
    pub start: u32,
    pub end: u32,
    pub reversed: bool,
}

pub struct TilingContig<'a> {
    graph: &'a OverlapGraph,
    reads: &'a ReadPool,
    tolerance: u32,
    max_reads: usize,
    refuse_bare_repeats: bool,
    // raw start (may be negative) and strand
    tiles: FxHashMap<ReadId, (i64, bool)>,
    order: Vec<ReadId>,
    bgn: i64,
    end: i64,
}

impl<'a> TilingContig<'a> {
    pub fn new(graph: &'a OverlapGraph, reads: &'a ReadPool) -> Self {
        TilingContig {
            graph,
            reads,
            tolerance: 20,
            max_reads: usize::MAX,
            refuse_bare_repeats: false,
            tiles: FxHashMap::default(),
            order: Vec::new(),
            bgn: 0,
            end: 0,
        }
    }

    pub fn with_tolerance(mut self, tolerance: u32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_reads(mut self, max_reads: usize) -> Self {
        self.max_reads = max_reads;
        self
    }

    pub fn refusing_bare_repeats(mut self, refuse: bool) -> Self {
        self.refuse_bare_repeats = refuse;
        self
    }

    fn read_len(&self, rid: ReadId) -> i64 {
        self.reads.usable_len(rid) as i64
    }

    /// where `e.to` lands given `e.from` at `start` on `reversed`
    fn place(&self, start: i64, reversed: bool, e: &OverlapEdge) -> (i64, bool) {
        let (la, lb) = (self.read_len(e.from), self.read_len(e.to));
        let d = e.offset as i64;
        if reversed {
            (start + la - d - lb, !e.reversed)
        } else {
            (start + d, e.reversed)
        }
    }

    fn disagreeing_members(&self, rid: ReadId, start: i64, reversed: bool) -> Vec<ReadId> {
        let mut verdict = FxHashMap::<ReadId, bool>::default();
        for e in self.graph.edges_of(rid) {
            let (m_start, m_rev) = match self.tiles.get(&e.to) {
                Some(t) => *t,
                None => continue,
            };
            let (exp_start, exp_rev) = self.place(start, reversed, e);
            let agree = exp_rev == m_rev && (exp_start - m_start).abs() <= self.tolerance as i64;
            let v = verdict.entry(e.to).or_insert(false);
            *v |= agree;
        }
        let mut out = verdict
            .into_iter()
            .filter(|(_, agree)| !agree)
            .map(|(m, _)| m)
            .collect::<Vec<ReadId>>();
        out.sort_unstable();
        out
    }

    fn update_bounds(&mut self) {
        let mut bgn = i64::MAX;
        let mut end = i64::MIN;
        for (rid, (s, _)) in self.tiles.iter() {
            bgn = bgn.min(*s);
            end = end.max(*s + self.read_len(*rid));
        }
        if self.tiles.is_empty() {
            bgn = 0;
            end = 0;
        }
        self.bgn = bgn;
        self.end = end;
    }

    /// members in placement order with coordinates relative to the contig start
    pub fn placements(&self) -> Vec<TilePlacement> {
        self.order
            .iter()
            .filter_map(|rid| {
                let (s, r) = self.tiles.get(rid)?;
                let start = (*s - self.bgn) as u32;
                Some(TilePlacement {
                    read: *rid,
                    start,
                    end: start + self.read_len(*rid) as u32,
                    reversed: *r,
                })
            })
            .collect()
    }

    /// drop members, as an external trimming step would
    pub fn trim_reads(&mut self, rids: &[ReadId]) -> usize {
        let mut removed = 0;
        for rid in rids {
            if self.tiles.remove(rid).is_some() {
                removed += 1;
            }
        }
        let tiles = &self.tiles;
        self.order.retain(|rid| tiles.contains_key(rid));
        self.update_bounds();
        removed
    }
}

fn is_bare_repeat(tier: Tier) -> bool {
    matches!(
        tier,
        Tier::RepeatWellConnected
            | Tier::RepeatStrong
            | Tier::RepeatWeak
            | Tier::RepeatMateInconsistent
            | Tier::RepeatChimeric
            | Tier::RepeatSpoilsport
    )
}

impl<'a> ContigBuilder for TilingContig<'a> {
    fn start(&mut self, seed: ReadId) {
        self.tiles.clear();
        self.order.clear();
        self.tiles.insert(seed, (0, false));
        self.order.push(seed);
        self.update_bounds();
    }

    fn try_merge_read(&mut self, req: &MergeRequest) -> MergeOutcome {
        let (a_start, a_rev) = match self.tiles.get(&req.anchor) {
            Some(t) => *t,
            None => return MergeOutcome::rejected(MergeError::InvalidStructure, Vec::new()),
        };
        if self.tiles.contains_key(&req.read) {
            return MergeOutcome::rejected(MergeError::InvalidStructure, Vec::new());
        }
        if self.refuse_bare_repeats && is_bare_repeat(req.tier) {
            return MergeOutcome::refused();
        }
        if self.tiles.len() >= self.max_reads {
            return MergeOutcome::rejected(MergeError::InternalLimit, Vec::new());
        }

        let (start, reversed) = self.place(a_start, a_rev, req.edge);
        let affected = self.disagreeing_members(req.read, start, reversed);
        if !affected.is_empty() {
            return MergeOutcome::rejected(MergeError::InvalidStructure, affected);
        }
        self.tiles.insert(req.read, (start, reversed));
        self.order.push(req.read);
        self.bgn = self.bgn.min(start);
        self.end = self.end.max(start + self.read_len(req.read));
        MergeOutcome::merged()
    }

    fn member_read_ids(&self) -> Vec<ReadId> {
        self.order.clone()
    }

    fn read_span(&self, rid: ReadId) -> Option<(u32, u32)> {
        let (s, _) = self.tiles.get(&rid)?;
        let start = (*s - self.bgn) as u32;
        Some((start, start + self.read_len(rid) as u32))
    }

    fn read_strand(&self, rid: ReadId) -> Option<bool> {
        self.tiles.get(&rid).map(|t| t.1)
    }

    fn len(&self) -> u32 {
        (self.end - self.bgn) as u32
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeFlags, OverlapGraphBuilder};
    use crate::reads::ReadInfo;

    fn edge(from: ReadId, to: ReadId, reversed: bool, offset: i32) -> OverlapEdge {
        OverlapEdge {
            from,
            to,
            reversed,
            score: 50,
            ovlp_len: 50,
            offset,
            flags: EdgeFlags::STRONG_GOOD,
        }
    }

    fn req<'e>(anchor: ReadId, e: &'e OverlapEdge, tier: Tier) -> MergeRequest<'e> {
        MergeRequest {
            anchor,
            read: e.to,
            edge_id: 0,
            edge: e,
            reversed: e.reversed,
            tier,
        }
    }

    #[test]
    fn tiles_forward_and_reversed_reads() {
        let reads = ReadPool::from_reads(vec![ReadInfo::new(100); 3]);
        let mut b = OverlapGraphBuilder::new(3);
        b.add_pair(edge(0, 1, false, 60), 100, 100);
        b.add_pair(edge(1, 2, true, 50), 100, 100);
        let g = b.build();
        let mut ctg = TilingContig::new(&g, &reads);
        ctg.start(0);
        let e01 = g.edges_of(0)[0];
        assert!(ctg.try_merge_read(&req(0, &e01, Tier::Strong)).is_merged());
        let e12 = *g.edges_of(1).iter().find(|e| e.to == 2).unwrap();
        assert!(ctg.try_merge_read(&req(1, &e12, Tier::Strong)).is_merged());
        assert_eq!(ctg.read_span(1), Some((60, 160)));
        assert_eq!(ctg.read_span(2), Some((110, 210)));
        assert_eq!(ctg.read_strand(2), Some(true));
        assert_eq!(ctg.len(), 210);

        // placing read 1 again from read 2 lands where it already is
        let e21 = *g.edges_of(2).iter().find(|e| e.to == 1).unwrap();
        let (s, r) = ctg.place(110, true, &e21);
        assert_eq!((s, r), (60, false));
    }

    #[test]
    fn inconsistent_member_is_reported() {
        // 0 -> 1 at 60, 1 -> 2 at 60, but 0 -> 2 claims 40
        let reads = ReadPool::from_reads(vec![ReadInfo::new(100); 3]);
        let mut b = OverlapGraphBuilder::new(3);
        b.add_pair(edge(0, 1, false, 60), 100, 100);
        b.add_pair(edge(1, 2, false, 60), 100, 100);
        b.add_pair(edge(0, 2, false, 40), 100, 100);
        let g = b.build();
        let mut ctg = TilingContig::new(&g, &reads).with_tolerance(5);
        ctg.start(0);
        let e01 = *g.edges_of(0).iter().find(|e| e.to == 1).unwrap();
        assert!(ctg.try_merge_read(&req(0, &e01, Tier::Strong)).is_merged());
        let e12 = *g.edges_of(1).iter().find(|e| e.to == 2).unwrap();
        let out = ctg.try_merge_read(&req(1, &e12, Tier::Strong));
        assert_eq!(out.result, Err(MergeError::InvalidStructure));
        assert_eq!(out.affected, vec![0]);
        assert_eq!(ctg.member_read_ids(), vec![0, 1]);
    }

    #[test]
    fn limits_refusals_and_trimming() {
        let reads = ReadPool::from_reads(vec![ReadInfo::new(100); 3]);
        let mut b = OverlapGraphBuilder::new(3);
        b.add_pair(edge(0, 1, false, 60), 100, 100);
        b.add_pair(edge(0, 2, false, -50), 100, 100);
        let g = b.build();
        let mut ctg = TilingContig::new(&g, &reads)
            .with_max_reads(2)
            .refusing_bare_repeats(true);
        ctg.start(0);
        let e01 = *g.edges_of(0).iter().find(|e| e.to == 1).unwrap();
        let e02 = *g.edges_of(0).iter().find(|e| e.to == 2).unwrap();
        assert_eq!(
            ctg.try_merge_read(&req(0, &e01, Tier::RepeatStrong)),
            MergeOutcome::refused()
        );
        assert!(ctg.try_merge_read(&req(0, &e01, Tier::LastChance)).is_merged());
        let out = ctg.try_merge_read(&req(0, &e02, Tier::Strong));
        assert_eq!(out.result, Err(MergeError::InternalLimit));

        assert_eq!(ctg.trim_reads(&[0]), 1);
        assert_eq!(ctg.member_read_ids(), vec![1]);
        assert_eq!(ctg.read_span(1), Some((0, 100)));
        assert_eq!(ctg.placements()[0].read, 1);
    }
}
