// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

//
// define the overlap edge and the overlap graph store. The store is immutable
// once built: all edges live in one arena addressed by `EdgeId`, and the edges
// out of a read form one contiguous slice sorted by descending score.
//

use crate::{EdgeId, ReadId};
use petgraph::visit::{GraphBase, GraphRef, IntoNeighbors, Visitable};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, Range};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeFlags(u8);
// bit field
// 0x01: strong good overlap
// 0x02: weak good overlap
// 0x04: below average good overlap
// 0x08: overlap is not in a repeat
// 0x10: overlap is in a repeat

impl EdgeFlags {
    pub const STRONG_GOOD: EdgeFlags = EdgeFlags(0x01);
    pub const WEAK_GOOD: EdgeFlags = EdgeFlags(0x02);
    pub const BELOW_AVG_GOOD: EdgeFlags = EdgeFlags(0x04);
    pub const NO_REPEAT: EdgeFlags = EdgeFlags(0x08);
    pub const REPEAT: EdgeFlags = EdgeFlags(0x10);

    const NAMES: [(&'static str, EdgeFlags); 5] = [
        ("strong", EdgeFlags::STRONG_GOOD),
        ("weak", EdgeFlags::WEAK_GOOD),
        ("below_avg", EdgeFlags::BELOW_AVG_GOOD),
        ("no_repeat", EdgeFlags::NO_REPEAT),
        ("repeat", EdgeFlags::REPEAT),
    ];

    pub fn empty() -> Self {
        EdgeFlags(0)
    }

    pub fn contains(&self, other: EdgeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(&self, other: EdgeFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn strength(&self) -> Strength {
        if self.contains(EdgeFlags::STRONG_GOOD) {
            Strength::Strong
        } else if self.contains(EdgeFlags::WEAK_GOOD) {
            Strength::Weak
        } else if self.contains(EdgeFlags::BELOW_AVG_GOOD) {
            Strength::BelowAvg
        } else {
            Strength::Unrated
        }
    }

    /// a repeat mark wins over a no-repeat mark
    pub fn repeat_status(&self) -> RepeatStatus {
        if self.contains(EdgeFlags::REPEAT) {
            RepeatStatus::Repeat
        } else if self.contains(EdgeFlags::NO_REPEAT) {
            RepeatStatus::NoRepeat
        } else {
            RepeatStatus::Neutral
        }
    }

    pub fn from_names(s: &str) -> Result<EdgeFlags, String> {
        let mut flags = EdgeFlags::empty();
        if s == "-" || s.is_empty() {
            return Ok(flags);
        }
        for name in s.split(',') {
            match EdgeFlags::NAMES.iter().find(|(n, _)| *n == name) {
                Some((_, f)) => flags = flags | *f,
                None => return Err(format!("unknown overlap flag '{}'", name)),
            }
        }
        Ok(flags)
    }
}

impl BitOr for EdgeFlags {
    type Output = EdgeFlags;
    fn bitor(self, rhs: EdgeFlags) -> EdgeFlags {
        EdgeFlags(self.0 | rhs.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strength {
    Strong,
    Weak,
    BelowAvg,
    Unrated,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RepeatStatus {
    NoRepeat,
    Neutral,
    Repeat,
}

/// a directed overlap `from -> to`; `offset` is the start of `to` in the
/// forward frame of `from`, and `to` lies in that frame reverse complemented
/// when `reversed` is set
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapEdge {
    pub from: ReadId,
    pub to: ReadId,
    pub reversed: bool,
    pub score: u32,
    pub ovlp_len: u32,
    pub offset: i32,
    pub flags: EdgeFlags,
}

impl OverlapEdge {
    /// the same overlap seen from the other read
    pub fn swap_rp(&self, len_from: u32, len_to: u32) -> OverlapEdge {
        let offset = if self.reversed {
            self.offset + len_to as i32 - len_from as i32
        } else {
            -self.offset
        };
        OverlapEdge {
            from: self.to,
            to: self.from,
            reversed: self.reversed,
            score: self.score,
            ovlp_len: self.ovlp_len,
            offset,
            flags: self.flags,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OverlapGraphBuilder {
    n_reads: usize,
    edges: Vec<OverlapEdge>,
}

impl OverlapGraphBuilder {
    pub fn new(n_reads: usize) -> Self {
        OverlapGraphBuilder {
            n_reads,
            edges: Vec::new(),
        }
    }

    pub fn add_edge(&mut self, edge: OverlapEdge) {
        self.edges.push(edge);
    }

    /// add an overlap together with its swapped counterpart
    pub fn add_pair(&mut self, edge: OverlapEdge, len_from: u32, len_to: u32) {
        self.edges.push(edge.swap_rp(len_from, len_to));
        self.edges.push(edge);
    }

    pub fn extend<I: IntoIterator<Item = OverlapEdge>>(&mut self, edges: I) {
        self.edges.extend(edges);
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn build(self) -> OverlapGraph {
        let mut edges = self.edges;
        edges.retain(|e| e.from != e.to);
        edges.par_sort_unstable_by(|a, b| {
            a.from
                .cmp(&b.from)
                .then(b.score.cmp(&a.score))
                .then(a.to.cmp(&b.to))
                .then(a.reversed.cmp(&b.reversed))
                .then(a.offset.cmp(&b.offset))
        });
        edges.dedup();

        let max_rid = edges
            .iter()
            .map(|e| e.from.max(e.to) as usize + 1)
            .max()
            .unwrap_or(0);
        let n_reads = self.n_reads.max(max_rid);

        // CSR offsets
        let mut offsets = vec![0_u32; n_reads + 1];
        for e in edges.iter() {
            offsets[e.from as usize + 1] += 1;
        }
        for i in 0..n_reads {
            offsets[i + 1] += offsets[i];
        }

        let strong_degree = (0..n_reads)
            .map(|rid| {
                edges[offsets[rid] as usize..offsets[rid + 1] as usize]
                    .iter()
                    .filter(|e| e.flags.contains(EdgeFlags::STRONG_GOOD))
                    .count() as u32
            })
            .collect();

        OverlapGraph {
            offsets,
            edges,
            strong_degree,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OverlapGraph {
    offsets: Vec<u32>,
    edges: Vec<OverlapEdge>,
    strong_degree: Vec<u32>,
}

impl OverlapGraph {
    pub fn n_reads(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, eid: EdgeId) -> &OverlapEdge {
        &self.edges[eid as usize]
    }

    pub fn edge_ids_of(&self, rid: ReadId) -> Range<EdgeId> {
        let rid = rid as usize;
        if rid >= self.n_reads() {
            return 0..0;
        }
        self.offsets[rid]..self.offsets[rid + 1]
    }

    /// edges out of `rid`, best score first
    pub fn edges_of(&self, rid: ReadId) -> &[OverlapEdge] {
        let r = self.edge_ids_of(rid);
        &self.edges[r.start as usize..r.end as usize]
    }

    pub fn iter_edges_of(&self, rid: ReadId) -> impl Iterator<Item = (EdgeId, &OverlapEdge)> {
        let r = self.edge_ids_of(rid);
        r.clone().zip(self.edges_of(rid).iter())
    }

    pub fn degree(&self, rid: ReadId) -> usize {
        let r = self.edge_ids_of(rid);
        (r.end - r.start) as usize
    }

    /// number of strong good overlaps, used as the connectivity of a read
    pub fn connectivity(&self, rid: ReadId) -> u32 {
        self.strong_degree.get(rid as usize).copied().unwrap_or(0)
    }

    /// every edge between the two reads, in both directions
    pub fn edges_between(&self, rid0: ReadId, rid1: ReadId) -> Vec<EdgeId> {
        let mut out = Vec::<EdgeId>::with_capacity(4);
        for (eid, e) in self.iter_edges_of(rid0) {
            if e.to == rid1 {
                out.push(eid);
            }
        }
        for (eid, e) in self.iter_edges_of(rid1) {
            if e.to == rid0 {
                out.push(eid);
            }
        }
        out
    }

    pub fn has_edge(&self, rid0: ReadId, rid1: ReadId) -> bool {
        self.edges_of(rid0).iter().any(|e| e.to == rid1)
    }

    /// a view with only the edges carrying `mask` between reads accepted by `keep`
    pub fn filtered<'a>(
        &'a self,
        mask: EdgeFlags,
        keep: &'a dyn Fn(ReadId) -> bool,
    ) -> FilteredGraph<'a> {
        FilteredGraph {
            graph: self,
            mask,
            keep,
        }
    }
}

/// borrowed sub-graph usable with the petgraph traversals
#[derive(Clone, Copy)]
pub struct FilteredGraph<'a> {
    graph: &'a OverlapGraph,
    mask: EdgeFlags,
    keep: &'a dyn Fn(ReadId) -> bool,
}

pub struct FilteredNeighbors<'a> {
    edges: std::slice::Iter<'a, OverlapEdge>,
    mask: EdgeFlags,
    keep: &'a dyn Fn(ReadId) -> bool,
}

impl<'a> Iterator for FilteredNeighbors<'a> {
    type Item = ReadId;

    fn next(&mut self) -> Option<ReadId> {
        while let Some(e) = self.edges.next() {
            if e.flags.intersects(self.mask) && (self.keep)(e.to) {
                return Some(e.to);
            }
        }
        None
    }
}

impl<'a> GraphBase for FilteredGraph<'a> {
    type NodeId = ReadId;
    type EdgeId = EdgeId;
}

impl<'a> GraphRef for FilteredGraph<'a> {}

impl<'a> IntoNeighbors for FilteredGraph<'a> {
    type Neighbors = FilteredNeighbors<'a>;

    fn neighbors(self, a: ReadId) -> FilteredNeighbors<'a> {
        FilteredNeighbors {
            edges: self.graph.edges_of(a).iter(),
            mask: self.mask,
            keep: self.keep,
        }
    }
}

impl<'a> Visitable for FilteredGraph<'a> {
    type Map = FxHashSet<ReadId>;

    fn visit_map(&self) -> FxHashSet<ReadId> {
        FxHashSet::default()
    }

    fn reset_map(&self, map: &mut FxHashSet<ReadId>) {
        map.clear();
    }
}
