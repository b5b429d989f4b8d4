// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

use crate::classify::Classification;
use crate::tier::Tier;
use crate::{EdgeId, ReadId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub tier: Tier,
    pub score: u32,
    /// the read to be merged
    pub read: ReadId,
    /// the placed read proposing the merge
    pub anchor: ReadId,
    pub edge: EdgeId,
    pub generation: u32,
    pub last_chance: bool,
}

impl Ord for Candidate {
    // max-heap order inside one tier: higher score, then lower read id
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then(other.read.cmp(&self.read))
            .then(other.anchor.cmp(&self.anchor))
            .then(other.edge.cmp(&self.edge))
            .then(self.generation.cmp(&other.generation))
            .then(self.last_chance.cmp(&other.last_chance))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// one heap per tier; every anchor read has at most one live candidate,
/// pushing a new one or retiring the anchor bumps its generation and the
/// older entry is dropped when it surfaces
#[derive(Debug, Clone)]
pub struct CandidateQueues {
    heaps: Vec<BinaryHeap<Candidate>>,
    generation: Vec<u32>,
}

impl CandidateQueues {
    pub fn new(n_reads: usize) -> Self {
        CandidateQueues {
            heaps: (0..Tier::COUNT).map(|_| BinaryHeap::new()).collect(),
            generation: vec![0; n_reads],
        }
    }

    fn bump(&mut self, anchor: ReadId) -> u32 {
        let g = &mut self.generation[anchor as usize];
        *g = g.wrapping_add(1);
        *g
    }

    pub fn push(&mut self, anchor: ReadId, c: Classification) {
        let generation = self.bump(anchor);
        self.heaps[c.tier.index()].push(Candidate {
            tier: c.tier,
            score: c.score,
            read: c.read,
            anchor,
            edge: c.edge,
            generation,
            last_chance: false,
        });
    }

    /// park an edge in the last chance tier; it does not replace the anchor's candidate
    pub fn push_last_chance(&mut self, anchor: ReadId, read: ReadId, edge: EdgeId, score: u32) {
        self.heaps[Tier::LastChance.index()].push(Candidate {
            tier: Tier::LastChance,
            score,
            read,
            anchor,
            edge,
            generation: 0,
            last_chance: true,
        });
    }

    /// drop the outstanding candidate of an anchor
    pub fn retire(&mut self, anchor: ReadId) {
        self.bump(anchor);
    }

    fn is_live(&self, c: &Candidate) -> bool {
        c.last_chance || self.generation[c.anchor as usize] == c.generation
    }

    /// best live candidate over all tiers
    pub fn pop(&mut self) -> Option<Candidate> {
        for t in 0..self.heaps.len() {
            while let Some(c) = self.heaps[t].pop() {
                if self.is_live(&c) {
                    if !c.last_chance {
                        // consumed: the anchor has nothing outstanding until re-classified
                        self.bump(c.anchor);
                    }
                    return Some(c);
                }
            }
        }
        None
    }

    /// live candidates, best first
    pub fn snapshot(&self) -> Vec<Candidate> {
        let mut out = Vec::new();
        for h in self.heaps.iter() {
            let mut live: Vec<Candidate> = h.iter().filter(|c| self.is_live(c)).copied().collect();
            live.sort_by(|a, b| b.cmp(a));
            out.extend(live);
        }
        out
    }

    pub fn n_live(&self) -> usize {
        self.heaps
            .iter()
            .map(|h| h.iter().filter(|c| self.is_live(c)).count())
            .sum()
    }

    pub fn clear(&mut self) {
        for h in self.heaps.iter_mut() {
            h.clear();
        }
        for g in self.generation.iter_mut() {
            *g = g.wrapping_add(1);
        }
    }
}
