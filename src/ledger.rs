// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

use crate::tier::Tier;
use crate::{ContigId, ReadId};

/// where and how a read entered a contig
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Placement {
    pub contig: ContigId,
    /// `None` for the seed read of the contig
    pub tier: Option<Tier>,
    /// strand of the read in the contig
    pub reversed: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadState {
    Unused,
    Used(Placement),
}

/// per read usage state of one read pool; a read is used by at most one
/// contig and the ledger refuses a second placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageLedger {
    states: Vec<ReadState>,
    n_used: usize,
}

impl UsageLedger {
    pub fn new(n_reads: usize) -> Self {
        UsageLedger {
            states: vec![ReadState::Unused; n_reads],
            n_used: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn n_used(&self) -> usize {
        self.n_used
    }

    pub fn state(&self, rid: ReadId) -> ReadState {
        self.states[rid as usize]
    }

    pub fn is_used(&self, rid: ReadId) -> bool {
        matches!(self.states[rid as usize], ReadState::Used(_))
    }

    pub fn placement(&self, rid: ReadId) -> Option<Placement> {
        match self.states[rid as usize] {
            ReadState::Used(p) => Some(p),
            ReadState::Unused => None,
        }
    }

    /// returns false, leaving the ledger untouched, if the read is already used
    pub fn mark_used(&mut self, rid: ReadId, placement: Placement) -> bool {
        let s = &mut self.states[rid as usize];
        if let ReadState::Used(_) = s {
            return false;
        }
        *s = ReadState::Used(placement);
        self.n_used += 1;
        true
    }

    /// return a read to the pool, forgetting how it entered its contig
    pub fn release(&mut self, rid: ReadId) -> bool {
        let s = &mut self.states[rid as usize];
        if let ReadState::Unused = s {
            return false;
        }
        *s = ReadState::Unused;
        self.n_used -= 1;
        true
    }

    pub fn members_of(&self, contig: ContigId) -> impl Iterator<Item = ReadId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter_map(move |(i, s)| match s {
                ReadState::Used(p) if p.contig == contig => Some(i as ReadId),
                _ => None,
            })
    }

    pub fn unused_reads(&self) -> impl Iterator<Item = ReadId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == ReadState::Unused)
            .map(|(i, _)| i as ReadId)
    }

    pub fn reset(&mut self) {
        for s in self.states.iter_mut() {
            *s = ReadState::Unused;
        }
        self.n_used = 0;
    }
}
