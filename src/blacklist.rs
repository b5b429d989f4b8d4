// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

use crate::ReadId;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
struct Batch {
    reads: Vec<ReadId>,
    merges_since_sealed: u32,
    sealed: bool,
}

/// reads that failed to merge recently; the failures between two successful
/// merges form one batch, released as a whole after `release_after` further
/// merges, or early once the window holds more than `max_entries` reads
#[derive(Debug, Clone)]
pub struct BlacklistWindow {
    batches: VecDeque<Batch>,
    members: FxHashSet<ReadId>,
    release_after: u32,
    max_entries: usize,
}

impl BlacklistWindow {
    pub fn new(release_after: u32, max_entries: usize) -> Self {
        BlacklistWindow {
            batches: VecDeque::new(),
            members: FxHashSet::default(),
            release_after,
            max_entries,
        }
    }

    pub fn contains(&self, rid: ReadId) -> bool {
        self.members.contains(&rid)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn n_batches(&self) -> usize {
        self.batches.len()
    }

    /// blacklist a read; returns the reads released because the window overflowed
    pub fn add(&mut self, rid: ReadId) -> Vec<ReadId> {
        if !self.members.insert(rid) {
            return Vec::new();
        }
        let open = match self.batches.back() {
            Some(b) => !b.sealed,
            None => false,
        };
        if !open {
            self.batches.push_back(Batch::default());
        }
        if let Some(b) = self.batches.back_mut() {
            b.reads.push(rid);
        }

        let mut released = Vec::new();
        while self.members.len() > self.max_entries {
            released.extend(self.release_oldest());
        }
        released
    }

    /// count a successful merge; returns the reads released by it
    pub fn on_merge(&mut self) -> Vec<ReadId> {
        for b in self.batches.iter_mut() {
            if b.sealed {
                b.merges_since_sealed += 1;
            } else {
                b.sealed = true;
            }
        }
        let mut released = Vec::new();
        while let Some(b) = self.batches.front() {
            if b.sealed && b.merges_since_sealed >= self.release_after {
                released.extend(self.release_oldest());
            } else {
                break;
            }
        }
        released
    }

    pub fn release_oldest(&mut self) -> Vec<ReadId> {
        match self.batches.pop_front() {
            Some(b) => {
                for rid in b.reads.iter() {
                    self.members.remove(rid);
                }
                b.reads
            }
            None => Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.batches.clear();
        self.members.clear();
    }
}
