// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

use crate::graph::OverlapEdge;
use crate::tier::Tier;
use crate::{EdgeId, ReadId};

/// one merge attempt: add `read` next to the placed `anchor` through `edge`
#[derive(Debug, Copy, Clone)]
pub struct MergeRequest<'a> {
    pub anchor: ReadId,
    pub read: ReadId,
    pub edge_id: EdgeId,
    pub edge: &'a OverlapEdge,
    /// strand of the new read in the contig
    pub reversed: bool,
    pub tier: Tier,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// the alignment against the contig is outside the tolerance
    SequenceMismatch,
    /// the read disagrees with the placement of other members
    InvalidStructure,
    InternalLimit,
    /// the contig declines the merge on heuristic grounds; not an alignment failure
    Refused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub result: Result<(), MergeError>,
    /// other members that contributed to a rejection
    pub affected: Vec<ReadId>,
}

impl MergeOutcome {
    pub fn merged() -> Self {
        MergeOutcome {
            result: Ok(()),
            affected: Vec::new(),
        }
    }

    pub fn rejected(error: MergeError, affected: Vec<ReadId>) -> Self {
        MergeOutcome {
            result: Err(error),
            affected,
        }
    }

    pub fn refused() -> Self {
        MergeOutcome::rejected(MergeError::Refused, Vec::new())
    }

    pub fn is_merged(&self) -> bool {
        self.result.is_ok()
    }
}

/// the contig under construction; it owns the layout, the scheduler only
/// starts it, tries one merge at a time and asks for the members
pub trait ContigBuilder {
    fn start(&mut self, seed: ReadId);

    /// must either add the read completely or leave the contig unchanged
    fn try_merge_read(&mut self, req: &MergeRequest) -> MergeOutcome;

    fn member_read_ids(&self) -> Vec<ReadId>;

    /// `[start, end)` of a member on the contig
    fn read_span(&self, _rid: ReadId) -> Option<(u32, u32)> {
        None
    }

    fn read_strand(&self, _rid: ReadId) -> Option<bool> {
        None
    }

    /// contig length in bases, when the builder tracks coordinates
    fn len(&self) -> u32 {
        0
    }

    fn is_empty(&self) -> bool {
        self.member_read_ids().is_empty()
    }
}
