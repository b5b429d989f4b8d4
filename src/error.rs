// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

use crate::{ContigId, EdgeId, ReadId};
use std::path::PathBuf;

/// collaborator contract violations; the pass has to stop, the contig and
/// the ledger no longer agree on who owns which read
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FatalError {
    #[error("merge of read {read} from read {anchor} through edge {edge} reported success, but read {read} is already placed")]
    DoublePlacement {
        anchor: ReadId,
        read: ReadId,
        edge: EdgeId,
    },
    #[error("read id {read} is outside the read pool ({context})")]
    UnknownRead { read: ReadId, context: &'static str },
    #[error("seed read {read} is already placed in contig {owner}")]
    SeedInUse { read: ReadId, owner: ContigId },
    #[error("contig {contig} has no members to resume from")]
    EmptyContig { contig: ContigId },
    #[error("contig {contig} reports read {read} as a member, but the ledger has it in contig {owner}")]
    ForeignMember {
        read: ReadId,
        contig: ContigId,
        owner: ContigId,
    },
}

/// errors from loading the driver inputs
#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{}:{line}: {message}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("overlap {rid0} -> {rid1} refers to a read missing from the read table")]
    DanglingRead { rid0: ReadId, rid1: ReadId },
    #[error("bad file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("no overlap files match {0}")]
    NoOverlapFiles(String),
}
