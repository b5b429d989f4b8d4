// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

//!
//! Greedy contig construction over a precomputed read overlap graph.
//!
//! A contig is grown one read at a time. Every read already in the contig
//! proposes its best merge candidate, the candidates are ranked by a fixed
//! set of priority tiers, and the best one is handed to the contig for a
//! merge attempt. Failed attempts ban the overlap and temporarily blacklist
//! the read; the next contig starts from a seed in the best connected
//! region of what is left.
//!

pub mod bans;
pub mod blacklist;
pub mod classify;
pub mod config;
pub mod contig;
pub mod error;
pub mod graph;
pub mod io;
pub mod ledger;
pub mod pathfinder;
pub mod queue;
pub mod reads;
pub mod seed;
pub mod tier;
pub mod tiling;

pub type ReadId = u32;
pub type EdgeId = u32;
pub type ContigId = u32;

pub use config::{AssemblyMode, PathfinderConfig};
pub use contig::{ContigBuilder, MergeError, MergeOutcome, MergeRequest};
pub use error::FatalError;
pub use graph::{EdgeFlags, OverlapEdge, OverlapGraph, OverlapGraphBuilder};
pub use ledger::{ReadState, UsageLedger};
pub use pathfinder::{AbortReason, ContigResult, ContigStats, ContigStatus, Pathfinder};
pub use reads::{ReadFlags, ReadInfo, ReadPool};
pub use tier::Tier;
