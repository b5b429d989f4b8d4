// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

//
// per read information: usable length, technology, template partner and the
// repeat / quality attributes precomputed by the k-mer classifier. All of it
// is read-only during contig construction.
//

use crate::ReadId;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeqType {
    Sanger,
    Illumina,
    IonTorrent,
    PacBio,
    Text,
}

impl SeqType {
    pub fn from_name(name: &str) -> Option<SeqType> {
        match name.to_ascii_lowercase().as_str() {
            "sanger" => Some(SeqType::Sanger),
            "illumina" | "solexa" => Some(SeqType::Illumina),
            "iontorrent" | "ion" => Some(SeqType::IonTorrent),
            "pacbio" => Some(SeqType::PacBio),
            "text" => Some(SeqType::Text),
            _ => None,
        }
    }
}

/// expected relative strand of two template partners placed in one contig
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MateOrientation {
    Opposite,
    Same,
    Any,
}

impl MateOrientation {
    pub fn from_name(name: &str) -> Option<MateOrientation> {
        match name {
            "opposite" | "FR" | "RF" => Some(MateOrientation::Opposite),
            "same" | "FF" | "RR" => Some(MateOrientation::Same),
            "any" | "-" => Some(MateOrientation::Any),
            _ => None,
        }
    }

    pub fn accepts(&self, reversed0: bool, reversed1: bool) -> bool {
        match self {
            MateOrientation::Opposite => reversed0 != reversed1,
            MateOrientation::Same => reversed0 == reversed1,
            MateOrientation::Any => true,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReadFlags(u16);
// bit field
// 0x001: the read is in a repeat
// 0x002: the read is well connected by strong overlaps
// 0x004: none of the read's overlaps are in a repeat
// 0x008: at least one of the read's overlaps is in a repeat
// 0x010: troublemaker, frequently involved in failed merges in earlier passes
// 0x020: likely chimeric or not correctable
// 0x040: may be a spoilsport (breaks otherwise good contigs)
// 0x080: rail / backbone read, never placed as a new read

impl ReadFlags {
    pub const REPEAT: ReadFlags = ReadFlags(0x001);
    pub const WELL_CONNECTED: ReadFlags = ReadFlags(0x002);
    pub const NO_REPEAT_OVERLAP: ReadFlags = ReadFlags(0x004);
    pub const ANY_REPEAT_OVERLAP: ReadFlags = ReadFlags(0x008);
    pub const TROUBLEMAKER: ReadFlags = ReadFlags(0x010);
    pub const CHIMERIC: ReadFlags = ReadFlags(0x020);
    pub const SPOILSPORT: ReadFlags = ReadFlags(0x040);
    pub const RAIL: ReadFlags = ReadFlags(0x080);

    const NAMES: [(&'static str, ReadFlags); 8] = [
        ("repeat", ReadFlags::REPEAT),
        ("well_connected", ReadFlags::WELL_CONNECTED),
        ("no_repeat_ovl", ReadFlags::NO_REPEAT_OVERLAP),
        ("any_repeat_ovl", ReadFlags::ANY_REPEAT_OVERLAP),
        ("troublemaker", ReadFlags::TROUBLEMAKER),
        ("chimeric", ReadFlags::CHIMERIC),
        ("spoilsport", ReadFlags::SPOILSPORT),
        ("rail", ReadFlags::RAIL),
    ];

    pub fn empty() -> Self {
        ReadFlags(0)
    }

    pub fn contains(&self, other: ReadFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ReadFlags) {
        self.0 |= other.0;
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// parse a comma separated list of flag names, `-` for none
    pub fn from_names(s: &str) -> Result<ReadFlags, String> {
        let mut flags = ReadFlags::empty();
        if s == "-" || s.is_empty() {
            return Ok(flags);
        }
        for name in s.split(',') {
            match ReadFlags::NAMES.iter().find(|(n, _)| *n == name) {
                Some((_, f)) => flags.insert(*f),
                None => return Err(format!("unknown read flag '{}'", name)),
            }
        }
        Ok(flags)
    }
}

impl BitOr for ReadFlags {
    type Output = ReadFlags;
    fn bitor(self, rhs: ReadFlags) -> ReadFlags {
        ReadFlags(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadInfo {
    pub usable_len: u32,
    pub seq_type: SeqType,
    pub mate: Option<ReadId>,
    pub mate_orientation: MateOrientation,
    pub flags: ReadFlags,
    pub repeat_level: u8,
}

impl ReadInfo {
    pub fn new(usable_len: u32) -> Self {
        ReadInfo {
            usable_len,
            seq_type: SeqType::Illumina,
            mate: None,
            mate_orientation: MateOrientation::Opposite,
            flags: ReadFlags::empty(),
            repeat_level: 0,
        }
    }

    pub fn with_flags(mut self, flags: ReadFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_mate(mut self, mate: ReadId) -> Self {
        self.mate = Some(mate);
        self
    }

    pub fn with_repeat_level(mut self, level: u8) -> Self {
        self.repeat_level = level;
        self
    }
}

/// all reads of one assembly pass, indexed by read id
#[derive(Debug, Clone, Default)]
pub struct ReadPool {
    reads: Vec<ReadInfo>,
}

impl ReadPool {
    pub fn new() -> Self {
        ReadPool { reads: Vec::new() }
    }

    pub fn from_reads(reads: Vec<ReadInfo>) -> Self {
        ReadPool { reads }
    }

    pub fn push(&mut self, info: ReadInfo) -> ReadId {
        self.reads.push(info);
        (self.reads.len() - 1) as ReadId
    }

    /// place a read at an explicit id, padding any gap with zero length reads
    pub fn set(&mut self, rid: ReadId, info: ReadInfo) {
        let idx = rid as usize;
        if idx >= self.reads.len() {
            self.reads.resize(idx + 1, ReadInfo::new(0));
        }
        self.reads[idx] = info;
    }

    /// pair two reads as template partners
    pub fn set_mates(&mut self, rid0: ReadId, rid1: ReadId) {
        self.reads[rid0 as usize].mate = Some(rid1);
        self.reads[rid1 as usize].mate = Some(rid0);
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    pub fn contains(&self, rid: ReadId) -> bool {
        (rid as usize) < self.reads.len()
    }

    pub fn get(&self, rid: ReadId) -> Option<&ReadInfo> {
        self.reads.get(rid as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReadId, &ReadInfo)> {
        self.reads
            .iter()
            .enumerate()
            .map(|(i, r)| (i as ReadId, r))
    }

    fn flag(&self, rid: ReadId, f: ReadFlags) -> bool {
        self.reads[rid as usize].flags.contains(f)
    }

    pub fn usable_len(&self, rid: ReadId) -> u32 {
        self.reads[rid as usize].usable_len
    }

    pub fn mate(&self, rid: ReadId) -> Option<ReadId> {
        self.reads[rid as usize].mate
    }

    pub fn is_repeat_flagged(&self, rid: ReadId) -> bool {
        self.flag(rid, ReadFlags::REPEAT)
    }

    pub fn is_well_connected(&self, rid: ReadId) -> bool {
        self.flag(rid, ReadFlags::WELL_CONNECTED)
    }

    pub fn has_no_repeat_overlap(&self, rid: ReadId) -> bool {
        self.flag(rid, ReadFlags::NO_REPEAT_OVERLAP)
    }

    pub fn has_any_repeat_overlap(&self, rid: ReadId) -> bool {
        self.flag(rid, ReadFlags::ANY_REPEAT_OVERLAP)
    }

    pub fn repeat_frequency_level(&self, rid: ReadId) -> u8 {
        self.reads[rid as usize].repeat_level
    }

    pub fn is_troublemaker(&self, rid: ReadId) -> bool {
        self.flag(rid, ReadFlags::TROUBLEMAKER)
    }

    pub fn is_likely_chimeric(&self, rid: ReadId) -> bool {
        self.flag(rid, ReadFlags::CHIMERIC)
    }

    pub fn is_maybe_spoilsport(&self, rid: ReadId) -> bool {
        self.flag(rid, ReadFlags::SPOILSPORT)
    }

    pub fn is_rail(&self, rid: ReadId) -> bool {
        self.flag(rid, ReadFlags::RAIL)
    }
}
