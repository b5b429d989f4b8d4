// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

//
// plain text formats used by the driver
//
// read table:    R <rid> <usable_len> <seqtype> <mate|-> <mate_orientation> <flags|-> <repeat_level>
// overlap chunk: O <rid0> <rid1> <+|-> <score> <ovlp_len> <offset> <flags|->
// layout:        C <ctg_id> <n_reads> <status> <attempts> <rejections>
//                R <ctg_id> <rid> <+|-> <start> <end> <tier|seed>
//

use crate::contig::ContigBuilder;
use crate::error::InputError;
use crate::graph::{EdgeFlags, OverlapEdge, OverlapGraph, OverlapGraphBuilder};
use crate::ledger::UsageLedger;
use crate::pathfinder::ContigResult;
use crate::reads::{MateOrientation, ReadFlags, ReadInfo, ReadPool, SeqType};
use crate::ReadId;
use flate2::bufread::MultiGzDecoder;
use glob::glob;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// open a text file, transparently decompressing gzip input
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead + Send>, InputError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut magic = Vec::<u8>::with_capacity(2);
    reader.by_ref().take(2).read_to_end(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    if magic == [0x1F_u8, 0x8B_u8] {
        log::debug!("input file: {} detected as gz-compressed file", path.display());
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

fn field<T: FromStr>(fields: &[&str], idx: usize, name: &str) -> Result<T, String> {
    let s = fields
        .get(idx)
        .ok_or_else(|| format!("missing field {}", name))?;
    s.parse::<T>()
        .map_err(|_| format!("bad value '{}' for {}", s, name))
}

pub fn parse_read_record(line: &str) -> Result<(ReadId, ReadInfo), String> {
    let fields = line.split_whitespace().collect::<Vec<&str>>();
    if fields.len() != 8 || fields[0] != "R" {
        return Err(format!("expected 8 fields starting with R, got '{}'", line));
    }
    let rid: ReadId = field(&fields, 1, "rid")?;
    let usable_len: u32 = field(&fields, 2, "usable_len")?;
    let seq_type = SeqType::from_name(fields[3])
        .ok_or_else(|| format!("unknown sequencing type '{}'", fields[3]))?;
    let mate = match fields[4] {
        "-" => None,
        m => Some(
            m.parse::<ReadId>()
                .map_err(|_| format!("bad mate id '{}'", m))?,
        ),
    };
    let mate_orientation = MateOrientation::from_name(fields[5])
        .ok_or_else(|| format!("unknown mate orientation '{}'", fields[5]))?;
    let flags = ReadFlags::from_names(fields[6])?;
    let repeat_level: u8 = field(&fields, 7, "repeat_level")?;
    Ok((
        rid,
        ReadInfo {
            usable_len,
            seq_type,
            mate,
            mate_orientation,
            flags,
            repeat_level,
        },
    ))
}

pub fn read_read_table(path: &Path) -> Result<ReadPool, InputError> {
    let reader = open_text(path)?;
    let mut pool = ReadPool::new();
    let mut mates = Vec::<(usize, ReadId, ReadId)>::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (rid, info) = parse_read_record(line).map_err(|message| InputError::Malformed {
            path: path.to_path_buf(),
            line: idx + 1,
            message,
        })?;
        if let Some(m) = info.mate {
            mates.push((idx + 1, rid, m));
        }
        pool.set(rid, info);
    }
    for (line, rid, m) in mates {
        if !pool.contains(m) || m == rid {
            return Err(InputError::Malformed {
                path: path.to_path_buf(),
                line,
                message: format!("read {} names mate {} which is not in the table", rid, m),
            });
        }
    }
    Ok(pool)
}

pub fn parse_overlap_record(line: &str) -> Result<OverlapEdge, String> {
    let fields = line.split_whitespace().collect::<Vec<&str>>();
    if fields.len() != 8 || fields[0] != "O" {
        return Err(format!("expected 8 fields starting with O, got '{}'", line));
    }
    let reversed = match fields[3] {
        "+" | "0" => false,
        "-" | "1" => true,
        s => return Err(format!("bad strand '{}'", s)),
    };
    Ok(OverlapEdge {
        from: field(&fields, 1, "rid0")?,
        to: field(&fields, 2, "rid1")?,
        reversed,
        score: field(&fields, 4, "score")?,
        ovlp_len: field(&fields, 5, "ovlp_len")?,
        offset: field(&fields, 6, "offset")?,
        flags: EdgeFlags::from_names(fields[7])?,
    })
}

pub fn read_overlap_file(path: &Path) -> Result<Vec<OverlapEdge>, InputError> {
    let reader = open_text(path)?;
    let mut edges = Vec::<OverlapEdge>::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let e = parse_overlap_record(line).map_err(|message| InputError::Malformed {
            path: path.to_path_buf(),
            line: idx + 1,
            message,
        })?;
        edges.push(e);
    }
    Ok(edges)
}

/// load every overlap chunk matching `<prefix>*` and build the graph; each
/// record gives both directed edges
pub fn load_overlap_chunks(prefix: &str, reads: &ReadPool) -> Result<OverlapGraph, InputError> {
    let infile_pattern = [prefix, "*"].concat();
    let mut paths = Vec::<PathBuf>::new();
    for entry in glob(&infile_pattern)? {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => log::warn!("skip unreadable overlap chunk: {}", e),
        }
    }
    if paths.is_empty() {
        return Err(InputError::NoOverlapFiles(infile_pattern));
    }
    paths.sort();

    let chunks = paths
        .par_iter()
        .map(|p| read_overlap_file(p))
        .collect::<Result<Vec<Vec<OverlapEdge>>, InputError>>()?;

    let mut builder = OverlapGraphBuilder::new(reads.len());
    let mut n_records = 0_usize;
    for chunk in chunks {
        for e in chunk {
            if !reads.contains(e.from) || !reads.contains(e.to) {
                return Err(InputError::DanglingRead {
                    rid0: e.from,
                    rid1: e.to,
                });
            }
            builder.add_pair(e, reads.usable_len(e.from), reads.usable_len(e.to));
            n_records += 1;
        }
    }
    log::info!(
        "loaded {} overlap records from {} chunks",
        n_records,
        paths.len()
    );
    Ok(builder.build())
}

pub fn write_layout<W: Write, C: ContigBuilder>(
    out: &mut W,
    contigs: &[(ContigResult, C)],
    ledger: &UsageLedger,
) -> io::Result<()> {
    for (res, ctg) in contigs.iter() {
        writeln!(
            out,
            "C {} {} {} {} {}",
            res.contig_id,
            res.reads.len(),
            res.status,
            res.stats.attempts,
            res.stats.rejections
        )?;
        for &rid in res.reads.iter() {
            let placement = if (rid as usize) < ledger.len() {
                ledger.placement(rid)
            } else {
                None
            };
            let reversed = ctg
                .read_strand(rid)
                .or_else(|| placement.map(|p| p.reversed))
                .unwrap_or(false);
            let (bgn, end) = ctg.read_span(rid).unwrap_or((0, 0));
            let tier = match placement.and_then(|p| p.tier) {
                Some(t) => format!("{:?}", t),
                None => "seed".to_string(),
            };
            writeln!(
                out,
                "R {} {} {} {} {} {}",
                res.contig_id,
                rid,
                if reversed { '-' } else { '+' },
                bgn,
                end,
                tier
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_records() {
        let (rid, info) =
            parse_read_record("R 3 1200 pacbio 4 opposite repeat,rail 2").unwrap();
        assert_eq!(rid, 3);
        assert_eq!(info.usable_len, 1200);
        assert_eq!(info.mate, Some(4));
        assert!(info.flags.contains(ReadFlags::REPEAT | ReadFlags::RAIL));
        assert_eq!(info.repeat_level, 2);
        assert!(parse_read_record("R 3 1200 pacbio").is_err());
        assert!(parse_read_record("R 3 1200 nanopore - any - 0").is_err());

        let e = parse_overlap_record("O 1 2 - 80 90 -15 strong,no_repeat").unwrap();
        assert_eq!((e.from, e.to, e.reversed, e.offset), (1, 2, true, -15));
        assert_eq!(e.flags, EdgeFlags::STRONG_GOOD | EdgeFlags::NO_REPEAT);
        assert!(parse_overlap_record("O 1 2 x 80 90 0 -").is_err());
        assert!(parse_overlap_record("O 1 2 + 80 90 0 bogus").is_err());
    }
}
