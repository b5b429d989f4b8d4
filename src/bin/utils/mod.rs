// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

pub use libc::{getrusage, rusage, RUSAGE_SELF};
use pathfinder::{ContigResult, ContigStatus};
use sysinfo::SystemExt;

/// switches of the driver that are not part of the pathfinder config
#[derive(Copy, Clone, Debug)]
pub struct Parameters {
    pub nthreads: usize,
    pub tol: u32,
    pub max_reads: usize,
    pub refuse_bare_repeats: bool,
}

pub fn new_rusage() -> rusage {
    // all-zero is a valid rusage
    unsafe { std::mem::zeroed() }
}

pub fn log_resource(msg: &str, data: &mut rusage) -> (u64, u64, u64) {
    let _res = unsafe { getrusage(RUSAGE_SELF, data) };
    log::info!(
        "{} : (maxRSS, utime, stime): {} {} {}",
        msg,
        data.ru_maxrss,
        data.ru_utime.tv_sec,
        data.ru_stime.tv_sec
    );

    (
        data.ru_maxrss as u64,
        data.ru_utime.tv_sec as u64,
        data.ru_stime.tv_sec as u64,
    )
}

pub fn log_system_memory() {
    let system = sysinfo::System::new_all();
    log::info!("sys: total memory: {} KB", system.total_memory());
    log::info!("sys: used memory: {} KB", system.used_memory());
    log::info!("sys: total swap: {} KB", system.total_swap());
    log::info!("sys: used swap: {} KB", system.used_swap());
}

pub fn log_summary<'a, I: Iterator<Item = &'a ContigResult>>(results: I) {
    let mut n_ctg = 0_usize;
    let mut n_singleton = 0_usize;
    let mut n_aborted = 0_usize;
    let mut n_rejections = 0_u64;
    let mut largest: Option<(u32, usize)> = None;
    for r in results {
        n_ctg += 1;
        if r.reads.len() == 1 {
            n_singleton += 1;
        }
        if r.status != ContigStatus::Finished {
            n_aborted += 1;
        }
        n_rejections += r.stats.rejections;
        let larger = match largest {
            Some((_, n)) => r.reads.len() > n,
            None => true,
        };
        if larger {
            largest = Some((r.contig_id, r.reads.len()));
        }
    }
    log::info!(
        "summary: contigs: {}, singletons: {}, aborted: {}, rejected merges: {}",
        n_ctg,
        n_singleton,
        n_aborted,
        n_rejections
    );
    if let Some((ctg_id, n_reads)) = largest {
        log::info!("summary: largest contig: {} with {} reads", ctg_id, n_reads);
    }
}
