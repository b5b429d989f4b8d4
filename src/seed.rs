// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

//
// pick the start read of the next contig. Unused reads are flood filled
// through good overlaps into clusters, the clusters are ranked by size, and
// the best connected read of each cluster becomes a seed. When no cluster
// is found, the read filter is relaxed stage by stage down to singletons.
//

use crate::config::{AssemblyMode, PathfinderConfig};
use crate::graph::{EdgeFlags, FilteredGraph, OverlapGraph};
use crate::ledger::UsageLedger;
use crate::reads::ReadPool;
use crate::ReadId;
use petgraph::visit::Bfs;
use rustc_hash::FxHashSet;
use std::cmp::Reverse;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SeedStage {
    /// not repeat flagged and well connected
    WellConnected,
    NonRepeat,
    AnyRepeat,
    /// fragment libraries: reads up to a repeat frequency level
    RepeatLevel(u8),
    Singleton,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SeedCandidate {
    pub read: ReadId,
    pub cluster_size: u32,
    pub connectivity: u32,
    pub stage: SeedStage,
}

#[derive(Debug, Clone)]
pub enum SeedCache {
    Stale,
    /// ranked worst first, consumed from the back
    Fresh(Vec<SeedCandidate>),
}

#[derive(Debug, Clone)]
pub struct SeedSelector {
    mode: AssemblyMode,
    cluster_cap: usize,
    cache_max: usize,
    cache: SeedCache,
    n_builds: usize,
}

impl SeedSelector {
    pub fn new(config: &PathfinderConfig) -> Self {
        SeedSelector {
            mode: config.mode,
            cluster_cap: config.seed_cluster_cap,
            cache_max: config.seed_cache_max,
            cache: SeedCache::Stale,
            n_builds: 0,
        }
    }

    pub fn invalidate(&mut self) {
        self.cache = SeedCache::Stale;
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self.cache, SeedCache::Fresh(_))
    }

    pub fn n_builds(&self) -> usize {
        self.n_builds
    }

    pub fn next_seed(
        &mut self,
        reads: &ReadPool,
        graph: &OverlapGraph,
        ledger: &UsageLedger,
    ) -> Option<SeedCandidate> {
        if let SeedCache::Fresh(seeds) = &mut self.cache {
            while let Some(s) = seeds.pop() {
                // the cluster may have been consumed by an earlier contig
                if admits(s.stage, reads, ledger, s.read) {
                    return Some(s);
                }
            }
        }

        let seeds = self.build(reads, graph, ledger);
        self.n_builds += 1;
        let mut seeds = match seeds {
            Some(s) => s,
            None => {
                self.cache = SeedCache::Stale;
                return None;
            }
        };
        let best = seeds.pop();
        self.cache = SeedCache::Fresh(seeds);
        best
    }

    fn stages(&self, reads: &ReadPool, ledger: &UsageLedger) -> Vec<SeedStage> {
        let mut stages = Vec::new();
        if self.mode.uses_repeat_levels() {
            let levels = (0..reads.len() as ReadId)
                .filter(|rid| admits(SeedStage::Singleton, reads, ledger, *rid))
                .map(|rid| reads.repeat_frequency_level(rid));
            let (mut min_level, mut max_level) = (u8::MAX, 0_u8);
            for l in levels {
                min_level = min_level.min(l);
                max_level = max_level.max(l);
            }
            if min_level <= max_level {
                for l in min_level..=max_level {
                    stages.push(SeedStage::RepeatLevel(l));
                }
            }
        } else {
            stages.push(SeedStage::WellConnected);
            stages.push(SeedStage::NonRepeat);
            stages.push(SeedStage::AnyRepeat);
        }
        stages.push(SeedStage::Singleton);
        stages
    }

    fn build(
        &self,
        reads: &ReadPool,
        graph: &OverlapGraph,
        ledger: &UsageLedger,
    ) -> Option<Vec<SeedCandidate>> {
        for stage in self.stages(reads, ledger) {
            let mut seeds = if stage == SeedStage::Singleton {
                (0..reads.len() as ReadId)
                    .filter(|rid| admits(stage, reads, ledger, *rid))
                    .map(|rid| SeedCandidate {
                        read: rid,
                        cluster_size: 0,
                        connectivity: graph.connectivity(rid),
                        stage,
                    })
                    .collect::<Vec<SeedCandidate>>()
            } else {
                self.clusters(stage, reads, graph, ledger)
            };
            if seeds.is_empty() {
                log::debug!("seed: no candidate at stage {:?}, relaxing", stage);
                continue;
            }
            seeds.sort_by_key(|s| (s.cluster_size, s.connectivity, Reverse(s.read)));
            if seeds.len() > self.cache_max {
                log::debug!(
                    "seed: keeping {} of {} candidates at stage {:?}",
                    self.cache_max,
                    seeds.len(),
                    stage
                );
                seeds.drain(..seeds.len() - self.cache_max);
            }
            log::debug!("seed: {} candidates at stage {:?}", seeds.len(), stage);
            return Some(seeds);
        }
        None
    }

    fn clusters(
        &self,
        stage: SeedStage,
        reads: &ReadPool,
        graph: &OverlapGraph,
        ledger: &UsageLedger,
    ) -> Vec<SeedCandidate> {
        let mask = if self.mode.uses_repeat_levels() {
            EdgeFlags::STRONG_GOOD | EdgeFlags::WEAK_GOOD
        } else {
            EdgeFlags::STRONG_GOOD
        };
        let keep = |rid: ReadId| admits(stage, reads, ledger, rid);
        let view = graph.filtered(mask, &keep);

        let mut visited = FxHashSet::<ReadId>::default();
        let mut seeds = Vec::<SeedCandidate>::new();
        let mut n_capped = 0_usize;
        for v in 0..reads.len() as ReadId {
            if visited.contains(&v) || !keep(v) {
                continue;
            }
            let (capped, members) = bfs_extend(v, view, self.cluster_cap);
            if capped {
                n_capped += 1;
            }
            let mut best = (v, graph.connectivity(v));
            for &w in members.iter() {
                visited.insert(w);
                let c = graph.connectivity(w);
                if c > best.1 || (c == best.1 && w < best.0) {
                    best = (w, c);
                }
            }
            if members.len() < 2 {
                continue;
            }
            seeds.push(SeedCandidate {
                read: best.0,
                cluster_size: members.len() as u32,
                connectivity: best.1,
                stage,
            });
        }
        if n_capped > 0 {
            log::warn!(
                "seed: {} clusters reached the size cap {} at stage {:?}",
                n_capped,
                self.cluster_cap,
                stage
            );
        }
        seeds
    }
}

fn admits(stage: SeedStage, reads: &ReadPool, ledger: &UsageLedger, rid: ReadId) -> bool {
    if !reads.contains(rid)
        || (rid as usize) >= ledger.len()
        || ledger.is_used(rid)
        || reads.is_rail(rid)
        || reads.usable_len(rid) == 0
    {
        return false;
    }
    match stage {
        SeedStage::WellConnected => !reads.is_repeat_flagged(rid) && reads.is_well_connected(rid),
        SeedStage::NonRepeat => !reads.is_repeat_flagged(rid),
        SeedStage::AnyRepeat | SeedStage::Singleton => true,
        SeedStage::RepeatLevel(l) => reads.repeat_frequency_level(rid) <= l,
    }
}

fn bfs_extend(v: ReadId, g: FilteredGraph, limit: usize) -> (bool, Vec<ReadId>) {
    //
    // bfs from v, stop once `limit` reads are collected
    //
    let mut bfs = Bfs::new(g, v);
    let mut nodes = Vec::<ReadId>::with_capacity(32);
    while let Some(n) = bfs.next(g) {
        nodes.push(n);
        if nodes.len() >= limit {
            return (true, nodes);
        }
    }
    (false, nodes)
}
