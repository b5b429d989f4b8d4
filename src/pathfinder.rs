// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

//
// the contig growing loop. One contig at a time: place a seed, let every
// placed read propose its best candidate, try the best candidate of all,
// then react. A merge adds a read and new proposals, a rejection bans the
// overlaps and blacklists the read, a refusal parks the overlap in the last
// chance tier once. The contig is done when nothing is proposed and the
// blacklist has drained.
//

use crate::bans::EdgeBans;
use crate::blacklist::BlacklistWindow;
use crate::classify::Classifier;
use crate::config::{ConfigError, PathfinderConfig};
use crate::contig::{ContigBuilder, MergeError, MergeRequest};
use crate::error::FatalError;
use crate::graph::OverlapGraph;
use crate::ledger::{Placement, UsageLedger};
use crate::queue::{Candidate, CandidateQueues};
use crate::reads::ReadPool;
use crate::seed::SeedSelector;
use crate::{ContigId, EdgeId, ReadId};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    AttemptBudget,
    TimeBudget,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContigStatus {
    Finished,
    /// budget ran out; the contig is kept as it is
    Aborted(AbortReason),
}

impl fmt::Display for ContigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContigStatus::Finished => write!(f, "finished"),
            ContigStatus::Aborted(AbortReason::AttemptBudget) => write!(f, "aborted_attempts"),
            ContigStatus::Aborted(AbortReason::TimeBudget) => write!(f, "aborted_time"),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContigStats {
    pub attempts: u64,
    pub merges: u64,
    pub rejections: u64,
    pub refusals: u64,
    pub last_chance_attempts: u64,
    pub stale_pops: u64,
    pub blacklist_releases: u64,
    pub banned_edges: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContigResult {
    pub contig_id: ContigId,
    pub seed: ReadId,
    /// members in the order the contig reports them
    pub reads: Vec<ReadId>,
    pub status: ContigStatus,
    pub stats: ContigStats,
}

pub struct Pathfinder<'a> {
    reads: &'a ReadPool,
    graph: &'a OverlapGraph,
    config: PathfinderConfig,
    bans: EdgeBans,
    queues: CandidateQueues,
    blacklist: BlacklistWindow,
    seeds: SeedSelector,
    // edges that got their one last chance in this contig
    deferred: FxHashSet<EdgeId>,
    // last chance entries whose read sits in the blacklist
    parked: Vec<Candidate>,
    next_contig_id: ContigId,
    current: Option<(ContigId, ReadId)>,
}

impl<'a> Pathfinder<'a> {
    pub fn new(
        reads: &'a ReadPool,
        graph: &'a OverlapGraph,
        config: PathfinderConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Pathfinder {
            reads,
            graph,
            bans: EdgeBans::new(graph.n_edges(), config.ban_bulk_reset_fraction),
            queues: CandidateQueues::new(reads.len()),
            blacklist: BlacklistWindow::new(
                config.blacklist_release_after,
                config.blacklist_max_entries,
            ),
            seeds: SeedSelector::new(&config),
            deferred: FxHashSet::default(),
            parked: Vec::new(),
            next_contig_id: 0,
            current: None,
            config,
        })
    }

    /// a ledger sized for the read pool of this pathfinder
    pub fn new_ledger(&self) -> UsageLedger {
        UsageLedger::new(self.reads.len())
    }

    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    pub fn bans(&self) -> &EdgeBans {
        &self.bans
    }

    pub fn queues(&self) -> &CandidateQueues {
        &self.queues
    }

    pub fn blacklist(&self) -> &BlacklistWindow {
        &self.blacklist
    }

    pub fn current_contig(&self) -> Option<ContigId> {
        self.current.map(|c| c.0)
    }

    /// forget bans, candidates and seeds; the ledger belongs to the caller
    pub fn begin_pass(&mut self) {
        self.bans.reset();
        self.queues.clear();
        self.blacklist.clear();
        self.deferred.clear();
        self.parked.clear();
        self.seeds.invalidate();
        self.current = None;
        log::info!("pathfinder: new pass over {} reads", self.reads.len());
    }

    pub fn next_seed(&mut self, ledger: &UsageLedger) -> Option<ReadId> {
        let s = self.seeds.next_seed(self.reads, self.graph, ledger)?;
        log::debug!(
            "seed: read {} stage {:?} cluster {} connectivity {}",
            s.read,
            s.stage,
            s.cluster_size,
            s.connectivity
        );
        Some(s.read)
    }

    /// build the next contig; `None` once no seed is left
    pub fn build_contig<C: ContigBuilder>(
        &mut self,
        ledger: &mut UsageLedger,
        contig: &mut C,
    ) -> Result<Option<ContigResult>, FatalError> {
        match self.next_seed(ledger) {
            Some(seed) => self.build_contig_from(ledger, contig, seed).map(Some),
            None => Ok(None),
        }
    }

    pub fn build_contig_from<C: ContigBuilder>(
        &mut self,
        ledger: &mut UsageLedger,
        contig: &mut C,
        seed: ReadId,
    ) -> Result<ContigResult, FatalError> {
        if !self.reads.contains(seed) || seed as usize >= ledger.len() {
            return Err(FatalError::UnknownRead {
                read: seed,
                context: "seed",
            });
        }
        if let Some(p) = ledger.placement(seed) {
            return Err(FatalError::SeedInUse {
                read: seed,
                owner: p.contig,
            });
        }

        let id = self.next_contig_id;
        self.next_contig_id += 1;
        self.queues.clear();
        self.blacklist.clear();
        self.deferred.clear();
        self.parked.clear();
        self.current = Some((id, seed));

        ledger.mark_used(
            seed,
            Placement {
                contig: id,
                tier: None,
                reversed: false,
            },
        );
        contig.start(seed);
        self.fill(ledger, id, seed);

        let started = Instant::now();
        let mut stats = ContigStats::default();
        let status = self.grow(ledger, contig, id, started, &mut stats)?;
        Ok(self.finish(contig, id, seed, status, stats))
    }

    /// keep growing a contig that was aborted or handed back after a resync
    pub fn resume_contig<C: ContigBuilder>(
        &mut self,
        ledger: &mut UsageLedger,
        contig: &mut C,
        id: ContigId,
    ) -> Result<ContigResult, FatalError> {
        let seed = match self.current {
            Some((cid, seed)) if cid == id => seed,
            _ => {
                let members = ledger.members_of(id).collect::<Vec<ReadId>>();
                let seed = match contig
                    .member_read_ids()
                    .first()
                    .copied()
                    .or_else(|| members.first().copied())
                {
                    Some(seed) => seed,
                    None => return Err(FatalError::EmptyContig { contig: id }),
                };
                self.queues.clear();
                self.blacklist.clear();
                self.deferred.clear();
                self.parked.clear();
                for &m in members.iter() {
                    self.fill(ledger, id, m);
                }
                self.current = Some((id, seed));
                seed
            }
        };
        let started = Instant::now();
        let mut stats = ContigStats::default();
        let status = self.grow(ledger, contig, id, started, &mut stats)?;
        Ok(self.finish(contig, id, seed, status, stats))
    }

    /// bring the ledger and the queues in line with a contig changed outside
    /// the pathfinder: removed members go back to the pool, unknown members are
    /// adopted, members near either end propose again; returns the number of
    /// reads whose state changed
    pub fn resync<C: ContigBuilder>(
        &mut self,
        ledger: &mut UsageLedger,
        contig: &C,
        id: ContigId,
    ) -> Result<usize, FatalError> {
        if !self.config.mode.allows_resync() {
            log::debug!("resync: ignored in {:?} mode", self.config.mode);
            return Ok(0);
        }
        let members = contig.member_read_ids();
        for &m in members.iter() {
            if !self.reads.contains(m) || m as usize >= ledger.len() {
                return Err(FatalError::UnknownRead {
                    read: m,
                    context: "contig member",
                });
            }
            if let Some(p) = ledger.placement(m) {
                if p.contig != id {
                    return Err(FatalError::ForeignMember {
                        read: m,
                        contig: id,
                        owner: p.contig,
                    });
                }
            }
        }

        let member_set = members.iter().copied().collect::<FxHashSet<ReadId>>();
        let removed = ledger
            .members_of(id)
            .filter(|r| !member_set.contains(r))
            .collect::<Vec<ReadId>>();
        let adopted = members
            .iter()
            .copied()
            .filter(|r| !ledger.is_used(*r))
            .collect::<Vec<ReadId>>();
        if removed.is_empty() && adopted.is_empty() {
            return Ok(0);
        }

        for &r in removed.iter() {
            ledger.release(r);
            self.queues.retire(r);
        }
        for &r in adopted.iter() {
            ledger.mark_used(
                r,
                Placement {
                    contig: id,
                    tier: None,
                    reversed: contig.read_strand(r).unwrap_or(false),
                },
            );
        }

        let len = contig.len();
        let d = self.config.resync_end_distance;
        let mut n_refilled = 0_usize;
        for &m in members.iter() {
            let near_end = match contig.read_span(m) {
                Some((s, e)) => s <= d || e.saturating_add(d) >= len,
                None => true,
            };
            if near_end {
                self.fill(ledger, id, m);
                n_refilled += 1;
            }
        }
        self.seeds.invalidate();
        log::info!(
            "resync: contig {} released {} adopted {} refilled {}",
            id,
            removed.len(),
            adopted.len(),
            n_refilled
        );
        Ok(removed.len() + adopted.len())
    }

    /// build contigs until no seed is left
    pub fn run_all<C, F>(
        &mut self,
        ledger: &mut UsageLedger,
        mut new_contig: F,
    ) -> Result<Vec<(ContigResult, C)>, FatalError>
    where
        C: ContigBuilder,
        F: FnMut(ContigId) -> C,
    {
        let mut out = Vec::new();
        while let Some(seed) = self.next_seed(ledger) {
            let mut contig = new_contig(self.next_contig_id);
            let res = self.build_contig_from(ledger, &mut contig, seed)?;
            out.push((res, contig));
        }
        let n_singleton = out.iter().filter(|(r, _)| r.reads.len() == 1).count();
        log::info!(
            "pathfinder: {} contigs, {} singletons, {} of {} reads placed",
            out.len(),
            n_singleton,
            ledger.n_used(),
            self.reads.len()
        );
        Ok(out)
    }

    fn finish<C: ContigBuilder>(
        &mut self,
        contig: &C,
        id: ContigId,
        seed: ReadId,
        status: ContigStatus,
        stats: ContigStats,
    ) -> ContigResult {
        let reads = contig.member_read_ids();
        log::info!(
            "contig {}: seed {} reads {} len {} attempts {} merges {} rejections {} status {}",
            id,
            seed,
            reads.len(),
            contig.len(),
            stats.attempts,
            stats.merges,
            stats.rejections,
            status
        );
        ContigResult {
            contig_id: id,
            seed,
            reads,
            status,
            stats,
        }
    }

    fn fill(&mut self, ledger: &UsageLedger, id: ContigId, anchor: ReadId) {
        let found = Classifier {
            reads: self.reads,
            graph: self.graph,
            ledger,
            bans: &self.bans,
            blacklist: &self.blacklist,
            deferred: &self.deferred,
            contig: id,
            mode: self.config.mode,
            est_repeat_level_ceiling: self.config.est_repeat_level_ceiling,
        }
        .classify(anchor);
        match found {
            Some(c) => self.queues.push(anchor, c),
            None => self.queues.retire(anchor),
        }
    }

    /// placed reads with an overlap to a released read propose again
    fn refill_around(&mut self, ledger: &UsageLedger, id: ContigId, released: &[ReadId]) {
        let graph = self.graph;
        let mut anchors = FxHashSet::<ReadId>::default();
        for &r in released {
            for e in graph.edges_of(r) {
                if !self.reads.contains(e.to) {
                    continue;
                }
                if let Some(p) = ledger.placement(e.to) {
                    if p.contig == id {
                        anchors.insert(e.to);
                    }
                }
            }
        }
        let mut anchors = anchors.into_iter().collect::<Vec<ReadId>>();
        anchors.sort_unstable();
        log::debug!(
            "blacklist: released {} reads, {} anchors refilled",
            released.len(),
            anchors.len()
        );
        for a in anchors {
            self.fill(ledger, id, a);
        }

        let (ready, waiting): (Vec<Candidate>, Vec<Candidate>) = std::mem::take(&mut self.parked)
            .into_iter()
            .partition(|c| released.contains(&c.read));
        self.parked = waiting;
        for c in ready {
            log::debug!("last chance: {} from {} back in the queue", c.read, c.anchor);
            self.queues.push_last_chance(c.anchor, c.read, c.edge, c.score);
        }
    }

    fn is_stale(&self, ledger: &UsageLedger, id: ContigId, c: &Candidate) -> bool {
        ledger.is_used(c.read)
            || self.bans.is_banned(c.edge)
            || self.blacklist.contains(c.read)
            || ledger.placement(c.anchor).map(|p| p.contig) != Some(id)
    }

    /// a last chance entry held back only by the blacklist keeps its turn
    fn waits_for_release(&self, ledger: &UsageLedger, id: ContigId, c: &Candidate) -> bool {
        self.blacklist.contains(c.read)
            && !ledger.is_used(c.read)
            && !self.bans.is_banned(c.edge)
            && ledger.placement(c.anchor).map(|p| p.contig) == Some(id)
    }

    fn grow<C: ContigBuilder>(
        &mut self,
        ledger: &mut UsageLedger,
        contig: &mut C,
        id: ContigId,
        started: Instant,
        stats: &mut ContigStats,
    ) -> Result<ContigStatus, FatalError> {
        let graph = self.graph;
        loop {
            if let Some(max) = self.config.max_attempts_per_contig {
                if stats.attempts >= max {
                    log::warn!("contig {}: attempt budget {} used up", id, max);
                    return Ok(ContigStatus::Aborted(AbortReason::AttemptBudget));
                }
            }
            if let Some(max) = self.config.max_time_per_contig {
                if started.elapsed() > max {
                    log::warn!("contig {}: time budget {:?} used up", id, max);
                    return Ok(ContigStatus::Aborted(AbortReason::TimeBudget));
                }
            }

            let cand = match self.queues.pop() {
                Some(c) => c,
                None => {
                    if self.blacklist.is_empty() {
                        return Ok(ContigStatus::Finished);
                    }
                    let released = self.blacklist.release_oldest();
                    stats.blacklist_releases += 1;
                    self.refill_around(ledger, id, &released);
                    continue;
                }
            };

            if self.is_stale(ledger, id, &cand) {
                stats.stale_pops += 1;
                if !cand.last_chance {
                    self.fill(ledger, id, cand.anchor);
                } else if self.waits_for_release(ledger, id, &cand) {
                    self.parked.push(cand);
                }
                continue;
            }

            let edge = graph.edge(cand.edge);
            let anchor_reversed = ledger
                .placement(cand.anchor)
                .map(|p| p.reversed)
                .unwrap_or(false);
            let reversed = anchor_reversed ^ edge.reversed;
            let req = MergeRequest {
                anchor: cand.anchor,
                read: cand.read,
                edge_id: cand.edge,
                edge,
                reversed,
                tier: cand.tier,
            };
            stats.attempts += 1;
            if cand.last_chance {
                stats.last_chance_attempts += 1;
            }
            let outcome = contig.try_merge_read(&req);
            for &a in outcome.affected.iter() {
                if !self.reads.contains(a) || a as usize >= ledger.len() {
                    return Err(FatalError::UnknownRead {
                        read: a,
                        context: "merge outcome",
                    });
                }
            }

            match outcome.result {
                Ok(()) => {
                    let placed = ledger.mark_used(
                        cand.read,
                        Placement {
                            contig: id,
                            tier: Some(cand.tier),
                            reversed,
                        },
                    );
                    if !placed {
                        return Err(FatalError::DoublePlacement {
                            anchor: cand.anchor,
                            read: cand.read,
                            edge: cand.edge,
                        });
                    }
                    stats.merges += 1;
                    log::debug!(
                        "contig {}: merged {} from {} via edge {} ({:?}, score {})",
                        id,
                        cand.read,
                        cand.anchor,
                        cand.edge,
                        cand.tier,
                        cand.score
                    );
                    let released = self.blacklist.on_merge();
                    self.fill(ledger, id, cand.read);
                    self.fill(ledger, id, cand.anchor);
                    if !released.is_empty() {
                        stats.blacklist_releases += 1;
                        self.refill_around(ledger, id, &released);
                    }
                }
                Err(MergeError::Refused)
                    if self.config.mode.uses_last_chance()
                        && !cand.last_chance
                        && !self.deferred.contains(&cand.edge) =>
                {
                    stats.refusals += 1;
                    log::debug!(
                        "contig {}: {} from {} refused, parked for a last chance",
                        id,
                        cand.read,
                        cand.anchor
                    );
                    self.deferred.insert(cand.edge);
                    self.queues
                        .push_last_chance(cand.anchor, cand.read, cand.edge, cand.score);
                    self.fill(ledger, id, cand.anchor);
                }
                Err(err) => {
                    if err == MergeError::Refused {
                        stats.refusals += 1;
                    }
                    stats.rejections += 1;
                    let mut n_banned = self.bans.ban_pair(graph, cand.anchor, cand.read);
                    for &a in outcome.affected.iter() {
                        if a != cand.read {
                            n_banned += self.bans.ban_pair(graph, a, cand.read);
                        }
                    }
                    stats.banned_edges += n_banned as u64;
                    log::debug!(
                        "contig {}: {} from {} rejected ({:?}), {} edges banned, {} affected",
                        id,
                        cand.read,
                        cand.anchor,
                        err,
                        n_banned,
                        outcome.affected.len()
                    );
                    let released = self.blacklist.add(cand.read);
                    self.fill(ledger, id, cand.anchor);
                    if !released.is_empty() {
                        stats.blacklist_releases += 1;
                        self.refill_around(ledger, id, &released);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssemblyMode;
    use crate::contig::MergeOutcome;
    use crate::graph::{EdgeFlags, OverlapEdge, OverlapGraphBuilder};
    use crate::reads::ReadInfo;
    use crate::tier::Tier;
    use std::collections::VecDeque;

    // replays a script of outcomes, merging once it runs out
    struct Scripted {
        members: Vec<ReadId>,
        script: VecDeque<MergeOutcome>,
        tried: Vec<(ReadId, ReadId, Tier)>,
    }

    impl Scripted {
        fn new(script: Vec<MergeOutcome>) -> Self {
            Scripted {
                members: Vec::new(),
                script: script.into(),
                tried: Vec::new(),
            }
        }
    }

    impl ContigBuilder for Scripted {
        fn start(&mut self, seed: ReadId) {
            self.members = vec![seed];
        }

        fn try_merge_read(&mut self, req: &MergeRequest) -> MergeOutcome {
            self.tried.push((req.anchor, req.read, req.tier));
            let out = self.script.pop_front().unwrap_or_else(MergeOutcome::merged);
            if out.is_merged() {
                self.members.push(req.read);
            }
            out
        }

        fn member_read_ids(&self) -> Vec<ReadId> {
            self.members.clone()
        }
    }

    fn star(n_leaves: u32) -> (ReadPool, OverlapGraph) {
        let reads = ReadPool::from_reads(vec![ReadInfo::new(100); n_leaves as usize + 1]);
        let mut b = OverlapGraphBuilder::new(reads.len());
        for leaf in 1..=n_leaves {
            b.add_pair(
                OverlapEdge {
                    from: 0,
                    to: leaf,
                    reversed: false,
                    score: 100 - leaf,
                    ovlp_len: 50,
                    offset: 50,
                    flags: EdgeFlags::STRONG_GOOD | EdgeFlags::NO_REPEAT,
                },
                100,
                100,
            );
        }
        (reads, b.build())
    }

    #[test]
    fn rejected_pair_is_banned_and_blacklist_drains() {
        // leaf 1 fails once; leaf 2 still merges and the blacklist drains at the end
        let (reads, g) = star(2);
        let mut pf = Pathfinder::new(&reads, &g, PathfinderConfig::default()).unwrap();
        let mut ledger = pf.new_ledger();
        let mut ctg = Scripted::new(vec![MergeOutcome::rejected(
            MergeError::SequenceMismatch,
            vec![],
        )]);
        let res = pf.build_contig_from(&mut ledger, &mut ctg, 0).unwrap();
        assert_eq!(res.reads, vec![0, 2]);
        assert_eq!(res.stats.rejections, 1);
        assert_eq!(res.stats.banned_edges, 2);
        // the banned pair is never proposed again
        assert_eq!(ctg.tried.iter().filter(|t| t.1 == 1).count(), 1);
        assert!(pf.blacklist().is_empty());
    }

    #[test]
    fn attempt_budget_aborts_softly_and_resumes() {
        let (reads, g) = star(4);
        let mut cfg = PathfinderConfig::default();
        cfg.max_attempts_per_contig = Some(2);
        let mut pf = Pathfinder::new(&reads, &g, cfg).unwrap();
        let mut ledger = pf.new_ledger();
        let mut ctg = Scripted::new(vec![]);
        let res = pf.build_contig_from(&mut ledger, &mut ctg, 0).unwrap();
        assert_eq!(res.status, ContigStatus::Aborted(AbortReason::AttemptBudget));
        assert_eq!(res.reads, vec![0, 1, 2]);
        assert_eq!(ledger.n_used(), 3);
        let res = pf.resume_contig(&mut ledger, &mut ctg, res.contig_id).unwrap();
        assert_eq!(res.status, ContigStatus::Aborted(AbortReason::AttemptBudget));
        assert_eq!(ctg.members, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn refusal_outside_genome_mode_is_a_rejection() {
        let (reads, g) = star(1);
        let mut pf =
            Pathfinder::new(&reads, &g, PathfinderConfig::with_mode(AssemblyMode::Mapping)).unwrap();
        let mut ledger = pf.new_ledger();
        let mut ctg = Scripted::new(vec![MergeOutcome::refused()]);
        let res = pf.build_contig_from(&mut ledger, &mut ctg, 0).unwrap();
        assert_eq!(res.reads, vec![0]);
        assert_eq!((res.stats.refusals, res.stats.rejections), (1, 1));
        assert_eq!(res.stats.last_chance_attempts, 0);
        assert_eq!(pf.bans().n_banned(), 2);
    }

    #[test]
    fn second_refusal_of_a_last_chance_edge_bans_it() {
        let (reads, g) = star(1);
        let mut pf = Pathfinder::new(&reads, &g, PathfinderConfig::default()).unwrap();
        let mut ledger = pf.new_ledger();
        let mut ctg = Scripted::new(vec![MergeOutcome::refused(), MergeOutcome::refused()]);
        let res = pf.build_contig_from(&mut ledger, &mut ctg, 0).unwrap();
        assert_eq!(res.reads, vec![0]);
        assert_eq!(res.stats.refusals, 2);
        assert_eq!(res.stats.last_chance_attempts, 1);
        assert_eq!(ctg.tried[1].2, Tier::LastChance);
        assert_eq!(pf.bans().n_banned(), 2);
    }

    #[test]
    fn blacklisted_last_chance_waits_for_the_release() {
        // 0-1 is refused and parked; 2 merges, then 2-1 fails and blacklists 1
        // while 0-1 still waits for its last chance
        let reads = ReadPool::from_reads(vec![ReadInfo::new(100); 3]);
        let mut b = OverlapGraphBuilder::new(reads.len());
        for (from, to, score, flags) in [
            (0, 1, 90, EdgeFlags::STRONG_GOOD | EdgeFlags::NO_REPEAT),
            (0, 2, 40, EdgeFlags::WEAK_GOOD | EdgeFlags::NO_REPEAT),
            (2, 1, 80, EdgeFlags::STRONG_GOOD | EdgeFlags::NO_REPEAT),
        ]
        .iter()
        {
            b.add_pair(
                OverlapEdge {
                    from: *from,
                    to: *to,
                    reversed: false,
                    score: *score,
                    ovlp_len: 50,
                    offset: 50,
                    flags: *flags,
                },
                100,
                100,
            );
        }
        let g = b.build();
        let mut pf = Pathfinder::new(&reads, &g, PathfinderConfig::default()).unwrap();
        let mut ledger = pf.new_ledger();
        let mut ctg = Scripted::new(vec![
            MergeOutcome::refused(),
            MergeOutcome::merged(),
            MergeOutcome::rejected(MergeError::SequenceMismatch, vec![]),
        ]);
        let res = pf.build_contig_from(&mut ledger, &mut ctg, 0).unwrap();
        assert_eq!(
            ctg.tried,
            vec![
                (0, 1, Tier::Strong),
                (0, 2, Tier::Weak),
                (2, 1, Tier::Strong),
                (0, 1, Tier::LastChance),
            ]
        );
        assert_eq!(res.reads, vec![0, 2, 1]);
        assert_eq!(res.stats.last_chance_attempts, 1);
        assert_eq!(res.stats.blacklist_releases, 1);
        assert_eq!(ledger.placement(1).unwrap().tier, Some(Tier::LastChance));
        assert!(pf.blacklist().is_empty());
    }

    #[test]
    fn resume_without_members_is_fatal() {
        let (reads, g) = star(2);
        let mut pf = Pathfinder::new(&reads, &g, PathfinderConfig::default()).unwrap();
        let mut ledger = pf.new_ledger();
        let mut ctg = Scripted::new(vec![]);
        assert_eq!(
            pf.resume_contig(&mut ledger, &mut ctg, 3).unwrap_err(),
            FatalError::EmptyContig { contig: 3 }
        );
        assert_eq!(ledger.n_used(), 0);
        assert_eq!(pf.current_contig(), None);
        assert!(ctg.tried.is_empty());
    }

    #[test]
    fn collaborator_errors_are_fatal() {
        let (reads, g) = star(1);
        let mut pf = Pathfinder::new(&reads, &g, PathfinderConfig::default()).unwrap();
        let mut ledger = pf.new_ledger();
        let mut ctg = Scripted::new(vec![MergeOutcome::rejected(
            MergeError::InvalidStructure,
            vec![42],
        )]);
        let err = pf.build_contig_from(&mut ledger, &mut ctg, 0).unwrap_err();
        assert_eq!(
            err,
            FatalError::UnknownRead {
                read: 42,
                context: "merge outcome"
            }
        );
        // nothing was banned for the bad outcome
        assert_eq!(pf.bans().n_banned(), 0);

        let err = pf.build_contig_from(&mut ledger, &mut ctg, 0).unwrap_err();
        assert!(matches!(err, FatalError::SeedInUse { read: 0, .. }));
        assert!(matches!(
            pf.build_contig_from(&mut ledger, &mut ctg, 9),
            Err(FatalError::UnknownRead { read: 9, .. })
        ));
    }

    #[test]
    fn invalid_config_is_refused() {
        let (reads, g) = star(1);
        let mut cfg = PathfinderConfig::default();
        cfg.seed_cluster_cap = 0;
        assert!(Pathfinder::new(&reads, &g, cfg).is_err());
    }
}
