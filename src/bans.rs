// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

use crate::graph::OverlapGraph;
use crate::{EdgeId, ReadId};

/// the only per-edge state that changes during a pass; a banned edge stays
/// banned until `reset`
#[derive(Debug, Clone)]
pub struct EdgeBans {
    banned: Vec<bool>,
    touched: Vec<EdgeId>,
    bulk_fraction: f64,
}

impl EdgeBans {
    pub fn new(n_edges: usize, bulk_fraction: f64) -> Self {
        EdgeBans {
            banned: vec![false; n_edges],
            touched: Vec::new(),
            bulk_fraction,
        }
    }

    pub fn is_banned(&self, eid: EdgeId) -> bool {
        self.banned[eid as usize]
    }

    pub fn ban(&mut self, eid: EdgeId) -> bool {
        let b = &mut self.banned[eid as usize];
        if *b {
            return false;
        }
        *b = true;
        self.touched.push(eid);
        true
    }

    /// ban every edge between the two reads, both directions; returns the number of new bans
    pub fn ban_pair(&mut self, graph: &OverlapGraph, rid0: ReadId, rid1: ReadId) -> usize {
        graph
            .edges_between(rid0, rid1)
            .into_iter()
            .filter(|eid| self.ban(*eid))
            .count()
    }

    /// true when every edge between the two reads is banned
    pub fn pair_banned(&self, graph: &OverlapGraph, rid0: ReadId, rid1: ReadId) -> bool {
        graph
            .edges_between(rid0, rid1)
            .into_iter()
            .all(|eid| self.is_banned(eid))
    }

    pub fn n_banned(&self) -> usize {
        self.touched.len()
    }

    pub fn banned_edges(&self) -> &[EdgeId] {
        &self.touched
    }

    pub fn reset(&mut self) {
        let bulk = self.touched.len() as f64 > self.banned.len() as f64 * self.bulk_fraction;
        if bulk {
            log::debug!("bans: bulk reset after {} bans", self.touched.len());
            for b in self.banned.iter_mut() {
                *b = false;
            }
        } else {
            for eid in self.touched.iter() {
                self.banned[*eid as usize] = false;
            }
        }
        self.touched.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeFlags, OverlapEdge, OverlapGraphBuilder};

    fn pair_graph() -> OverlapGraph {
        let mut b = OverlapGraphBuilder::new(3);
        for (a, c) in [(0, 1), (1, 2)].iter() {
            b.add_pair(
                OverlapEdge {
                    from: *a,
                    to: *c,
                    reversed: false,
                    score: 40,
                    ovlp_len: 40,
                    offset: 60,
                    flags: EdgeFlags::STRONG_GOOD,
                },
                100,
                100,
            );
        }
        b.build()
    }

    #[test]
    fn ban_pair_is_symmetric() {
        let g = pair_graph();
        let mut bans = EdgeBans::new(g.n_edges(), 0.5);
        assert_eq!(bans.ban_pair(&g, 1, 0), 2);
        assert!(bans.pair_banned(&g, 0, 1));
        assert!(!bans.pair_banned(&g, 1, 2));
        assert_eq!(bans.ban_pair(&g, 0, 1), 0);
        assert_eq!(bans.n_banned(), 2);
    }

    #[test]
    fn reset_clears_touched_and_bulk() {
        let g = pair_graph();
        let mut bans = EdgeBans::new(g.n_edges(), 0.9);
        bans.ban_pair(&g, 0, 1);
        bans.reset();
        assert_eq!(bans.n_banned(), 0);
        assert!(!bans.pair_banned(&g, 0, 1));

        let mut bans = EdgeBans::new(g.n_edges(), 0.1);
        bans.ban_pair(&g, 0, 1);
        bans.ban_pair(&g, 1, 2);
        bans.reset();
        assert!((0..g.n_edges() as EdgeId).all(|e| !bans.is_banned(e)));
    }
}
