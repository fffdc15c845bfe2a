//! Rank-to-location remapping via a quadratic assignment heuristic.
//!
//! Ported from `tauQAP.c`: a greedy construction phase seeds an assignment
//! by repeatedly pairing the heaviest remaining communicator with the most
//! central remaining location, then a cyclic pairwise-exchange phase
//! improves on it. Two correctness fixes relative to the original (see
//! DESIGN.md): the original's `bsearch`-based "is this index already
//! assigned" check used a comparator that returns a boolean cast to `int`,
//! which is not a valid three-way comparator and can give `bsearch` wrong
//! answers; this version tracks the assigned set as a `Vec<usize>` kept
//! sorted and queried with `slice::binary_search`, which is a real
//! comparator. The original's cyclic-exchange index stepping also has a
//! typo'd loop guard that keeps it from ever advancing past `i == 1`; this
//! version enumerates every `(i, j)` pair up front and cycles through them.

use crate::commmatrix::CommMatrix;
use crate::topology::Topology;

/// Find a low-cost assignment of ranks to physical locations for `cm` under
/// `topology`. Returns `order` where `order[location] = rank`, or `None` if
/// `topology` is not a cost matrix (QAP has nothing to optimize against a
/// bare graph).
pub fn remap(cm: &CommMatrix, topology: &Topology) -> Option<Vec<usize>> {
    let top = topology.as_matrix()?;
    assert_eq!(cm.nodecount(), top.nodecount(), "comm matrix and topology size mismatch");
    let seed = construction(cm, top);
    Some(improve(cm, top, seed))
}

fn comm_load(cm: &CommMatrix, process: usize, assigned: &[usize]) -> u64 {
    assigned
        .iter()
        .filter(|&&a| a != process)
        .map(|&a| cm.get(process, a) + cm.get(a, process))
        .sum()
}

fn core_dist(top: &crate::topology::TopologyMatrix, node: usize, assigned: &[usize]) -> u64 {
    assigned.iter().filter(|&&a| a != node).map(|&a| top.get(node, a)).sum()
}

fn insert_sorted(list: &mut Vec<usize>, elm: usize) {
    if let Err(pos) = list.binary_search(&elm) {
        list.insert(pos, elm);
    }
}

/// Greedy seed assignment: at each step, pair the unassigned process with
/// the greatest communication load against the already-assigned set with
/// the unassigned location with the smallest total distance to it. Ties
/// break toward the lowest index.
fn construction(cm: &CommMatrix, top: &crate::topology::TopologyMatrix) -> Vec<usize> {
    let n = cm.nodecount();
    let mut order = vec![0usize; n];
    if n == 0 {
        return order;
    }

    let identity: Vec<usize> = (0..n).collect();
    let (seed_proc, _) = (0..n)
        .map(|i| (i, comm_load(cm, i, &identity)))
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .unwrap();
    let (seed_loc, _) = (0..n)
        .map(|i| (i, core_dist(top, i, &identity)))
        .min_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .unwrap();

    order[seed_loc] = seed_proc;
    let mut assigned_procs = vec![seed_proc];
    let mut assigned_locs = vec![seed_loc];

    for _ in 1..n {
        let best_proc = (0..n)
            .filter(|p| assigned_procs.binary_search(p).is_err())
            .map(|p| (p, comm_load(cm, p, &assigned_procs)))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .unwrap()
            .0;
        let best_loc = (0..n)
            .filter(|l| assigned_locs.binary_search(l).is_err())
            .map(|l| (l, core_dist(top, l, &assigned_locs)))
            .min_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
            .unwrap()
            .0;

        order[best_loc] = best_proc;
        insert_sorted(&mut assigned_procs, best_proc);
        insert_sorted(&mut assigned_locs, best_loc);
    }

    order
}

fn total_cost(cm: &CommMatrix, top: &crate::topology::TopologyMatrix, order: &[usize]) -> u64 {
    let n = order.len();
    let mut cost = 0u64;
    for i in 0..n {
        for j in 0..n {
            cost += cm.get(order[i], order[j]) * top.get(i, j);
        }
    }
    cost
}

/// Cyclic pairwise-exchange local search: repeatedly tries swapping two
/// locations' assignments, keeping the swap only if it lowers total cost.
fn improve(cm: &CommMatrix, top: &crate::topology::TopologyMatrix, initial: Vec<usize>) -> Vec<usize> {
    let n = initial.len();
    if n < 2 {
        return initial;
    }

    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (i, j))).collect();

    let mut best = initial.clone();
    let mut best_cost = total_cost(cm, top, &best);
    let mut current = initial;

    for step in 0..(n * n) {
        let (i, j) = pairs[step % pairs.len()];
        current.swap(i, j);
        let cost = total_cost(cm, top, &current);
        if cost < best_cost {
            best.clone_from(&current);
            best_cost = cost;
        } else {
            current.swap(i, j);
        }
    }

    best
}
