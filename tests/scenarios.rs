//! End-to-end scenarios spanning partitioning, transitions, the comm
//! matrix, and the QAP remapper together, as opposed to the per-module
//! unit tests living alongside each `src/` file.

use rankmesh::commmatrix::{CommMatrix, Symmetric};
use rankmesh::instance::{Group, Instance};
use rankmesh::partitioning::partitioner::Partitioner;
use rankmesh::partitioning::Filter;
use rankmesh::qap::remap;
use rankmesh::reorder::{Reordering, ReorderEnv};
use rankmesh::topology::{Topology, TopologyMatrix};
use rankmesh::transition::{DataFlow, ReductionOp, Transition};

// S1: a 1-D space striped across 4 tasks, gathered so every task ends up
// holding the full space - each task sends its chunk to all others and
// receives the complementary three chunks in turn.
#[test]
fn s1_1d_stripe_to_all_exchanges_complementary_chunks() {
    let mut inst = Instance::new(Group::new(4, 0));
    let space = inst.create_space(1, [1000, 0, 0]);
    let stripe = inst.create_partitioning(space, Partitioner::Stripe(0), None, Filter::none());
    let all = inst.create_partitioning(space, Partitioner::All, None, Filter::none());
    inst.run_partitioning(stripe);
    inst.run_partitioning(all);

    for me in 0..4 {
        let tr = Transition::calculate(inst.partitioning(stripe), inst.partitioning(all), DataFlow::CopyIn, None, me).unwrap();
        assert_eq!(tr.sends().len(), 3, "task {me} should send its chunk to the 3 others");
        assert_eq!(tr.recvs().len(), 3, "task {me} should receive the 3 complementary chunks");
        assert_eq!(tr.locals().len(), 1);
    }
}

// S2: a 2-D space owned entirely by the master, fanned out to every task.
#[test]
fn s2_2d_master_to_all_is_pure_broadcast() {
    let mut inst = Instance::new(Group::new(3, 0));
    let space = inst.create_space(2, [8, 8, 0]);
    let master = inst.create_partitioning(space, Partitioner::Master, None, Filter::none());
    let all = inst.create_partitioning(space, Partitioner::All, None, Filter::none());
    inst.run_partitioning(master);
    inst.run_partitioning(all);

    let tr0 = Transition::calculate(inst.partitioning(master), inst.partitioning(all), DataFlow::CopyIn, None, 0).unwrap();
    assert_eq!(tr0.sends().len(), 2); // task 0 sends to tasks 1 and 2
    assert_eq!(tr0.locals().len(), 1); // and keeps its own copy

    let tr1 = Transition::calculate(inst.partitioning(master), inst.partitioning(all), DataFlow::CopyIn, None, 1).unwrap();
    assert!(tr1.sends().is_empty());
    assert_eq!(tr1.recvs().len(), 1);
    assert_eq!(tr1.recvs()[0].from_task, 0);
}

// S3: an All partitioning (plus-reduced) landing on the master.
#[test]
fn s3_reduce_plus_to_master() {
    let mut inst = Instance::new(Group::new(4, 0));
    let space = inst.create_space(1, [100, 0, 0]);
    let all = inst.create_partitioning(space, Partitioner::All, None, Filter::none());
    let master = inst.create_partitioning(space, Partitioner::Master, None, Filter::none());
    inst.run_partitioning(all);
    inst.run_partitioning(master);

    let tr = Transition::calculate(inst.partitioning(all), inst.partitioning(master), DataFlow::Reduce, Some(ReductionOp::Plus), 0).unwrap();
    assert_eq!(tr.reductions().len(), 1);
    assert_eq!(tr.reductions()[0].op, ReductionOp::Plus);
    assert_eq!(tr.reductions()[0].output_task, 0);
    assert_eq!(tr.reductions()[0].input_tasks, vec![0, 1, 2, 3]);
    assert!(tr.sends().is_empty());
}

// S4: CommMatrix accumulation matches the send volume of an S1-style stripe
// transition accumulated from every task's point of view.
#[test]
fn s4_comm_matrix_accumulates_stripe_to_all_sends() {
    let mut inst = Instance::new(Group::new(4, 0));
    let space = inst.create_space(1, [400, 0, 0]); // 100 per task
    let stripe = inst.create_partitioning(space, Partitioner::Stripe(0), None, Filter::none());
    let all = inst.create_partitioning(space, Partitioner::All, None, Filter::none());
    inst.run_partitioning(stripe);
    inst.run_partitioning(all);

    let mut cm = CommMatrix::new(4);
    for me in 0..4 {
        let tr = Transition::calculate(inst.partitioning(stripe), inst.partitioning(all), DataFlow::CopyIn, None, me).unwrap();
        cm.add_transition(me, &tr);
    }

    // every task sends its 100-element stripe to the 3 others.
    for from in 0..4 {
        for to in 0..4 {
            if from == to {
                assert_eq!(cm.get(from, to), 0);
            } else {
                assert_eq!(cm.get(from, to), 100);
            }
        }
    }
}

// S5: QAP on an all-zero comm matrix against an all-zero topology must
// still return a valid permutation (any assignment has cost 0).
#[test]
fn s5_qap_identity_on_identity() {
    let cm = CommMatrix::new(5);
    let top = TopologyMatrix::new(5);
    let order = remap(&cm, &Topology::Matrix(top)).unwrap();
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..5).collect::<Vec<_>>());
}

// S6: QAP should find a strictly better (or equal) assignment than the
// identity permutation under an adversarial comm matrix paired with a
// topology where distance grows with index separation.
#[test]
fn s6_qap_improves_over_identity_under_adversarial_load() {
    let n = 5;
    let mut cm = CommMatrix::new(n);
    // task 0 and task 4 talk heavily; everyone else is quiet.
    cm.update(0, 4, 10_000, Symmetric::Directed);
    cm.update(4, 0, 10_000, Symmetric::Directed);

    let mut top = TopologyMatrix::new(n);
    // distance grows with index separation, so identity placement is bad
    // for the (0, 4) pair specifically.
    for i in 0..n {
        for j in 0..n {
            if i != j {
                top.set(i, j, (i.abs_diff(j)) as u64);
            }
        }
    }

    let identity_cost: u64 = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .map(|(i, j)| cm.get(i, j) * top.get(i, j))
        .sum();

    let order = remap(&cm, &Topology::Matrix(top.clone())).unwrap();
    let order_cost: u64 = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .map(|(i, j)| cm.get(order[i], order[j]) * top.get(i, j))
        .sum();

    assert!(order_cost <= identity_cost);
}

// S7: the LAIK_REORDERING-style literal parses into an explicit task map.
#[test]
fn s7_reordering_env_literal_parses_to_explicit_map() {
    let env = ReorderEnv {
        reordering: Some("2.3,0.4,5.1".to_string()),
        reorder_file: None,
        reorder_live: false,
    };
    let cm = CommMatrix::new(6);
    let topology = Topology::Matrix(TopologyMatrix::new(6));
    let resolved = rankmesh::reorder::resolve(&env, 6, 0, &cm, &topology).unwrap().unwrap();
    assert_eq!(resolved, Reordering::parse_literal("2.3,0.4,5.1", 6).unwrap());
    assert_eq!(resolved.get(2), Some(3));
    assert_eq!(resolved.get(0), Some(4));
    assert_eq!(resolved.get(5), Some(1));
}
