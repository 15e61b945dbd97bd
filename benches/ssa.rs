//! Benchmarks for SSA construction.
//!
//! Measures the full builder pipeline on generated method shapes:
//! - A long chain of if/else diamonds (many joins, phis for every local)
//! - Deeply nested loops (long dominator chains, loop-carried phis)
//! - A sequence of try regions (handler phis and exceptional arguments)
//! - A batch of methods compiled through the parallel driver

extern crate jitssa;

use criterion::{criterion_group, criterion_main, Criterion};
use jitssa::prelude::*;
use std::hint::black_box;

const LOCALS: u32 = 8;

fn locals() -> Vec<LocalVar> {
    (0..LOCALS)
        .map(|i| if i % 2 == 0 { LocalVar::param() } else { LocalVar::temp() })
        .collect()
}

/// Reads every even local, writes every odd one.
fn body(seed: u32) -> BasicBlock {
    let mut block = BasicBlock::new();
    for i in 0..LOCALS {
        let var = Variable::local(i);
        if i % 2 == 0 {
            block.push(Operation::use_def(var));
        } else {
            block.push(Operation::def_of(var));
        }
        if (i + seed) % 5 == 0 {
            block.push(Operation::indirect_def());
        }
    }
    block
}

/// `count` if/else diamonds in a row.
fn diamond_chain(count: usize) -> FlowGraph {
    let mut graph = FlowGraph::new(locals());
    let mut head = graph.add_block(body(0));
    for i in 0..count {
        let seed = i as u32;
        let left = graph.add_block(body(seed + 1));
        let right = graph.add_block(body(seed + 2));
        let join = graph.add_block(body(seed + 3));
        graph.add_edge(head, left, FlowEdgeKind::ConditionalTrue).unwrap();
        graph.add_edge(head, right, FlowEdgeKind::ConditionalFalse).unwrap();
        graph.add_edge(left, join, FlowEdgeKind::Unconditional).unwrap();
        graph.add_edge(right, join, FlowEdgeKind::Unconditional).unwrap();
        head = join;
    }
    graph
}

/// `depth` loops nested inside each other.
fn nested_loops(depth: usize) -> FlowGraph {
    let mut graph = FlowGraph::new(locals());
    let entry = graph.add_block(body(0));
    let mut headers = Vec::new();
    let mut prev = entry;
    for i in 0..depth {
        let header = graph.add_block(body(i as u32));
        graph.add_edge(prev, header, FlowEdgeKind::Unconditional).unwrap();
        headers.push(header);
        prev = header;
    }
    let mut inner = prev;
    for &header in headers.iter().rev() {
        let latch = graph.add_block(body(7));
        graph.add_edge(inner, latch, FlowEdgeKind::Unconditional).unwrap();
        graph.add_edge(latch, header, FlowEdgeKind::ConditionalTrue).unwrap();
        inner = latch;
    }
    let exit = graph.add_block(BasicBlock::new());
    graph.add_edge(inner, exit, FlowEdgeKind::ConditionalFalse).unwrap();
    graph
}

/// `count` try/catch pairs in a row, each try two blocks long.
fn try_sequence(count: usize) -> FlowGraph {
    let mut graph = FlowGraph::new(locals());
    let mut prev = graph.add_block(body(0));
    for i in 0..count {
        let seed = i as u32;
        let try_entry = graph.add_block(body(seed));
        let try_tail = graph.add_block(body(seed + 1));
        let handler = graph.add_block(body(seed + 2));
        let after = graph.add_block(body(seed + 3));
        graph.add_edge(prev, try_entry, FlowEdgeKind::Unconditional).unwrap();
        graph.add_edge(try_entry, try_tail, FlowEdgeKind::Unconditional).unwrap();
        graph.add_edge(try_tail, after, FlowEdgeKind::Leave).unwrap();
        graph.add_edge(handler, after, FlowEdgeKind::Leave).unwrap();
        let region = graph
            .add_region(ExceptionRegion::new(RegionKind::Catch, try_entry, handler))
            .unwrap();
        graph.protect(try_entry, region).unwrap();
        graph.protect(try_tail, region).unwrap();
        prev = after;
    }
    graph
}

fn bench_build(c: &mut Criterion, name: &str, mut graph: FlowGraph, placement: PhiPlacement) {
    let config = SsaConfig::default().with_placement(placement);
    c.bench_function(name, |b| {
        b.iter(|| {
            let mut ctx = SsaContext::new(config.clone());
            let form = SsaBuilder::new(&mut ctx, black_box(&mut graph)).build().unwrap();
            black_box(form)
        });
    });
}

fn bench_diamond_chain(c: &mut Criterion) {
    bench_build(c, "ssa_diamond_chain_64", diamond_chain(64), PhiPlacement::Minimal);
}

fn bench_diamond_chain_pruned(c: &mut Criterion) {
    bench_build(c, "ssa_diamond_chain_64_pruned", diamond_chain(64), PhiPlacement::Pruned);
}

fn bench_nested_loops(c: &mut Criterion) {
    bench_build(c, "ssa_nested_loops_32", nested_loops(32), PhiPlacement::Minimal);
}

fn bench_try_sequence(c: &mut Criterion) {
    bench_build(c, "ssa_try_sequence_32", try_sequence(32), PhiPlacement::Minimal);
}

fn bench_compile_all(c: &mut Criterion) {
    let mut methods: Vec<FlowGraph> = (0..64)
        .map(|i| match i % 3 {
            0 => diamond_chain(16),
            1 => nested_loops(8),
            _ => try_sequence(8),
        })
        .collect();
    let config = SsaConfig::default();

    c.bench_function("ssa_compile_all_64_methods", |b| {
        b.iter(|| {
            let outcomes = compile_all(black_box(&mut methods), &config);
            black_box(outcomes)
        });
    });
}

criterion_group!(
    benches,
    bench_diamond_chain,
    bench_diamond_chain_pruned,
    bench_nested_loops,
    bench_try_sequence,
    bench_compile_all,
);
criterion_main!(benches);
