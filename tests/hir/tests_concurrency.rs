//! Parallel resolution reaches the same state as sequential resolution.

use rayon::prelude::*;

use crate::helpers::compilation_helpers::*;
use typegraph::hir::{Compilation, Diagnostic, TypeId, TypeRef};

/// Many independent groups of chains, cycles and generic instantiations.
fn generated_source(groups: usize) -> String {
    let mut source = String::new();
    for i in 0..groups {
        source.push_str(&format!(
            "class Chain{i}0 {{}} class Chain{i}1 : Chain{i}0 {{}} class Chain{i}2 : Chain{i}1 {{}}\n\
             class Cyc{i}A : Cyc{i}B {{}} class Cyc{i}B : Cyc{i}C {{}} class Cyc{i}C : Cyc{i}A {{}}\n\
             class Tail{i} : Cyc{i}A {{}}\n\
             interface I{i}X : I{i}Y {{}} interface I{i}Y : I{i}X {{}} class Impl{i} : I{i}X {{}}\n\
             class G{i}<T> : H{i}<G{i}<T>> {{}} class H{i}<T> : G{i}<H{i}<T>> {{}}\n\
             class Bind{i}A : Bind{i}B.X {{}} class Bind{i}B : Bind{i}A.Y {{}}\n\
             interface IBox{i}<T> {{}} class Box{i}<T> : IBox{i}<T> {{}} class Self{i} : Box{i}<Self{i}> {{}}\n"
        ));
    }
    source
}

#[derive(Debug, PartialEq)]
struct State {
    types: Vec<(String, Option<String>, Vec<String>, Vec<String>)>,
    diagnostics: Vec<Diagnostic>,
}

fn state(c: &Compilation) -> State {
    let render = |list: &[TypeRef]| -> Vec<String> { list.iter().map(|t| c.display(t)).collect() };
    let types = c
        .symbols()
        .type_ids()
        .map(|ty| {
            (
                c.type_name(ty),
                c.base_type(ty).map(|b| c.display(b)),
                render(c.interfaces(ty)),
                render(c.all_interfaces(ty)),
            )
        })
        .collect();
    State {
        types,
        diagnostics: c.diagnostics(),
    }
}

#[test]
fn test_parallel_resolution_matches_sequential() {
    let source = generated_source(40);

    let sequential = compile(&source);
    sequential.resolve_all();

    let parallel = compile(&source);
    parallel.resolve_all_parallel();

    assert_eq!(state(&sequential), state(&parallel));
}

#[test]
fn test_concurrent_queries_in_rotated_orders() {
    let source = generated_source(25);
    let reference = compile(&source);
    let expected = state(&reference);

    for stride in [1usize, 7, 13] {
        let c = compile(&source);
        let ids: Vec<TypeId> = c.symbols().type_ids().collect();
        let n = ids.len();
        (0..n).into_par_iter().for_each(|i| {
            let ty = ids[(i * stride + n / 2) % n];
            if i % 2 == 0 {
                c.interfaces(ty);
                c.base_type(ty);
            } else {
                c.all_interfaces(ty);
            }
        });
        assert_eq!(state(&c), expected, "stride {stride}");
    }
}

#[test]
fn test_concurrent_queries_on_one_cycle() {
    let source = "class A : B {} class B : C {} class C : A {} class D : C {}";
    for _ in 0..20 {
        let c = compile(source);
        let names = ["A", "B", "C", "D"];
        names.par_iter().for_each(|name| {
            c.base_type(type_id(&c, name));
        });
        for name in ["A", "B", "C"] {
            assert!(c.is_error_type(c.base_type(type_id(&c, name)).unwrap()));
        }
        assert_eq!(base_name(&c, "D").as_deref(), Some("C"));
        assert_eq!(c.diagnostics().len(), 3);
    }
}
