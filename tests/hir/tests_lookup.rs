//! Member lookup over declared hierarchies, including cyclic ones.

use crate::helpers::compilation_helpers::*;
use typegraph::hir::{LookupOptions, TypeRef, instance_type};

#[test]
fn test_member_inherited_through_three_cycle() {
    let c = compile("class A : B {} class B : C {} class C : A { public int Z; }");
    assert_eq!(member_names(&c, "A", "Z"), vec!["C.Z"]);
    assert_eq!(member_names(&c, "B", "Z"), vec!["C.Z"]);
    assert!(member_names(&c, "A", "Q").is_empty());
}

#[test]
fn test_lookup_before_resolution_on_cycle() {
    let c = compile("class A : B { public int X; } class B : A { public int Y; }");
    let a = type_id(&c, "A");

    assert_eq!(member_names(&c, "A", "Y"), vec!["B.Y"]);
    assert_eq!(member_names(&c, "B", "X"), vec!["A.X"]);
    // lookup does not settle the cycle in either direction
    assert!(c.is_error_type(c.base_type(a).unwrap()));
    assert_eq!(member_names(&c, "A", "X"), vec!["A.X"]);
}

#[test]
fn test_derived_member_hides_base_member() {
    let c = compile(
        "class B { public void M() {} public int Only; }
         class D : B { public void M() {} }",
    );
    assert_eq!(member_names(&c, "D", "M"), vec!["D.M"]);
    assert_eq!(member_names(&c, "D", "Only"), vec!["B.Only"]);

    let all: Vec<String> = c
        .lookup_member_with(type_id(&c, "D"), "M", LookupOptions::all_levels())
        .into_iter()
        .map(|s| c.display_symbol(s))
        .collect();
    assert_eq!(all, vec!["D.M", "B.M"]);
}

#[test]
fn test_interface_bases_are_searched_breadth_first() {
    let c = compile(
        "interface IA { void F(); }
         interface IB { void F(); }
         interface IC : IA, IB {}",
    );
    assert_eq!(member_names(&c, "IC", "F"), vec!["IA.F", "IB.F"]);
}

#[test]
fn test_overloads_are_all_found() {
    let c = compile("class B { void M() {} void M(int a) {} } class D : B {}");
    assert_eq!(member_names(&c, "D", "M").len(), 2);
}

#[test]
fn test_lookup_on_constructed_type_substitutes_owner() {
    let c = compile("class Box<T> { public T Value; } class IntBox : Box<IntBox> {}");
    let start = instance_type(c.symbols(), type_id(&c, "IntBox"));
    let hits = c.lookup_member_in(&start, "Value", LookupOptions::default());
    assert_eq!(hits.len(), 1);
    assert_eq!(c.display(&TypeRef::Named(hits[0].owner.clone())), "Box<IntBox>");
    assert_eq!(c.display_symbol(hits[0].symbol), "Box.Value");
}

#[test]
fn test_nested_types_are_members() {
    let c = compile("class A : Missing { public class N {} }");
    assert_eq!(member_names(&c, "A", "N"), vec!["A.N"]);
    assert!(member_names(&c, "A", "Q").is_empty());
}

#[test]
fn test_nested_type_inherited_through_base() {
    let c = compile("class B { public class N {} } class D : B {}");
    assert_eq!(member_names(&c, "D", "N"), vec!["B.N"]);
}

#[test]
fn test_members_of_core_object_are_empty() {
    let c = compile("class A {}");
    assert!(member_names(&c, "A", "ToString").is_empty());
}
