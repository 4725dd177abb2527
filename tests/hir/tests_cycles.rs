//! Inheritance cycles: direct, mutual, through binding, through generics.

use std::sync::Arc;

use crate::helpers::compilation_helpers::*;
use crate::helpers::diagnostic_helpers::*;
use typegraph::hir::{DiagnosticCollector, DiagnosticKind, ErrorReason, TypeRef, codes};

// =============================================================================
// BASE CYCLES
// =============================================================================

#[test]
fn test_self_cycle_is_error() {
    let c = compile("class A : A {}");
    let a = type_id(&c, "A");

    let base = c.base_type(a).unwrap();
    assert!(c.is_error_type(base));
    assert_ne!(base, &TypeRef::named(a));
    assert_eq!(c.display(base), "?A");
    assert_eq!(cycle_pairs(&c), vec![("A".to_string(), "A".to_string())]);
}

#[test]
fn test_mutual_cycle_reports_each_neighbor_once() {
    let c = compile("class A : B {} class B : A {}");

    assert!(c.is_error_type(c.base_type(type_id(&c, "A")).unwrap()));
    assert!(c.is_error_type(c.base_type(type_id(&c, "B")).unwrap()));
    assert_eq!(
        cycle_pairs(&c),
        vec![
            ("A".to_string(), "B".to_string()),
            ("B".to_string(), "A".to_string()),
        ]
    );
    assert_eq!(codes(&c), vec![codes::CIRCULAR_BASE, codes::CIRCULAR_BASE]);
}

#[test]
fn test_three_cycle_each_member_names_its_successor() {
    let c = compile("class A : B {} class B : C {} class C : A {}");
    assert_eq!(
        cycle_pairs(&c),
        vec![
            ("A".to_string(), "B".to_string()),
            ("B".to_string(), "C".to_string()),
            ("C".to_string(), "A".to_string()),
        ]
    );
}

#[test]
fn test_type_deriving_from_cycle_member_keeps_real_base() {
    let c = compile("class A : B {} class B : A {} class D : A {}");
    let d = type_id(&c, "D");
    assert_eq!(base_name(&c, "D").as_deref(), Some("A"));
    assert!(
        c.diagnostics()
            .iter()
            .all(|diag| diag.kind.subject() != Some(d))
    );
}

#[test]
fn test_cycle_error_carries_neighbor() {
    let c = compile("class A : B {} class B : A {}");
    let a = type_id(&c, "A");
    let b = type_id(&c, "B");
    let err = c.base_type(a).and_then(TypeRef::as_error).unwrap();
    assert_eq!(err.reason, ErrorReason::CircularBase { neighbor: b });
    assert_eq!(err.name.as_str(), "B");
}

#[test]
fn test_cycle_diagnostic_points_at_base_expression() {
    let source = "class A : B {}\nclass B : A {}";
    let c = compile(source);
    let diagnostics = c.diagnostics();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostic_text(source, &diagnostics[0]), "B");
    assert_eq!(diagnostic_text(source, &diagnostics[1]), "A");
}

// =============================================================================
// CYCLES FOUND WHILE BINDING
// =============================================================================

#[test]
fn test_binding_cycle_through_qualified_names() {
    let source = "class A : B.X {} class B : A.Y {}";
    let c = compile(source);

    assert_eq!(base_name(&c, "A").as_deref(), Some("?X"));
    assert_eq!(base_name(&c, "B").as_deref(), Some("?Y"));
    assert_eq!(
        cycle_pairs(&c),
        vec![
            ("A".to_string(), "B".to_string()),
            ("B".to_string(), "A".to_string()),
        ]
    );
    // the not-found diagnostics of the cyclic qualifiers are suppressed
    assert_eq!(codes(&c), vec![codes::CIRCULAR_BASE, codes::CIRCULAR_BASE]);
    let diagnostics = c.diagnostics();
    assert_eq!(diagnostic_text(source, &diagnostics[0]), "B.X");
    assert_eq!(diagnostic_text(source, &diagnostics[1]), "A.Y");
}

#[test]
fn test_binding_cycle_attributed_to_reentered_type() {
    let c = compile("class B : A.Y {} class A : B {}");

    assert!(c.is_error_type(c.base_type(type_id(&c, "B")).unwrap()));
    // A's own chain ends at B's error base without coming back to A
    assert_eq!(base_name(&c, "A").as_deref(), Some("B"));
    assert_eq!(cycle_pairs(&c), vec![("B".to_string(), "A".to_string())]);
}

#[test]
fn test_self_reference_through_inherited_nested_type() {
    let c = compile("class B<T> { public class Y {} } class A : B<A.Y> {}");

    assert!(c.is_error_type(c.base_type(type_id(&c, "A")).unwrap()));
    assert_eq!(cycle_pairs(&c), vec![("A".to_string(), "A".to_string())]);
}

#[test]
fn test_qualified_name_through_cyclic_pair() {
    let c = compile("class A : B { class X {} } class B : A { class Y {} } class Z : A.Y {}");
    let z = type_id(&c, "Z");

    let base = c.base_type(z).unwrap();
    let def = base.def().unwrap();
    assert_eq!(c.symbols().type_symbol(def).name.as_str(), "Y");
    assert_eq!(c.display(base), "B.Y");
    assert!(
        c.diagnostics()
            .iter()
            .all(|d| d.kind.subject() != Some(z))
    );
}

#[test]
fn test_nested_type_qualified_through_self_is_legal() {
    let c = compile("class U : U.I { public interface I {} }");
    assert_eq!(interface_names(&c, "U"), vec!["U.I"]);
    assert_eq!(base_name(&c, "U").as_deref(), Some("System.Object"));
    assert_no_diagnostics(&c);
}

// =============================================================================
// GENERIC CYCLES
// =============================================================================

#[test]
fn test_generic_definitions_depending_on_each_other_cycle() {
    let c = compile("class A<T> : B<A<T>> {} class B<T> : A<B<T>> {}");
    assert!(c.is_error_type(c.base_type(type_id(&c, "A<>")).unwrap()));
    assert!(c.is_error_type(c.base_type(type_id(&c, "B<>")).unwrap()));
    assert_eq!(
        cycle_pairs(&c),
        vec![
            ("A".to_string(), "B".to_string()),
            ("B".to_string(), "A".to_string()),
        ]
    );
}

// =============================================================================
// INTERFACE CYCLES
// =============================================================================

#[test]
fn test_interface_cycle() {
    let c = compile("interface I1 : I2 {} interface I2 : I1 {} class C : I1 {}");

    let i1 = interface_names(&c, "I1");
    assert_eq!(i1, vec!["?I2"]);
    assert!(all_interface_names(&c, "I1").is_empty());
    assert_eq!(interface_names(&c, "C"), vec!["I1"]);
    assert_eq!(all_interface_names(&c, "C"), vec!["I1"]);

    let cycles = diagnostics_where(&c, |k| {
        matches!(k, DiagnosticKind::CycleInInterfaceInheritance { .. })
    });
    assert_eq!(cycles.len(), 2);
    assert_eq!(
        cycle_pairs(&c),
        vec![
            ("I1".to_string(), "I2".to_string()),
            ("I2".to_string(), "I1".to_string()),
        ]
    );
}

#[test]
fn test_interface_self_cycle() {
    let c = compile("interface I : I {}");
    assert_eq!(interface_names(&c, "I"), vec!["?I"]);
    assert_eq!(codes(&c), vec![codes::CYCLE_IN_INTERFACE_INHERITANCE]);
}

// =============================================================================
// MEMOIZATION
// =============================================================================

#[test]
fn test_base_type_is_memoized() {
    let collector = Arc::new(DiagnosticCollector::new());
    let c = compile("class A : A {}").with_sink(collector.clone());
    let a = type_id(&c, "A");

    let first = c.base_type(a).unwrap();
    assert_eq!(collector.len(), 1);

    let second = c.base_type(a).unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(collector.len(), 1);

    c.resolve_all();
    assert_eq!(collector.len(), 1);
}

#[test]
fn test_sink_receives_declaration_diagnostics_first() {
    let collector = Arc::new(DiagnosticCollector::new());
    let c = compile("class D {} class D {} class A : A {}").with_sink(collector.clone());
    assert_eq!(collector.len(), 1);
    c.resolve_all();
    let received: Vec<&str> = collector.diagnostics().iter().map(|d| d.code()).collect();
    assert_eq!(
        received,
        vec![codes::DUPLICATE_TYPE_DECLARATION, codes::CIRCULAR_BASE]
    );
}
