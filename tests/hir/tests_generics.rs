//! Generic instantiations: non-cycles through type arguments, substitution.

use crate::helpers::compilation_helpers::*;
use crate::helpers::diagnostic_helpers::*;
use typegraph::hir::{DiagnosticKind, TypeRef, codes};

#[test]
fn test_self_as_type_argument_is_not_a_cycle() {
    let c = compile("class N<T> {} class O : N<O> {}");
    let base = c.base_type(type_id(&c, "O")).unwrap();
    assert!(!c.is_error_type(base));
    assert_eq!(c.display(base), "N<O>");
    assert_no_diagnostics(&c);
}

#[test]
fn test_self_as_interface_argument_is_not_a_cycle() {
    let c = compile("interface I<T> {} class E : I<E> {}");
    assert_eq!(interface_names(&c, "E"), vec!["I<E>"]);
    assert_no_diagnostics(&c);
}

#[test]
fn test_arity_selects_definition() {
    let c = compile("class G {} class G<T> {} class G<T, U> {} class X : G<X, X> {}");
    let base = c.base_type(type_id(&c, "X")).unwrap();
    assert_eq!(base.def(), Some(type_id(&c, "G<,>")));
    assert_eq!(c.display(base), "G<X, X>");
}

#[test]
fn test_all_interfaces_substitutes_base_arguments() {
    let c = compile(
        "interface IEnumerable<T> {}
         interface IList<T> : IEnumerable<T> {}
         class Collection<T> : IList<T> {}
         class Names : Collection<Names> {}",
    );
    assert_eq!(
        all_interface_names(&c, "Collection<>"),
        vec!["IList<T>", "IEnumerable<T>"]
    );
    assert!(interface_names(&c, "Names").is_empty());
    assert_eq!(
        all_interface_names(&c, "Names"),
        vec!["IList<Names>", "IEnumerable<Names>"]
    );
}

#[test]
fn test_constructed_type_queries_substitute() {
    let c = compile("interface IBox<T> {} class Box<T> : IBox<T> {} class IntBox : Box<IntBox> {}");
    let int_box = type_id(&c, "IntBox");
    let Some(TypeRef::Named(constructed)) = c.base_type(int_box).cloned() else {
        panic!("expected a constructed base");
    };
    assert_eq!(c.display(&TypeRef::Named(constructed.clone())), "Box<IntBox>");

    let base = c.base_type_of(&constructed).unwrap();
    assert_eq!(c.display(&base), "System.Object");
    let interfaces: Vec<String> = c
        .interfaces_of(&constructed)
        .iter()
        .map(|i| c.display(i))
        .collect();
    assert_eq!(interfaces, vec!["IBox<IntBox>"]);
    let all: Vec<String> = c
        .all_interfaces_of(&constructed)
        .iter()
        .map(|i| c.display(i))
        .collect();
    assert_eq!(all, vec!["IBox<IntBox>"]);
}

#[test]
fn test_nested_type_through_generic_outer_records_containing_type() {
    let c = compile("class Outer<T> { public class Inner {} } class User : Outer<User>.Inner {}");
    let base = c.base_type(type_id(&c, "User")).unwrap();
    assert_eq!(c.display(base), "Outer<User>.Inner");
    let named = base.as_named().unwrap();
    assert_eq!(named.def, type_id(&c, "Outer.Inner"));
    assert!(named.containing.is_some());
    assert_no_diagnostics(&c);
}

#[test]
fn test_enclosing_type_parameter_in_nested_base() {
    let c = compile("class Box<T> {} class Outer<T> { class Inner : Box<T> {} }");
    assert_eq!(base_name(&c, "Outer.Inner").as_deref(), Some("Box<T>"));
    assert_no_diagnostics(&c);
}

#[test]
fn test_type_parameter_as_base_is_error() {
    let c = compile("class G<T> : T {}");
    let g = type_id(&c, "G<>");
    assert_eq!(base_name(&c, "G<>").as_deref(), Some("?T"));
    let diagnostics = c.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        diagnostics[0].kind,
        DiagnosticKind::TypeParameterBase { ty, .. } if ty == g
    ));
    assert_eq!(diagnostics[0].code(), codes::TYPE_PARAMETER_BASE);
}

#[test]
fn test_missing_type_argument_keeps_constructed_base() {
    let c = compile("class Box<T> {} class A : Box<Missing> {}");
    assert_eq!(base_name(&c, "A").as_deref(), Some("Box<?Missing>"));
    assert_eq!(codes(&c), vec![codes::TYPE_NOT_FOUND]);
}
