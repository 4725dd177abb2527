//! Name binding of base-list expressions.

use crate::helpers::compilation_helpers::*;
use crate::helpers::diagnostic_helpers::*;
use typegraph::hir::{DiagnosticKind, SymbolRef, codes};
use typegraph::parser::parse_type_expr;

// =============================================================================
// NOT FOUND
// =============================================================================

#[test]
fn test_unknown_base_is_error_with_diagnostic() {
    let source = "class A : Missing {} class B : A {}";
    let c = compile(source);

    assert_eq!(base_name(&c, "A").as_deref(), Some("?Missing"));
    // other types are unaffected
    assert_eq!(base_name(&c, "B").as_deref(), Some("A"));

    let diagnostics = c.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        &diagnostics[0].kind,
        DiagnosticKind::TypeNotFound { name, arity: 0 } if name == "Missing"
    ));
    assert_eq!(diagnostic_text(source, &diagnostics[0]), "Missing");
}

#[test]
fn test_unknown_entries_do_not_stop_others() {
    let c = compile("interface I {} class A : Missing, I, AlsoMissing {}");
    assert_eq!(base_name(&c, "A").as_deref(), Some("?Missing"));
    assert_eq!(interface_names(&c, "A"), vec!["I", "?AlsoMissing"]);
    assert_eq!(codes(&c), vec![codes::TYPE_NOT_FOUND, codes::TYPE_NOT_FOUND]);
}

#[test]
fn test_dotted_name_not_found_names_container() {
    let c = compile("namespace N { class C {} } class A : N.D {}");
    let n = c.symbols().find_namespace("N").unwrap();
    let diagnostics = c.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        &diagnostics[0].kind,
        DiagnosticKind::DottedNameNotFound { container: SymbolRef::Namespace(ns), name, .. }
            if *ns == n && name == "D"
    ));
    assert_eq!(base_name(&c, "A").as_deref(), Some("?D"));
}

#[test]
fn test_missing_nested_type_reports_once() {
    let c = compile("class Outer {} class A : Outer.Missing.Deeper {}");
    assert_eq!(base_name(&c, "A").as_deref(), Some("?Deeper"));
    assert_eq!(codes(&c), vec![codes::DOTTED_NAME_NOT_FOUND]);
}

#[test]
fn test_namespace_is_not_a_type() {
    let c = compile("namespace N { class C {} } class A : N {}");
    assert_eq!(base_name(&c, "A").as_deref(), Some("?N"));
    assert_eq!(codes(&c), vec![codes::NOT_A_TYPE]);
}

// =============================================================================
// NAMESPACES AND USINGS
// =============================================================================

#[test]
fn test_qualified_namespace_path() {
    let c = compile("namespace Outer.Inner { public class T {} } class A : Outer.Inner.T {}");
    assert_eq!(base_name(&c, "A").as_deref(), Some("Outer.Inner.T"));
    assert_no_diagnostics(&c);
}

#[test]
fn test_enclosing_namespace_is_searched() {
    let c = compile("namespace N { class Base {} namespace M { class Derived : Base {} } }");
    assert_eq!(base_name(&c, "N.M.Derived").as_deref(), Some("N.Base"));
}

#[test]
fn test_using_imports_types() {
    let c = compile(
        "namespace Lib { public class Base {} }
         namespace App { using Lib; class Derived : Base {} }",
    );
    assert_eq!(base_name(&c, "App.Derived").as_deref(), Some("Lib.Base"));
    assert_no_diagnostics(&c);
}

#[test]
fn test_using_does_not_leak_to_other_blocks() {
    let c = compile(
        "namespace Lib { public class Base {} }
         namespace App { using Lib; }
         namespace App { class Derived : Base {} }",
    );
    assert_eq!(base_name(&c, "App.Derived").as_deref(), Some("?Base"));
    assert_eq!(codes(&c), vec![codes::TYPE_NOT_FOUND]);
}

#[test]
fn test_namespace_member_wins_over_using() {
    let c = compile(
        "namespace Lib { public class X {} }
         namespace App { using Lib; class X {} class D : X {} }",
    );
    assert_eq!(base_name(&c, "App.D").as_deref(), Some("App.X"));
}

#[test]
fn test_two_usings_with_same_name_are_ambiguous() {
    let c = compile(
        "namespace L1 { public class X {} }
         namespace L2 { public class X {} }
         namespace App { using L1; using L2; class D : X {} }",
    );
    assert_eq!(base_name(&c, "App.D").as_deref(), Some("?X"));
    let diagnostics = c.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    let DiagnosticKind::AmbiguousReference { candidates, .. } = &diagnostics[0].kind else {
        panic!("expected an ambiguity, got {:?}", diagnostics[0].kind);
    };
    assert_eq!(candidates.len(), 2);
}

#[test]
fn test_type_and_namespace_with_same_name_are_ambiguous() {
    let c = compile("namespace X { } class X {} class D : X {}");
    assert_eq!(codes(&c), vec![codes::AMBIGUOUS_REFERENCE]);
}

#[test]
fn test_unknown_using_is_reported() {
    let c = compile("using Nowhere; class A {}");
    assert_eq!(codes(&c), vec![codes::NAMESPACE_NOT_FOUND]);
}

// =============================================================================
// NESTED TYPES
// =============================================================================

#[test]
fn test_sibling_nested_type_in_scope() {
    let c = compile("class Outer { class Sibling {} class Inner : Sibling {} }");
    assert_eq!(base_name(&c, "Outer.Inner").as_deref(), Some("Outer.Sibling"));
}

#[test]
fn test_nested_type_inherited_by_enclosing_type_in_scope() {
    let c = compile(
        "class Base { public class Helper {} }
         class Outer : Base { class Inner : Helper {} }",
    );
    assert_eq!(base_name(&c, "Outer.Inner").as_deref(), Some("Base.Helper"));
    assert_no_diagnostics(&c);
}

#[test]
fn test_inherited_nested_type_through_qualifier() {
    let c = compile(
        "class Base { public class Helper {} }
         class Mid : Base {}
         class User : Mid.Helper {}",
    );
    assert_eq!(base_name(&c, "User").as_deref(), Some("Base.Helper"));
}

#[test]
fn test_base_clause_does_not_see_own_members() {
    let c = compile("class U : Nested { class Nested {} }");
    assert_eq!(base_name(&c, "U").as_deref(), Some("?Nested"));
    assert_eq!(codes(&c), vec![codes::TYPE_NOT_FOUND]);
}

#[test]
fn test_resolve_type_expression_sees_members_of_context() {
    let c = compile("class C { class N {} } class N {}");
    let context = type_id(&c, "C");
    let expr = parse_type_expr("N").unwrap();
    let resolved = c.resolve_type_expression(&expr, context);
    assert_eq!(c.display(&resolved), "C.N");

    let missing = c.resolve_type_expression(&parse_type_expr("Q.R").unwrap(), context);
    assert!(c.is_error_type(&missing));
}

#[test]
fn test_resolve_type_expression_returns_binding_diagnostics() {
    let c = compile("class C {}");
    let context = type_id(&c, "C");
    let expr = parse_type_expr("Missing").unwrap();
    let (resolved, diagnostics) = c.resolve_type_expression_with_diagnostics(&expr, context);
    assert!(c.is_error_type(&resolved));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), codes::TYPE_NOT_FOUND);
    // nothing is reported to the compilation
    assert_no_diagnostics(&c);
}
