//! Base-list legality, accessibility consistency and implicit bases.

use rstest::rstest;

use crate::helpers::compilation_helpers::*;
use crate::helpers::diagnostic_helpers::*;
use typegraph::hir::{CompilationOptions, DiagnosticKind, codes};

// =============================================================================
// STRUCTURAL CHECKS
// =============================================================================

#[test]
fn test_sealed_base_class_is_kept() {
    let c = compile("sealed class B {} class D : B {}");
    let (b, d) = (type_id(&c, "B"), type_id(&c, "D"));
    assert_eq!(base_name(&c, "D").as_deref(), Some("B"));
    let diagnostics = c.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::SealedBaseClass { ty: d, base: b }
    );
}

#[rstest]
#[case::static_base("static class S {} class D : S {}", codes::STATIC_BASE_CLASS)]
#[case::static_class_with_base("class B {} static class S : B {}", codes::STATIC_CLASS_BASE)]
#[case::static_class_with_interface(
    "interface I {} static class S : I {}",
    codes::STATIC_CLASS_INTERFACE
)]
#[case::struct_base("struct V {} class D : V {}", codes::SEALED_BASE_CLASS)]
#[case::enum_base("enum E { A } class D : E {}", codes::SEALED_BASE_CLASS)]
fn test_illegal_base_reports_one_diagnostic(#[case] source: &str, #[case] code: &str) {
    let c = compile(source);
    assert_eq!(codes(&c), vec![code]);
}

#[test]
fn test_class_in_struct_base_list_is_not_an_interface() {
    let c = compile("class K {} struct S : K {}");
    let (k, s) = (type_id(&c, "K"), type_id(&c, "S"));
    assert_eq!(base_name(&c, "S").as_deref(), Some("System.ValueType"));
    assert_eq!(
        c.declared_interfaces(s).len(),
        0,
        "a class never lands in the interface list"
    );
    let diagnostics = c.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::NotAnInterface { ty: s, found: k }
    );
}

#[test]
fn test_base_class_must_come_first() {
    let c = compile("interface I {} class B {} class C : I, B {}");
    assert_eq!(base_name(&c, "C").as_deref(), Some("System.Object"));
    assert_eq!(interface_names(&c, "C"), vec!["I"]);
    assert_eq!(codes(&c), vec![codes::BASE_CLASS_MUST_BE_FIRST]);
}

#[test]
fn test_partial_pieces_with_different_bases_keep_first() {
    let c = compile("class B1 {} class B2 {} partial class P : B1 {} partial class P : B2 {}");
    assert_eq!(base_name(&c, "P").as_deref(), Some("B1"));
    assert_eq!(codes(&c), vec![codes::PARTIAL_BASE_CLASS_MISMATCH]);
}

#[test]
fn test_partial_pieces_with_same_base_agree() {
    let c = compile("class B {} partial class P : B {} partial class P : B {}");
    assert_eq!(base_name(&c, "P").as_deref(), Some("B"));
    assert_no_diagnostics(&c);
}

#[test]
fn test_partial_pieces_merge_interfaces() {
    let c = compile(
        "interface I1 {} interface I2 {} partial class P : I1 {} partial class P : I2 {}",
    );
    assert_eq!(interface_names(&c, "P"), vec!["I1", "I2"]);
    assert_no_diagnostics(&c);
}

#[test]
fn test_partial_pieces_bind_in_their_own_file() {
    let c = compile_files(&[
        "namespace Lib { public class Base {} }",
        "using Lib; partial class P : Base {}",
        "partial class P : I {} interface I {}",
    ]);
    assert_eq!(base_name(&c, "P").as_deref(), Some("Lib.Base"));
    assert_eq!(interface_names(&c, "P"), vec!["I"]);
    assert_no_diagnostics(&c);
}

#[test]
fn test_using_does_not_reach_other_files() {
    let c = compile_files(&[
        "namespace Lib { public class Base {} }",
        "using Lib; partial class P {}",
        "partial class P : Base {}",
    ]);
    assert_eq!(base_name(&c, "P").as_deref(), Some("?Base"));
    assert_eq!(codes(&c), vec![codes::TYPE_NOT_FOUND]);
}

#[test]
fn test_duplicate_interface_across_pieces() {
    let c = compile("interface I {} partial class P : I {} partial class P : I {}");
    assert_eq!(interface_names(&c, "P"), vec!["I"]);
    assert_eq!(codes(&c), vec![codes::DUPLICATE_INTERFACE]);
}

#[test]
fn test_duplicate_interface_is_listed_once() {
    let c = compile("interface I {} interface J : I, I {}");
    let (i, j) = (type_id(&c, "I"), type_id(&c, "J"));
    assert_eq!(interface_names(&c, "J"), vec!["I"]);
    let diagnostics = c.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::DuplicateInterface { ty: j, interface: i }
    );
}

#[test]
fn test_different_instantiations_are_not_duplicates() {
    let c = compile("interface I<T> {} class A {} class B {} class C : I<A>, I<B> {}");
    assert_eq!(interface_names(&c, "C"), vec!["I<A>", "I<B>"]);
    assert_no_diagnostics(&c);
}

// =============================================================================
// ACCESSIBILITY
// =============================================================================

const HIDDEN_BASE: &str =
    "public class Outer { private class Hidden {} public class Visible : Hidden {} }";

#[test]
fn test_less_accessible_base_is_reported_and_kept() {
    let c = compile(HIDDEN_BASE);
    let (hidden, visible) = (type_id(&c, "Outer.Hidden"), type_id(&c, "Outer.Visible"));
    assert_eq!(base_name(&c, "Outer.Visible").as_deref(), Some("Outer.Hidden"));
    let diagnostics = c.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::InconsistentBaseAccessibility {
            ty: visible,
            base: hidden
        }
    );
    assert_eq!(diagnostic_text(HIDDEN_BASE, &diagnostics[0]), "Hidden");
}

#[test]
fn test_accessibility_checks_can_be_disabled() {
    let options = CompilationOptions::default().with_accessibility_checks(false);
    let c = compile_with(HIDDEN_BASE, options);
    assert_eq!(base_name(&c, "Outer.Visible").as_deref(), Some("Outer.Hidden"));
    assert_no_diagnostics(&c);
}

#[test]
fn test_type_argument_limits_accessibility() {
    let c = compile("public class Box<T> {} class Secret {} public class Leak : Box<Secret> {}");
    assert_eq!(codes(&c), vec![codes::INCONSISTENT_BASE_ACCESSIBILITY]);
}

#[test]
fn test_enclosing_type_limits_accessibility() {
    let c = compile("class Inner { public class Nested {} } public class Leak : Inner.Nested {}");
    assert_eq!(codes(&c), vec![codes::INCONSISTENT_BASE_ACCESSIBILITY]);
}

#[test]
fn test_less_accessible_base_interface() {
    let c = compile("interface I {} public interface J : I {}");
    assert_eq!(codes(&c), vec![codes::INCONSISTENT_INTERFACE_ACCESSIBILITY]);
}

#[test]
fn test_class_may_implement_less_accessible_interface() {
    let c = compile("interface I {} public class C : I {}");
    assert_no_diagnostics(&c);
}

#[test]
fn test_structural_diagnostics_precede_accessibility() {
    let c = compile(
        "public class Outer { private sealed class Hidden {} public class Visible : Hidden {} }",
    );
    assert_eq!(
        codes(&c),
        vec![
            codes::SEALED_BASE_CLASS,
            codes::INCONSISTENT_BASE_ACCESSIBILITY
        ]
    );
}

#[test]
fn test_accessibility_checked_alongside_cycle() {
    let c = compile(
        "public class Outer {
             private class Hidden : Visible {}
             public class Visible : Hidden {}
         }",
    );
    let diagnostics = c.diagnostics();
    let visible = type_id(&c, "Outer.Visible");
    assert!(diagnostics.iter().any(|d| matches!(
        d.kind,
        DiagnosticKind::InconsistentBaseAccessibility { ty, .. } if ty == visible
    )));
    assert_eq!(cycle_pairs(&c).len(), 2);
}

// =============================================================================
// IMPLICIT BASES
// =============================================================================

#[rstest]
#[case::class("class C {}", "C", Some("System.Object"))]
#[case::structure("struct S {}", "S", Some("System.ValueType"))]
#[case::enumeration("enum E { A, B }", "E", Some("System.Enum"))]
#[case::delegate("delegate void D();", "D", Some("System.MulticastDelegate"))]
#[case::interface("interface I {}", "I", None)]
#[case::object("class C {}", "System.Object", None)]
#[case::value_type("class C {}", "System.ValueType", Some("System.Object"))]
#[case::multicast("class C {}", "System.MulticastDelegate", Some("System.Delegate"))]
fn test_implicit_base(#[case] source: &str, #[case] name: &str, #[case] expected: Option<&str>) {
    let c = compile(source);
    assert_eq!(base_name(&c, name).as_deref(), expected);
    assert_eq!(
        c.declared_base_type(type_id(&c, name)).is_some(),
        expected.is_some()
    );
}

#[test]
fn test_no_implicit_base_without_core_library() {
    let options = CompilationOptions::default().with_core_library(false);
    let c = compile_with("class C {} struct S {}", options);
    assert_eq!(base_name(&c, "C"), None);
    assert_eq!(base_name(&c, "S"), None);
    assert_no_diagnostics(&c);
}

#[test]
fn test_source_object_becomes_root() {
    let c = compile("namespace System { public class Object {} } class C {}");
    assert_eq!(base_name(&c, "C").as_deref(), Some("System.Object"));
    assert_eq!(base_name(&c, "System.Object"), None);
}
