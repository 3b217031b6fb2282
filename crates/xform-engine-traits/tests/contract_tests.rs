//! Tests for the shared engine contract types

use std::error::Error as _;

use xform_engine_traits::newline::NEWLINE;
use xform_engine_traits::{
    Diagnostic, DiagnosticList, EngineError, EngineErrorKind, EngineKind, Parameter, ParameterSet,
};

// ============== Diagnostics ==============

#[test]
fn diagnostic_renders_position() {
    let d = Diagnostic::new("unexpected end of stream", 3, 7);
    assert_eq!(d.to_string(), "unexpected end of stream at line 3, column 7");
}

#[test]
fn diagnostic_list_drops_duplicates_keeping_order() {
    let list: DiagnosticList = vec![
        Diagnostic::new("b", 2, 1),
        Diagnostic::new("a", 1, 1),
        Diagnostic::new("b", 2, 1),
    ]
    .into_iter()
    .collect();

    assert_eq!(list.len(), 2);
    assert_eq!(
        list.to_string(),
        format!("b at line 2, column 1{NEWLINE}a at line 1, column 1")
    );
}

#[test]
fn compile_error_root_cause_is_diagnostics() {
    let mut diagnostics = DiagnosticList::new();
    diagnostics.push(Diagnostic::new("missing name", 4, 2));
    let err = EngineError::compile("stylesheet failed to compile", diagnostics);

    assert_eq!(err.kind(), EngineErrorKind::Compile);
    assert_eq!(err.to_string(), "stylesheet failed to compile");
    let source = err.source().expect("compile error should expose diagnostics");
    assert_eq!(source.to_string(), "missing name at line 4, column 2");
    assert_eq!(err.diagnostics().len(), 1);
}

#[test]
fn execution_errors_have_no_source() {
    let err = EngineError::execution("division by zero");
    assert_eq!(err.kind(), EngineErrorKind::Execution);
    assert!(err.source().is_none());
    assert!(err.diagnostics().is_empty());

    let err = EngineError::invalid_input("bad json");
    assert_eq!(err.kind(), EngineErrorKind::Execution);
}

// ============== Parameters ==============

#[test]
fn parameter_set_keeps_order_and_duplicates() {
    let mut params = ParameterSet::new();
    params.add(Parameter::new("a", "1"));
    params.add(Parameter::new("b", "2"));
    params.add(Parameter::new("a", "3"));

    let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "a"]);
}

#[test]
fn parameter_set_edit_operations() {
    let mut params = ParameterSet::from_names(["x", "y"]);
    assert!(params.iter().all(|p| p.value.is_empty()));

    assert!(params.rename(0, "z"));
    assert!(params.set_value(1, "v"));
    assert!(!params.rename(5, "nope"));
    assert!(!params.set_value(5, "nope"));

    assert_eq!(params.get(0), Some(&Parameter::new("z", "")));
    assert_eq!(params.remove(1), Some(Parameter::new("y", "v")));
    assert_eq!(params.remove(1), None);
    assert_eq!(params.len(), 1);
}

#[test]
fn unnamed_parameters_are_not_bound() {
    let params: ParameterSet = vec![
        Parameter::new("", "ignored"),
        Parameter::new("  ", "ignored"),
        Parameter::new("p", "v"),
    ]
    .into_iter()
    .collect();

    let bound: Vec<_> = params.bound().collect();
    assert_eq!(bound, vec![&Parameter::new("p", "v")]);
}

#[test]
fn parameter_set_serializes_as_list() {
    let params = ParameterSet::from_names(["a"]);
    let json = serde_json::to_string(&params).unwrap();
    assert_eq!(json, r#"[{"name":"a","value":""}]"#);
}

// ============== Engine kinds ==============

#[test]
fn engine_kind_round_trips_identifiers() {
    for kind in EngineKind::ALL {
        assert_eq!(kind.to_string().parse::<EngineKind>().unwrap(), kind);
    }
    assert_eq!("JSON".parse::<EngineKind>().unwrap(), EngineKind::JsonTransform);
    assert!("xquery".parse::<EngineKind>().is_err());
}

#[test]
fn engine_kind_default_is_standard() {
    assert_eq!(EngineKind::default(), EngineKind::StandardXslt);
}

#[test]
fn raw_compile_error_is_its_own_root() {
    let err = EngineError::compile_raw("engine rejected stylesheet");
    assert_eq!(err.kind(), EngineErrorKind::Compile);
    assert!(err.source().is_none());

    let err = EngineError::compile("no diagnostics", DiagnosticList::new());
    assert!(err.source().is_none(), "empty diagnostics must not become the cause");
}
