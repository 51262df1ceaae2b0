use serde_json::json;

use super::{
    CompletionItem, CompletionItemKind, CompletionList, Definition, Diagnostic,
    DiagnosticSeverity, Documentation, Hover, MarkedString, MarkupContent, MarkupKind,
    NumberOrString, Profile, definition, diagnostic, marked_string,
};
use crate::shape::Shape;
use crate::types::{Location, Position, Range};

fn sample_range() -> Range {
    Range::new(Position::new(1, 0), Position::new(1, 5)).unwrap()
}

#[test]
fn registries_build_for_both_profiles() -> anyhow::Result<()> {
    for profile in [Profile::Standard, Profile::Vendor] {
        let registry = profile.registry()?;
        assert_eq!(registry.len(), 7);
    }
    Ok(())
}

#[test]
fn every_catalog_union_is_kind_disjoint() -> anyhow::Result<()> {
    for profile in [Profile::Standard, Profile::Vendor] {
        let registry = profile.registry()?;
        for descriptor in registry.methods() {
            let mut shapes = vec![descriptor.params()];
            if let Some(reply) = descriptor.reply() {
                shapes.push(&reply.result);
                shapes.push(&reply.error);
            }
            for shape in shapes {
                shape.for_each(&mut |s| {
                    assert!(
                        s.has_disjoint_alternatives(),
                        "ambiguous union in {}: {s}",
                        descriptor.name()
                    );
                });
            }
        }
    }
    Ok(())
}

#[test]
fn definition_object_decodes_as_single_location() -> anyhow::Result<()> {
    let wire = json!({"uri": "file:///a.rs", "range": {
        "start": {"line": 1, "character": 0},
        "end": {"line": 1, "character": 5},
    }});
    assert!(definition().matches(&wire));

    let decoded: Definition = serde_json::from_value(wire)?;
    assert!(matches!(decoded, Definition::Single(_)));
    Ok(())
}

#[test]
fn definition_array_decodes_as_many_locations() -> anyhow::Result<()> {
    let wire = json!([{"uri": "file:///a.rs", "range": {
        "start": {"line": 1, "character": 0},
        "end": {"line": 1, "character": 5},
    }}]);
    assert!(definition().matches(&wire));

    let decoded: Definition = serde_json::from_value(wire)?;
    assert!(matches!(decoded, Definition::Many(locations) if locations.len() == 1));
    Ok(())
}

#[test]
fn range_shape_rejects_reversed_bounds() {
    let reversed = json!({
        "start": {"line": 6, "character": 0},
        "end": {"line": 5, "character": 0},
    });
    assert!(!super::range().matches(&reversed));

    // Same line, reversed characters.
    assert!(!super::range().matches(&json!({
        "start": {"line": 5, "character": 4},
        "end": {"line": 5, "character": 2},
    })));

    let err = diagnostic()
        .decode(json!({"range": reversed, "message": "m"}))
        .unwrap_err();
    assert_eq!(err.path, "$.range");
    assert_eq!(err.expected, "range with start <= end");
}

#[test]
fn diagnostic_without_severity_stays_absent() -> anyhow::Result<()> {
    let wire = json!({
        "range": {
            "start": {"line": 0, "character": 0},
            "end": {"line": 0, "character": 3},
        },
        "message": "unused variable",
    });
    let decoded = diagnostic().decode(wire.clone())?;
    assert_eq!(decoded, wire, "absence is preserved, not defaulted");

    let typed: Diagnostic = serde_json::from_value(wire)?;
    assert_eq!(typed.severity, None);
    assert_eq!(typed.code, None);
    Ok(())
}

#[test]
fn diagnostic_severity_out_of_range_fails_decode() {
    let wire = json!({
        "range": {
            "start": {"line": 0, "character": 0},
            "end": {"line": 0, "character": 3},
        },
        "severity": 5,
        "message": "m",
    });
    let err = diagnostic().decode(wire.clone()).unwrap_err();
    assert_eq!(err.path, "$.severity");

    assert!(serde_json::from_value::<Diagnostic>(wire).is_err());
}

#[test]
fn diagnostic_code_takes_either_union_arm() -> anyhow::Result<()> {
    let with_number = json!({
        "range": {
            "start": {"line": 0, "character": 0},
            "end": {"line": 0, "character": 1},
        },
        "code": 404,
        "message": "m",
    });
    let typed: Diagnostic = serde_json::from_value(with_number)?;
    assert_eq!(typed.code, Some(NumberOrString::Number(404)));

    let with_string = json!({
        "range": {
            "start": {"line": 0, "character": 0},
            "end": {"line": 0, "character": 1},
        },
        "code": "E0308",
        "message": "m",
    });
    let typed: Diagnostic = serde_json::from_value(with_string)?;
    assert_eq!(typed.code, Some(NumberOrString::String("E0308".into())));
    Ok(())
}

#[test]
fn marked_string_union_arms() -> anyhow::Result<()> {
    assert!(marked_string().matches(&json!("plain text")));
    assert!(marked_string().matches(&json!({"language": "rust", "value": "fn f() {}"})));
    assert!(!marked_string().matches(&json!(42)));

    let plain: MarkedString = serde_json::from_value(json!("plain text"))?;
    assert!(matches!(plain, MarkedString::Plain(_)));
    let tagged: MarkedString =
        serde_json::from_value(json!({"language": "rust", "value": "fn f() {}"}))?;
    assert!(matches!(tagged, MarkedString::Tagged(_)));
    Ok(())
}

#[test]
fn severity_round_trips_and_validates() -> anyhow::Result<()> {
    assert_eq!(serde_json::to_value(DiagnosticSeverity::Hint)?, json!(4));
    assert_eq!(
        serde_json::from_value::<DiagnosticSeverity>(json!(1))?,
        DiagnosticSeverity::Error
    );
    assert!(serde_json::from_value::<DiagnosticSeverity>(json!(0)).is_err());
    assert!(serde_json::from_value::<DiagnosticSeverity>(json!(5)).is_err());
    Ok(())
}

#[test]
fn markup_kind_rejects_unknown_literals() {
    assert_eq!(
        serde_json::from_value::<MarkupKind>(json!("markdown")).unwrap(),
        MarkupKind::Markdown
    );
    assert!(serde_json::from_value::<MarkupKind>(json!("html")).is_err());
}

#[test]
fn completion_item_kind_codes() -> anyhow::Result<()> {
    assert_eq!(
        serde_json::to_value(CompletionItemKind::EnumMember)?,
        json!(20)
    );
    assert_eq!(
        serde_json::from_value::<CompletionItemKind>(json!(25))?,
        CompletionItemKind::TypeParameter
    );
    assert!(serde_json::from_value::<CompletionItemKind>(json!(26)).is_err());
    assert!(serde_json::from_value::<CompletionItemKind>(json!(0)).is_err());
    Ok(())
}

#[test]
fn profile_kind_ranges_diverge() {
    // Kind 20 (EnumMember) postdates the vendor catalog.
    let item = json!({"label": "x", "kind": 20});
    assert!(Profile::Standard.completion_item().matches(&item));
    assert!(!Profile::Vendor.completion_item().matches(&item));

    let early = json!({"label": "x", "kind": 18});
    assert!(Profile::Standard.completion_item().matches(&early));
    assert!(Profile::Vendor.completion_item().matches(&early));
}

#[test]
fn vendor_documentation_is_string_only() {
    let markup = json!({"label": "x", "documentation": {"kind": "markdown", "value": "doc"}});
    assert!(Profile::Standard.completion_item().matches(&markup));
    assert!(!Profile::Vendor.completion_item().matches(&markup));

    let plain = json!({"label": "x", "documentation": "doc"});
    assert!(Profile::Standard.completion_item().matches(&plain));
    assert!(Profile::Vendor.completion_item().matches(&plain));
}

#[test]
fn typed_values_conform_to_their_shapes() -> anyhow::Result<()> {
    let diag = Diagnostic {
        range: sample_range(),
        severity: Some(DiagnosticSeverity::Warning),
        code: Some(NumberOrString::String("E0308".into())),
        source: Some("rustc".into()),
        message: "mismatched types".into(),
    };
    assert!(diagnostic().matches(&serde_json::to_value(&diag)?));

    let hover = Hover {
        contents: MarkedString::Tagged(super::LanguageString {
            language: "rust".into(),
            value: "fn main()".into(),
        }),
        range: Some(sample_range()),
    };
    assert!(super::hover().matches(&serde_json::to_value(&hover)?));

    let list = CompletionList {
        is_incomplete: false,
        items: vec![CompletionItem {
            label: "push".into(),
            kind: Some(CompletionItemKind::Method),
            detail: Some("fn push(&mut self, value: T)".into()),
            documentation: Some(Documentation::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: "Appends an element.".into(),
            })),
            insert_text: None,
            data: Some(json!({"resolve": 1})),
        }],
    };
    assert!(
        Profile::Standard
            .completion_list()
            .matches(&serde_json::to_value(&list)?)
    );

    let definition_value = serde_json::to_value(Definition::Many(vec![Location {
        uri: "file:///a.rs".into(),
        range: sample_range(),
    }]))?;
    assert!(definition().matches(&definition_value));
    Ok(())
}

#[test]
fn params_structs_conform_to_their_shapes() -> anyhow::Result<()> {
    let formatting = super::DocumentFormattingParams {
        text_document: crate::types::TextDocumentIdentifier {
            uri: "file:///a.rs".into(),
        },
        options: super::FormattingOptions {
            tab_size: 4,
            insert_spaces: true,
        },
    };
    assert!(super::document_formatting_params().matches(&serde_json::to_value(&formatting)?));

    let did_open = super::DidOpenTextDocumentParams {
        text_document: crate::types::TextDocumentItem {
            uri: "file:///a.rs".into(),
            language_id: "rust".into(),
            version: 1,
            text: "fn main() {}".into(),
        },
    };
    assert!(super::did_open_params().matches(&serde_json::to_value(&did_open)?));

    let did_change = super::DidChangeTextDocumentParams {
        text_document: crate::types::VersionedTextDocumentIdentifier {
            uri: "file:///a.rs".into(),
            version: 2,
        },
        content_changes: vec![super::TextDocumentContentChangeEvent {
            range: Some(sample_range()),
            text: "fn main() { run(); }".into(),
        }],
    };
    assert!(super::did_change_params().matches(&serde_json::to_value(&did_change)?));

    let publish = super::PublishDiagnosticsParams {
        uri: "file:///a.rs".into(),
        diagnostics: vec![],
    };
    assert!(super::publish_diagnostics_params().matches(&serde_json::to_value(&publish)?));

    let edits = vec![super::TextEdit {
        range: sample_range(),
        new_text: "    ".into(),
    }];
    assert!(Shape::sequence(super::text_edit()).matches(&serde_json::to_value(&edits)?));
    Ok(())
}

#[test]
fn response_error_shape_is_distinct_from_results() -> anyhow::Result<()> {
    let error_wire = json!({"code": -32601, "message": "method not found"});
    assert!(super::response_error().matches(&error_wire));
    assert!(!super::hover().matches(&error_wire));
    assert!(!Shape::sequence(super::text_edit()).matches(&error_wire));
    Ok(())
}
