use chatmark_core::{
    Action, Element, ElementDisplay, Message, NameMatcher, NameScope, classify, prepare,
    scoped_actions,
};

fn element(name: &str, for_id: Option<&str>, display: ElementDisplay) -> Element {
    Element {
        name: name.to_string(),
        for_id: for_id.map(str::to_string),
        display,
        url: None,
    }
}

fn action(name: &str, for_id: Option<&str>) -> Action {
    Action {
        name: name.to_string(),
        label: None,
        value: None,
        for_id: for_id.map(str::to_string),
    }
}

fn message(id: Option<&str>, content: &str, elements: Vec<Element>) -> Message {
    Message {
        id: id.map(str::to_string),
        content: Some(content.to_string()),
        elements,
        ..Default::default()
    }
}

#[test]
fn reference_occurrence_becomes_link_token() {
    let msg = message(
        None,
        "See Report for details",
        vec![element("Report", None, ElementDisplay::Reference)],
    );
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.content, "See [Report](Report) for details");
    assert_eq!(prepared.refs.len(), 1);
    assert_eq!(prepared.refs[0].name, "Report");
    assert!(prepared.inlined.is_empty());
}

#[test]
fn link_target_replaces_spaces() {
    let msg = message(
        None,
        "open Sales Chart now",
        vec![element("Sales Chart", None, ElementDisplay::Reference)],
    );
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.content, "open [Sales Chart](Sales_Chart) now");
}

#[test]
fn substring_name_never_truncates_longer_name() {
    let msg = message(
        None,
        "Report_v2 supersedes Report",
        vec![
            element("Report", None, ElementDisplay::Reference),
            element("Report_v2", None, ElementDisplay::Reference),
        ],
    );
    let prepared = prepare(&msg).expect("content");
    assert_eq!(
        prepared.content,
        "[Report_v2](Report_v2) supersedes [Report](Report)"
    );
    let names: Vec<&str> = prepared.refs.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Report_v2", "Report"]);
}

#[test]
fn wrongly_scoped_name_stays_plain_text() {
    let msg = message(
        Some("this-msg"),
        "See Report",
        vec![element("Report", Some("other-msg"), ElementDisplay::Reference)],
    );
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.content, "See Report");
    assert!(prepared.refs.is_empty());
    assert!(prepared.inlined.is_empty());
}

#[test]
fn unknown_name_stays_plain_text() {
    let msg = message(
        None,
        "nothing matches here",
        vec![element("Report", None, ElementDisplay::Reference)],
    );
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.content, "nothing matches here");
    assert!(prepared.refs.is_empty());
}

#[test]
fn inline_element_registers_once_and_keeps_text_plain() {
    let msg = message(
        Some("m1"),
        "Chart then Chart again",
        vec![element("Chart", None, ElementDisplay::Inline)],
    );
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.content, "Chart then Chart again");
    assert_eq!(prepared.inlined.len(), 1);
    assert_eq!(prepared.inlined[0].name, "Chart");
    assert!(prepared.refs.is_empty());
}

#[test]
fn reference_occurrences_keep_duplicates() {
    let msg = message(
        None,
        "Report and Report",
        vec![element("Report", None, ElementDisplay::Reference)],
    );
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.refs.len(), 2);
}

#[test]
fn message_scoped_inline_element_is_preseeded_without_occurrence() {
    let msg = message(
        Some("m1"),
        "no names here",
        vec![element("Chart", Some("m1"), ElementDisplay::Inline)],
    );
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.inlined.len(), 1);
    assert_eq!(prepared.content, "no names here");
}

#[test]
fn preseeded_inline_element_is_not_duplicated_by_occurrence() {
    let msg = message(
        Some("m1"),
        "Chart is below",
        vec![element("Chart", Some("m1"), ElementDisplay::Inline)],
    );
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.inlined.len(), 1);
}

#[test]
fn embed_element_rewrites_like_a_reference() {
    let mut embed = element("Forecast", None, ElementDisplay::Embed);
    embed.url = Some("https://panels.example/forecast".to_string());
    let msg = message(None, "open Forecast", vec![embed.clone()]);
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.content, "open [Forecast](Forecast)");
    assert_eq!(prepared.refs, vec![embed]);
}

#[test]
fn language_wraps_everything_in_one_fenced_block() {
    let msg = Message {
        content: Some("x = 1".to_string()),
        language: Some("python".to_string()),
        ..Default::default()
    };
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.content, "```python\nx = 1\n```");
}

#[test]
fn language_wrap_applies_after_rewrite() {
    let msg = Message {
        content: Some("print(Report)".to_string()),
        language: Some("python".to_string()),
        elements: vec![element("Report", None, ElementDisplay::Reference)],
        ..Default::default()
    };
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.content, "```python\nprint([Report](Report))\n```");
}

#[test]
fn empty_content_yields_nothing_to_render() {
    let msg = message(None, "   \n  ", vec![]);
    assert!(prepare(&msg).is_none());

    let msg = Message {
        content: None,
        elements: vec![element("Report", None, ElementDisplay::Reference)],
        language: Some("python".to_string()),
        ..Default::default()
    };
    assert!(prepare(&msg).is_none());
}

#[test]
fn special_characters_in_names_match_literally() {
    let msg = message(
        None,
        "see Report (v2) today",
        vec![element("Report (v2)", None, ElementDisplay::Reference)],
    );
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.content, "see [Report (v2)](Report_(v2)) today");
    assert_eq!(prepared.refs.len(), 1);
}

#[test]
fn duplicate_names_prefer_first_in_scope_catalog_entry() {
    let out_of_scope = element("Report", Some("other"), ElementDisplay::Inline);
    let in_scope = element("Report", None, ElementDisplay::Reference);
    let msg = message(
        Some("m1"),
        "Report",
        vec![out_of_scope, in_scope.clone()],
    );
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.content, "[Report](Report)");
    assert_eq!(prepared.refs, vec![in_scope]);
}

#[test]
fn classify_precedence_matches_catalog() {
    let elements = vec![
        element("A", Some("m2"), ElementDisplay::Reference),
        element("B", None, ElementDisplay::Inline),
    ];
    assert_eq!(classify("Z", Some("m1"), &elements), NameScope::NotFound);
    assert_eq!(classify("A", Some("m1"), &elements), NameScope::WrongScope);
    assert!(matches!(
        classify("A", Some("m2"), &elements),
        NameScope::Reference(_)
    ));
    assert!(matches!(
        classify("B", Some("m1"), &elements),
        NameScope::Inline(_)
    ));
}

#[test]
fn action_scoper_keeps_global_and_matching_actions_in_order() {
    let actions = vec![
        action("first", None),
        action("second", Some("m1")),
        action("third", Some("m2")),
        action("fourth", Some("m1")),
    ];
    let scoped = scoped_actions(&actions, Some("m1"));
    let names: Vec<&str> = scoped.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "fourth"]);
}

#[test]
fn action_scoper_is_idempotent() {
    let actions = vec![
        action("first", None),
        action("second", Some("m1")),
        action("third", Some("m2")),
    ];
    let once = scoped_actions(&actions, Some("m1"));
    let twice = scoped_actions(&once, Some("m1"));
    assert_eq!(once, twice);
}

#[test]
fn missing_catalogs_behave_as_empty() {
    let msg = message(None, "plain text", vec![]);
    let prepared = prepare(&msg).expect("content");
    assert_eq!(prepared.content, "plain text");
    assert!(prepared.actions.is_empty());
    assert!(prepared.refs.is_empty());
    assert!(prepared.inlined.is_empty());
}

#[test]
fn matcher_collapses_duplicate_names() {
    let matcher = NameMatcher::from_names(&["aa", "bb", "aa"]).expect("matcher");
    assert_eq!(matcher.regex().as_str().matches("aa").count(), 1);
}

#[test]
fn matcher_orders_longest_first() {
    let matcher = NameMatcher::from_names(&["Report", "Report_v2"]).expect("matcher");
    let found: Vec<&str> = matcher
        .regex()
        .find_iter("Report_v2 and Report")
        .map(|m| m.as_str())
        .collect();
    assert_eq!(found, vec!["Report_v2", "Report"]);
}
