use quiz_forge::json_utils::{extract_first, find_json_structures, NodeType};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
struct Card {
    front: String,
    back: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Deck {
    cards: Vec<Card>,
}

#[test]
fn extract_first_reads_a_bare_array() {
    let s = r#"[{"front":"H","back":"Hydrogen"},{"front":"He","back":"Helium"}]"#;
    let cards: Vec<Card> = extract_first(s).unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[1].back, "Helium");
}

#[test]
fn extract_first_skips_roots_of_other_shapes() {
    let s = r#"intro {"note":"ignore me"} then {"front":"Fe","back":"Iron"} and {"front":"Cu","back":"Copper"}"#;
    let card: Card = extract_first(s).unwrap();
    assert_eq!(card.front, "Fe");
}

#[test]
fn extract_first_does_not_search_inside_a_rejected_root() {
    let s = r#"{"deck":{"items":[{"front":"Au","back":"Gold"},{"front":"Ag"}]}}"#;
    assert!(extract_first::<Card>(s).is_err());
    assert!(extract_first::<Vec<Card>>(s).is_err());
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Step {
    Ask { question: String },
    Reveal { answer: String },
}

#[test]
fn extract_first_tagged_enum_list_in_text() {
    let s = r#"
Round one
[ {"type":"ask","question":"Largest planet?"}, {"type":"reveal","answer":"Jupiter"} ]
"#;
    let steps: Vec<Step> = extract_first(s).unwrap();
    assert_eq!(
        steps,
        [
            Step::Ask { question: "Largest planet?".into() },
            Step::Reveal { answer: "Jupiter".into() },
        ]
    );
}

#[test]
fn extract_first_accepts_plain_json() {
    let deck: Deck = extract_first(r#"  {"cards":[{"front":"Na","back":"Sodium"}]}  "#).unwrap();
    assert_eq!(deck.cards[0].back, "Sodium");
}

#[test]
fn extract_first_finds_fenced_payload_after_prose() {
    let s = "Of course! Here is the deck (with [notes]):\n```json\n{\"cards\":[{\"front\":\"K\",\"back\":\"Potassium\"}]}\n```";
    let deck: Deck = extract_first(s).unwrap();
    assert_eq!(deck.cards.len(), 1);
    assert_eq!(deck.cards[0].front, "K");
}

#[test]
fn extract_first_ignores_brackets_inside_strings() {
    let s = r#"{"cards":[{"front":"What does } mean?","back":"A closing brace ]"}]}"#;
    let deck: Deck = extract_first(s).unwrap();
    assert_eq!(deck.cards[0].front, "What does } mean?");
}

#[test]
fn extract_first_reports_error_when_nothing_matches() {
    assert!(extract_first::<Deck>("no json here").is_err());
    assert!(extract_first::<Deck>(r#"{"cards": [{"front": "unterminated"#).is_err());
    assert!(extract_first::<Deck>(r#"{"title": "wrong shape"}"#).is_err());
}

#[test]
fn structures_report_roots_with_nested_children() {
    let s = r#"a {"x":[1,2],"y":{"z":[]}} b [3]"#;
    let roots = find_json_structures(s);

    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0].kind, NodeType::Object);
    assert_eq!(roots[0].slice(s), r#"{"x":[1,2],"y":{"z":[]}}"#);
    assert_eq!(roots[0].children.len(), 2);
    assert_eq!(roots[0].children[1].children[0].kind, NodeType::Array);
    assert_eq!(roots[1].slice(s), "[3]");
}

#[test]
fn mismatched_closers_are_dropped() {
    let s = "(see [1}) then {\"ok\":true}";
    let roots = find_json_structures(s);
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].slice(s), "{\"ok\":true}");
}
