mod common;

use common::{RecordingStore, as_store};
use pretty_assertions::assert_eq;
use recordkit_model::{
    Attribute, Attributes, Euid, KindDecl, Lifecycle, Record, RecordKind, RecordOptions,
    StoreRef,
};
use serde_json::{Value, json};
use std::sync::Arc;

fn kind_with(attributes: Attributes, defaults: Attributes) -> Arc<RecordKind> {
    RecordKind::base("Model").extend(
        KindDecl::new("Item")
            .attributes(attributes)
            .defaults(defaults),
    )
}

fn record(kind: &Arc<RecordKind>, attrs: Attributes) -> (Record, Arc<RecordingStore>) {
    let store = RecordingStore::new();
    let options = RecordOptions::new().store(StoreRef::Instance(as_store(&store)));
    (Record::with_options(kind, Some(attrs), options), store)
}

// ── get ──────────────────────────────────────────────────────────

#[test]
fn get_returns_plain_value() {
    let (r, _) = record(&RecordKind::base("Model"), Attributes::new().with("a", 1));
    assert_eq!(r.get("a"), Some(json!(1)));
}

#[test]
fn get_evaluates_computed_attribute() {
    let attrs = Attributes::new().with_computed("answer", |_| json!(42));
    let (r, _) = record(&RecordKind::base("Model"), attrs);
    assert_eq!(r.get("answer"), Some(json!(42)));
}

#[test]
fn computed_attribute_sees_the_record() {
    let attrs = Attributes::new()
        .with("first", "Ada")
        .with("last", "Lovelace")
        .with_computed("full", |r| {
            let first = r.get("first").unwrap_or(Value::Null);
            let last = r.get("last").unwrap_or(Value::Null);
            json!(format!("{} {}", first.as_str().unwrap_or(""), last.as_str().unwrap_or("")))
        });
    let (mut r, _) = record(&RecordKind::base("Model"), attrs);
    assert_eq!(r.get("full"), Some(json!("Ada Lovelace")));

    r.set("first", "Augusta");
    assert_eq!(r.get("full"), Some(json!("Augusta Lovelace")));
}

#[test]
fn computed_returning_falsy_value_is_still_evaluated() {
    let attrs = Attributes::new().with_computed("zero", |_| json!(0));
    let (r, _) = record(&RecordKind::base("Model"), attrs);
    assert_eq!(r.get("zero"), Some(json!(0)));
}

#[test]
fn get_unknown_is_none() {
    let (r, _) = record(&RecordKind::base("Model"), Attributes::new());
    assert_eq!(r.get("nope"), None);
}

// ── set ──────────────────────────────────────────────────────────

#[test]
fn set_tracks_previous_and_changed() {
    let (mut r, store) = record(&RecordKind::base("Model"), Attributes::new().with("a", 1));

    r.set("a", 2);

    assert_eq!(r.previous().get("a"), Some(&Some(json!(1))));
    assert_eq!(r.changed().get("a"), Some(&json!(2)));
    assert_eq!(r.get("a"), Some(json!(2)));
    assert_eq!(store.notification_count(), 1);
}

#[test]
fn set_new_key_records_absent_previous() {
    let (mut r, _) = record(&RecordKind::base("Model"), Attributes::new());
    r.set("fresh", true);
    assert_eq!(r.previous().get("fresh"), Some(&None));
    assert_eq!(r.get("fresh"), Some(json!(true)));
}

#[test]
fn set_same_value_still_notifies() {
    let (mut r, store) = record(&RecordKind::base("Model"), Attributes::new().with("a", 1));
    r.set("a", 1);
    r.set("a", 1);
    assert_eq!(store.notification_count(), 2);
    assert_eq!(r.previous().get("a"), Some(&Some(json!(1))));
}

#[test]
fn previous_reflects_most_recent_write_only() {
    let (mut r, _) = record(&RecordKind::base("Model"), Attributes::new().with("a", 1));
    r.set("a", 2).set("a", 3);
    assert_eq!(r.previous().get("a"), Some(&Some(json!(2))));
    assert_eq!(r.changed().get("a"), Some(&json!(3)));
}

#[test]
fn set_on_computed_is_ignored() {
    let attrs = Attributes::new().with_computed("answer", |_| json!(42));
    let (mut r, store) = record(&RecordKind::base("Model"), attrs);

    let euid = *r.set("answer", 99).euid();

    assert_eq!(euid, *r.euid());
    assert!(r.attribute("answer").is_some_and(Attribute::is_computed));
    assert_eq!(r.get("answer"), Some(json!(42)));
    assert!(r.changed().is_empty());
    assert!(r.previous().is_empty());
    assert_eq!(store.notification_count(), 0);
}

#[test]
fn changed_accumulates_across_calls() {
    let (mut r, _) = record(&RecordKind::base("Model"), Attributes::new());
    r.set("a", 1);
    r.set("b", 2);
    assert_eq!(r.changed().len(), 2);

    r.clear_changed();
    assert!(r.changed().is_empty());
    assert_eq!(r.get("a"), Some(json!(1)));
}

// ── set_object ───────────────────────────────────────────────────

#[test]
fn set_object_skips_computed_and_notifies_once() {
    let attrs = Attributes::new().with_computed("b", |_| json!("computed"));
    let (mut r, store) = record(&RecordKind::base("Model"), attrs);

    r.set_object([("a", json!(1)), ("b", json!(2))]);

    assert_eq!(r.get("a"), Some(json!(1)));
    assert_eq!(r.get("b"), Some(json!("computed")));
    assert!(r.changed().contains_key("a"));
    assert!(!r.changed().contains_key("b"));
    assert!(!r.previous().contains_key("b"));
    assert_eq!(store.notification_count(), 1);
}

#[test]
fn last_written_covers_only_the_latest_call() {
    let attrs = Attributes::new().with_computed("c", |_| json!(0));
    let (mut r, _) = record(&RecordKind::base("Model"), attrs);

    r.set("a", 1);
    assert_eq!(r.last_written().iter().collect::<Vec<_>>(), vec!["a"]);

    r.set_object([("b", json!(2)), ("c", json!(3)), ("d", json!(4))]);
    assert_eq!(r.last_written().iter().collect::<Vec<_>>(), vec!["b", "d"]);

    r.set("c", 5);
    assert!(r.last_written().is_empty());
    assert_eq!(r.changed().len(), 3);
}

#[test]
fn dropping_a_record_notifies_its_store() {
    let (r, store) = record(&RecordKind::base("Model"), Attributes::new());
    let euid = *r.euid();
    drop(r);
    assert_eq!(store.removed.lock().unwrap().as_slice(), &[euid]);
}

#[test]
fn set_object_accepts_json_map() {
    let (mut r, store) = record(&RecordKind::base("Model"), Attributes::new().with("x", 0));
    let Value::Object(props) = json!({"x": 1, "y": 2}) else {
        unreachable!()
    };

    r.set_object(props);

    assert_eq!(r.get("x"), Some(json!(1)));
    assert_eq!(r.get("y"), Some(json!(2)));
    assert_eq!(r.previous().get("x"), Some(&Some(json!(0))));
    let notified = store.notifications.lock().unwrap();
    assert_eq!(notified.len(), 1);
    assert_eq!(notified[0].len(), 2);
}

#[test]
fn set_object_with_only_computed_keys_still_notifies() {
    let attrs = Attributes::new().with_computed("c", |_| json!(1));
    let (mut r, store) = record(&RecordKind::base("Model"), attrs);
    r.set_object([("c", json!(5))]);
    assert!(r.changed().is_empty());
    assert_eq!(store.notification_count(), 1);
}

// ── construction ─────────────────────────────────────────────────

#[test]
fn constructor_attributes_beat_defaults() {
    let kind = kind_with(Attributes::new(), Attributes::new().with("x", 10));

    let (r, _) = record(&kind, Attributes::new().with("x", 5));
    assert_eq!(r.get("x"), Some(json!(5)));

    let (r, _) = record(&kind, Attributes::new());
    assert_eq!(r.get("x"), Some(json!(10)));
}

#[test]
fn constructor_merges_schema_attributes_and_defaults() {
    let kind = kind_with(
        Attributes::new().with("a", 1).with("b", 2),
        Attributes::new().with("b", 20).with("c", 30),
    );
    let (r, _) = record(&kind, Attributes::new().with("a", 100));

    assert_eq!(r.get("a"), Some(json!(100)));
    assert_eq!(r.get("b"), Some(json!(2)));
    assert_eq!(r.get("c"), Some(json!(30)));
    assert!(r.changed().is_empty());
}

#[test]
fn instances_do_not_share_attribute_maps() {
    let kind = kind_with(Attributes::new().with("a", 1), Attributes::new());
    let (mut first, _) = record(&kind, Attributes::new());
    let (second, _) = record(&kind, Attributes::new());

    first.set("a", 2);

    assert_eq!(second.get("a"), Some(json!(1)));
    assert_eq!(kind.schema().attributes().get("a"), Some(&Attribute::Value(json!(1))));
}

#[test]
fn options_schema_is_composed_for_the_instance_only() {
    let kind = kind_with(Attributes::new().with("a", 1), Attributes::new());
    let store = RecordingStore::new();
    let options = RecordOptions::new()
        .store(StoreRef::Instance(as_store(&store)))
        .attributes(Attributes::new().with("b", 2))
        .defaults(Attributes::new().with("c", 3));

    let r = Record::with_options(&kind, Some(Attributes::new().with("b", 20)), options);

    assert_eq!(r.get("a"), Some(json!(1)));
    assert_eq!(r.get("b"), Some(json!(20)));
    assert_eq!(r.get("c"), Some(json!(3)));
    assert!(r.schema().attributes().contains_key("b"));
    assert!(!kind.schema().attributes().contains_key("b"));
}

#[test]
fn options_override_instance_properties() {
    let kind = RecordKind::base("Model");
    let euid = Euid::new();
    let store = RecordingStore::new();
    let options = RecordOptions::new()
        .store(StoreRef::Instance(as_store(&store)))
        .primary_key("slug")
        .include_keys(["slug"])
        .euid(euid);

    let r = Record::with_options(&kind, Some(Attributes::new().with("slug", "home")), options);

    assert_eq!(r.primary_key(), "slug");
    assert_eq!(r.primary_key_value(), Some(json!("home")));
    assert_eq!(r.include_keys(), Some(&["slug".to_string()][..]));
    assert_eq!(*r.euid(), euid);
}

#[test]
fn registers_once_with_primary_key_visible() {
    let (r, store) = record(&RecordKind::base("Model"), Attributes::new().with("id", 7));
    let added = store.added.lock().unwrap();
    assert_eq!(added.as_slice(), &[(*r.euid(), Some(json!(7)))]);
}

#[test]
fn euid_lives_outside_attributes() {
    let (r, _) = record(&RecordKind::base("Model"), Attributes::new());
    assert!(!r.attributes().contains_key("euid"));
    assert_eq!(r.euid().to_string().len(), 36);
}

// ── raw / to_json ────────────────────────────────────────────────

#[test]
fn raw_honours_include_keys() {
    let kind = RecordKind::base("Model").extend(KindDecl::new("Narrow").include_keys(["a"]));
    let (r, _) = record(&kind, Attributes::new().with("a", 1).with("b", 2));

    assert_eq!(r.raw(), Attributes::new().with("a", 1));
    assert_eq!(r.to_json().unwrap(), r#"{"a":1}"#);
}

#[test]
fn raw_is_a_defensive_copy() {
    let kind = RecordKind::base("Model").extend(KindDecl::new("Narrow").include_keys(["a"]));
    let (r, _) = record(&kind, Attributes::new().with("a", 1).with("b", 2));

    let mut snapshot = r.raw();
    snapshot.insert("a", 100);
    snapshot.insert("z", 0);

    assert_eq!(r.raw(), Attributes::new().with("a", 1));
}

#[test]
fn raw_without_include_keys_copies_everything() {
    let attrs = Attributes::new().with("a", 1).with_computed("c", |_| json!(3));
    let (r, _) = record(&RecordKind::base("Model"), attrs);

    let raw = r.raw();
    assert_eq!(raw.len(), 2);
    assert!(raw.is_computed("c"));
}

#[test]
fn to_json_omits_computed_attributes() {
    let attrs = Attributes::new()
        .with("a", 1)
        .with("s", "x")
        .with_computed("c", |_| json!(3));
    let (r, _) = record(&RecordKind::base("Model"), attrs);
    assert_eq!(r.to_json().unwrap(), r#"{"a":1,"s":"x"}"#);
}

// ── lifecycle ────────────────────────────────────────────────────

#[test]
fn lifecycle_hooks_are_no_ops() {
    let (mut r, store) = record(&RecordKind::base("Model"), Attributes::new().with("a", 1));
    r.commit();
    r.fetch();
    r.did_fetch();
    r.did_commit();
    r.destroy();
    r.did_destroy();
    assert_eq!(r.get("a"), Some(json!(1)));
    assert!(r.changed().is_empty());
    assert_eq!(store.notification_count(), 0);
}
