//! Integration tests for views attached to an in-memory remote collection.

use std::cell::RefCell;
use std::rc::Rc;
use strand_core::{CancelKind, Document, Error, FieldPath, SourceError, ValueType};
use strand_events::{ChildEvent, LocalSource, MemoryCollection, PreviousKey};
use strand_view::{Change, Direction, OrderedView};

fn player(score: i64, active: bool) -> Document {
    Document::map([
        ("score", Document::from(score)),
        ("active", Document::from(active)),
    ])
}

fn keys(view: &Rc<RefCell<OrderedView>>) -> Vec<String> {
    view.borrow().keys().map(|k| k.to_string()).collect()
}

fn capture(view: &Rc<RefCell<OrderedView>>) -> Rc<RefCell<Vec<Change>>> {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let changes_clone = changes.clone();
    view.borrow_mut()
        .set_observer(move |change| changes_clone.borrow_mut().push(change));
    changes
}

#[test]
fn test_leaderboard_follows_score_updates() {
    let remote = Rc::new(MemoryCollection::ordered_by_child("score"));
    remote.set("alice", player(30, true)).unwrap();
    remote.set("bob", player(10, true)).unwrap();
    remote.set("carol", player(20, true)).unwrap();

    let view = OrderedView::builder().attach(remote.clone());
    assert_eq!(keys(&view), vec!["bob", "carol", "alice"]);

    let changes = capture(&view);
    // bob overtakes everyone: the remote sends Moved, then Changed
    remote.set("bob", player(50, true)).unwrap();

    assert_eq!(keys(&view), vec!["carol", "alice", "bob"]);
    assert_eq!(
        *changes.borrow(),
        vec![Change::moved(2, 0), Change::changed(2)]
    );
}

#[test]
fn test_view_sorts_independently_of_remote() {
    let remote = Rc::new(MemoryCollection::new());
    let view = OrderedView::builder()
        .order_by("score", ValueType::Integer)
        .direction(Direction::Descending)
        .attach(remote.clone());

    remote.set("alice", player(30, true)).unwrap();
    remote.set("bob", player(10, true)).unwrap();
    remote.set("carol", player(20, true)).unwrap();
    assert_eq!(keys(&view), vec!["alice", "carol", "bob"]);

    let changes = capture(&view);
    remote.set("bob", player(40, true)).unwrap();

    assert_eq!(keys(&view), vec!["bob", "alice", "carol"]);
    assert_eq!(*changes.borrow(), vec![Change::changed(0)]);

    view.borrow_mut().clear_ordering().unwrap();
    assert_eq!(keys(&view), vec!["carol", "bob", "alice"]);
}

#[test]
fn test_filter_hides_inactive_players() {
    let active = FieldPath::parse("active");
    let remote = Rc::new(MemoryCollection::new());
    let view = OrderedView::builder()
        .filter(move |e| e.child(&active).and_then(Document::as_bool) == Some(false))
        .attach(remote.clone());
    let changes = capture(&view);

    remote.set("alice", player(30, true)).unwrap();
    remote.set("bob", player(10, false)).unwrap();
    remote.set("carol", player(20, true)).unwrap();
    assert_eq!(keys(&view), vec!["alice", "carol"]);

    // bob comes back, alice leaves
    remote.set("bob", player(10, true)).unwrap();
    remote.set("alice", player(30, false)).unwrap();
    assert_eq!(keys(&view), vec!["bob", "carol"]);

    remote.remove("alice").unwrap();
    assert_eq!(view.borrow().excluded_len(), 0);

    assert_eq!(
        *changes.borrow(),
        vec![
            Change::added(0),
            Change::added(1),
            Change::added(1),
            Change::removed(0),
        ]
    );
}

#[test]
fn test_two_views_share_a_remote() {
    let remote = Rc::new(MemoryCollection::new());
    let by_key = OrderedView::builder().attach(remote.clone());
    let by_score = OrderedView::builder()
        .order_by("score", ValueType::Integer)
        .attach(remote.clone());
    assert_eq!(remote.listener_count(), 2);

    remote.set("a", player(3, true)).unwrap();
    remote.set("b", player(1, true)).unwrap();
    remote.set("c", player(2, true)).unwrap();

    assert_eq!(keys(&by_key), vec!["a", "b", "c"]);
    assert_eq!(keys(&by_score), vec!["b", "c", "a"]);

    by_key.borrow_mut().teardown();
    assert_eq!(remote.listener_count(), 1);

    remote.remove("b").unwrap();
    assert_eq!(keys(&by_key), vec!["a", "b", "c"]);
    assert_eq!(keys(&by_score), vec!["c", "a"]);
}

#[test]
fn test_remote_cancellation_reaches_view() {
    let remote = Rc::new(MemoryCollection::new());
    remote.set("a", player(1, true)).unwrap();

    let view = OrderedView::builder().attach(remote.clone());
    let cancelled = Rc::new(RefCell::new(Vec::new()));
    let cancelled_clone = cancelled.clone();
    view.borrow_mut()
        .set_cancel_handler(move |error| cancelled_clone.borrow_mut().push(error.kind));

    remote.cancel(SourceError::new(CancelKind::ExpiredToken, "token expired"));

    assert_eq!(*cancelled.borrow(), vec![CancelKind::ExpiredToken]);
    assert_eq!(keys(&view), vec!["a"]);
    assert!(matches!(
        view.borrow_mut().reverse(),
        Err(Error::SourceCancelled(_))
    ));
    assert!(matches!(
        remote.set("b", player(2, true)),
        Err(Error::SourceCancelled(_))
    ));
}

#[test]
fn test_out_of_order_stream_is_rejected() {
    let source = Rc::new(LocalSource::new());
    let view = OrderedView::builder().attach(source.clone());
    let changes = capture(&view);

    let element = strand_core::Element::new("late", player(1, true));
    let result = source.emit(ChildEvent::added(element, PreviousKey::after("early")));

    assert_eq!(result, Err(Error::key_not_found("early")));
    assert!(view.borrow().is_empty());
    assert!(changes.borrow().is_empty());
}
