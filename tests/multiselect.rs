use std::sync::Arc;

use parking_lot::Mutex;

use multiselect::{
    FocusCheck, FocusId, FocusTracker, IdRecord, Key, MultiSelect, MultiSelectHandle,
    MultiSelectProps, Part, SelectableItem, WidgetId,
};

type Calls = Arc<Mutex<Vec<(&'static str, Vec<String>)>>>;

fn candidates() -> Vec<SelectableItem> {
    (1..=5)
        .map(|n| SelectableItem::new(n.to_string(), format!("Item {n}")))
        .collect()
}

fn mount(props: MultiSelectProps) -> (MultiSelect, Calls) {
    let calls = Calls::default();
    let sent = Arc::clone(&calls);
    let updated = Arc::clone(&calls);
    let widget = MultiSelect::builder(props, candidates())
        .send_items(move |items| {
            sent.lock().push(("send", ids(items)));
        })
        .mount(move |items| {
            updated.lock().push(("update", ids(items)));
        });
    (widget, calls)
}

fn ids(items: &[SelectableItem]) -> Vec<String> {
    items.iter().map(|i| i.id.to_string()).collect()
}

#[test]
fn double_toggle_restores_the_selection() {
    let (mut widget, _) = mount(MultiSelectProps::new("Items"));
    let seed = [IdRecord::new(4), IdRecord::new(1)];
    widget.set_selected_items_list_from_ids(&seed);
    let before = ids(widget.selected_items());

    for item in candidates() {
        let was_selected = before.contains(&item.id.to_string());
        widget.toggle_item(item.clone());
        widget.toggle_item(item);
        let mut after = ids(widget.selected_items());
        if was_selected {
            let mut expected = before.clone();
            expected.sort();
            after.sort();
            assert_eq!(after, expected);
        } else {
            assert_eq!(after, before);
        }
        widget.set_selected_items_list_from_ids(&seed);
    }
}

#[test]
fn select_all_takes_every_candidate_only_from_an_empty_open_menu() {
    let (mut widget, _) = mount(MultiSelectProps::new("Items"));
    assert!(!widget.select_all(), "closed menu has no Select All");

    widget.open_menu();
    assert!(widget.click(Part::SelectAll));
    assert_eq!(widget.selected_items(), candidates().as_slice());
    assert!(!widget.select_all(), "Clear All replaces Select All");

    let mut props = MultiSelectProps::new("Items");
    props.has_button = false;
    let (mut bare, _) = mount(props);
    bare.open_menu();
    assert!(!bare.select_all());
    assert!(bare.selected_items().is_empty());
}

#[test]
fn clear_all_empties_a_non_empty_selection() {
    let (mut widget, _) = mount(MultiSelectProps::new("Items"));
    widget.open_menu();
    assert!(!widget.clear_all(), "nothing to clear");

    widget.set_selected_items_list_from_ids(&[IdRecord::new(1), IdRecord::new(5)]);
    assert!(widget.click(Part::ClearAll));
    assert!(widget.selected_items().is_empty());
    assert!(widget.is_open());
}

#[test]
fn unknown_ids_are_dropped() {
    let (mut widget, _) = mount(MultiSelectProps::new("Items"));
    widget.set_selected_items_list_from_ids(&[IdRecord::new("2"), IdRecord::new("9")]);
    assert_eq!(ids(widget.selected_items()), ["2"]);
}

#[test]
fn every_mutation_notifies_both_listeners_in_order() {
    let (mut widget, calls) = mount(MultiSelectProps::new("Items"));
    assert_eq!(
        *calls.lock(),
        [("send", vec![]), ("update", vec![])],
        "mount notifies once"
    );

    calls.lock().clear();
    widget.toggle_item(SelectableItem::new("3", "Item 3"));
    assert_eq!(
        *calls.lock(),
        [("send", vec!["3".to_string()]), ("update", vec!["3".to_string()])]
    );

    calls.lock().clear();
    widget.open_menu();
    widget.click(Part::ClearAll);
    assert_eq!(*calls.lock(), [("send", vec![]), ("update", vec![])]);
}

#[tokio::test]
async fn blur_inside_keeps_menu_open_and_blur_outside_closes_it() {
    let (widget, _) = mount(MultiSelectProps::new("Items"));
    let handle = MultiSelectHandle::new(widget);
    let focus = FocusTracker::new();

    let (toggle, done) = {
        let mut widget = handle.lock();
        widget.open_menu();
        widget.key(Part::Toggle, Key::ArrowDown);
        (widget.focus_id(Part::Toggle), widget.focus_id(Part::Done))
    };
    focus.focus(Some(toggle));

    let check = handle.blur(Part::Toggle, &focus);
    focus.focus(Some(done));
    assert_eq!(check.await.unwrap(), FocusCheck::StillInside);
    assert!(handle.lock().is_open());
    assert_eq!(handle.lock().highlighted_index(), None);

    let check = handle.blur(Part::Done, &focus);
    focus.focus(Some(FocusId::new(WidgetId::next(), Part::Control)));
    assert_eq!(check.await.unwrap(), FocusCheck::Closed);
    assert!(!handle.lock().is_open());
}

#[test]
fn enter_on_an_item_toggles_it_and_highlights_the_slot_before_its_id() {
    let (mut widget, _) = mount(MultiSelectProps::new("Items"));
    widget.open_menu();

    widget.key(Part::Item(2), Key::Enter);
    assert_eq!(ids(widget.selected_items()), ["3"]);
    assert!(widget.is_open());
    assert_eq!(widget.highlighted_index(), Some(2));

    widget.key(Part::Item(2), Key::from_label("Spacebar"));
    assert!(widget.selected_items().is_empty());
    assert!(widget.is_open());
    assert_eq!(widget.highlighted_index(), Some(2));
}

#[test]
fn initial_selection_shows_before_any_interaction() {
    let mut props = MultiSelectProps::new("Items");
    props.initial_selected_item_list = vec![IdRecord::new(1)];
    let (widget, _) = mount(props);

    let view = widget.view();
    assert_eq!(view.count_text, "1 selected");
    assert_eq!(view.summary.as_deref(), Some("Item 1"));
    assert!(!view.is_open);
    assert!(view.disclosure);
}
