use super::*;

#[test]
fn pane_switch_resets_selection() {
    let mut app = App::new(true);
    app.selected = 7;
    app.show_pane(Pane::Queue);
    assert_eq!(app.pane, Pane::Queue);
    assert_eq!(app.selected, 0);

    // Switching to the same pane keeps the cursor.
    app.selected = 3;
    app.show_pane(Pane::Queue);
    assert_eq!(app.selected, 3);
}

#[test]
fn cursor_movement_wraps_both_ways() {
    let mut app = App::new(true);
    app.move_up(3);
    assert_eq!(app.selected, 2);
    app.move_down(3);
    assert_eq!(app.selected, 0);
    app.move_down(3);
    assert_eq!(app.selected, 1);
}

#[test]
fn cursor_movement_on_empty_lists_stays_at_zero() {
    let mut app = App::new(true);
    app.selected = 5;
    app.move_down(0);
    assert_eq!(app.selected, 0);
    app.move_up(0);
    assert_eq!(app.selected, 0);
}

#[test]
fn clamp_selection_after_list_shrinks() {
    let mut app = App::new(true);
    app.selected = 9;
    app.clamp_selection(4);
    assert_eq!(app.selected, 3);
    app.clamp_selection(0);
    assert_eq!(app.selected, 0);
}

#[test]
fn entering_search_disables_follow_playback() {
    let mut app = App::new(true);
    app.enter_search();
    assert!(app.search_mode);
    assert!(!app.follow_playback);
    app.exit_search();
    assert!(!app.search_mode);
}

#[test]
fn jump_helpers_hit_the_edges() {
    let mut app = App::new(true);
    app.jump_bottom(5);
    assert_eq!(app.selected, 4);
    app.jump_top();
    assert_eq!(app.selected, 0);
    app.jump_bottom(0);
    assert_eq!(app.selected, 0);
}
