use std::sync::Once;

use dashboard_core::{
    update, AppState, BatchUnit, ChapterUnit, Effect, Msg, NoticeLevel, RemoteFailure, ViewKind,
};
use pretty_assertions::assert_eq;

const NOVEL: i64 = 7;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(dashboard_logging::initialize_for_tests);
}

fn batch(id: i64, batch_number: i64) -> BatchUnit {
    BatchUnit {
        id,
        batch_number,
        chapter_start: batch_number * 10 - 9,
        chapter_end: batch_number * 10,
        translated: false,
        content_preview: format!("Batch {batch_number} preview"),
    }
}

fn chapter(id: i64, chapter_number: i64) -> ChapterUnit {
    ChapterUnit {
        id,
        chapter_number,
        title: format!("Chapter {chapter_number}"),
        translated: false,
        progress: 0,
        content_preview: String::new(),
    }
}

fn loaded_state() -> AppState {
    let (state, effects) = update(AppState::new(), Msg::NovelOpened(NOVEL));
    assert_eq!(effects, vec![Effect::LoadUnits { novel_id: NOVEL }]);
    let (state, _) = update(
        state,
        Msg::BatchesLoaded {
            novel_id: NOVEL,
            result: Ok(vec![batch(1, 1), batch(2, 2), batch(3, 3)]),
        },
    );
    let (state, _) = update(
        state,
        Msg::ChaptersLoaded {
            novel_id: NOVEL,
            result: Ok(vec![chapter(10, 1), chapter(11, 2), chapter(12, 3)]),
        },
    );
    state
}

fn toggle(state: AppState, kind: ViewKind, id: i64) -> AppState {
    update(state, Msg::UnitToggled { kind, id }).0
}

#[test]
fn toggle_marks_card_selected() {
    init_logging();
    let state = toggle(loaded_state(), ViewKind::Batch, 2);
    let view = state.view();
    let selected: Vec<_> = view
        .batches
        .iter()
        .filter(|row| row.selected)
        .map(|row| row.id)
        .collect();
    assert_eq!(selected, vec![2]);

    let state = toggle(state, ViewKind::Batch, 2);
    assert!(state.view().batches.iter().all(|row| !row.selected));
}

#[test]
fn current_selection_is_in_list_order() {
    init_logging();
    let state = toggle(loaded_state(), ViewKind::Batch, 3);
    let state = toggle(state, ViewKind::Batch, 1);
    assert_eq!(state.current_selection(ViewKind::Batch), vec![1, 3]);
}

#[test]
fn toggling_hidden_list_or_unknown_unit_is_ignored() {
    init_logging();
    let mut state = loaded_state();
    assert!(state.consume_dirty());

    let mut state = toggle(state, ViewKind::Chapter, 10);
    assert!(state.selection().is_empty(ViewKind::Chapter));
    assert!(!state.consume_dirty());

    let mut state = toggle(state, ViewKind::Batch, 99);
    assert!(state.selection().is_empty(ViewKind::Batch));
    assert!(!state.consume_dirty());
}

#[test]
fn every_switch_leaves_inactive_selection_empty() {
    init_logging();
    let mut state = loaded_state();
    let script = [
        (ViewKind::Batch, 1),
        (ViewKind::Chapter, 11),
        (ViewKind::Chapter, 12),
        (ViewKind::Batch, 2),
        (ViewKind::Batch, 3),
        (ViewKind::Chapter, 10),
    ];

    for (mode, id) in script {
        let active = state.active_view();
        state = toggle(state, active, if active == ViewKind::Batch { 1 } else { 10 });
        state = update(state, Msg::ViewSwitched(mode)).0;

        let inactive = match mode {
            ViewKind::Batch => ViewKind::Chapter,
            ViewKind::Chapter => ViewKind::Batch,
        };
        assert!(state.selection().is_empty(inactive));
        assert!(state.selection().is_empty(mode));
        assert_eq!(state.view().view, mode);

        state = toggle(state, mode, id);
        assert!(state.selection().is_empty(inactive));
    }
}

#[test]
fn switching_to_current_mode_still_clears() {
    init_logging();
    let state = toggle(loaded_state(), ViewKind::Batch, 1);
    let (state, effects) = update(state, Msg::ViewSwitched(ViewKind::Batch));
    assert!(effects.is_empty());
    assert_eq!(state.view().view, ViewKind::Batch);
    assert!(state.selection().is_empty(ViewKind::Batch));
}

#[test]
fn reload_reapplies_view_and_clears_selection() {
    init_logging();
    let state = toggle(loaded_state(), ViewKind::Batch, 1);
    let (state, _) = update(
        state,
        Msg::BatchesLoaded {
            novel_id: NOVEL,
            result: Ok(vec![batch(1, 1)]),
        },
    );
    assert!(state.selection().is_empty(ViewKind::Batch));
    assert_eq!(state.view().batches.len(), 1);
}

#[test]
fn lists_for_another_novel_are_ignored() {
    init_logging();
    let state = loaded_state();
    let before = state.view();
    let (state, effects) = update(
        state,
        Msg::ChaptersLoaded {
            novel_id: NOVEL + 1,
            result: Ok(Vec::new()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().chapters, before.chapters);
}

#[test]
fn failed_list_load_keeps_previous_list_and_warns() {
    init_logging();
    let state = loaded_state();
    let (state, effects) = update(
        state,
        Msg::ChaptersLoaded {
            novel_id: NOVEL,
            result: Err(RemoteFailure::Rejected(Some("Novel not found".to_string()))),
        },
    );
    assert_eq!(effects.len(), 1);
    let view = state.view();
    assert_eq!(view.chapters.len(), 3);
    assert_eq!(view.notices.len(), 1);
    assert_eq!(view.notices[0].level, NoticeLevel::Warning);
    assert_eq!(
        view.notices[0].message,
        "Failed to load chapters: Novel not found"
    );

    let Effect::DismissNotice { id, .. } = effects[0] else {
        panic!("expected dismiss effect, got {:?}", effects[0]);
    };
    let (state, _) = update(state, Msg::NoticeExpired(id));
    assert!(state.view().notices.is_empty());
}

#[test]
fn loaded_chapter_progress_drives_initial_bar() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::NovelOpened(NOVEL));
    let mut half = chapter(20, 1);
    half.progress = 50;
    let (state, _) = update(
        state,
        Msg::ChaptersLoaded {
            novel_id: NOVEL,
            result: Ok(vec![half]),
        },
    );
    let view = state.view();
    assert_eq!(view.chapters[0].bar.percent, 50);
    assert_eq!(view.chapters[0].bar.label, "Progress: 50%");
}
