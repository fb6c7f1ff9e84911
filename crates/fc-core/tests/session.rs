//! End-to-end editing sessions: file manager, line editor and settings
//! working together the way the shell drives them.

use std::time::{Duration, Instant};

use fc_core::autosave::AutoSave;
use fc_core::{
    Cursor, Document, Error, FileManager, Level, LineChange, LineEditor, Report, Settings,
    Shortcut, UndoOutcome,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn workspace() -> (TempDir, FileManager, LineEditor) {
    let root = TempDir::new().unwrap();
    let fm = FileManager::new(root.path().join("novels")).unwrap();
    (root, fm, LineEditor::new())
}

#[test]
fn write_a_chapter_then_revise_it() {
    let (_root, fm, mut ed) = workspace();
    let name = fm.create_file("chapter1").unwrap();
    let doc = fm.open_file(&name).unwrap();
    ed.open(doc.clone());

    for line in ["It was a dark night.", "The rain fell.", "Nobody came."] {
        ed.input_mut().set(line);
        ed.process_enter().unwrap();
    }
    assert_eq!(
        doc.read_text().unwrap(),
        "It was a dark night.\nThe rain fell.\nNobody came.\n"
    );

    // Walk up to the middle line and rewrite it.
    ed.navigate_up().unwrap();
    ed.navigate_up().unwrap();
    assert_eq!(ed.cursor(), Cursor::Line(1));
    assert_eq!(ed.input().text(), "The rain fell.");
    ed.input_mut().set("The rain fell hard.");
    ed.process_enter().unwrap();
    assert_eq!(ed.cursor(), Cursor::Line(2));

    assert_eq!(
        doc.read_text().unwrap(),
        "It was a dark night.\nThe rain fell hard.\nNobody came.\n"
    );

    // Three appends, the unedited "Nobody came." committed on the way up,
    // then the rewrite.
    assert_eq!(ed.undo().unwrap(), UndoOutcome::Restored { remaining: 4 });
    assert_eq!(
        doc.read_text().unwrap(),
        "It was a dark night.\nThe rain fell.\nNobody came.\n"
    );
}

#[test]
fn deleting_another_file_keeps_session() {
    let (_root, fm, mut ed) = workspace();
    fm.create_file("draft").unwrap();
    fm.create_file("other").unwrap();
    ed.open(fm.open_file("draft").unwrap());

    let gone = fm.delete_file("other").unwrap();
    assert_ne!(ed.document().map(Document::path), Some(gone.as_path()));
    ed.save_current_line("still here").unwrap();
    assert_eq!(ed.document().unwrap().read_text().unwrap(), "still here\n");
}

#[test]
fn deleting_open_file_ends_session() {
    let (_root, fm, mut ed) = workspace();
    fm.create_file("draft").unwrap();
    ed.open(fm.open_file("draft").unwrap());
    ed.save_current_line("text").unwrap();

    let gone = fm.delete_file("draft").unwrap();
    if ed.document().map(Document::path) == Some(gone.as_path()) {
        ed.close();
    }
    assert!(ed.document().is_none());
    let err = ed.save_current_line("more").unwrap_err();
    assert!(matches!(err, Error::NoCurrentFile));
    assert_eq!(Report::from(err).level, Level::Warning);
}

#[test]
fn undo_is_per_file() {
    let (_root, fm, mut ed) = workspace();
    fm.create_file("a").unwrap();
    fm.create_file("b").unwrap();

    ed.open(fm.open_file("a").unwrap());
    ed.save_current_line("in a").unwrap();

    ed.open(fm.open_file("b").unwrap());
    assert_eq!(ed.undo().unwrap(), UndoOutcome::NothingToUndo);

    let a = fm.open_file("a").unwrap();
    ed.open(a.clone());
    assert_eq!(a.read_text().unwrap(), "in a\n");
}

#[test]
fn autosave_appends_pending_input_once() {
    let (_root, fm, mut ed) = workspace();
    fm.create_file("auto").unwrap();
    let doc = fm.open_file("auto").unwrap();
    ed.open(doc.clone());

    let t0 = Instant::now();
    let mut timer = AutoSave::with_interval(Duration::from_secs(60), t0);
    ed.input_mut().set("half a thought");

    assert!(!timer.poll(t0 + Duration::from_secs(30)));
    assert!(timer.poll(t0 + Duration::from_secs(60)));
    assert_eq!(ed.save().unwrap(), LineChange::Appended(0));

    assert!(timer.poll(t0 + Duration::from_secs(120)));
    assert_eq!(ed.save().unwrap(), LineChange::Unchanged);
    assert_eq!(doc.read_text().unwrap(), "half a thought\n");
}

#[test]
fn settings_drive_the_working_directory() {
    let root = TempDir::new().unwrap();
    let settings_path = root.path().join("config").join("settings.json");
    let notes = root.path().join("my notes");

    let mut settings = Settings::open(&settings_path).unwrap();
    settings.set_novel_directory(&notes).unwrap();
    settings.set_shortcut(Shortcut::Undo, "Ctrl+U").unwrap();

    let settings = Settings::open(&settings_path).unwrap();
    let fm = FileManager::new(settings.novel_directory()).unwrap();
    assert_eq!(fm.dir(), notes);
    assert!(notes.is_dir());
    assert_eq!(settings.shortcut(Shortcut::Undo), "Ctrl+U");
    assert_eq!(settings.shortcut(Shortcut::Save), "Ctrl+S");
}

#[test]
fn paste_then_undo_in_one_step() {
    let (_root, fm, mut ed) = workspace();
    fm.create_file("paste").unwrap();
    let doc = fm.open_file("paste").unwrap();
    ed.open(doc.clone());
    ed.save_current_line("before").unwrap();

    let pasted = "one\ntwo\r\nthree";
    let lines: Vec<&str> = pasted.lines().collect();
    ed.append_lines(&lines).unwrap();
    assert_eq!(doc.read_text().unwrap(), "before\none\ntwo\nthree\n");

    ed.undo().unwrap();
    assert_eq!(doc.read_text().unwrap(), "before\n");
}
