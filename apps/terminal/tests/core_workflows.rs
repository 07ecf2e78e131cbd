use markpad_core::app::{open_database, open_document_store};
use markpad_core::config::{AppConfig, ConfigStore};
use markpad_core::db::Database;
use markpad_core::documents::SortKey;
use markpad_core::export::MarkdownExport;
use markpad_core::storage::{KeyValueStore, ACTIVE_ID_KEY, DOCUMENTS_KEY};
use markpad_core::store::DocumentStore;
use markpad_core::theme::{load_theme, save_theme, Theme};
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

const EDIT_DEADLINE: Duration = Duration::from_secs(20);

fn config_for(dir: &Path) -> AppConfig {
    AppConfig {
        data_dir: Some(dir.to_string_lossy().to_string()),
        ..AppConfig::default()
    }
}

fn markpad(dir: &Path, args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_markpad"))
        .arg("--data-dir")
        .arg(dir)
        .arg("--config")
        .arg(dir.join("config.json"))
        .args(args)
        .output()
        .expect("run markpad");
    assert!(
        output.status.success(),
        "markpad {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf8")
}

fn spawn_edit(dir: &Path, stdin: Stdio) -> Child {
    Command::new(env!("CARGO_BIN_EXE_markpad"))
        .arg("--data-dir")
        .arg(dir)
        .arg("--config")
        .arg(dir.join("config.json"))
        .arg("edit")
        .stdin(stdin)
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn edit")
}

/// Waits for an edit session to exit, killing it if it hangs.
fn finish_edit(mut child: Child) -> String {
    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().expect("try_wait") {
            break status;
        }
        if started.elapsed() > EDIT_DEADLINE {
            let _ = child.kill();
            panic!("edit session did not exit within {EDIT_DEADLINE:?}");
        }
        std::thread::sleep(Duration::from_millis(20));
    };
    assert!(status.success(), "edit exited with {status}");
    let mut stdout = String::new();
    child
        .stdout
        .take()
        .expect("stdout")
        .read_to_string(&mut stdout)
        .expect("read stdout");
    stdout
}

#[test]
fn documents_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_for(dir.path());

    let (first_id, second_id) = {
        let mut store = open_document_store(&config).expect("open");
        let first_id = store.create().id.clone();
        let second_id = store.create().id.clone();
        store.set_title(&first_id, "Draft");
        store.set_content(&second_id, "# Report\n\nbody");
        (first_id, second_id)
    };

    let store = open_document_store(&config).expect("reopen");
    assert_eq!(store.documents().len(), 2);
    assert_eq!(store.active_id(), Some(second_id.as_str()));
    assert_eq!(store.get(&first_id).map(|doc| doc.title.as_str()), Some("Draft"));
    assert_eq!(
        store.active_document().map(|doc| doc.content.as_str()),
        Some("# Report\n\nbody")
    );

    let titles: Vec<&str> = store
        .visible_documents(SortKey::Title)
        .into_iter()
        .map(|doc| doc.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Draft", "Untitled Document 2"]);
}

#[test]
fn deleted_active_document_stays_deleted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_for(dir.path());

    let id = {
        let mut store = open_document_store(&config).expect("open");
        let id = store.create().id.clone();
        assert!(store.delete(&id));
        id
    };

    let db = open_database(&config.database_path().expect("path")).expect("db");
    assert_eq!(db.get_kv(DOCUMENTS_KEY).expect("get").as_deref(), Some("[]"));
    assert_eq!(db.get_kv(ACTIVE_ID_KEY).expect("get"), None);

    let mut store = DocumentStore::load(db);
    store.select(&id);
    assert!(store.active_document().is_none());
    assert!(store.documents().is_empty());
}

#[test]
fn corrupt_documents_entry_starts_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("markpad.db");
    {
        let mut db = open_database(&path).expect("db");
        db.set(DOCUMENTS_KEY, "{not json").expect("set");
    }

    let mut store = DocumentStore::load(open_database(&path).expect("db"));
    assert!(store.documents().is_empty());
    store.create();
    assert_eq!(store.documents()[0].title, "Untitled Document 1");
}

#[test]
fn theme_persists_in_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("markpad.db");
    {
        let mut db = open_database(&path).expect("db");
        assert_eq!(load_theme(&db, Theme::Light), Theme::Light);
        save_theme(&mut db, Theme::Dark).expect("save");
    }
    let db = Database::open(&path).expect("db");
    assert_eq!(load_theme(&db, Theme::Light), Theme::Dark);
}

#[test]
fn config_file_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ConfigStore::new(dir.path().join("nested").join("config.json"));
    assert_eq!(store.load().expect("load"), AppConfig::default());

    let config = AppConfig {
        autosave_debounce_ms: 250,
        default_sort: SortKey::Title,
        default_theme: Theme::Dark,
        ..config_for(dir.path())
    };
    store.save(&config).expect("save");
    assert_eq!(store.load().expect("reload"), config);
}

#[test]
fn export_writes_sanitized_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let export = MarkdownExport::new("Plan: Q3/Q4?", "# Plan\n");
    let path = export.write_to_dir(dir.path()).expect("export");
    assert_eq!(path, dir.path().join("Plan- Q3-Q4-.md"));
    assert_eq!(std::fs::read_to_string(path).expect("read"), "# Plan\n");
}

#[test]
fn cli_workflow_across_invocations() {
    let dir = tempfile::tempdir().expect("tempdir");

    let created = markpad(dir.path(), &["new"]);
    assert!(created.starts_with("Created Untitled Document 1"));
    markpad(dir.path(), &["new"]);

    let listed = markpad(dir.path(), &["list", "--json"]);
    let rows: Vec<serde_json::Value> = serde_json::from_str(&listed).expect("json");
    assert_eq!(rows.len(), 2);
    let first_id = rows
        .iter()
        .find(|row| row["title"] == "Untitled Document 1")
        .and_then(|row| row["id"].as_str())
        .expect("first id")
        .to_string();

    markpad(dir.path(), &["select", first_id.as_str()]);
    markpad(dir.path(), &["rename", &first_id[..8], "Draft", "notes"]);

    let mut child = spawn_edit(dir.path(), Stdio::piped());
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"# Draft\n:wq\n")
        .expect("write");
    let printed = finish_edit(child);
    assert!(printed.contains("saved 8 bytes"));

    let html = markpad(dir.path(), &["show", "--html"]);
    assert_eq!(html, "<h1>Draft</h1>\n");

    let filtered = markpad(dir.path(), &["list", "--search", "DRA"]);
    assert!(filtered.contains("Draft notes"));
    assert!(!filtered.contains("Untitled Document 2"));

    let out_dir = dir.path().join("exports");
    let out_arg = out_dir.to_string_lossy().to_string();
    let exported = markpad(dir.path(), &["export", "--out", out_arg.as_str()]);
    assert!(exported.starts_with("Exported "));
    assert!(out_dir.join("Draft notes.md").exists());

    assert_eq!(markpad(dir.path(), &["theme", "toggle"]), "Theme: dark\n");
    assert_eq!(markpad(dir.path(), &["theme"]), "Theme: dark\n");
}

#[test]
fn edit_with_closed_stdin_exits_without_changes() {
    let dir = tempfile::tempdir().expect("tempdir");
    markpad(dir.path(), &["new"]);

    let printed = finish_edit(spawn_edit(dir.path(), Stdio::null()));
    assert!(printed.starts_with("Editing "));
    assert!(!printed.contains("saved"));

    let config = config_for(dir.path());
    let store = open_document_store(&config).expect("open");
    assert_eq!(
        store.active_document().map(|doc| doc.content.as_str()),
        Some("")
    );
}
