use flatpages::config::{AutoReload, ExtensionSetting, FlatPagesConfig, MetaFormat};
use flatpages::error::FlatPagesError;
use flatpages::metadata::{Metadata, Value};
use flatpages::page::Page;
use flatpages::renderer::{Renderer, RendererSlot};
use flatpages::FlatPages;
use std::cell::Cell;
use std::fs::File;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

// =============================================================================
// Fixtures
// =============================================================================

fn setup(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("pages");
    std::fs::create_dir_all(&root).unwrap();
    for (name, content) in files {
        write(&root.join(name), content);
    }
    temp_dir
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn set_mtime(path: &Path, mtime: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(mtime)
        .unwrap();
}

fn base_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

fn open(temp_dir: &TempDir) -> FlatPages {
    FlatPages::new(FlatPagesConfig::default(), temp_dir.path())
}

fn open_with(temp_dir: &TempDir, config: FlatPagesConfig) -> FlatPages {
    FlatPages::new(config, temp_dir.path())
}

fn page_file(temp_dir: &TempDir, name: &str) -> std::path::PathBuf {
    temp_dir.path().join("pages").join(name)
}

// =============================================================================
// Lookup
// =============================================================================

#[test]
fn test_get_returns_identical_page() {
    let temp_dir = setup(&[("hello.html", "title: Hello\n\nHello, *World*!")]);
    let pages = open(&temp_dir);

    let first = pages.get("hello").unwrap().unwrap();
    let second = pages.get("hello").unwrap().unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(first.get("title").unwrap(), &Value::from("Hello"));
    assert_eq!(first.body(), "Hello, *World*!");
}

#[test]
fn test_not_found_default() {
    let temp_dir = setup(&[("hello.html", "Hello")]);
    let pages = open(&temp_dir);

    assert!(pages.get("missing").unwrap().is_none());
    assert_eq!(pages.get("missing").unwrap().map_or(42, |_| 0), 42);

    let fallback = pages.get_or_fail("hello").unwrap();
    let got = pages.get_or("missing", Rc::clone(&fallback)).unwrap();
    assert!(Rc::ptr_eq(&got, &fallback));

    let err = pages.get_or_fail("missing").unwrap_err();
    assert!(matches!(err, FlatPagesError::NotFound(ref p) if p == "missing"));
}

#[test]
fn test_nested_paths_and_iteration() {
    let temp_dir = setup(&[
        ("index.html", "Home"),
        ("foo/bar.html", "Bar"),
        ("foo/lorem/ipsum.html", "Ipsum"),
        ("foo/not_a_page.txt", "ignored"),
    ]);
    let pages = open(&temp_dir);

    let paths: Vec<String> = pages
        .pages()
        .unwrap()
        .iter()
        .map(|p| p.path().to_string())
        .collect();
    assert_eq!(paths, vec!["foo/bar", "foo/lorem/ipsum", "index"]);
    assert_eq!(pages.snapshot().unwrap().len(), 3);
}

#[test]
fn test_missing_root_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let pages = open(&temp_dir);
    assert!(pages.pages().unwrap().is_empty());
}

// =============================================================================
// Front matter
// =============================================================================

#[test]
fn test_page_without_metadata() {
    let temp_dir = setup(&[("plain.html", "Hello world")]);
    let pages = open(&temp_dir);

    let page = pages.get_or_fail("plain").unwrap();
    assert!(page.meta().unwrap().is_empty());
    assert_eq!(page.body(), "Hello world");
}

#[test]
fn test_metadata_then_body() {
    let temp_dir = setup(&[("foo.html", "title: Foo\n\nbody line 1\nbody line 2")]);
    let pages = open(&temp_dir);

    let page = pages.get_or_fail("foo").unwrap();
    assert_eq!(page.meta().unwrap().len(), 1);
    assert_eq!(page.get("title").unwrap().as_str(), Some("Foo"));
    assert_eq!(page.body(), "body line 1\nbody line 2");
}

#[test]
fn test_legacy_and_tokenizing_parsers_diverge() {
    let content = "k: |\n  line1\n\n  line2\n\nBody";
    let temp_dir = setup(&[("block.html", content)]);

    let tokenizing = open(&temp_dir);
    let page = tokenizing.get_or_fail("block").unwrap();
    assert_eq!(page.get("k").unwrap().as_str(), Some("line1\n\nline2"));
    assert_eq!(page.body(), "Body");

    let config = FlatPagesConfig {
        legacy_meta_parser: true,
        ..FlatPagesConfig::default()
    };
    let legacy = open_with(&temp_dir, config);
    let page = legacy.get_or_fail("block").unwrap();
    assert_eq!(page.get("k").unwrap().as_str(), Some("line1"));
    assert_eq!(page.body(), "  line2\n\nBody");
}

#[test]
fn test_toml_pages_by_extension() {
    let temp_dir = setup(&[
        ("yaml.html", "title: From YAML\n\nYAML body"),
        (
            "toml.md",
            "+++\ntitle = \"From TOML\"\ndate = 2024-03-01\n+++\n\nTOML body",
        ),
    ]);
    let mut config = FlatPagesConfig {
        extension: ExtensionSetting::from(vec![".html", ".md"]),
        ..FlatPagesConfig::default()
    };
    config.meta_parsers.insert(".md".to_string(), MetaFormat::Toml);
    let pages = open_with(&temp_dir, config);

    let toml = pages.get_or_fail("toml").unwrap();
    assert_eq!(toml.format(), MetaFormat::Toml);
    assert_eq!(toml.get("title").unwrap().as_str(), Some("From TOML"));
    assert!(toml.get("date").unwrap().as_date().is_some());
    assert_eq!(toml.body(), "TOML body");

    let yaml = pages.get_or_fail("yaml").unwrap();
    assert_eq!(yaml.get("title").unwrap().as_str(), Some("From YAML"));
}

#[test]
fn test_metadata_type_error_stays_with_page() {
    let temp_dir = setup(&[
        ("list.html", "- a\n- b\n\nbody"),
        ("good.html", "title: Good\n\nbody"),
    ]);
    let pages = open(&temp_dir);

    let page = pages.get("list").unwrap().expect("page is listed");
    match page.meta().unwrap_err() {
        FlatPagesError::MetadataType { path, found } => {
            assert_eq!(path, "list");
            assert_eq!(found, "sequence");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(matches!(
        page.get("title"),
        Err(FlatPagesError::MetadataType { .. })
    ));

    let good = pages.get_or_fail("good").unwrap();
    assert_eq!(good.title(), Some("Good"));
    assert_eq!(pages.pages().unwrap().len(), 2);
}

#[test]
fn test_body_without_separator_does_not_block_table() {
    let temp_dir = setup(&[
        ("loose.html", "title: Foo\nSome body"),
        ("good.html", "title: Good\n\nbody"),
    ]);
    let pages = open(&temp_dir);

    let loose = pages.get_or_fail("loose").unwrap();
    assert_eq!(loose.title(), Some("Foo"));
    assert_eq!(loose.body(), "Some body");
    assert!(pages.get("good").unwrap().is_some());
}

#[test]
fn test_decode_error_names_path() {
    let temp_dir = setup(&[("broken/page.html", "title: a\u{7}b\n\nbody")]);
    let pages = open(&temp_dir);

    let err = pages.get("broken/page").unwrap_err();
    assert!(matches!(err, FlatPagesError::Decode { .. }));
    assert!(err.to_string().contains("broken/page"));
}

// =============================================================================
// Extensions and collisions
// =============================================================================

#[test]
fn test_multiple_extensions() {
    let temp_dir = setup(&[("a.html", "A"), ("b.txt", "B"), ("c.md", "C")]);
    let config = FlatPagesConfig {
        extension: ExtensionSetting::from(".html,.txt"),
        ..FlatPagesConfig::default()
    };
    let pages = open_with(&temp_dir, config);

    assert!(pages.get("a").unwrap().is_some());
    assert!(pages.get("b").unwrap().is_some());
    assert!(pages.get("c").unwrap().is_none());
}

#[test]
fn test_collision_is_an_error() {
    let temp_dir = setup(&[("a.html", "one"), ("a.txt", "two")]);
    let config = FlatPagesConfig {
        extension: ExtensionSetting::from(vec![".html", ".txt"]),
        ..FlatPagesConfig::default()
    };
    let pages = open_with(&temp_dir, config);

    let err = pages.get("a").unwrap_err();
    match err {
        FlatPagesError::Collision { path, first, second } => {
            assert_eq!(path, "a");
            assert_ne!(first, second);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_collision_after_new_file_and_reload() {
    let temp_dir = setup(&[("hello.html", "Hello")]);
    let config = FlatPagesConfig {
        extension: ExtensionSetting::from(vec![".html", ".txt"]),
        ..FlatPagesConfig::default()
    };
    let pages = open_with(&temp_dir, config);
    assert!(pages.get("hello").unwrap().is_some());

    write(&page_file(&temp_dir, "hello.txt"), "Hello again");
    // Still the old snapshot until reload.
    assert!(pages.get("hello").unwrap().is_some());

    pages.reload(false);
    assert!(matches!(
        pages.get("hello"),
        Err(FlatPagesError::Collision { .. })
    ));
}

#[test]
fn test_case_insensitive() {
    let temp_dir = setup(&[("Hello.html", "Hi"), ("Foo/Bar.html", "Bar")]);
    let config = FlatPagesConfig {
        case_insensitive: true,
        ..FlatPagesConfig::default()
    };
    let pages = open_with(&temp_dir, config);

    let paths = pages.snapshot().unwrap();
    assert_eq!(paths.paths(), vec!["foo/bar", "hello"]);
    assert!(pages.get("HELLO").unwrap().is_some());
    assert!(pages.get("foo/bar").unwrap().is_some());
}

#[test]
fn test_case_insensitive_collision() {
    let temp_dir = setup(&[("Hello.html", "one"), ("hello.html", "two")]);
    let config = FlatPagesConfig {
        case_insensitive: true,
        ..FlatPagesConfig::default()
    };
    let pages = open_with(&temp_dir, config);
    assert!(matches!(
        pages.pages(),
        Err(FlatPagesError::Collision { .. })
    ));
}

#[test]
fn test_invalid_configuration() {
    let temp_dir = setup(&[("a.html", "A")]);

    let config = FlatPagesConfig {
        extension: ExtensionSetting::Many(Vec::new()),
        ..FlatPagesConfig::default()
    };
    assert!(matches!(
        open_with(&temp_dir, config).get("a"),
        Err(FlatPagesError::Config(_))
    ));

    let config = FlatPagesConfig {
        encoding: "no-such-encoding".to_string(),
        ..FlatPagesConfig::default()
    };
    assert!(matches!(
        open_with(&temp_dir, config).get("a"),
        Err(FlatPagesError::Config(_))
    ));
}

// =============================================================================
// Caching and reload
// =============================================================================

#[test]
fn test_reload_picks_up_changes() {
    let temp_dir = setup(&[("a.html", "title: A\n\nold"), ("b.html", "B")]);
    let a_file = page_file(&temp_dir, "a.html");
    set_mtime(&a_file, base_time());
    let pages = open(&temp_dir);

    let old_a = pages.get_or_fail("a").unwrap();
    let old_b = pages.get_or_fail("b").unwrap();

    write(&a_file, "title: A2\n\nnew");
    set_mtime(&a_file, base_time() + Duration::from_secs(10));

    // No reload yet: the snapshot is unchanged.
    assert!(Rc::ptr_eq(&pages.get_or_fail("a").unwrap(), &old_a));

    pages.reload(false);
    let new_a = pages.get_or_fail("a").unwrap();
    assert!(!Rc::ptr_eq(&new_a, &old_a));
    assert_eq!(new_a.body(), "new");
    assert_eq!(new_a.get("title").unwrap().as_str(), Some("A2"));
    assert_eq!(old_a.body(), "old");

    let new_b = pages.get_or_fail("b").unwrap();
    assert_eq!(new_b.body(), old_b.body());
}

#[test]
fn test_same_mtime_keeps_stale_page() {
    let temp_dir = setup(&[("a.html", "old")]);
    let a_file = page_file(&temp_dir, "a.html");
    set_mtime(&a_file, base_time());
    let pages = open(&temp_dir);
    assert_eq!(pages.get_or_fail("a").unwrap().body(), "old");

    write(&a_file, "new");
    set_mtime(&a_file, base_time());
    pages.reload(false);
    assert_eq!(pages.get_or_fail("a").unwrap().body(), "old");

    pages.reload(true);
    assert_eq!(pages.get_or_fail("a").unwrap().body(), "new");
}

#[test]
fn test_deep_reload_reparses() {
    let temp_dir = setup(&[("a.html", "A")]);
    let pages = open(&temp_dir);

    let first = pages.get_or_fail("a").unwrap();
    pages.reload(false);
    let shallow = pages.get_or_fail("a").unwrap();
    assert!(Rc::ptr_eq(&first, &shallow));

    pages.reload(true);
    let deep = pages.get_or_fail("a").unwrap();
    assert!(!Rc::ptr_eq(&first, &deep));
    assert_eq!(deep.body(), "A");
}

#[test]
fn test_deleted_file_disappears_after_reload() {
    let temp_dir = setup(&[("a.html", "A"), ("b.html", "B")]);
    let pages = open(&temp_dir);
    assert_eq!(pages.pages().unwrap().len(), 2);

    std::fs::remove_file(page_file(&temp_dir, "b.html")).unwrap();
    assert_eq!(pages.pages().unwrap().len(), 2);

    pages.reload(false);
    assert!(pages.get("b").unwrap().is_none());
}

#[test]
fn test_before_request_policy() {
    let temp_dir = setup(&[("a.html", "A")]);

    let pages = open(&temp_dir);
    assert_eq!(pages.config().auto_reload, AutoReload::IfDebug);
    assert!(!pages.before_request(false));
    assert!(pages.before_request(true));

    let config = FlatPagesConfig {
        auto_reload: AutoReload::Never,
        ..FlatPagesConfig::default()
    };
    let pages = open_with(&temp_dir, config);
    let before = pages.snapshot().unwrap();
    assert!(!pages.before_request(true));
    assert!(Rc::ptr_eq(&before, &pages.snapshot().unwrap()));

    let config = FlatPagesConfig {
        auto_reload: AutoReload::Always,
        ..FlatPagesConfig::default()
    };
    let pages = open_with(&temp_dir, config);
    let before = pages.snapshot().unwrap();
    assert!(pages.before_request(false));
    assert!(!Rc::ptr_eq(&before, &pages.snapshot().unwrap()));
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_markdown_rendering() {
    let temp_dir = setup(&[("hello.html", "title: Hello\n\nHello, *World*!")]);
    let pages = open(&temp_dir);

    let page = pages.get_or_fail("hello").unwrap();
    assert_eq!(page.html(&pages).unwrap(), "<p>Hello, <em>World</em>!</p>\n");
}

#[test]
fn test_html_is_rendered_once() {
    let temp_dir = setup(&[("a.html", "A")]);
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);

    let config = FlatPagesConfig {
        renderer: "counting".to_string(),
        ..FlatPagesConfig::default()
    };
    let mut pages = open_with(&temp_dir, config);
    pages.register_renderer(Renderer::body_only("counting", move |body| {
        counter.set(counter.get() + 1);
        body.to_uppercase()
    }));

    let page = pages.get_or_fail("a").unwrap();
    assert_eq!(page.html(&pages).unwrap(), "A");
    assert_eq!(page.html(&pages).unwrap(), "A");
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_renderer_with_pages() {
    let temp_dir = setup(&[("a.html", "A"), ("b.html", "B")]);
    let config = FlatPagesConfig {
        renderer: "with-pages".to_string(),
        ..FlatPagesConfig::default()
    };
    let mut pages = open_with(&temp_dir, config);
    pages.register_renderer(Renderer::with_pages("with-pages", |body, pages| {
        let count = pages.pages().map(|p| p.len()).unwrap_or(0);
        format!("{} of {}", body, count)
    }));

    let page = pages.get_or_fail("a").unwrap();
    assert_eq!(page.html(&pages).unwrap(), "A of 2");
}

#[test]
fn test_renderer_with_page() {
    let temp_dir = setup(&[("a.html", "title: First\n\nbody")]);
    let config = FlatPagesConfig {
        renderer: "with-page".to_string(),
        ..FlatPagesConfig::default()
    };
    let mut pages = open_with(&temp_dir, config);
    pages.register_renderer(Renderer::with_page("with-page", |body, _, page| {
        format!("<h1>{}</h1>{}", page.title().unwrap_or_default(), body)
    }));

    let page = pages.get_or_fail("a").unwrap();
    assert_eq!(page.html(&pages).unwrap(), "<h1>First</h1>body");
}

#[test]
fn test_unknown_renderer_fails_at_render() {
    let temp_dir = setup(&[("a.html", "A")]);
    let config = FlatPagesConfig {
        renderer: "nope".to_string(),
        ..FlatPagesConfig::default()
    };
    let pages = open_with(&temp_dir, config);

    let page = pages.get_or_fail("a").unwrap();
    assert_eq!(page.renderer_name(), "nope");
    let err = page.html(&pages).unwrap_err();
    assert!(matches!(err, FlatPagesError::Renderer(_)));
    assert!(err.to_string().contains("nope"));
}

#[test]
fn test_page_built_by_hand() {
    let temp_dir = setup(&[]);
    let pages = open(&temp_dir);
    let page = Page::new(
        "manual",
        "manual.html",
        "title: Manual",
        MetaFormat::Yaml,
        "*hi*",
        RendererSlot::Resolved(Rc::new(Renderer::raw())),
    );
    assert_eq!(page.title(), Some("Manual"));
    assert_eq!(page.html(&pages).unwrap(), "*hi*");
}

// =============================================================================
// Writing
// =============================================================================

#[test]
fn test_store_and_delete() {
    let temp_dir = setup(&[]);
    let pages = open(&temp_dir);
    assert!(pages.get("blog/first").unwrap().is_none());

    let mut meta = Metadata::new();
    meta.insert("title".to_string(), Value::from("First post"));
    meta.insert("tags".to_string(), Value::from(vec!["a", "b"]));

    let file = pages.store("blog/first", &meta, "Hello\n\nThere").unwrap();
    assert_eq!(file, page_file(&temp_dir, "blog/first.html"));

    let page = pages.get_or_fail("blog/first").unwrap();
    assert_eq!(page.meta().unwrap(), &meta);
    assert_eq!(page.body(), "Hello\n\nThere");

    pages.delete("blog/first").unwrap();
    assert!(!file.exists());
    assert!(pages.get("blog/first").unwrap().is_none());
    assert!(matches!(
        pages.delete("blog/first"),
        Err(FlatPagesError::NotFound(_))
    ));
}

#[test]
fn test_store_toml() {
    let temp_dir = setup(&[]);
    let config = FlatPagesConfig {
        extension: ".md".into(),
        meta_parser: MetaFormat::Toml,
        ..FlatPagesConfig::default()
    };
    let pages = open_with(&temp_dir, config);

    let mut meta = Metadata::new();
    meta.insert("title".to_string(), Value::from("T"));
    let file = pages.store("t", &meta, "Body").unwrap();

    let text = std::fs::read_to_string(&file).unwrap();
    assert!(text.starts_with("+++\n"));
    let page = pages.get_or_fail("t").unwrap();
    assert_eq!(page.get("title").unwrap().as_str(), Some("T"));
    assert_eq!(page.body(), "Body");
}

#[test]
fn test_store_rejects_bad_paths() {
    let temp_dir = setup(&[]);
    let pages = open(&temp_dir);
    let meta = Metadata::new();

    for bad in ["", "../escape", "/abs", "a\\b", "a//b"] {
        assert!(
            matches!(pages.store(bad, &meta, ""), Err(FlatPagesError::Validation(_))),
            "accepted {:?}",
            bad
        );
    }
}
