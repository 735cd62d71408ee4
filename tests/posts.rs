use blog_schema::content::{
    ContentLoader, Field, FieldErrorKind, LoadError, PostSchema, Schema,
};
use blog_schema::Blog;
use chrono::{TimeZone, Utc};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn yaml(s: &str) -> serde_yaml::Value {
    serde_yaml::from_str(s).unwrap()
}

fn write_post(base: &Path, name: &str, content: &str) {
    let dir = base.join("src/content/posts");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn hello_world_gets_default_lang() {
    let meta = PostSchema
        .validate(&yaml(r#"{title: "Hello World", date: "2024-01-15"}"#))
        .unwrap();
    assert_eq!(meta.title, "Hello World");
    assert_eq!(meta.date, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    assert_eq!(meta.lang, "en");
}

#[test]
fn missing_title_is_reported() {
    let err = PostSchema
        .validate(&yaml(r#"{date: "2024-01-15"}"#))
        .unwrap_err();
    assert_eq!(err.errors().len(), 1);
    assert_eq!(err.errors()[0].field, Field::Title);
    assert_eq!(err.errors()[0].kind, FieldErrorKind::MissingRequiredField);
}

#[test]
fn unparseable_date_is_reported() {
    let err = PostSchema
        .validate(&yaml(r#"{title: "Post", date: "not-a-date"}"#))
        .unwrap_err();
    assert_eq!(err.errors()[0].field, Field::Date);
    assert!(matches!(
        err.errors()[0].kind,
        FieldErrorKind::UncoercibleDate { .. }
    ));
}

#[test]
fn non_string_tag_is_reported() {
    let err = PostSchema
        .validate(&yaml(r#"{title: "Post", date: "2024-01-15", tags: ["go", 42]}"#))
        .unwrap_err();
    assert_eq!(err.errors()[0].field, Field::Tags);
    assert!(matches!(
        err.errors()[0].kind,
        FieldErrorKind::TypeMismatch { .. }
    ));
}

#[test]
fn explicit_lang_is_kept() {
    let meta = PostSchema
        .validate(&yaml(r#"{title: "Post", date: "2024-01-15", lang: "fr"}"#))
        .unwrap();
    assert_eq!(meta.lang, "fr");
}

#[test]
fn site_with_mixed_posts() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("_config.yml"),
        "site: https://jmfrancois.github.io\nintegrations: [mdx, sitemap]\n",
    )
    .unwrap();
    write_post(
        tmp.path(),
        "first.md",
        "---\ntitle: First\ndate: 2023-12-31\ncategories: [life]\n---\nHi\n",
    );
    write_post(
        tmp.path(),
        "second.mdx",
        "---\ntitle: Second\ndate: 2024-01-15\nlang: fr\n---\nimport X from './x'\n",
    );
    write_post(tmp.path(), "broken.md", "---\ntitle: [nope]\ndate: 2024-01-15\n---\n");

    let blog = Blog::new(tmp.path()).unwrap();
    assert_eq!(blog.config.site, "https://jmfrancois.github.io");

    let report = ContentLoader::new(&blog).load_posts().unwrap();
    let titles: Vec<_> = report.entries.iter().map(|e| e.data.title.as_str()).collect();
    assert_eq!(titles, vec!["Second", "First"]);
    assert_eq!(report.entries[0].data.lang, "fr");
    assert_eq!(report.entries[1].data.lang, "en");

    assert_eq!(report.errors.len(), 1);
    match &report.errors[0].error {
        LoadError::Invalid(err) => {
            assert!(err.has(Field::Title));
            assert!(!err.has(Field::Date));
        }
        other => panic!("unexpected error: {other}"),
    }

    let summary = blog.check().unwrap();
    assert_eq!(summary.valid, 2);
    assert_eq!(summary.invalid, 1);
}
