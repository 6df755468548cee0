use std::fs;
use std::path::PathBuf;

use rftemplate::adapter::{DesignAdapter, DesignExport, MarkupAdapter};
use rftemplate::{Asset, AssetStore, CompiledDocument, Compiler, Config, DesignConfig, FillRequest, SourceAdapter};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

/// Compare against `tests/goldens/expected/<stem>.html` and `<stem>.sha256`.
fn check_golden(stem: &str, doc: &CompiledDocument) {
    let html_path = golden_path(&format!("{}.html", stem));
    let digest_path = golden_path(&format!("{}.sha256", stem));
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&html_path, &doc.html).expect("write golden");
        fs::write(&digest_path, format!("{}\n", doc.digest())).expect("write golden");
        println!("Updated golden: {:?}", digest_path);
        return;
    }

    let html = fs::read_to_string(&html_path).expect("unable to read golden markup");
    assert_eq!(doc.html, html, "compiled output for {} changed", stem);
    let digest = fs::read_to_string(&digest_path).expect("unable to read golden digest");
    assert_eq!(doc.digest(), digest.trim(), "digest for {} changed", stem);
}

#[test]
fn golden_design_compile() {
    let raw = fs::read_to_string("tests/fixtures/launch_export.json").expect("read fixture");
    let export = DesignExport::from_json(&raw).expect("parse fixture");
    let import = DesignAdapter::new(DesignConfig::default())
        .import("launch", &export)
        .expect("import");
    let request = FillRequest::from_json(r#"{"eventTitle": "Launch Night"}"#).unwrap();
    let doc = Compiler::default().compile(&import.schema, &request, &import.assets).unwrap();

    let again = Compiler::default().compile(&import.schema, &request, &import.assets).unwrap();
    assert_eq!(doc.html, again.html);
    check_golden("launch", &doc);
}

#[test]
fn golden_markup_compile() {
    let config = Config::from_file("tests/fixtures/meetup_config.json").expect("load config");
    let markup = fs::read_to_string("tests/fixtures/meetup.html").expect("read fixture");
    let import = MarkupAdapter::new(config.markup).import("meetup", &markup).expect("import");

    let data = fs::read_to_string("tests/fixtures/two_speakers.json").expect("read fixture");
    let request = FillRequest::from_json(&data).unwrap().with_token("primary", "#1a1a2e");
    let mut assets = AssetStore::new();
    assets.insert("logo", Asset::from_bytes(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_vec()));

    let compiler = Compiler::new(config.compile);
    let doc = compiler.compile(&import.schema, &request, &assets).unwrap();
    let again = compiler.compile(&import.schema, &request, &assets).unwrap();
    assert_eq!(doc.digest(), again.digest());
    check_golden("meetup", &doc);
}
