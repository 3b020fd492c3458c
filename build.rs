use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_LOCALE: &str = "en";

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let locales_dir = manifest_dir.join("locales");
    println!("cargo:rerun-if-changed={}", locales_dir.display());

    let mut locales = BTreeMap::<String, BTreeMap<String, String>>::new();
    let mut entries = fs::read_dir(&locales_dir)
        .expect("locales directory must exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect::<Vec<_>>();
    entries.sort();

    for path in entries {
        println!("cargo:rerun-if-changed={}", path.display());
        let Some(tag) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        locales.insert(tag.to_string(), load_catalog(&path));
    }

    if !locales.contains_key(DEFAULT_LOCALE) {
        panic!("default locale `{DEFAULT_LOCALE}` has no catalog in locales/");
    }

    let mut out = String::new();
    out.push_str(&format!(
        "pub const DEFAULT_LOCALE: &str = {DEFAULT_LOCALE:?};\n"
    ));
    out.push_str("pub static LOCALES: &[(&str, &[(&str, &str)])] = &[\n");
    for (tag, messages) in &locales {
        out.push_str(&format!("    ({tag:?}, &[\n"));
        for (key, value) in messages {
            out.push_str(&format!("        ({key:?}, {value:?}),\n"));
        }
        out.push_str("    ]),\n");
    }
    out.push_str("];\n");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("out dir"));
    fs::write(out_dir.join("expensesync_i18n_generated.rs"), out)
        .expect("write generated i18n table");
}

fn load_catalog(path: &Path) -> BTreeMap<String, String> {
    let raw = fs::read_to_string(path)
        .unwrap_or_else(|error| panic!("failed to read {}: {error}", path.display()));
    let table = toml::from_str::<toml::Table>(&raw)
        .unwrap_or_else(|error| panic!("failed to parse {}: {error}", path.display()));
    let mut messages = BTreeMap::new();
    flatten(None, &table, &mut messages, path);
    messages
}

fn flatten(
    prefix: Option<&str>,
    table: &toml::Table,
    messages: &mut BTreeMap<String, String>,
    path: &Path,
) {
    for (key, value) in table {
        let full_key = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            toml::Value::String(text) => {
                messages.insert(full_key, text.clone());
            }
            toml::Value::Table(nested) => flatten(Some(&full_key), nested, messages, path),
            other => panic!(
                "{}: `{full_key}` must be a string or table, found {}",
                path.display(),
                other.type_str()
            ),
        }
    }
}
