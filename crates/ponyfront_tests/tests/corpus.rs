//! Stdlib corpus test: parse and round-trip every package shipped with an
//! installed Pony toolchain. Skips (with a note) when no stdlib is found, so
//! the suite stays green on machines without `ponyc`.

use std::fs;
use std::path::{Path, PathBuf};

use ponyfront_ast::map::ToOrderedMap;
use ponyfront_core::stdlib::find_stdlib;
use ponyfront_parser::parse_module;
use ponyfront_printer::{to_pretty_source, to_source};
use rayon::prelude::*;

fn collect_pony_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_pony_files(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "pony") {
            out.push(path);
        }
    }
}

fn check_file(path: &Path) -> Result<(), String> {
    let source =
        fs::read_to_string(path).map_err(|err| format!("{}: read failed: {err}", path.display()))?;
    let module = parse_module(&source)
        .map_err(|err| format!("{}: parse failed: {err}", path.display()))?;
    let expected = module.to_ordered_map();

    for (label, rendition) in [
        ("compact", to_source(&module)),
        ("pretty", to_pretty_source(&module)),
    ] {
        let reparsed = parse_module(&rendition)
            .map_err(|err| format!("{}: {label} reparse failed: {err}", path.display()))?;
        if reparsed.to_ordered_map() != expected {
            return Err(format!("{}: {label} round trip changed shape", path.display()));
        }
    }
    Ok(())
}

#[test]
fn test_stdlib_round_trips() {
    let stdlib = match find_stdlib() {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("skipping stdlib corpus: {err}");
            return;
        }
    };

    let mut files = Vec::new();
    collect_pony_files(&stdlib, &mut files);
    assert!(
        !files.is_empty(),
        "stdlib at {} contains no .pony files",
        stdlib.display()
    );

    let failures: Vec<String> = files
        .par_iter()
        .filter_map(|path| check_file(path).err())
        .collect();

    assert!(
        failures.is_empty(),
        "{} of {} stdlib files failed:\n{}",
        failures.len(),
        files.len(),
        failures.join("\n")
    );
}
