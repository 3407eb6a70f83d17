//! ponyfront_tests: Cross-crate integration tests.
//!
//! Houses the round-trip and stdlib-corpus suites under `tests/`. The
//! helpers here check the one guarantee the printer makes: reprinted source
//! projects to the same ordered map as the original.

use ponyfront_ast::map::{MapValue, ToOrderedMap};
use ponyfront_parser::parse_module;
use ponyfront_printer::{to_pretty_source, to_source};

/// Parse `source`, reprint it both ways, and assert that each rendition
/// reparses to the same projection. Returns the compact rendition so callers
/// can make additional shape assertions.
pub fn assert_round_trip(source: &str) -> String {
    let module = parse_module(source)
        .unwrap_or_else(|err| panic!("original does not parse: {err}\n---\n{source}"));
    let expected = module.to_ordered_map();

    let compact = to_source(&module);
    assert_projects_to(&compact, &expected, source, "compact");

    let pretty = to_pretty_source(&module);
    assert_projects_to(&pretty, &expected, source, "pretty");

    compact
}

fn assert_projects_to(rendition: &str, expected: &MapValue, original: &str, label: &str) {
    let reparsed = parse_module(rendition).unwrap_or_else(|err| {
        panic!("{label} rendition does not reparse: {err}\n--- original\n{original}\n--- rendition\n{rendition}")
    });
    assert_eq!(
        &reparsed.to_ordered_map(),
        expected,
        "{label} rendition changed shape\n--- original\n{original}\n--- rendition\n{rendition}"
    );
}
