#![no_main]

use std::path::PathBuf;

use clap::Parser;
use libfuzzer_sys::fuzz_target;

use wordcop::cli::Args;
use wordcop::config::ResolvedConfig;
use wordcop::cop::registry::CopRegistry;
use wordcop::linter::lint_source;
use wordcop::parse::source::SourceFile;

// Correcting any input must leave nothing for a second pass to report.
fuzz_target!(|data: &[u8]| {
    let config = ResolvedConfig::default();
    let registry = CopRegistry::default_registry();
    let correct = Args::parse_from(["wordcop", "-a"]);
    let check = Args::parse_from(["wordcop"]);

    let source = SourceFile::from_vec(PathBuf::from("fuzz.rb"), data.to_vec());
    let Ok(result) = lint_source(&source, &config, &registry, &correct) else {
        return;
    };
    let Some(fixed) = result.corrected_source else {
        return;
    };

    let fixed = SourceFile::from_vec(PathBuf::from("fuzz.rb"), fixed);
    let again = lint_source(&fixed, &config, &registry, &check).unwrap();
    assert!(
        again.diagnostics.is_empty(),
        "offenses survived autocorrect: {:?}",
        again.diagnostics
    );
});
