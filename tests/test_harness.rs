// tests/test_harness.rs
//! Helpers for the integration tests: load a file from `test_scripts/`,
//! compile it, and check the IR or the diagnostics it produced.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use ycc::{CompileOptions, CompileOutput, compile};

/// Result of compiling one test input.
pub struct TestResult {
    pub name: String,
    pub source: String,
    pub output: CompileOutput,
}

/// Loads and compiles files from `test_scripts/`.
pub struct TestHarness {
    test_scripts_dir: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let test_scripts_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_scripts");
        Self { test_scripts_dir }
    }

    pub fn load(&self, filename: &str) -> String {
        let path = self.test_scripts_dir.join(filename);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }

    pub fn compile_file(&self, filename: &str) -> TestResult {
        let source = self.load(filename);
        compile_named(filename, &source)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile an inline source under the name `T.java`.
pub fn compile_str(source: &str) -> TestResult {
    compile_named("T.java", source)
}

fn compile_named(name: &str, source: &str) -> TestResult {
    let output = compile(source, &CompileOptions::new(name));
    TestResult {
        name: name.to_string(),
        source: source.to_string(),
        output,
    }
}

impl TestResult {
    /// Assert that compilation succeeded and return the IR.
    pub fn assert_success(&self) -> &str {
        if self.output.diagnostics.has_errors() {
            eprintln!("Source:\n{}", self.source);
            eprintln!("\nDiagnostics:\n{}", self.output.diagnostics);
            panic!(
                "Expected {} to compile, but got {} errors",
                self.name,
                self.output.diagnostics.error_count()
            );
        }
        self.output
            .ir
            .as_deref()
            .unwrap_or_else(|| panic!("{} produced no IR", self.name))
    }

    /// Assert that compilation failed and produced no IR.
    pub fn assert_failure(&self) {
        assert!(
            self.output.diagnostics.has_errors(),
            "Expected {} to fail, but it compiled",
            self.name
        );
        assert!(self.output.ir.is_none(), "IR must not be generated after errors");
    }

    /// Rendered messages without the file prefix, `line:col: message`.
    pub fn messages(&self) -> Vec<String> {
        self.output
            .diagnostics
            .iter()
            .map(|d| format!("{}: {}", d.span, d.message))
            .collect()
    }

    /// Assert that every line of `expected` appears in the IR, in order.
    pub fn assert_ir_contains_in_order(&self, expected: &[&str]) {
        let ir = self.assert_success();
        let mut rest = ir;
        for line in expected {
            match rest.find(line) {
                Some(pos) => rest = &rest[pos + line.len()..],
                None => panic!("Missing (or out of order) in IR: {line:?}\n\n{ir}"),
            }
        }
    }
}
