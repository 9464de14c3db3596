//! Command-line arguments of the `ycc` binary.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::CompileOptions;

#[derive(Debug, Parser)]
#[command(
    name = "ycc",
    version,
    about = "Compile a Java-like source file to LLVM-style IR",
    after_long_help = "Set YCC_LOG (for example YCC_LOG=ycc_compiler=debug) to enable logging on stderr."
)]
pub struct Args {
    /// Source file to compile.
    pub input: PathBuf,

    /// Where to write the IR. Defaults to the input path with an `.ll`
    /// extension; `-` writes to stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Options for the library, named after the input file.
    pub fn compile_options(&self) -> CompileOptions {
        let file_name = self
            .input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string());
        CompileOptions::new(file_name)
    }

    /// Destination of the IR, `None` for stdout.
    pub fn output_path(&self) -> Option<PathBuf> {
        match &self.output {
            Some(path) if path == Path::new("-") => None,
            Some(path) => Some(path.clone()),
            None => Some(self.input.with_extension("ll")),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn output_defaults_next_to_the_input() {
        let args = Args::parse_from(["ycc", "src/Main.java"]);
        assert_eq!(args.output_path(), Some(PathBuf::from("src/Main.ll")));
        assert_eq!(args.compile_options().file_name, "Main.java");
    }

    #[test]
    fn dash_means_stdout() {
        let args = Args::parse_from(["ycc", "Main.java", "-o", "-"]);
        assert_eq!(args.output_path(), None);
    }
}
