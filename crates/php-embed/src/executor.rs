//! Invocation requests and their outcomes.

use std::path::PathBuf;

/// What to run: a script file or an inline code string.
#[derive(Debug, Clone)]
pub enum Source {
    /// Path to a script file. The file is opened by the engine, not by this
    /// layer; a nonexistent path surfaces as the engine's own nonzero exit
    /// status.
    File(PathBuf),
    /// Inline code, equivalent to running a one-off script whose body is
    /// this text.
    Code(String),
}

/// A single execution request: a source plus positional arguments.
///
/// Consumed exactly once. The engine may mutate global interpreter state as
/// a side effect of a run, so a request never stands for two executions.
#[derive(Debug)]
pub struct Invocation {
    pub(crate) source: Source,
    pub(crate) args: Vec<String>,
}

impl Invocation {
    /// Request running the script file at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
            args: Vec::new(),
        }
    }

    /// Request running `code` as a one-off script body.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            source: Source::Code(code.into()),
            args: Vec::new(),
        }
    }

    /// Append positional arguments, visible inside the script as
    /// `$argv[1..]`. `$argv[0]` is the script path, or `"-"` for inline
    /// code, mirroring a standalone CLI run.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Exit status of one completed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Process-style exit status: opaque pass-through from the engine,
    /// except the negative boundary sentinels in [`crate::error`].
    pub status: i32,
}

impl Outcome {
    /// Whether the invocation exited cleanly.
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

// `$argv[0]` for inline code, matching the PHP CLI's `-r` behavior.
pub(crate) const INLINE_ARGV0: &str = "-";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_accumulate_in_order() {
        let inv = Invocation::code("echo $argv[1];")
            .args(["a", "b"])
            .args(vec!["c".to_string()]);
        assert_eq!(inv.args, vec!["a", "b", "c"]);
    }

    #[test]
    fn outcome_success_is_exit_zero_only() {
        assert!(Outcome { status: 0 }.success());
        assert!(!Outcome { status: 7 }.success());
        assert!(!Outcome { status: -1 }.success());
    }
}
