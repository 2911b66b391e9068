//! mtsort CLI -- check execution sequences and generate random ones.

use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use mtsort_core::{ExecutionReport, Report, Strategy};
use mtsort_parser::{parse_execution, parse_execution_list, ParseError};
use mtsort_testgen::generator::LIST_FILE;

/// Exit status when every execution admitted a total order.
pub const EXIT_OK: i32 = 0;
/// Exit status when at least one execution contained a cycle.
pub const EXIT_CYCLE: i32 = 1;
/// Exit status for unreadable input, structural errors and bad arguments.
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "mtsort",
    about = "Incremental topological sorting of memory-access traces"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that every execution of a sequence admits a total order
    Check(CheckArgs),
    /// Generate random execution sequences
    Generate(GenerateArgs),
}

#[derive(Debug, Parser)]
#[command(group(ArgGroup::new("source").required(true).args(["files", "list", "input_dir"])))]
pub struct CheckArgs {
    /// Execution relation files, in processing order
    pub files: Vec<PathBuf>,
    /// List file naming the execution files (relative to the list's directory)
    #[arg(long)]
    pub list: Option<PathBuf>,
    /// Directory whose execution files are processed in natural name order
    #[arg(long)]
    pub input_dir: Option<PathBuf>,
    /// File extension selected by --input-dir
    #[arg(long, default_value = "txt")]
    pub extension: String,
    /// How executions after the first are linearized
    #[arg(long, value_enum, default_value_t = StrategyArg::Incremental)]
    pub strategy: StrategyArg,
    /// Print the settled order of every execution
    #[arg(long)]
    pub verbose: bool,
    /// Output results as JSON (one object per execution)
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Number of batches to generate
    #[arg(long)]
    pub n_batch: u64,
    /// Number of distinct labels per batch
    #[arg(long)]
    pub n_label: u64,
    /// Number of relation slots per execution
    #[arg(long)]
    pub n_slot: u64,
    /// Number of executions per batch
    #[arg(long)]
    pub n_exec: u64,
    /// Endpoint mutations between consecutive executions
    #[arg(long, default_value_t = 1)]
    pub n_mutation: u64,
    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
    /// Output directory for generated batches
    #[arg(long)]
    pub output_dir: PathBuf,
}

impl GenerateArgs {
    /// Rejects parameter combinations the generator cannot satisfy.
    ///
    /// # Errors
    ///
    /// Fails if relation slots are requested over an empty label set.
    pub const fn validate(&self) -> Result<(), GenerateError> {
        if self.n_slot > 0 && self.n_label == 0 {
            return Err(GenerateError::NoLabels {
                n_slot: self.n_slot,
            });
        }
        Ok(())
    }
}

/// Invalid `generate` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    NoLabels { n_slot: u64 },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLabels { n_slot } => {
                write!(f, "--n-slot {n_slot} needs --n-label of at least 1")
            }
        }
    }
}

impl std::error::Error for GenerateError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Incremental,
    Full,
}

impl From<StrategyArg> for Strategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Incremental => Self::Incremental,
            StrategyArg::Full => Self::Full,
        }
    }
}

/// Failure to read an execution source.
#[derive(Debug)]
pub enum InputError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: ParseError },
    Empty,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Parse { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Empty => write!(f, "no execution files to check"),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Empty => None,
        }
    }
}

fn read(path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Compares file names so that embedded numbers sort by value:
/// `exec_2.txt` before `exec_10.txt`.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.chars().next(), b.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let (x_digits, x_rest) = split_digits(a);
                let (y_digits, y_rest) = split_digits(b);
                let (x_value, y_value) = (
                    x_digits.trim_start_matches('0'),
                    y_digits.trim_start_matches('0'),
                );
                let order = x_value
                    .len()
                    .cmp(&y_value.len())
                    .then_with(|| x_value.cmp(y_value))
                    .then_with(|| x_digits.len().cmp(&y_digits.len()));
                if order != Ordering::Equal {
                    return order;
                }
                (a, b) = (x_rest, y_rest);
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                (a, b) = (&a[x.len_utf8()..], &b[y.len_utf8()..]);
            }
        }
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Execution files named by a list file, resolved against its directory.
///
/// # Errors
///
/// Fails if the list file cannot be read or names no execution.
pub fn list_entries(list: &Path) -> Result<Vec<PathBuf>, InputError> {
    let base = list.parent().unwrap_or_else(|| Path::new(""));
    let entries = parse_execution_list(&read(list)?).map_err(|source| InputError::Parse {
        path: list.to_path_buf(),
        source,
    })?;
    Ok(entries.into_iter().map(|entry| base.join(entry)).collect())
}

/// Files in `dir` with `extension`, in natural order of their names.
///
/// # Errors
///
/// Fails if `dir` cannot be listed.
pub fn dir_entries(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, InputError> {
    let entries = fs::read_dir(dir).map_err(|source| InputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == extension))
        .filter(|path| path.file_name().is_none_or(|name| name != LIST_FILE))
        .collect();
    files.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    Ok(files)
}

/// Display name of an execution file.
#[must_use]
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Execution files selected by `args`, in processing order.
///
/// # Errors
///
/// Fails if a list file or input directory cannot be read, or if nothing is
/// selected.
pub fn collect_inputs(args: &CheckArgs) -> Result<Vec<PathBuf>, InputError> {
    let files = if let Some(list) = &args.list {
        list_entries(list)?
    } else if let Some(dir) = &args.input_dir {
        dir_entries(dir, &args.extension)?
    } else {
        args.files.clone()
    };
    if files.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(files)
}

/// Reads and parses every execution file.
///
/// # Errors
///
/// Fails on the first unreadable or malformed file.
pub fn read_executions(
    files: &[PathBuf],
) -> Result<Vec<mtsort_core::Execution<String>>, InputError> {
    files
        .iter()
        .map(|path| {
            parse_execution(&read(path)?).map_err(|source| InputError::Parse {
                path: path.clone(),
                source,
            })
        })
        .collect()
}

/// Process exit status for a finished check.
#[must_use]
pub fn exit_code(report: &Report) -> i32 {
    if report.is_ok() {
        EXIT_OK
    } else {
        EXIT_CYCLE
    }
}

/// Output lines for one execution result.
///
/// # Errors
///
/// Fails if `--json` is set and the result cannot be serialized.
pub fn render_entry(
    args: &CheckArgs,
    filename: &str,
    entry: &ExecutionReport,
) -> Result<String, serde_json::Error> {
    if args.json {
        let result = serde_json::json!({
            "file": filename,
            "result": entry,
        });
        return serde_json::to_string(&result);
    }

    let mut lines = vec![if entry.ok {
        format!("{filename}: PASS")
    } else {
        let broken: Vec<String> = entry
            .broken
            .iter()
            .map(|relation| format!("{} -> {}", relation.pred, relation.succ))
            .collect();
        format!("{filename}: FAIL (cycle broken at {})", broken.join(", "))
    }];
    if args.verbose {
        lines.push(format!("  pass: {:?}", entry.pass));
        lines.push(format!("  order: {}", entry.order.join(" ")));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_order() {
        let mut names = vec!["exec_10.txt", "exec_2.txt", "exec_1.txt", "exec_02.txt", "a.txt"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(
            names,
            vec!["a.txt", "exec_1.txt", "exec_2.txt", "exec_02.txt", "exec_10.txt"]
        );
    }

    #[test]
    fn test_natural_order_plain_text() {
        assert_eq!(natural_cmp("abc", "abd"), Ordering::Less);
        assert_eq!(natural_cmp("ab", "abc"), Ordering::Less);
        assert_eq!(natural_cmp("x9y", "x9y"), Ordering::Equal);
    }

    #[test]
    fn test_source_is_required() {
        assert!(App::try_parse_from(["mtsort", "check"]).is_err());
        let app = App::try_parse_from(["mtsort", "check", "--list", "l.txt", "--strategy", "full"])
            .unwrap();
        let Command::Check(args) = app.command else {
            panic!("expected check");
        };
        assert_eq!(args.list, Some(PathBuf::from("l.txt")));
        assert_eq!(Strategy::from(args.strategy), Strategy::Full);
    }

    #[test]
    fn test_sources_conflict() {
        assert!(App::try_parse_from(["mtsort", "check", "a.txt", "--input-dir", "d"]).is_err());
    }

    #[test]
    fn test_list_and_dir_inputs() {
        let dir = std::env::temp_dir().join(format!("mtsort_cli_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for name in ["exec_10.txt", "exec_2.txt", "notes.md"] {
            fs::write(dir.join(name), "a b\n").unwrap();
        }
        fs::write(dir.join("list.txt"), "exec_10.txt\nexec_2.txt\n").unwrap();

        let listed = list_entries(&dir.join("list.txt")).unwrap();
        assert_eq!(listed, [dir.join("exec_10.txt"), dir.join("exec_2.txt")]);

        let found: Vec<String> = dir_entries(&dir, "txt")
            .unwrap()
            .iter()
            .map(|path| file_name(path))
            .collect();
        assert_eq!(found, ["exec_2.txt", "exec_10.txt"]);

        let executions = read_executions(&listed).unwrap();
        assert_eq!(executions.len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_generated_batch_dir_skips_list_file() {
        let dir = std::env::temp_dir().join(format!("mtsort_cli_batch_{}", std::process::id()));
        let batches = mtsort_testgen::generator::generate_mult_batches(1, 4, 5, 3, 1, Some(3));
        let batch_dir = batches[0].write_to(&dir).unwrap();

        let found: Vec<String> = dir_entries(&batch_dir, "txt")
            .unwrap()
            .iter()
            .map(|path| file_name(path))
            .collect();
        assert_eq!(found, ["exec_0.txt", "exec_1.txt", "exec_2.txt"]);
        assert_eq!(read_executions(&dir_entries(&batch_dir, "txt").unwrap()).unwrap().len(), 3);

        fs::remove_dir_all(&dir).unwrap();
    }

    fn generate_args(extra: &[&str]) -> Result<GenerateArgs, clap::Error> {
        let base = ["mtsort", "generate", "--n-batch", "1", "--n-exec", "2", "--output-dir", "out"];
        let app = App::try_parse_from(base.iter().chain(extra))?;
        let Command::Generate(args) = app.command else {
            panic!("expected generate");
        };
        Ok(args)
    }

    #[test]
    fn test_generate_rejects_slots_without_labels() {
        let args = generate_args(&["--n-label", "0", "--n-slot", "3"]).unwrap();
        let error = args.validate().unwrap_err();
        assert_eq!(error, GenerateError::NoLabels { n_slot: 3 });
        assert!(error.to_string().contains("--n-label"));

        assert!(generate_args(&["--n-label", "0", "--n-slot", "0"])
            .unwrap()
            .validate()
            .is_ok());
        assert!(generate_args(&["--n-label", "4", "--n-slot", "3"])
            .unwrap()
            .validate()
            .is_ok());
    }

    fn check_args(extra: &[&str]) -> CheckArgs {
        let app = App::try_parse_from(["mtsort", "check", "a.txt"].iter().chain(extra)).unwrap();
        let Command::Check(args) = app.command else {
            panic!("expected check");
        };
        args
    }

    fn entry(ok: bool, broken: Vec<mtsort_core::Relation<String>>) -> ExecutionReport {
        ExecutionReport {
            execution: 0,
            pass: mtsort_core::Pass::Baseline,
            ok,
            order: vec!["b".to_string(), "a".to_string()],
            broken,
        }
    }

    #[test]
    fn test_render_pass_and_fail() {
        let plain = check_args(&[]);
        assert_eq!(
            render_entry(&plain, "exec_0.txt", &entry(true, vec![])).unwrap(),
            "exec_0.txt: PASS"
        );

        let broken = vec![
            mtsort_core::Relation::new("a".to_string(), "b".to_string()),
            mtsort_core::Relation::new("c".to_string(), "d".to_string()),
        ];
        assert_eq!(
            render_entry(&plain, "exec_1.txt", &entry(false, broken)).unwrap(),
            "exec_1.txt: FAIL (cycle broken at a -> b, c -> d)"
        );
    }

    #[test]
    fn test_render_verbose_and_json() {
        let verbose = check_args(&["--verbose"]);
        assert_eq!(
            render_entry(&verbose, "exec_0.txt", &entry(true, vec![])).unwrap(),
            "exec_0.txt: PASS\n  pass: Baseline\n  order: b a"
        );

        let json = check_args(&["--json"]);
        let line = render_entry(&json, "exec_0.txt", &entry(true, vec![])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["file"], "exec_0.txt");
        assert_eq!(value["result"]["ok"], true);
        assert_eq!(value["result"]["order"], serde_json::json!(["b", "a"]));
    }

    #[test]
    fn test_exit_codes() {
        let passing = Report {
            executions: vec![entry(true, vec![])],
        };
        assert_eq!(exit_code(&passing), EXIT_OK);
        assert_eq!(exit_code(&Report::default()), EXIT_OK);

        let failing = Report {
            executions: vec![
                entry(true, vec![]),
                entry(false, vec![mtsort_core::Relation::new("a".to_string(), "b".to_string())]),
            ],
        };
        assert_eq!(exit_code(&failing), EXIT_CYCLE);
        assert_eq!(EXIT_FATAL, 2);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let error = read_executions(&[PathBuf::from("/nonexistent/exec_0.txt")]).unwrap_err();
        assert!(matches!(error, InputError::Io { .. }));
        assert!(error.to_string().contains("exec_0.txt"));
    }
}
