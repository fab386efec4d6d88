//! Run configuration.
//!
//! A run needs two settings: where to write the cucumber JSON report, and
//! whether this process coordinates the run or is one of its workers. Both are
//! read from the environment by [`ReportConfig::from_env`] or supplied
//! programmatically. Only a coordinator with a report path installs the
//! report aggregator.

use std::sync::atomic::{AtomicU8, Ordering};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::ConfigError;

/// Environment variable naming the cucumber JSON report path.
pub const PICKLE_BDD_CUCUMBER_JSON: &str = "PICKLE_BDD_CUCUMBER_JSON";

/// Environment variable marking a worker process.
///
/// A boolean flag (`1`/`true`/`yes`/`on` or `0`/`false`/`no`/`off`); any other
/// non-empty value is taken as a worker identifier and also marks a worker.
pub const PICKLE_BDD_WORKER: &str = "PICKLE_BDD_WORKER";

const OVERRIDE_UNSET: u8 = 0;
const OVERRIDE_COORDINATOR: u8 = 1;
const OVERRIDE_WORKER: u8 = 2;

static ROLE_OVERRIDE: AtomicU8 = AtomicU8::new(OVERRIDE_UNSET);

/// Whether this process coordinates the run or executes part of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ProcessRole {
    /// The single process that aggregates and writes reports.
    #[default]
    Coordinator,
    /// A process running a share of the scenarios on behalf of a coordinator.
    Worker,
}

/// Report settings for a run.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use pickle_bdd::{ProcessRole, ReportConfig};
///
/// let lookup = |name: &str| match name {
///     "PICKLE_BDD_CUCUMBER_JSON" => Some("${OUT}/report.json".to_string()),
///     "OUT" => Some("target/bdd".to_string()),
///     _ => None,
/// };
/// let config = ReportConfig::from_lookup(lookup, Utf8Path::new("/work")).expect("config");
/// assert_eq!(config.cucumber_json().map(Utf8Path::as_str), Some("/work/target/bdd/report.json"));
/// assert_eq!(config.role(), ProcessRole::Coordinator);
/// assert!(config.installs_aggregator());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportConfig {
    cucumber_json: Option<Utf8PathBuf>,
    role: ProcessRole,
}

impl ReportConfig {
    /// A coordinator configuration with no report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the current directory cannot be
    /// determined or is not UTF-8.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|err| ConfigError::CurrentDir {
            message: err.to_string(),
        })?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|path| ConfigError::NonUtf8CurrentDir {
            path: path.to_string_lossy().into_owned(),
        })?;
        Self::from_lookup(|name| std::env::var(name).ok(), &cwd)
    }

    /// Read the configuration through `lookup`, resolving a relative report
    /// path against `cwd`.
    ///
    /// A process-wide override set with [`set_role_override`] takes
    /// precedence over [`PICKLE_BDD_WORKER`].
    ///
    /// # Errors
    /// Currently infallible; the signature matches [`ReportConfig::from_env`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        cwd: &Utf8Path,
    ) -> Result<Self, ConfigError> {
        let cucumber_json = lookup(PICKLE_BDD_CUCUMBER_JSON)
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| expand_report_path(raw.trim(), &lookup, cwd));
        let role = role_override()
            .or_else(|| lookup(PICKLE_BDD_WORKER).as_deref().and_then(parse_role))
            .unwrap_or_default();
        Ok(Self {
            cucumber_json,
            role,
        })
    }

    /// Write the report to `path`, used as given.
    #[must_use]
    pub fn with_cucumber_json(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.cucumber_json = Some(path.into());
        self
    }

    /// Set the process role.
    #[must_use]
    pub fn with_role(mut self, role: ProcessRole) -> Self {
        self.role = role;
        self
    }

    /// Report path, if one is configured.
    #[must_use]
    pub fn cucumber_json(&self) -> Option<&Utf8Path> {
        self.cucumber_json.as_deref()
    }

    /// Role of this process.
    #[must_use]
    pub fn role(&self) -> ProcessRole {
        self.role
    }

    /// Whether a report aggregator belongs in this process.
    #[must_use]
    pub fn installs_aggregator(&self) -> bool {
        self.role == ProcessRole::Coordinator && self.cucumber_json.is_some()
    }
}

fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "Yes" | "on" | "ON" | "On" => Some(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" | "No" | "off" | "OFF" | "Off" => {
            Some(false)
        }
        _ => None,
    }
}

fn parse_role(value: &str) -> Option<ProcessRole> {
    if value.trim().is_empty() {
        return None;
    }
    let worker = parse_env_bool(value).unwrap_or(true);
    Some(if worker {
        ProcessRole::Worker
    } else {
        ProcessRole::Coordinator
    })
}

fn role_override() -> Option<ProcessRole> {
    match ROLE_OVERRIDE.load(Ordering::Relaxed) {
        OVERRIDE_COORDINATOR => Some(ProcessRole::Coordinator),
        OVERRIDE_WORKER => Some(ProcessRole::Worker),
        _ => None,
    }
}

/// Force the process role for configurations read after this call.
///
/// Tests may call [`clear_role_override`] to restore environment driven
/// behaviour.
pub fn set_role_override(role: ProcessRole) {
    let value = match role {
        ProcessRole::Coordinator => OVERRIDE_COORDINATOR,
        ProcessRole::Worker => OVERRIDE_WORKER,
    };
    ROLE_OVERRIDE.store(value, Ordering::Relaxed);
}

/// Remove any in-process role override.
pub fn clear_role_override() {
    ROLE_OVERRIDE.store(OVERRIDE_UNSET, Ordering::Relaxed);
}

/// Expand a report path the way a shell user expects.
///
/// `$NAME` and `${NAME}` are replaced through `lookup` (unknown names stay as
/// written), a leading `~` becomes `$HOME`, and the result is made absolute
/// against `cwd` and normalised lexically.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use pickle_bdd::config::expand_report_path;
///
/// let lookup = |name: &str| (name == "HOME").then(|| "/home/ci".to_string());
/// let cwd = Utf8Path::new("/repo");
/// assert_eq!(expand_report_path("~/out/../r.json", &lookup, cwd), "/home/ci/r.json");
/// assert_eq!(expand_report_path("$MISSING/r.json", &lookup, cwd), "/repo/$MISSING/r.json");
/// ```
#[must_use]
pub fn expand_report_path(
    raw: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
    cwd: &Utf8Path,
) -> Utf8PathBuf {
    let expanded = expand_user(&expand_vars(raw, lookup), lookup);
    let path = Utf8Path::new(&expanded);
    if path.is_absolute() {
        normalise(path)
    } else {
        normalise(&cwd.join(path))
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn expand_vars(raw: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            let mut closed = false;
            for n in chars.by_ref() {
                if n == '}' {
                    closed = true;
                    break;
                }
                name.push(n);
            }
            match lookup(&name).filter(|_| closed) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push_str("${");
                    out.push_str(&name);
                    if closed {
                        out.push('}');
                    }
                }
            }
        } else {
            let mut name = String::new();
            while let Some(&n) = chars.peek() {
                if !is_name_char(n) {
                    break;
                }
                name.push(n);
                chars.next();
            }
            let value = if name.is_empty() { None } else { lookup(&name) };
            match value {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('$');
                    out.push_str(&name);
                }
            }
        }
    }
    out
}

fn expand_user(path: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let Some(rest) = path.strip_prefix('~') else {
        return path.to_string();
    };
    if !(rest.is_empty() || rest.starts_with('/')) {
        return path.to_string();
    }
    match lookup("HOME") {
        Some(home) => format!("{}{rest}", home.trim_end_matches('/')),
        None => path.to_string(),
    }
}

fn normalise(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            Utf8Component::Prefix(_) | Utf8Component::RootDir | Utf8Component::Normal(_) => {
                out.push(component);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serial_test::serial;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name| {
            pairs
                .iter()
                .find_map(|(key, value)| (key == name).then(|| value.clone()))
        }
    }

    #[expect(clippy::expect_used, reason = "lookup-based configuration is infallible")]
    fn config(pairs: &[(&str, &str)]) -> ReportConfig {
        ReportConfig::from_lookup(env(pairs), Utf8Path::new("/work/project")).expect("config")
    }

    #[test]
    #[serial]
    fn defaults_to_coordinator_without_report() {
        clear_role_override();
        let config = config(&[]);
        assert_eq!(config, ReportConfig::new());
        assert!(!config.installs_aggregator());
    }

    #[test]
    #[serial]
    fn empty_report_path_means_no_report() {
        clear_role_override();
        assert_eq!(config(&[(PICKLE_BDD_CUCUMBER_JSON, "  ")]).cucumber_json(), None);
    }

    #[rstest]
    #[case("report.json", "/work/project/report.json")]
    #[case("./out/../report.json", "/work/project/report.json")]
    #[case("../report.json", "/work/report.json")]
    #[case("/abs/report.json", "/abs/report.json")]
    #[case("~/r.json", "/home/ci/r.json")]
    #[case("~", "/home/ci")]
    #[case("~other/r.json", "/work/project/~other/r.json")]
    #[case("$OUT/r.json", "/tmp/out/r.json")]
    #[case("${OUT}/r.json", "/tmp/out/r.json")]
    #[case("$OUTDIR/r.json", "/work/project/$OUTDIR/r.json")]
    #[case("${OUT/r.json", "/work/project/${OUT/r.json")]
    #[case("cost$/r.json", "/work/project/cost$/r.json")]
    #[case("/../r.json", "/r.json")]
    fn report_paths_are_expanded(#[case] raw: &str, #[case] expected: &str) {
        let lookup = env(&[("HOME", "/home/ci/"), ("OUT", "/tmp/out")]);
        assert_eq!(
            expand_report_path(raw, &lookup, Utf8Path::new("/work/project")),
            Utf8PathBuf::from(expected)
        );
    }

    #[rstest]
    #[case("", ProcessRole::Coordinator)]
    #[case("0", ProcessRole::Coordinator)]
    #[case("off", ProcessRole::Coordinator)]
    #[case("1", ProcessRole::Worker)]
    #[case("YES", ProcessRole::Worker)]
    #[case("gw3", ProcessRole::Worker)]
    #[serial]
    fn worker_flag_selects_role(#[case] value: &str, #[case] expected: ProcessRole) {
        clear_role_override();
        assert_eq!(config(&[(PICKLE_BDD_WORKER, value)]).role(), expected);
    }

    #[test]
    #[serial]
    fn worker_never_installs_aggregator() {
        clear_role_override();
        let config = config(&[
            (PICKLE_BDD_CUCUMBER_JSON, "r.json"),
            (PICKLE_BDD_WORKER, "gw0"),
        ]);
        assert!(config.cucumber_json().is_some());
        assert!(!config.installs_aggregator());
    }

    #[test]
    #[serial]
    fn override_takes_precedence_over_environment() {
        clear_role_override();
        set_role_override(ProcessRole::Worker);
        assert_eq!(config(&[]).role(), ProcessRole::Worker);
        set_role_override(ProcessRole::Coordinator);
        assert_eq!(config(&[(PICKLE_BDD_WORKER, "1")]).role(), ProcessRole::Coordinator);
        clear_role_override();
        assert_eq!(config(&[(PICKLE_BDD_WORKER, "1")]).role(), ProcessRole::Worker);
    }

    #[test]
    fn builders_set_fields_verbatim() {
        let config = ReportConfig::new()
            .with_cucumber_json("relative.json")
            .with_role(ProcessRole::Worker);
        assert_eq!(config.cucumber_json(), Some(Utf8Path::new("relative.json")));
        assert_eq!(config.role(), ProcessRole::Worker);
    }

    #[test]
    fn parse_env_bool_understands_common_values() {
        for truthy in ["1", "true", "TRUE", "True", "yes", "YES", "Yes", "on", "ON", "On"] {
            assert_eq!(parse_env_bool(truthy), Some(true), "expected {truthy} to be truthy");
        }
        for falsy in ["0", "false", "FALSE", "False", "no", "NO", "No", "off", "OFF", "Off"] {
            assert_eq!(parse_env_bool(falsy), Some(false), "expected {falsy} to be falsy");
        }
        assert_eq!(parse_env_bool("maybe"), None);
    }
}
