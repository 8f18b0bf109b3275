//! Task types and definitions

use std::collections::BTreeSet;
use std::fmt;

use gantry_core::AnchoredUnixPath;
use serde::{Deserialize, Serialize};

/// Separator between package and task in a qualified task id
pub const TASK_DELIMITER: char = '#';

/// Package name used for tasks that belong to the workspace root
pub const ROOT_PKG_NAME: &str = "//";

/// Identifier for a task: either a bare task name (`build`) or a
/// package-qualified one (`web#build`)
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskId {
    /// Package name, absent for bare task names
    package: Option<String>,
    /// Task name (e.g., "build", "test", "lint")
    task: String,
}

impl TaskId {
    /// Create a package-qualified task ID
    pub fn new(package: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            package: Some(package.into()),
            task: task.into(),
        }
    }

    /// Create a bare task ID that applies to every package
    pub fn bare(task: impl Into<String>) -> Self {
        Self {
            package: None,
            task: task.into(),
        }
    }

    /// Create a task ID scoped to the workspace root
    pub fn root(task: impl Into<String>) -> Self {
        Self::new(ROOT_PKG_NAME, task)
    }

    /// Parse a task ID from "package#task" or "task" format.
    ///
    /// Splits on the first delimiter; an empty package or task portion
    /// means the whole string is a bare task name.
    pub fn parse(s: &str) -> Self {
        match s.split_once(TASK_DELIMITER) {
            Some((package, task)) if !package.is_empty() && !task.is_empty() => {
                Self::new(package, task)
            }
            _ => Self::bare(s),
        }
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    /// Whether this id names a specific package
    pub fn is_package_task(&self) -> bool {
        self.package.is_some()
    }

    /// Whether this id is scoped to the workspace root
    pub fn is_root_task(&self) -> bool {
        self.package.as_deref() == Some(ROOT_PKG_NAME)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package {
            Some(package) => write!(f, "{}{}{}", package, TASK_DELIMITER, self.task),
            None => f.write_str(&self.task),
        }
    }
}

/// Returns true if the id is of the form `package#task`
pub fn is_package_task(id: &str) -> bool {
    TaskId::parse(id).is_package_task()
}

/// Qualify a task name with the root package
pub fn root_task_id(task: &str) -> String {
    TaskId::root(task).to_string()
}

/// Drop the package portion of a task id, if any
pub fn strip_package_name(id: &str) -> &str {
    match id.split_once(TASK_DELIMITER) {
        Some((package, task)) if !package.is_empty() && !task.is_empty() => task,
        _ => id,
    }
}

/// How task output is shown while it runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Stream all output
    #[default]
    Full,
    /// Show nothing
    None,
    /// Only print the task hash
    #[serde(alias = "hash")]
    HashOnly,
    /// Only show output on cache misses
    NewOnly,
    /// Only show output when the task fails
    ErrorsOnly,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Full => "full",
            Self::None => "none",
            Self::HashOnly => "hash-only",
            Self::NewOnly => "new-only",
            Self::ErrorsOnly => "errors-only",
        };
        f.write_str(s)
    }
}

/// Glob patterns a task produces, split by polarity
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TaskOutputs {
    /// Globs that are cached
    pub inclusions: Vec<String>,
    /// Globs excluded from the cache (declared with a `!` prefix)
    pub exclusions: Vec<String>,
}

impl TaskOutputs {
    /// Sort both lists in place
    pub fn sort(&mut self) {
        self.inclusions.sort();
        self.exclusions.sort();
    }

    pub fn is_empty(&self) -> bool {
        self.inclusions.is_empty() && self.exclusions.is_empty()
    }

    /// Re-prefix exclusions and return the combined, sorted glob list
    pub fn to_globs(&self) -> Vec<String> {
        let mut globs: Vec<String> = self
            .inclusions
            .iter()
            .cloned()
            .chain(self.exclusions.iter().map(|glob| format!("!{}", glob)))
            .collect();
        globs.sort();
        globs
    }
}

/// The two projections of a `dependsOn` list.
///
/// Always replaced as a pair when merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TaskDependencies {
    /// Tasks in the same package or other packages (`lint`, `web#build`)
    pub tasks: BTreeSet<String>,
    /// Tasks required from upstream workspace dependencies (`^build`)
    pub topological: BTreeSet<String>,
}

impl TaskDependencies {
    /// Flatten back into a `dependsOn` list: task dependencies, then `^`-prefixed
    /// topological ones, each group sorted
    pub fn to_depends_on(&self) -> Vec<String> {
        self.tasks
            .iter()
            .cloned()
            .chain(self.topological.iter().map(|task| format!("^{}", task)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.topological.is_empty()
    }
}

/// Fields of a task block, as named in the configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    Outputs,
    Cache,
    DependsOn,
    Inputs,
    OutputMode,
    Persistent,
    Env,
    PassThroughEnv,
    DotEnv,
}

impl FieldId {
    /// Every stable-schema field
    pub const ALL: [FieldId; 9] = [
        FieldId::Outputs,
        FieldId::Cache,
        FieldId::DependsOn,
        FieldId::Inputs,
        FieldId::OutputMode,
        FieldId::Persistent,
        FieldId::Env,
        FieldId::PassThroughEnv,
        FieldId::DotEnv,
    ];

    /// Key used in the configuration file
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Outputs => "outputs",
            Self::Cache => "cache",
            Self::DependsOn => "dependsOn",
            Self::Inputs => "inputs",
            Self::OutputMode => "outputMode",
            Self::Persistent => "persistent",
            Self::Env => "env",
            Self::PassThroughEnv => "passThroughEnv",
            Self::DotEnv => "dotEnv",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully merged task definition, ready for scheduling and hashing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTaskDefinition {
    /// Output globs (for caching)
    pub outputs: TaskOutputs,

    /// Whether results may be cached
    pub cache: bool,

    /// Tasks required from upstream workspace dependencies
    pub topological_dependencies: BTreeSet<String>,

    /// Tasks that must complete first
    pub task_dependencies: BTreeSet<String>,

    /// Input globs. Kept in declared order, the hasher sorts the matched files.
    pub inputs: Vec<String>,

    /// How output is shown
    pub output_mode: OutputMode,

    /// Whether this is a long-running task (e.g., dev server)
    pub persistent: bool,

    /// Environment variables that affect the hash
    pub env: BTreeSet<String>,

    /// Environment variables passed through without hashing.
    /// `None` means never configured, distinct from configured empty.
    pub pass_through_env: Option<BTreeSet<String>>,

    /// `.env` files, in precedence order
    pub dot_env: Vec<AnchoredUnixPath>,
}

impl Default for ResolvedTaskDefinition {
    fn default() -> Self {
        Self {
            outputs: TaskOutputs::default(),
            cache: true,
            topological_dependencies: BTreeSet::new(),
            task_dependencies: BTreeSet::new(),
            inputs: Vec::new(),
            output_mode: OutputMode::default(),
            persistent: false,
            env: BTreeSet::new(),
            pass_through_env: None,
            dot_env: Vec::new(),
        }
    }
}

impl ResolvedTaskDefinition {
    /// Both dependency projections as one value
    pub fn dependencies(&self) -> TaskDependencies {
        TaskDependencies {
            tasks: self.task_dependencies.clone(),
            topological: self.topological_dependencies.clone(),
        }
    }
}
