use std::fmt;
use std::str::FromStr;

use keystone_core::{simple_name_of, validate_class_name, ModelError};

/// One import declaration of a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportSpec {
    /// `import a.b.C;`
    Single(String),
    /// `import a.b.*;` (the stored path is `a.b`)
    OnDemand(String),
}

impl ImportSpec {
    /// Parse `a.b.C` or `a.b.*`.
    pub fn parse(spec: &str) -> Result<Self, ModelError> {
        let spec = spec.trim();
        match spec.strip_suffix(".*") {
            Some(prefix) => {
                validate_class_name(prefix)?;
                Ok(ImportSpec::OnDemand(prefix.to_owned()))
            }
            None => {
                validate_class_name(spec)?;
                Ok(ImportSpec::Single(spec.to_owned()))
            }
        }
    }

    /// Parse a whole import list, failing on the first malformed entry.
    pub fn parse_all<I, S>(specs: I) -> Result<Vec<Self>, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        specs
            .into_iter()
            .map(|spec| Self::parse(spec.as_ref()))
            .collect()
    }

    /// The imported package/type path without any `.*` suffix.
    pub fn path(&self) -> &str {
        match self {
            ImportSpec::Single(path) | ImportSpec::OnDemand(path) => path,
        }
    }

    /// The simple name a single-type import brings into scope.
    pub fn imported_name(&self) -> Option<&str> {
        match self {
            ImportSpec::Single(path) => Some(simple_name_of(path)),
            ImportSpec::OnDemand(_) => None,
        }
    }

    pub fn is_on_demand(&self) -> bool {
        matches!(self, ImportSpec::OnDemand(_))
    }
}

impl fmt::Display for ImportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportSpec::Single(path) => f.write_str(path),
            ImportSpec::OnDemand(path) => write!(f, "{path}.*"),
        }
    }
}

impl FromStr for ImportSpec {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
