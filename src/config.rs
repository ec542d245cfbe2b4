use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

/// Where a boilerplate matcher is allowed to hit inside a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The whole (trimmed) line must match.
    Line,
    /// The pattern may match anywhere in the line.
    Anywhere,
}

#[derive(Debug, Clone)]
pub struct BoilerplatePattern {
    pub name: String,
    regex: Regex,
}

impl BoilerplatePattern {
    pub fn new(name: &str, fragment: &str, anchor: Anchor) -> Result<Self> {
        let source = match anchor {
            Anchor::Line => format!(r"(?i)^(?:{})$", fragment),
            Anchor::Anywhere => format!(r"(?i){}", fragment),
        };
        let regex = Regex::new(&source)
            .with_context(|| format!("Invalid boilerplate pattern {:?}: {}", name, fragment))?;
        Ok(BoilerplatePattern {
            name: name.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// Ordered list of line matchers; a line is dropped when any of them hits.
#[derive(Debug, Clone, Default)]
pub struct Boilerplate {
    patterns: Vec<BoilerplatePattern>,
}

const DEFAULT_PATTERNS: &[(&str, &str, Anchor)] = &[
    ("institutional_banner", r"SECRETAR[ÍI]A GENERAL", Anchor::Anywhere),
    ("pagination", r"P[áa]gina:\s*\d+\s*de\s*\d+", Anchor::Line),
    ("version", r"Versi[oó]n:?.*", Anchor::Line),
    ("validity", r"Vigencia.*", Anchor::Line),
    ("code_stamp", r"C[oó]digo:\s*UC[- ]?CU[- ]?RES[- ]?\S+.*", Anchor::Line),
    ("approved_by", r"Aprobado por:.*", Anchor::Line),
    ("elaborated_by", r"Elaborado por:.*", Anchor::Line),
    (
        "process_banner",
        r"PRO\s*CESO\s*DE\s*GESTI[ÓO]N\s*DE\s*SECRETAR[ÍI]A\s*DEL\s*CU.*",
        Anchor::Line,
    ),
    (
        "session_banner",
        r"RESO\s*LUCI[ÓO]N\s*SESI[ÓO]N\s*(?:EXTRA)?ORDINAR[ÍI]A.*",
        Anchor::Line,
    ),
    ("minutes_line", r"Acta:\s*\d+", Anchor::Line),
    ("date_stamp", r"\d{4}-\d{2}-\d{2}.*", Anchor::Line),
];

static DEFAULT_BOILERPLATE: LazyLock<Boilerplate> = LazyLock::new(|| Boilerplate {
    patterns: DEFAULT_PATTERNS
        .iter()
        .map(|(name, fragment, anchor)| BoilerplatePattern::new(name, fragment, *anchor).unwrap())
        .collect(),
});

impl Boilerplate {
    pub fn defaults() -> Self {
        DEFAULT_BOILERPLATE.clone()
    }

    pub fn push(&mut self, pattern: BoilerplatePattern) {
        self.patterns.push(pattern);
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// First matching pattern, in list order. Lines are compared with
    /// whitespace runs collapsed to one space and the ends trimmed.
    pub fn find_match(&self, line: &str) -> Option<&BoilerplatePattern> {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        self.patterns.iter().find(|p| p.is_match(&line))
    }

    pub fn is_boilerplate(&self, line: &str) -> bool {
        self.find_match(line).is_some()
    }
}

pub fn default_months() -> BTreeMap<String, String> {
    [
        ("enero", "01"),
        ("febrero", "02"),
        ("marzo", "03"),
        ("abril", "04"),
        ("mayo", "05"),
        ("junio", "06"),
        ("julio", "07"),
        ("agosto", "08"),
        ("septiembre", "09"),
        ("setiembre", "09"),
        ("octubre", "10"),
        ("noviembre", "11"),
        ("diciembre", "12"),
    ]
    .iter()
    .map(|(name, num)| (name.to_string(), num.to_string()))
    .collect()
}

/// Thresholds, matchers and lookup tables shared by every pipeline stage.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub char_limit: usize,
    pub min_len_considerando: usize,
    pub min_len_resuelve: usize,
    pub page_key_len: usize,
    pub boilerplate: Boilerplate,
    pub months: BTreeMap<String, String>,
}

impl ExtractionConfig {
    pub fn month_number(&self, name: &str) -> Option<&str> {
        self.months.get(&name.to_lowercase()).map(String::as_str)
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let settings = Settings::default();
        ExtractionConfig {
            char_limit: settings.char_limit,
            min_len_considerando: settings.min_len_considerando,
            min_len_resuelve: settings.min_len_resuelve,
            page_key_len: settings.page_key_len,
            boilerplate: Boilerplate::defaults(),
            months: settings.months,
        }
    }
}

/// Raw, user-overridable settings as read from file and environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub char_limit: usize,
    pub min_len_considerando: usize,
    pub min_len_resuelve: usize,
    pub page_key_len: usize,
    /// Extra line-anchored patterns appended after the defaults.
    pub extra_boilerplate: Vec<String>,
    pub months: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            char_limit: 1000,
            min_len_considerando: 30,
            min_len_resuelve: 10,
            page_key_len: 80,
            extra_boilerplate: Vec::new(),
            months: default_months(),
        }
    }
}

impl Settings {
    pub fn into_config(self) -> Result<ExtractionConfig> {
        anyhow::ensure!(self.char_limit > 0, "char_limit must be greater than zero");

        let mut boilerplate = Boilerplate::defaults();
        for (i, fragment) in self.extra_boilerplate.iter().enumerate() {
            let name = format!("extra_{}", i + 1);
            boilerplate.push(BoilerplatePattern::new(&name, fragment, Anchor::Line)?);
        }

        let months = self
            .months
            .into_iter()
            .map(|(name, num)| (name.to_lowercase(), num))
            .collect();

        Ok(ExtractionConfig {
            char_limit: self.char_limit,
            min_len_considerando: self.min_len_considerando,
            min_len_resuelve: self.min_len_resuelve,
            page_key_len: self.page_key_len,
            boilerplate,
            months,
        })
    }
}

/// Layer an optional settings file and `RESO_*` environment variables over
/// the defaults.
pub fn load(path: Option<&Path>) -> Result<ExtractionConfig> {
    let mut builder = config::Config::builder();
    if let Some(p) = path {
        builder = builder.add_source(config::File::from(p).required(true));
    }
    let settings: Settings = builder
        .add_source(config::Environment::with_prefix("RESO").try_parsing(true))
        .build()
        .context("Failed to read settings")?
        .try_deserialize()
        .context("Failed to parse settings")?;
    let cfg = settings.into_config()?;
    debug!(
        char_limit = cfg.char_limit,
        boilerplate = cfg.boilerplate.len(),
        months = cfg.months.len(),
        "settings loaded"
    );
    Ok(cfg)
}

// ── Tests ──
