//! Validation engine for rank specifications.
//!
//! The engine runs all registered [`ValidationRule`]s against a
//! [`RankSpec`](crate::spec::RankSpec) and collects every diagnostic into a
//! [`ValidationReport`] — it never short-circuits on the first error, so
//! users see all problems at once.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use rapid_pagerank::validation::ValidationEngine;
//!
//! let engine = ValidationEngine::with_defaults();
//! let report = engine.validate(&spec);
//! if report.has_errors() {
//!     for err in report.errors() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use serde::Serialize;

use crate::spec::{RankMode, RankSpec};

// ─── Error codes ────────────────────────────────────────────────────────────

/// Short, stable machine-readable category for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A numeric field is outside its permitted range.
    OutOfRange,
    /// Personalized mode was selected without teleport weights.
    MissingTeleport,
    /// A configured limit is itself invalid.
    LimitExceeded,
    /// A field the schema doesn't recognize.
    UnknownField,
    /// A field that is present but has no effect in this configuration.
    Unused,
}

// ─── Structured error ───────────────────────────────────────────────────────

/// A structured validation finding: code, JSON-pointer path, message, and an
/// optional remediation hint.
#[derive(Debug, Clone, Serialize)]
pub struct SpecError {
    pub code: ErrorCode,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl SpecError {
    pub fn new(
        code: ErrorCode,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl std::fmt::Display for SpecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a diagnostic is a hard error or a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

/// A single validation finding — an error or warning attached to a
/// [`SpecError`] that carries the code, path, message, and hint.
#[derive(Debug, Clone, Serialize)]
pub struct SpecDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub error: SpecError,
}

impl SpecDiagnostic {
    pub fn error(err: SpecError) -> Self {
        Self {
            severity: Severity::Error,
            error: err,
        }
    }

    pub fn warning(err: SpecError) -> Self {
        Self {
            severity: Severity::Warning,
            error: err,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<SpecDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &SpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    /// Iterate over warning-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &SpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.error)
    }

    /// Returns `true` if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Total number of diagnostics (errors + warnings).
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if there are no diagnostics at all.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A single validation rule that inspects a [`RankSpec`] and returns zero or
/// more diagnostics.
///
/// Rules are stateless and must be `Send + Sync` so they can be shared
/// across threads (e.g., in a long-lived validation engine).
pub trait ValidationRule: Send + Sync {
    /// Short, stable identifier for this rule (e.g., `"damping_range"`).
    fn name(&self) -> &str;

    /// Inspect `spec` and return any findings.
    fn validate(&self, spec: &RankSpec) -> Vec<SpecDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs a set of [`ValidationRule`]s against a [`RankSpec`] and collects
/// all diagnostics into a [`ValidationReport`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    /// Create an empty engine with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine pre-loaded with the default rule set.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(DampingRangeRule));
        engine.add_rule(Box::new(ConvergenceParamsRule));
        engine.add_rule(Box::new(RankTeleportRule));
        engine.add_rule(Box::new(RuntimeLimitsRule));
        engine.add_rule(Box::new(UnknownFieldsRule));
        engine
    }

    /// Register an additional rule.
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Run all rules against `spec` and return the collected report.
    pub fn validate(&self, spec: &RankSpec) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            report.diagnostics.extend(rule.validate(spec));
        }
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. damping must lie in [0, 1) ──────────────────────────────────────────

struct DampingRangeRule;

impl ValidationRule for DampingRangeRule {
    fn name(&self) -> &str {
        "damping_range"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<SpecDiagnostic> {
        if (0.0..1.0).contains(&spec.damping) {
            vec![]
        } else {
            vec![SpecDiagnostic::error(
                SpecError::new(
                    ErrorCode::OutOfRange,
                    "/damping",
                    format!("damping must be in [0, 1) (got {})", spec.damping),
                )
                .with_hint("The typical value is 0.85"),
            )]
        }
    }
}

// ─── 2. tolerance and max_iterations must be positive ───────────────────────

struct ConvergenceParamsRule;

impl ValidationRule for ConvergenceParamsRule {
    fn name(&self) -> &str {
        "convergence_params"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<SpecDiagnostic> {
        let mut out = Vec::new();

        if !spec.tolerance.is_finite() || spec.tolerance <= 0.0 {
            out.push(SpecDiagnostic::error(
                SpecError::new(
                    ErrorCode::OutOfRange,
                    "/tolerance",
                    format!(
                        "tolerance must be a positive finite number (got {})",
                        spec.tolerance
                    ),
                )
                .with_hint("Remove the field to use the default of 1e-6"),
            ));
        }

        if spec.max_iterations == 0 {
            out.push(SpecDiagnostic::error(
                SpecError::new(
                    ErrorCode::OutOfRange,
                    "/max_iterations",
                    "max_iterations must be greater than 0",
                )
                .with_hint("Remove the field to use the default of 100"),
            ));
        }

        out
    }
}

// ─── 3. personalized_pagerank requires teleport weights ─────────────────────

struct RankTeleportRule;

impl ValidationRule for RankTeleportRule {
    fn name(&self) -> &str {
        "rank_teleport"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<SpecDiagnostic> {
        match spec.mode {
            RankMode::StandardPagerank => {
                if spec.teleport.is_some() {
                    vec![SpecDiagnostic::warning(
                        SpecError::new(
                            ErrorCode::Unused,
                            "/teleport",
                            "teleport is ignored when mode is standard_pagerank",
                        )
                        .with_hint("Set mode to \"personalized_pagerank\" or remove teleport"),
                    )]
                } else {
                    vec![]
                }
            }
            RankMode::PersonalizedPagerank => {
                let teleport = match &spec.teleport {
                    Some(t) if !t.is_empty() => t,
                    _ => {
                        return vec![SpecDiagnostic::error(
                            SpecError::new(
                                ErrorCode::MissingTeleport,
                                "/teleport",
                                "personalized_pagerank requires a non-empty teleport map",
                            )
                            .with_hint(
                                "Add teleport weights keyed by node label, \
                                 e.g. {\"hub\": 1.0}",
                            ),
                        )]
                    }
                };

                let mut out = Vec::new();
                let mut labels: Vec<&String> = teleport.keys().collect();
                labels.sort();
                for label in labels {
                    let weight = teleport[label];
                    if !weight.is_finite() || weight < 0.0 {
                        out.push(SpecDiagnostic::error(
                            SpecError::new(
                                ErrorCode::OutOfRange,
                                format!("/teleport/{label}"),
                                format!(
                                    "teleport weight must be finite and non-negative (got {weight})"
                                ),
                            ),
                        ));
                    }
                }
                if out.is_empty() && teleport.values().sum::<f64>() <= 0.0 {
                    out.push(SpecDiagnostic::error(
                        SpecError::new(
                            ErrorCode::OutOfRange,
                            "/teleport",
                            "teleport weights must have positive total mass",
                        )
                        .with_hint("At least one weight must be greater than 0"),
                    ));
                }
                out
            }
        }
    }
}

// ─── 4. Runtime limits must be positive when set ────────────────────────────

struct RuntimeLimitsRule;

impl ValidationRule for RuntimeLimitsRule {
    fn name(&self) -> &str {
        "runtime_limits"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<SpecDiagnostic> {
        let mut out = Vec::new();

        let checks: &[(&str, Option<usize>)] = &[
            ("max_nodes", spec.runtime.max_nodes),
            ("max_edges", spec.runtime.max_edges),
        ];

        for &(field, value) in checks {
            if value == Some(0) {
                out.push(SpecDiagnostic::error(
                    SpecError::new(
                        ErrorCode::LimitExceeded,
                        format!("/runtime/{field}"),
                        format!("{field} must be greater than 0"),
                    )
                    .with_hint(format!(
                        "Remove {field} to disable the limit, or set it to a positive value"
                    )),
                ));
            }
        }

        out
    }
}

// ─── 5. Unknown fields (strict → error, non-strict → warning) ──────────────

struct UnknownFieldsRule;

impl UnknownFieldsRule {
    /// Collect unknown-field diagnostics at the given JSON pointer `path`
    /// from a `HashMap` of extra fields captured by `#[serde(flatten)]`.
    fn check_unknowns(
        path: &str,
        unknowns: &std::collections::HashMap<String, serde_json::Value>,
        strict: bool,
    ) -> Vec<SpecDiagnostic> {
        unknowns
            .keys()
            .map(|key| {
                let diag_fn = if strict {
                    SpecDiagnostic::error
                } else {
                    SpecDiagnostic::warning
                };
                diag_fn(
                    SpecError::new(
                        ErrorCode::UnknownField,
                        format!("{path}/{key}"),
                        format!("unrecognized field \"{key}\""),
                    )
                    .with_hint("Check spelling or remove this field"),
                )
            })
            .collect()
    }
}

impl ValidationRule for UnknownFieldsRule {
    fn name(&self) -> &str {
        "unknown_fields"
    }

    fn validate(&self, spec: &RankSpec) -> Vec<SpecDiagnostic> {
        let mut out = Vec::new();
        out.extend(Self::check_unknowns("", &spec.unknown_fields, spec.strict));
        out.extend(Self::check_unknowns(
            "/runtime",
            &spec.runtime.unknown_fields,
            spec.strict,
        ));
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════
