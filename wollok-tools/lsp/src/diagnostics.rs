//! Diagnostic Engine
//!
//! Turns validator problems into editor diagnostics for one document.

use tower_lsp::lsp_types::*;
use wollok_model::{Environment, Problem};

use crate::cursor::to_range;
use crate::document::Document;

/// Prefix for problems whose code has no catalog entry.
const RULE_FAILURE: &str = "Rule failure: ";

const MESSAGES: &[(&str, &str)] = &[
    ("nameShouldBeginWithLowercase", "The name {0} must start with lowercase"),
    ("nameShouldBeginWithUppercase", "The name {0} must start with uppercase"),
    ("nameShouldNotBeKeyword", "The name {0} is a keyword, you should pick another one"),
    ("shouldNotBeEmpty", "Should not make an empty definition."),
    (
        "shouldUseConditionalExpression",
        "Bad usage of if! You must return the condition itself without using if.",
    ),
    ("shouldPassValuesToAllAttributes", "Reference {0} not found in {1}"),
    ("namedArgumentShouldExist", "Reference {0} not found in {1}"),
    ("linearizationShouldNotRepeatNamedArguments", "Reference {0} is initialized more than once"),
    ("namedArgumentShouldNotAppearMoreThanOnce", "Reference {0} is initialized more than once"),
    (
        "shouldInitializeAllAttributes",
        "You must provide initial value to the following references: {0}",
    ),
    (
        "shouldImplementAllMethodsInHierarchy",
        "Inconsistent hierarchy. Methods on mixins without super implementation on hierarchy",
    ),
    (
        "shouldUseSelfAndNotSingletonReference",
        "Don't use the name within the object. Use 'self' instead.",
    ),
    ("shouldNotReassignConst", "Cannot modify constants"),
    ("shouldNotHaveLoopInHierarchy", "Infinite Cycle hierarchy"),
    ("shouldOnlyInheritFromMixin", "Mixin can only inherit from another mixin"),
    (
        "shouldNotDefineMoreThanOneSuperclass",
        "Bad Linearization: you cannot define multiple parent classes",
    ),
    (
        "superclassShouldBeLastInLinearization",
        "Bad Linearization: superclass should be last in linearization",
    ),
    ("shouldNotUseOverride", "Method does not override anything"),
    (
        "possiblyReturningBlock",
        "This method is returning a block, consider removing the '=' before curly braces.",
    ),
    (
        "shouldUseOverrideKeyword",
        "Method should be marked as override, since it overrides a superclass method",
    ),
    ("getterMethodShouldReturnAValue", "Getter should return a value"),
    ("methodShouldHaveDifferentSignature", "Duplicated method"),
    ("shouldNotDuplicateVariables", "There is already a variable with this name in the hierarchy"),
    ("shouldNotDuplicateFields", "There is already a field with this name in the hierarchy"),
    (
        "shouldNotDuplicateLocalVariables",
        "There is already a variable with this name in the hierarchy",
    ),
    (
        "shouldNotDuplicateGlobalDefinitions",
        "There is already a definition with this name in the hierarchy",
    ),
    (
        "shouldNotDuplicateVariablesInLinearization",
        "There are attributes with the same name in the hierarchy: [{0}]",
    ),
    ("shouldNotDuplicateEntities", "This name is already defined (imported from {0})"),
    ("shouldNotImportSameFile", "Cannot import same file"),
    ("shouldNotImportMoreThanOnce", "This file is already imported"),
    ("parameterShouldNotDuplicateExistingVariable", "Duplicated Name"),
    ("methodShouldExist", "Method does not exist or invalid number of arguments"),
    ("shouldImplementAbstractMethods", "You must implement all inherited abstract methods"),
    (
        "shouldNotUseVoidMethodAsValue",
        "Message send \"{0}\" produces no value (missing return in method?)",
    ),
    ("shouldInitializeGlobalReference", "Reference is never initialized"),
    ("shouldNotDefineUnusedVariables", "Unused variable"),
    ("shouldNotDefineGlobalMutableVariables", "Global variables are not allowed"),
    ("shouldDefineConstInsteadOfVar", "Variable should be const"),
    ("shouldUseBooleanValueInIfCondition", "Expecting a boolean"),
    ("shouldUseBooleanValueInLogicOperation", "Expecting a boolean"),
    ("shouldNotDefineUnnecesaryIf", "Unnecessary if always evaluates to true!"),
    ("codeShouldBeReachable", "Unreachable code"),
    ("shouldNotDefineUnnecessaryCondition", "Unnecessary condition"),
    (
        "shouldCatchUsingExceptionHierarchy",
        "Can only catch wollok.lang.Exception or a subclass of it",
    ),
    ("catchShouldBeReachable", "Unreachable catch block"),
    ("shouldNotUseReservedWords", "{0} is a reserved name for a core element"),
    ("shouldNotDuplicatePackageName", "Duplicated package"),
    ("shouldHaveNonEmptyName", "Tests must have a non-empty description"),
    ("shouldHaveAssertInTest", "Tests must send at least one message to assert object"),
    ("overridingMethodShouldHaveABody", "Overriding method must have a body"),
    ("shouldNotDefineEmptyDescribe", "Describe should not be empty"),
    (
        "shouldNotMarkMoreThanOneOnlyTest",
        "You should mark a single test with the flag 'only' (the others will not be executed)",
    ),
];

/// Catalog message for a problem code, with `{n}` placeholders.
pub fn message_template(code: &str) -> Option<&'static str> {
    MESSAGES
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, message)| *message)
}

/// Editor message for a problem.
pub fn report_message(problem: &Problem) -> String {
    match message_template(&problem.code) {
        Some(template) => interpolate(template, &problem.values),
        None => humanize(&problem.code),
    }
}

/// Replaces `{n}` with the n-th value; missing values become empty.
pub fn interpolate(template: &str, values: &[String]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if after[..close].chars().all(|c| c.is_ascii_digit()) => {
                let value = after[..close]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| values.get(index));
                if let Some(value) = value {
                    result.push_str(value);
                }
                rest = &after[close + 1..];
            }
            _ => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// `shouldNotBeEmpty` becomes `Rule failure: Should not be empty`.
pub fn humanize(code: &str) -> String {
    if code.is_empty() {
        return String::new();
    }

    let mut words = String::with_capacity(code.len() + 8);
    let mut in_run = false;
    for c in code.chars() {
        let boundary = c.is_ascii_uppercase() || c.is_ascii_digit();
        if boundary && !in_run {
            words.push(' ');
        }
        in_run = boundary;
        words.extend(c.to_lowercase());
    }

    let mut chars = words.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{}{}", RULE_FAILURE, capitalized)
}

/// The diagnostic engine that reports validator problems.
pub struct DiagnosticEngine {
    max_problems: usize,
}

impl DiagnosticEngine {
    pub fn new(max_problems: usize) -> Self {
        Self { max_problems }
    }

    /// Diagnostics for the problems located in `doc`.
    pub fn check(&self, env: &Environment, problems: &[Problem], doc: &Document) -> Vec<Diagnostic> {
        problems
            .iter()
            .filter(|problem| {
                env.get(problem.node)
                    .is_some_and(|_| env.source_file(problem.node) == Some(doc.file_name()))
            })
            .take(self.max_problems)
            .map(|problem| self.to_diagnostic(env, problem))
            .collect()
    }

    fn to_diagnostic(&self, env: &Environment, problem: &Problem) -> Diagnostic {
        let severity = if problem.is_error() {
            DiagnosticSeverity::ERROR
        } else {
            DiagnosticSeverity::WARNING
        };

        let range = problem
            .source_map
            .or(env.node(problem.node).source_map)
            .as_ref()
            .map(to_range)
            .unwrap_or_default();

        Diagnostic {
            range,
            severity: Some(severity),
            code: Some(NumberOrString::String(problem.code.clone())),
            source: env.source_file(problem.node).map(str::to_string),
            message: report_message(problem),
            ..Default::default()
        }
    }
}

impl Default for DiagnosticEngine {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_PROBLEMS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wollok_model::{EnvironmentBuilder, NodeData, NodeId, ProblemLevel, SourceMap};

    fn environment() -> (Environment, NodeId, NodeId) {
        let mut builder = EnvironmentBuilder::new();
        let root = builder.root();
        let birds = builder.add(
            root,
            NodeData::Package {
                name: "birds".into(),
                file_name: Some("file:///birds.wlk".into()),
            },
        );
        let pepita = builder.add_located(
            birds,
            NodeData::Singleton {
                name: Some("Pepita".into()),
                supertypes: Vec::new(),
            },
            SourceMap::new((1, 1), (1, 17)),
        );
        let other = builder.add(
            root,
            NodeData::Package {
                name: "other".into(),
                file_name: Some("file:///other.wlk".into()),
            },
        );
        let empty = builder.add(
            other,
            NodeData::Class {
                name: "Empty".into(),
                supertypes: Vec::new(),
                is_abstract: false,
            },
        );
        (builder.build().expect("valid environment"), pepita, empty)
    }

    #[test]
    fn test_interpolate() {
        let values = vec!["pepita".to_string(), "Bird".to_string()];
        assert_eq!(interpolate("Reference {0} not found in {1}", &values), "Reference pepita not found in Bird");
        assert_eq!(interpolate("missing {2}!", &values), "missing !");
        assert_eq!(interpolate("{x} and {", &values), "{x} and {");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("shouldNotBeEmpty"), "Rule failure: Should not be empty");
        assert_eq!(humanize("shouldHaveABody"), "Rule failure: Should have abody");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_report_message_uses_catalog() {
        let problem = Problem::new("nameShouldBeginWithLowercase", ProblemLevel::Warning, NodeId(0))
            .with_values(vec!["Pepita".to_string()]);
        assert_eq!(report_message(&problem), "The name Pepita must start with lowercase");

        let unknown = Problem::new("someBrandNewRule", ProblemLevel::Error, NodeId(0));
        assert_eq!(report_message(&unknown), "Rule failure: Some brand new rule");
    }

    #[test]
    fn test_check_keeps_document_problems() {
        let (env, pepita, empty) = environment();
        let problems = vec![
            Problem::new("nameShouldBeginWithLowercase", ProblemLevel::Warning, pepita)
                .with_values(vec!["Pepita".to_string()]),
            Problem::new("shouldNotBeEmpty", ProblemLevel::Error, empty),
        ];
        let doc = Document::new(Url::parse("file:///birds.wlk").unwrap(), 1, String::new());

        let diagnostics = DiagnosticEngine::default().check(&env, &problems, &doc);
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(
            diagnostic.code,
            Some(NumberOrString::String("nameShouldBeginWithLowercase".to_string()))
        );
        assert_eq!(diagnostic.source.as_deref(), Some("file:///birds.wlk"));
        assert_eq!(diagnostic.range.end, Position::new(0, 16));
    }

    #[test]
    fn test_problem_region_wins_and_unlocated_problems_go_to_origin() {
        let (env, pepita, empty) = environment();
        let mut narrow = Problem::new("nameShouldBeginWithLowercase", ProblemLevel::Warning, pepita);
        narrow.source_map = Some(SourceMap::new((1, 8), (1, 14)));
        let unlocated = Problem::new("shouldNotBeEmpty", ProblemLevel::Error, empty);

        let birds = Document::new(Url::parse("file:///birds.wlk").unwrap(), 1, String::new());
        let other = Document::new(Url::parse("file:///other.wlk").unwrap(), 1, String::new());
        let engine = DiagnosticEngine::default();

        let diagnostics = engine.check(&env, &[narrow], &birds);
        assert_eq!(diagnostics[0].range.start, Position::new(0, 7));

        let diagnostics = engine.check(&env, &[unlocated], &other);
        assert_eq!(diagnostics[0].range, Range::default());
        assert_eq!(diagnostics[0].message, "Should not make an empty definition.");
    }

    #[test]
    fn test_check_is_capped() {
        let (env, pepita, _) = environment();
        let problems: Vec<Problem> = (0..5)
            .map(|_| Problem::new("shouldNotBeEmpty", ProblemLevel::Error, pepita))
            .collect();
        let doc = Document::new(Url::parse("file:///birds.wlk").unwrap(), 1, String::new());

        assert_eq!(DiagnosticEngine::new(3).check(&env, &problems, &doc).len(), 3);
    }
}
