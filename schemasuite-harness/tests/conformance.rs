//! End-to-end runs of conformance suites through the in-process host.

#![allow(clippy::panic_in_result_fn)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use assert_fs::prelude::*;
use futures::FutureExt;
use pretty_assertions::assert_eq;
use schemasuite_core::options::AsyncValid;
use schemasuite_core::{
    ConformanceTests, ErrorDetails, NamedSuite, Options, Rejection, Selector, TestCase,
    TestGroup, Validation, Validator, Verdict,
};
use schemasuite_harness::{HarnessOptions, Outcome, OutputFormat, RunSummary, TestRunner};
use serde_json::{Value, json};

/// Answers with a fixed verdict and error list.
struct Fixed {
    verdict: bool,
    errors: Option<ErrorDetails>,
}

impl Validator for Fixed {
    fn validate(&self, _schema: &Value, _data: &Arc<Value>) -> Validation {
        self.verdict.into()
    }

    fn errors(&self) -> Option<ErrorDetails> {
        self.errors.clone()
    }
}

/// Checks `{"type": "integer"}`-style schemas, keeping the errors of the last call.
#[derive(Default)]
struct TypeChecker {
    last_errors: Mutex<Option<ErrorDetails>>,
}

impl Validator for TypeChecker {
    fn name(&self) -> std::borrow::Cow<'_, str> {
        "type-checker".into()
    }

    fn validate(&self, schema: &Value, data: &Arc<Value>) -> Validation {
        let valid = match schema.get("type").and_then(Value::as_str) {
            Some("integer") => data.is_i64() || data.is_u64(),
            Some("string") => data.is_string(),
            _ => true,
        };

        *self.last_errors.lock().unwrap() = if valid {
            None
        } else {
            Some(vec![json!({"keyword": "type"})])
        };

        valid.into()
    }

    fn errors(&self) -> Option<ErrorDetails> {
        self.last_errors.lock().unwrap().clone()
    }
}

/// Rejects every deferred validation with a fixed message.
struct Rejecting(&'static str);

impl Validator for Rejecting {
    fn validate(&self, _schema: &Value, _data: &Arc<Value>) -> Validation {
        let message = self.0;
        Validation::Deferred(async move { Err::<Verdict, _>(Rejection::exception(message)) }.boxed())
    }
}

/// Hands back the data it was given, or a copy of it.
struct Echo {
    copy: bool,
}

impl Validator for Echo {
    fn validate(&self, _schema: &Value, data: &Arc<Value>) -> Validation {
        let data = if self.copy {
            Arc::new(data.as_ref().clone())
        } else {
            Arc::clone(data)
        };
        Validation::Deferred(async move { Ok::<_, Rejection>(Verdict::Data(data)) }.boxed())
    }
}

/// Accepts everything after a short delay.
struct Slow;

impl Validator for Slow {
    fn validate(&self, _schema: &Value, _data: &Arc<Value>) -> Validation {
        Validation::Deferred(
            async {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                Ok::<_, Rejection>(Verdict::Flag(true))
            }
            .boxed(),
        )
    }
}

fn quiet() -> Options {
    Options::default().with_log(false).with_cwd("/")
}

async fn run(validators: Vec<Arc<dyn Validator>>, options: Options) -> Result<RunSummary> {
    let tests = ConformanceTests::new(validators, options)?;
    let runner = TestRunner::new(HarnessOptions::default().with_format(OutputFormat::Terse));
    runner.run_conformance(&tests).await
}

fn single_case(case: TestCase) -> Vec<NamedSuite> {
    vec![NamedSuite::inline(
        "suite",
        vec![TestGroup::new("group", json!({}), vec![case])],
    )]
}

fn outcome<'a>(summary: &'a RunSummary, name: &str) -> &'a Outcome {
    &summary
        .find(name)
        .unwrap_or_else(|| panic!("no result named {name}"))
        .outcome
}

#[tokio::test]
async fn valid_verdict_without_errors_passes() -> Result<()> {
    let options = quiet().with_suite(
        "inline",
        single_case(TestCase::valid("accepted", json!(1), true)),
    );

    let summary = run(vec![Arc::new(Fixed { verdict: true, errors: Some(vec![]) })], options).await?;

    assert_eq!(
        outcome(&summary, "JSON schema tests::inline::suite::group::accepted"),
        &Outcome::Passed
    );
    assert!(summary.success());

    Ok(())
}

#[tokio::test]
async fn invalid_verdict_with_errors_passes() -> Result<()> {
    let options = quiet().with_suite(
        "inline",
        single_case(TestCase::valid("rejected", json!(1), false)),
    );

    let validator = Fixed {
        verdict: false,
        errors: Some(vec![json!({"keyword": "type"})]),
    };
    let summary = run(vec![Arc::new(validator)], options).await?;

    assert_eq!((summary.passed, summary.failed), (1, 0));

    Ok(())
}

#[tokio::test]
async fn async_rejection_matches_expected_error() -> Result<()> {
    let options = quiet().with_async(true).with_suite(
        "inline",
        single_case(TestCase::error("bad schema", json!({}), "bad schema")),
    );

    let summary = run(vec![Arc::new(Rejecting("bad schema"))], options).await?;

    assert_eq!((summary.passed, summary.failed), (1, 0));

    Ok(())
}

#[tokio::test]
async fn async_rejection_with_other_message_fails() -> Result<()> {
    let options = quiet().with_async(true).with_suite(
        "inline",
        single_case(TestCase::error("bad schema", json!({}), "bad schema")),
    );

    let summary = run(vec![Arc::new(Rejecting("unknown keyword"))], options).await?;

    assert!(matches!(
        &summary.results[0].outcome,
        Outcome::Failed(e) if e.expected == Some(json!("bad schema"))
    ));

    Ok(())
}

#[tokio::test]
async fn async_fan_out_completes_every_validator() -> Result<()> {
    let results_seen = Arc::new(Mutex::new(vec![]));
    let sink = Arc::clone(&results_seen);

    let options = quiet()
        .with_async(true)
        .with_suite("inline", single_case(TestCase::valid("accepted", json!(1), true)))
        .after_each(move |result| sink.lock().unwrap().push(result.passed));

    let validators: Vec<Arc<dyn Validator>> = vec![Arc::new(Slow), Arc::new(Rejecting("boom"))];
    let summary = run(validators, options).await?;

    assert!(matches!(
        outcome(&summary, "JSON schema tests::inline::suite::group::accepted"),
        Outcome::Failed(_)
    ));

    // The rejection settles first; the slow validator still reports its pass.
    let mut seen = results_seen.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen, [false, true]);

    Ok(())
}

#[tokio::test]
async fn disagreeing_validator_fails_only_its_case() -> Result<()> {
    let errors_seen = Arc::new(AtomicUsize::new(0));
    let results_seen = Arc::new(AtomicUsize::new(0));
    let (e, r) = (Arc::clone(&errors_seen), Arc::clone(&results_seen));

    let group = TestGroup::new(
        "integers",
        json!({"type": "integer"}),
        vec![
            TestCase::valid("a string", json!("x"), false),
            TestCase::valid("an integer", json!(7), true),
        ],
    );

    let options = quiet()
        .with_suite("inline", vec![NamedSuite::inline("types", vec![group])])
        .after_each(move |_| {
            r.fetch_add(1, Ordering::SeqCst);
        })
        .after_error(move |result| {
            assert!(!result.passed);
            e.fetch_add(1, Ordering::SeqCst);
        });

    let validators: Vec<Arc<dyn Validator>> = vec![
        Arc::new(TypeChecker::default()),
        Arc::new(Fixed { verdict: true, errors: None }),
    ];
    let summary = run(validators, options).await?;

    let prefix = "JSON schema tests::inline::types::integers";
    assert!(matches!(
        outcome(&summary, &format!("{prefix}::a string")),
        Outcome::Failed(_)
    ));
    assert_eq!(outcome(&summary, &format!("{prefix}::an integer")), &Outcome::Passed);

    // Both validators ran on both cases; only the second validator's first run failed.
    assert_eq!(results_seen.load(Ordering::SeqCst), 4);
    assert_eq!(errors_seen.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn async_valid_requires_the_same_data() -> Result<()> {
    let case = || TestCase::valid("object", json!({"a": 1}), true);

    let same = quiet()
        .with_async(true)
        .with_async_valid(Some(AsyncValid::Data))
        .with_suite("inline", single_case(case()));
    let copied = quiet()
        .with_async(true)
        .with_async_valid(Some(AsyncValid::Data))
        .with_suite("inline", single_case(case()));

    let summary = run(vec![Arc::new(Echo { copy: false })], same).await?;
    assert!(summary.success());

    let summary = run(vec![Arc::new(Echo { copy: true })], copied).await?;
    assert_eq!(summary.failed, 1);

    Ok(())
}

#[tokio::test]
async fn only_takes_precedence_over_skip() -> Result<()> {
    let suites = vec![
        NamedSuite::inline(
            "focused",
            vec![TestGroup::new("g", json!({}), vec![TestCase::valid("t", json!(1), true)])],
        ),
        NamedSuite::inline(
            "other",
            vec![TestGroup::new("g", json!({}), vec![TestCase::valid("t", json!(1), true)])],
        ),
    ];

    let options = quiet()
        .with_skip(Selector::Named(vec!["focused".into()]))
        .with_only(Selector::Named(vec!["focused".into()]))
        .with_suite("inline", suites);

    let summary = run(vec![Arc::new(Fixed { verdict: true, errors: None })], options).await?;

    assert_eq!(
        outcome(&summary, "JSON schema tests::inline::focused::g::t"),
        &Outcome::Passed
    );
    assert_eq!(
        outcome(&summary, "JSON schema tests::inline::other::g::t"),
        &Outcome::Skipped
    );

    Ok(())
}

#[tokio::test]
async fn schema_lists_run_every_case_per_schema() -> Result<()> {
    let mut group = TestGroup::new("strings", Value::Null, vec![TestCase::valid("s", json!("x"), true)]);
    group.schema = schemasuite_core::suite::GroupSchema::Multiple(vec![
        json!({"type": "string", "description": "typed"}),
        json!({"$id": "https://example.com/any"}),
    ]);

    let options = quiet().with_suite("inline", vec![NamedSuite::inline("suite", vec![group])]);
    let summary = run(vec![Arc::new(TypeChecker::default())], options).await?;

    let names: Vec<String> = summary.results.iter().map(|r| r.qualified_name()).collect();
    assert_eq!(
        names,
        [
            "JSON schema tests::inline::suite::strings::schema typed::s",
            "JSON schema tests::inline::suite::strings::schema https://example.com/any::s",
        ]
    );
    assert!(summary.success());

    Ok(())
}

#[tokio::test]
async fn suites_on_disk_with_configuration_file() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    dir.child("draft4/integers.json").write_str(
        r#"[
            {
                "description": "integer type",
                "schema": {"type": "integer"},
                "tests": [
                    {"description": "small", "data": 1, "valid": true},
                    {"description": "big", "dataFile": "data/big.json", "valid": true},
                    {"description": "text", "data": "1", "valid": false}
                ]
            }
        ]"#,
    )?;
    dir.child("draft4/data/big.json").write_str("123456789")?;
    dir.child("draft4/strings.yaml").write_str(
        "- description: string type\n  schema:\n    type: string\n  tests:\n    - description: text\n      data: abc\n      valid: true\n",
    )?;
    dir.child("suite.yaml").write_str(
        "description: draft4 conformance\nsuites:\n  draft4: draft4/*.*\nhideFolder: draft4/\nskip: [strings]\ntimeout: 5000\nlog: false\n",
    )?;

    let options = Options::from_file(dir.child("suite.yaml").path())?;
    let summary = run(vec![Arc::new(TypeChecker::default())], options).await?;

    let prefix = "draft4 conformance::draft4";
    assert_eq!(outcome(&summary, &format!("{prefix}::integers::integer type::small")), &Outcome::Passed);
    assert_eq!(outcome(&summary, &format!("{prefix}::integers::integer type::big")), &Outcome::Passed);
    assert_eq!(outcome(&summary, &format!("{prefix}::integers::integer type::text")), &Outcome::Passed);
    assert_eq!(outcome(&summary, &format!("{prefix}::strings::string type::text")), &Outcome::Skipped);

    Ok(())
}

#[tokio::test]
async fn data_file_wins_over_inline_data() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    dir.child("suite.json").write_str(
        r#"[{"description": "g", "schema": {"type": "integer"}, "tests": [
            {"description": "both", "data": 1, "dataFile": "data/text.json", "valid": false}
        ]}]"#,
    )?;
    dir.child("data/text.json").write_str(r#""text""#)?;

    let data_seen = Arc::new(Mutex::new(vec![]));
    let sink = Arc::clone(&data_seen);
    let options = quiet()
        .with_cwd(dir.path())
        .with_suite("files", vec![NamedSuite::deferred("suite", "suite.json")])
        .after_each(move |result| sink.lock().unwrap().push(result.data.as_ref().clone()));

    let summary = run(vec![Arc::new(TypeChecker::default())], options).await?;

    assert_eq!(
        outcome(&summary, "JSON schema tests::files::suite::g::both"),
        &Outcome::Passed
    );
    assert_eq!(*data_seen.lock().unwrap(), [json!("text")]);

    Ok(())
}

#[tokio::test]
async fn missing_data_file_errors_the_leaf() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    dir.child("suite.json").write_str(
        r#"[{"description": "g", "schema": {}, "tests": [
            {"description": "gone", "dataFile": "missing.json", "valid": true}
        ]}]"#,
    )?;

    let options = quiet()
        .with_cwd(dir.path())
        .with_suite("files", vec![NamedSuite::deferred("suite", "suite.json")]);

    let summary = run(vec![Arc::new(Fixed { verdict: true, errors: None })], options).await?;

    assert!(matches!(&summary.results[0].outcome, Outcome::Errored(_)));

    Ok(())
}

#[tokio::test]
async fn panicking_validator_is_contained() -> Result<()> {
    struct Exploding;

    impl Validator for Exploding {
        fn validate(&self, _schema: &Value, data: &Arc<Value>) -> Validation {
            assert!(data.is_i64(), "cannot handle {data}");
            true.into()
        }
    }

    let group = TestGroup::new(
        "g",
        json!({}),
        vec![
            TestCase::valid("boom", json!("x"), true),
            TestCase::valid("fine", json!(1), true),
        ],
    );
    let options = quiet().with_suite("inline", vec![NamedSuite::inline("suite", vec![group])]);

    let summary = run(vec![Arc::new(Exploding)], options).await?;

    assert!(matches!(&summary.results[0].outcome, Outcome::Errored(m) if m.contains("cannot handle")));
    assert_eq!(summary.results[1].outcome, Outcome::Passed);

    Ok(())
}

#[test]
fn empty_validator_list_is_rejected_up_front() {
    let result = ConformanceTests::new(Vec::<Arc<dyn Validator>>::new(), quiet());
    assert!(result.is_err());
}
