//! Runs the bundled YAML suites against a small keyword validator.
//!
//! Accepts cargo-test style arguments, e.g. `cargo test --test schemasuite-suite-tests -- types`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use schemasuite_core::{ConformanceTests, ErrorDetails, Options, Validation, Validator};
use schemasuite_harness::{HarnessOptions, TestRunner, TraceEventConfig};
use serde_json::{Value, json};

/// Supports the `type`, `minimum`, `required` and `properties` keywords.
#[derive(Default)]
struct KeywordValidator {
    last_errors: Mutex<Option<ErrorDetails>>,
}

impl KeywordValidator {
    fn check(schema: &Value, data: &Value, errors: &mut ErrorDetails) {
        if let Some(expected) = schema.get("type").and_then(Value::as_str) {
            let matches = match expected {
                "null" => data.is_null(),
                "boolean" => data.is_boolean(),
                "integer" => data.is_i64() || data.is_u64(),
                "number" => data.is_number(),
                "string" => data.is_string(),
                "array" => data.is_array(),
                "object" => data.is_object(),
                _ => true,
            };
            if !matches {
                errors.push(json!({"keyword": "type", "params": {"type": expected}}));
            }
        }

        if let (Some(minimum), Some(number)) = (
            schema.get("minimum").and_then(Value::as_f64),
            data.as_f64(),
        ) {
            if number < minimum {
                errors.push(json!({"keyword": "minimum", "params": {"limit": minimum}}));
            }
        }

        if let Some(object) = data.as_object() {
            for name in schema
                .get("required")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
            {
                if !object.contains_key(name) {
                    errors.push(json!({"keyword": "required", "params": {"missingProperty": name}}));
                }
            }

            if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                for (name, subschema) in properties {
                    if let Some(value) = object.get(name) {
                        Self::check(subschema, value, errors);
                    }
                }
            }
        }
    }
}

impl Validator for KeywordValidator {
    fn name(&self) -> std::borrow::Cow<'_, str> {
        "keywords".into()
    }

    fn validate(&self, schema: &Value, data: &Arc<Value>) -> Validation {
        let mut errors = vec![];
        Self::check(schema, data, &mut errors);

        let valid = errors.is_empty();
        if let Ok(mut last_errors) = self.last_errors.lock() {
            *last_errors = (!valid).then_some(errors);
        }

        valid.into()
    }

    fn errors(&self) -> Option<ErrorDetails> {
        self.last_errors.lock().ok().and_then(|e| e.clone())
    }
}

async fn run_suite_tests(options: HarnessOptions) -> Result<bool> {
    let _trace_config = TraceEventConfig::init(&options.trace_events);

    let suites_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/suites");
    let config = Options::from_file(&suites_dir.join("schemasuite.yaml"))?;

    let tests = ConformanceTests::new([Arc::new(KeywordValidator::default()) as Arc<dyn Validator>], config)?;
    let summary = TestRunner::new(options).run_conformance(&tests).await?;

    Ok(summary.success())
}

fn main() -> Result<()> {
    let unparsed_args: Vec<_> = std::env::args().collect();
    let options = HarnessOptions::parse_from(unparsed_args);

    let success = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run_suite_tests(options))?;

    if !success {
        std::process::exit(1);
    }

    Ok(())
}
