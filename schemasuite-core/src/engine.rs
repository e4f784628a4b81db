//! Registration of conformance suites with a host test framework.

use std::path::Path;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use crate::catalog::{self, CatalogEntry, CatalogSettings};
use crate::error::Error;
use crate::execution::{self, CaseContext};
use crate::filter::Filter;
use crate::options::Options;
use crate::registration::{Registrar, Variant};
use crate::schemas;
use crate::suite::{SuiteSpec, TestGroup};
use crate::trace_categories;
use crate::validator::Validator;

/// A set of validators paired with the suites to run them against.
#[derive(Debug)]
pub struct ConformanceTests {
    validators: Arc<[Arc<dyn Validator>]>,
    options: Arc<Options>,
}

impl ConformanceTests {
    /// Creates a new set of conformance tests. A single validator is passed as
    /// a one-element collection.
    ///
    /// Fails if `options` cannot be used, before any suite is looked at.
    pub fn new<I>(validators: I, options: Options) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Arc<dyn Validator>>,
    {
        let validators: Arc<[Arc<dyn Validator>]> = validators.into_iter().collect();
        options.check(validators.len())?;

        Ok(Self {
            validators,
            options: Arc::new(options),
        })
    }

    /// Registers every configured suite with `registrar`, under a top-level
    /// group labelled with the configured description.
    pub fn register(&self, registrar: &mut dyn Registrar) -> Result<(), Error> {
        let options = self.options.as_ref();
        let cwd = options.resolved_cwd()?;
        let variant = Filter::blanket(&options.skip, &options.only).variant();

        registrar.group(
            variant,
            &options.description,
            options.timeout(),
            &mut |r: &mut dyn Registrar| {
                for (name, spec) in &options.suites {
                    self.register_suite_group(r, name, spec, &cwd)?;
                }
                Ok(())
            },
        )
    }

    fn register_suite_group(
        &self,
        registrar: &mut dyn Registrar,
        name: &str,
        spec: &SuiteSpec,
        cwd: &Path,
    ) -> Result<(), Error> {
        let options = self.options.as_ref();

        // Name lists select suites, not suite groups.
        registrar.group(Variant::Normal, name, None, &mut |r: &mut dyn Registrar| {
            let settings = CatalogSettings {
                cwd,
                hide_folder: options.hide_folder.as_deref(),
                skip: &options.skip,
                only: &options.only,
            };

            for entry in catalog::resolve_suites(spec, &settings, options.matcher.as_ref())? {
                self.register_suite(r, &entry, cwd)?;
            }
            Ok(())
        })
    }

    fn register_suite(
        &self,
        registrar: &mut dyn Registrar,
        entry: &CatalogEntry<'_>,
        cwd: &Path,
    ) -> Result<(), Error> {
        registrar.group(
            entry.filter.variant(),
            &entry.suite.name,
            None,
            &mut |r: &mut dyn Registrar| {
                let loaded = entry.suite.load(self.options.loader.as_ref(), cwd)?;
                let test_dir: Arc<Path> = Arc::from(loaded.dir.as_path());

                tracing::debug!(
                    target: trace_categories::DISCOVERY,
                    "suite {} has {} group(s)",
                    entry.suite.name,
                    loaded.groups.len()
                );

                for group in loaded.groups.iter() {
                    self.register_group(r, group, &test_dir)?;
                }
                Ok(())
            },
        )
    }

    fn register_group(
        &self,
        registrar: &mut dyn Registrar,
        group: &TestGroup,
        test_dir: &Arc<Path>,
    ) -> Result<(), Error> {
        registrar.group(
            group.filter().variant(),
            &group.description,
            None,
            &mut |r: &mut dyn Registrar| {
                for variant in schemas::expand(group) {
                    let schema = Arc::new(variant.schema.clone());

                    if let Some(label) = variant.label {
                        r.group(
                            Variant::Normal,
                            &format!("schema {label}"),
                            None,
                            &mut |r: &mut dyn Registrar| {
                                self.register_cases(r, group, &schema, test_dir);
                                Ok(())
                            },
                        )?;
                    } else {
                        self.register_cases(r, group, &schema, test_dir);
                    }
                }
                Ok(())
            },
        )
    }

    fn register_cases(
        &self,
        registrar: &mut dyn Registrar,
        group: &TestGroup,
        schema: &Arc<Value>,
        test_dir: &Arc<Path>,
    ) {
        for case in &group.tests {
            let context = CaseContext {
                validators: Arc::clone(&self.validators),
                options: Arc::clone(&self.options),
                schema: Arc::clone(schema),
                case: Arc::new(case.clone()),
                test_dir: Arc::clone(test_dir),
            };

            registrar.test(
                case.filter().variant(),
                &case.description,
                Box::new(move || execution::run_case(context).boxed()),
            );
        }
    }
}
