use std::fmt;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

use verdite_core_types::ProblemKind;

pub const RESULT_PASS: &str = "pass";
pub const RESULT_FAIL: &str = "fail";

/// Prefix under which this crate's metrics appear in the process registry.
const REGISTRY_PREFIX: &str = "verdite_va";

/// The registry scraped by the process's metrics endpoint. VA instances
/// register into it through [`Metrics::register_global`]; tests keep their
/// metrics private via [`Metrics::new`] and read them back with
/// [`Metrics::exposition`].
fn process_registry() -> &'static Mutex<Registry> {
    static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(Registry::default()))
}

/// Encode the process registry in the Prometheus text exposition format.
pub fn export<W: fmt::Write>(writer: &mut W) -> Result<(), fmt::Error> {
    let registry = process_registry().lock().expect("poisoned lock");
    encode(writer, &registry)
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ValidationLabels {
    pub operation: String,
    pub perspective: String,
    pub challenge_type: String,
    pub problem_type: String,
    pub result: String,
}

/// Per-operation latency, labelled by outcome. Observed exactly once per
/// top-level operation, including requests rejected before the coordinator
/// body runs.
#[derive(Clone)]
pub struct Metrics {
    pub validation_latency: Family<ValidationLabels, Histogram>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            validation_latency: Family::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.001, 2.0, 16))
            }),
        }
    }

    pub fn register(registry: &mut Registry) -> Self {
        let metrics = Self::new();

        registry.register(
            "validation_latency",
            "Latency of validation authority operations",
            metrics.validation_latency.clone(),
        );

        metrics
    }

    /// Register under the `verdite_va` prefix of the process registry.
    pub fn register_global() -> Self {
        let mut registry = process_registry().lock().expect("poisoned lock");
        Self::register(registry.sub_registry_with_prefix(REGISTRY_PREFIX))
    }

    /// The text exposition of this metric set alone, against a throwaway
    /// unprefixed registry. Lets tests assert on samples without touching
    /// the process registry.
    pub fn exposition(&self) -> Result<String, fmt::Error> {
        let mut registry = Registry::default();
        registry.register(
            "validation_latency",
            "Latency of validation authority operations",
            self.validation_latency.clone(),
        );

        let mut out = String::new();
        encode(&mut out, &registry)?;
        Ok(out)
    }

    pub(crate) fn observe(
        &self,
        operation: &str,
        perspective: &str,
        challenge_type: &str,
        problem: Option<ProblemKind>,
        latency: Duration,
    ) {
        let labels = ValidationLabels {
            operation: operation.to_string(),
            perspective: perspective.to_string(),
            challenge_type: challenge_type.to_string(),
            problem_type: problem.map(|kind| kind.as_str()).unwrap_or("").to_string(),
            result: if problem.is_none() {
                RESULT_PASS.to_string()
            } else {
                RESULT_FAIL.to_string()
            },
        };

        self.validation_latency
            .get_or_create(&labels)
            .observe(latency.as_secs_f64());
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
