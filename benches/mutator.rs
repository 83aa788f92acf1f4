//! Criterion benchmarks for the DeploymentConfig mutators
//!
//! The mutators run once per reconcile pass for every managed
//! DeploymentConfig, so both the in-sync path and the drifted path matter.

use std::sync::Arc;

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};

use amp_common::crd::DeploymentConfig;
use amp_common::quantity::ParsedQuantity;
use amp_common::{DiffReporter, NoopDiffReporter};
use amp_reconcilers::{DeploymentConfigMutator, Mutator, MUTATOR_NAMES};

// =============================================================================
// Test Fixtures
// =============================================================================

fn deployment_config(replicas: i32, cpu: &str, tolerations: usize) -> DeploymentConfig {
    let mut yaml = format!(
        r#"
apiVersion: apps.openshift.io/v1
kind: DeploymentConfig
metadata:
  name: backend-listener
spec:
  replicas: {replicas}
  template:
    spec:
      affinity:
        nodeAffinity:
          requiredDuringSchedulingIgnoredDuringExecution:
            nodeSelectorTerms:
              - matchExpressions:
                  - key: node-role.kubernetes.io/infra
                    operator: In
                    values: ["true"]
      containers:
        - name: listener
          resources:
            requests:
              cpu: "{cpu}"
              memory: 550Mi
            limits:
              cpu: "1"
              memory: 700Mi
      tolerations:
"#
    );
    for i in 0..tolerations {
        yaml.push_str(&format!(
            "        - key: dedicated-{i}\n          operator: Exists\n          effect: NoSchedule\n"
        ));
    }
    serde_yaml::from_str(&yaml).expect("fixture parses")
}

fn reporter() -> Arc<dyn DiffReporter> {
    Arc::new(NoopDiffReporter)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_in_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("mutate_in_sync");

    for name in MUTATOR_NAMES {
        let mutator = DeploymentConfigMutator::by_name(name, reporter()).expect("known mutator");
        let desired = deployment_config(2, "500m", 4);
        let existing = deployment_config(2, "0.5", 4);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("pipeline", name), &existing, |b, existing| {
            b.iter_batched(
                || existing.clone(),
                |mut existing| black_box(mutator.mutate(&mut existing, &desired)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_drifted(c: &mut Criterion) {
    let mut group = c.benchmark_group("mutate_drifted");
    let mutator = DeploymentConfigMutator::generic(reporter());

    for tolerations in [1, 8, 32] {
        let desired = deployment_config(3, "1", tolerations);
        let mut existing = deployment_config(1, "250m", tolerations);
        if let Some(t) = existing.pod_spec_mut().tolerations.as_mut() {
            t.reverse();
        }

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("generic", tolerations),
            &existing,
            |b, existing| {
                b.iter_batched(
                    || existing.clone(),
                    |mut existing| black_box(mutator.mutate(&mut existing, &desired)),
                    BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_quantity_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantity_parse");

    for input in ["1", "250m", "1.5Gi", "1e3", "123456789012345678901234567890n"] {
        group.bench_with_input(BenchmarkId::new("parse", input), input, |b, input| {
            b.iter(|| black_box(ParsedQuantity::parse(black_box(input))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_in_sync, bench_drifted, bench_quantity_parse);
criterion_main!(benches);
