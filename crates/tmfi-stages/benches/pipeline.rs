use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use tmfi_core::CorrectionLog;
use tmfi_in::{extract, NameReconciler, TypeCorrector};
use tmfi_registry::Registry;
use tmfi_stages::{IntentPipeline, PipelineConfig};

const CATALOG: &str = include_str!("../../../catalogs/gst-core.json");

const FENCED: &str = r#"Here is the intent:

```json
{
  "name": "Factory automation slice",
  "description": "Low latency slice for a smart factory",
  "serviceSpecCharacteristic": [
    {"name": "E2E latency", "value": {"value": "5", "unitOfMeasure": "ms"}},
    {"name": "Bandwidth", "value": {"value": "500", "unitOfMeasure": "Mbps"}},
    {"name": "Uptime", "value": {"value": "99.999", "unitOfMeasure": "percentage"}},
    {"name": "Area of service", "value": {"value": "DE, FR, IT"}},
    {"name": "Number of users", "value": {"value": "1000.4"}},
    {"name": "User management openness", "value": {"value": "Supported"}}
  ]
}
```
"#;

fn bench_pipeline(c: &mut Criterion) {
    let registry = Arc::new(Registry::from_json_str(CATALOG).unwrap());
    let pipeline = IntentPipeline::new(Arc::clone(&registry), &PipelineConfig::default());

    c.bench_function("extract", |b| b.iter(|| extract(black_box(FENCED))));

    let reconciler = NameReconciler::default();
    let corrector = TypeCorrector::default();
    let record = extract(FENCED).unwrap();
    c.bench_function("repair", |b| {
        b.iter(|| {
            let mut record = record.clone();
            let mut log = CorrectionLog::new();
            reconciler.reconcile_record(&mut record, &registry, &mut log);
            corrector.correct_record(&mut record, &registry, &mut log);
            log
        })
    });

    c.bench_function("process", |b| b.iter(|| pipeline.process(black_box(FENCED))));
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
